//! Transaction entity.
//!
//! One flat row per recorded event. The `type` column says which of the
//! optional columns are meaningful:
//!
//! | type     | ballot_id | candidate_id | vote_count |
//! |----------|-----------|--------------|------------|
//! | `ballot` | yes       |              |            |
//! | `vote`   | yes       | yes          |            |
//! | `result` |           | yes          | yes        |

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored transaction row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction")]
pub struct Model {
    /// Database-assigned identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Type tag (`ballot`, `vote` or `result`).
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: String,

    /// Opaque client-supplied signature.
    #[sea_orm(nullable)]
    pub signature: Option<String>,

    /// When the row was written.
    pub created_at: DateTime<Utc>,

    /// Ballot reference (`ballot`, `vote`).
    #[sea_orm(nullable)]
    pub ballot_id: Option<i64>,

    /// Candidate reference (`vote`, `result`).
    #[sea_orm(nullable)]
    pub candidate_id: Option<i64>,

    /// Counted votes (`result`).
    #[sea_orm(nullable)]
    pub vote_count: Option<i64>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
