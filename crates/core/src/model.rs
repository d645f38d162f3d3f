//! Typed transaction model.
//!
//! A [`Transaction`] is one of three kinds ([`TransactionKind`]), each
//! carrying its own fields on top of the common id / signature / timestamp.
//! Storage uses a single flat row ([`transaction::Model`]); the conversions
//! in this module are the only place that knows which columns belong to
//! which kind.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use voteledger_db::entities::transaction;

/// Type tag stored in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// `ballot`
    Ballot,
    /// `vote`
    Vote,
    /// `result`
    Result,
}

impl TransactionType {
    /// The tag as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ballot => "ballot",
            Self::Vote => "vote",
            Self::Result => "result",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ballot" => Ok(Self::Ballot),
            "vote" => Ok(Self::Vote),
            "result" => Ok(Self::Result),
            other => Err(ConversionError::UnknownType(other.to_string())),
        }
    }
}

/// Why a stored row could not be turned into a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The `type` column holds an unknown tag.
    #[error("unrecognized transaction type: {0:?}")]
    UnknownType(String),

    /// A column the kind requires is NULL.
    #[error("{kind} transaction is missing {field}")]
    MissingField {
        /// Kind named by the row.
        kind: TransactionType,
        /// Column that was NULL.
        field: &'static str,
    },
}

/// A new election ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotTransaction {
    /// Ballot being opened.
    pub ballot_id: Option<i64>,
}

/// A single vote cast for a candidate on a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTransaction {
    /// Ballot the vote belongs to.
    pub ballot_id: i64,
    /// Candidate voted for.
    pub candidate_id: i64,
}

/// A recorded tally snapshot for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTransaction {
    /// Candidate the snapshot is for.
    pub candidate_id: i64,
    /// Votes counted at snapshot time.
    pub vote_count: i64,
}

/// Kind-specific part of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    /// Ballot creation.
    Ballot(BallotTransaction),
    /// Vote cast.
    Vote(VoteTransaction),
    /// Result snapshot.
    Result(ResultTransaction),
}

/// The kind-specific columns of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KindColumns {
    ballot_id: Option<i64>,
    candidate_id: Option<i64>,
    vote_count: Option<i64>,
}

impl TransactionKind {
    /// The type tag for this kind.
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Ballot(_) => TransactionType::Ballot,
            Self::Vote(_) => TransactionType::Vote,
            Self::Result(_) => TransactionType::Result,
        }
    }

    const fn columns(&self) -> KindColumns {
        match *self {
            Self::Ballot(BallotTransaction { ballot_id }) => KindColumns {
                ballot_id,
                candidate_id: None,
                vote_count: None,
            },
            Self::Vote(VoteTransaction {
                ballot_id,
                candidate_id,
            }) => KindColumns {
                ballot_id: Some(ballot_id),
                candidate_id: Some(candidate_id),
                vote_count: None,
            },
            Self::Result(ResultTransaction {
                candidate_id,
                vote_count,
            }) => KindColumns {
                ballot_id: None,
                candidate_id: Some(candidate_id),
                vote_count: Some(vote_count),
            },
        }
    }

    fn from_columns(kind: TransactionType, cols: KindColumns) -> Result<Self, ConversionError> {
        let require = |value: Option<i64>, field: &'static str| {
            value.ok_or(ConversionError::MissingField { kind, field })
        };

        Ok(match kind {
            TransactionType::Ballot => Self::Ballot(BallotTransaction {
                ballot_id: cols.ballot_id,
            }),
            TransactionType::Vote => Self::Vote(VoteTransaction {
                ballot_id: require(cols.ballot_id, "ballot_id")?,
                candidate_id: require(cols.candidate_id, "candidate_id")?,
            }),
            TransactionType::Result => Self::Result(ResultTransaction {
                candidate_id: require(cols.candidate_id, "candidate_id")?,
                vote_count: require(cols.vote_count, "vote_count")?,
            }),
        })
    }
}

impl From<BallotTransaction> for TransactionKind {
    fn from(tx: BallotTransaction) -> Self {
        Self::Ballot(tx)
    }
}

impl From<VoteTransaction> for TransactionKind {
    fn from(tx: VoteTransaction) -> Self {
        Self::Vote(tx)
    }
}

impl From<ResultTransaction> for TransactionKind {
    fn from(tx: ResultTransaction) -> Self {
        Self::Result(tx)
    }
}

/// A transaction that has not been stored yet.
///
/// It has no id or timestamp; both are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub signature: Option<String>,
    pub kind: TransactionKind,
}

impl NewTransaction {
    /// Create an unsigned transaction.
    pub fn new(kind: impl Into<TransactionKind>) -> Self {
        Self {
            signature: None,
            kind: kind.into(),
        }
    }

    /// Attach an opaque signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Option<String>) -> Self {
        self.signature = signature;
        self
    }

    /// Build the insertable row. `id` and `created_at` stay unset.
    #[must_use]
    pub fn into_active_model(self) -> transaction::ActiveModel {
        let cols = self.kind.columns();
        transaction::ActiveModel {
            id: NotSet,
            kind: Set(self.kind.transaction_type().as_str().to_string()),
            signature: Set(self.signature),
            created_at: NotSet,
            ballot_id: Set(cols.ballot_id),
            candidate_id: Set(cols.candidate_id),
            vote_count: Set(cols.vote_count),
        }
    }
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl Transaction {
    /// The type tag of this transaction.
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// The vote payload, if this is a vote.
    #[must_use]
    pub const fn as_vote(&self) -> Option<&VoteTransaction> {
        match &self.kind {
            TransactionKind::Vote(vote) => Some(vote),
            _ => None,
        }
    }

    /// Flatten into a storage row. Columns that do not belong to the kind are
    /// `None`.
    #[must_use]
    pub fn to_record(&self) -> transaction::Model {
        let cols = self.kind.columns();
        transaction::Model {
            id: self.id,
            kind: self.transaction_type().as_str().to_string(),
            signature: self.signature.clone(),
            created_at: self.created_at,
            ballot_id: cols.ballot_id,
            candidate_id: cols.candidate_id,
            vote_count: cols.vote_count,
        }
    }
}

impl TryFrom<transaction::Model> for Transaction {
    type Error = ConversionError;

    fn try_from(row: transaction::Model) -> Result<Self, Self::Error> {
        let kind_tag: TransactionType = row.kind.parse()?;
        let kind = TransactionKind::from_columns(
            kind_tag,
            KindColumns {
                ballot_id: row.ballot_id,
                candidate_id: row.candidate_id,
                vote_count: row.vote_count,
            },
        )?;

        Ok(Self {
            id: row.id,
            signature: row.signature,
            created_at: row.created_at,
            kind,
        })
    }
}

/// Number of votes a candidate received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Candidate counted.
    pub candidate_id: i64,
    /// Votes received, at least one.
    pub vote_count: i64,
}
