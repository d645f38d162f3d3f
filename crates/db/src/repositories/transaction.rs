//! Transaction repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use voteledger_common::{AppError, AppResult};

use crate::entities::{Transaction, transaction};

/// Transaction repository for database operations.
///
/// Rows are append-only: there is no update or delete.
#[derive(Clone)]
pub struct TransactionRepository {
    db: Arc<DatabaseConnection>,
}

impl TransactionRepository {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new transaction row.
    ///
    /// The repository owns `id` and `created_at`: whatever the caller put in
    /// those fields is discarded.
    pub async fn create(&self, mut model: transaction::ActiveModel) -> AppResult<transaction::Model> {
        model.id = NotSet;
        model.created_at = Set(Utc::now());

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find every stored transaction.
    pub async fn find_all(&self) -> AppResult<Vec<transaction::Model>> {
        Transaction::find()
            .order_by_asc(transaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find transactions created within `[start, end]`, both ends inclusive.
    pub async fn find_by_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<transaction::Model>> {
        Transaction::find()
            .filter(transaction::Column::CreatedAt.between(start, end))
            .order_by_asc(transaction::Column::CreatedAt)
            .order_by_asc(transaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find transactions with the given type tag.
    pub async fn find_by_kind(&self, kind: &str) -> AppResult<Vec<transaction::Model>> {
        Transaction::find()
            .filter(transaction::Column::Kind.eq(kind))
            .order_by_asc(transaction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
