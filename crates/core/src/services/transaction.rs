//! Transaction service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use voteledger_common::{AppError, AppResult};
use voteledger_db::entities::transaction;
use voteledger_db::repositories::TransactionRepository;

use crate::model::{NewTransaction, ResultSummary, Transaction, TransactionType, VoteTransaction};

/// Service for recording and reading voting transactions.
#[derive(Clone)]
pub struct TransactionService {
    transaction_repo: TransactionRepository,
}

impl TransactionService {
    /// Create a new transaction service.
    #[must_use]
    pub const fn new(transaction_repo: TransactionRepository) -> Self {
        Self { transaction_repo }
    }

    /// Record a new transaction. Each call creates a new row, even for
    /// content identical to an existing one.
    pub async fn create(&self, new: NewTransaction) -> AppResult<Transaction> {
        let kind = new.kind.transaction_type();
        let row = self
            .transaction_repo
            .create(new.into_active_model())
            .await?;

        let tx = Transaction::try_from(row)
            .map_err(|e| AppError::Internal(format!("Stored transaction unreadable: {e}")))?;

        tracing::info!(id = tx.id, kind = %kind, "Transaction recorded");
        Ok(tx)
    }

    /// List every stored transaction.
    pub async fn list_all(&self) -> AppResult<Vec<Transaction>> {
        let rows = self.transaction_repo.find_all().await?;
        Ok(into_transactions(rows))
    }

    /// List transactions created within `[start, end]`.
    ///
    /// A reversed range is rejected rather than answered with an empty list.
    pub async fn list_by_time(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Transaction>> {
        if start > end {
            return Err(AppError::BadRequest(
                "start_time must not be after end_time".to_string(),
            ));
        }

        let rows = self
            .transaction_repo
            .find_by_created_between(start, end)
            .await?;
        Ok(into_transactions(rows))
    }

    /// List all votes.
    pub async fn list_votes(&self) -> AppResult<Vec<VoteTransaction>> {
        let rows = self
            .transaction_repo
            .find_by_kind(TransactionType::Vote.as_str())
            .await?;

        Ok(into_transactions(rows)
            .iter()
            .filter_map(Transaction::as_vote)
            .copied()
            .collect())
    }

    /// Current per-candidate vote counts, computed from the stored votes.
    pub async fn results(&self) -> AppResult<Vec<ResultSummary>> {
        let votes = self.list_votes().await?;
        Ok(tally(&votes))
    }
}

/// Count votes per candidate.
///
/// Produces one entry per candidate that received at least one vote, ordered
/// by candidate id.
#[must_use]
pub fn tally(votes: &[VoteTransaction]) -> Vec<ResultSummary> {
    let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
    for vote in votes {
        *counts.entry(vote.candidate_id).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(candidate_id, vote_count)| ResultSummary {
            candidate_id,
            vote_count,
        })
        .collect()
}

/// Convert rows, skipping any that do not map to a known transaction.
fn into_transactions(rows: Vec<transaction::Model>) -> Vec<Transaction> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Transaction::try_from(row) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    tracing::warn!(id = id, error = %e, "Skipping unreadable transaction record");
                    None
                }
            }
        })
        .collect()
}
