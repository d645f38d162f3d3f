//! Create transaction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transaction::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transaction::Type).string_len(16).not_null())
                    .col(ColumnDef::new(Transaction::Signature).text().null())
                    .col(
                        ColumnDef::new(Transaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Transaction::BallotId).big_integer().null())
                    .col(ColumnDef::new(Transaction::CandidateId).big_integer().null())
                    .col(ColumnDef::new(Transaction::VoteCount).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // Index: type (for listing votes)
        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_type")
                    .table(Transaction::Table)
                    .col(Transaction::Type)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for time range queries)
        manager
            .create_index(
                Index::create()
                    .name("idx_transaction_created_at")
                    .table(Transaction::Table)
                    .col(Transaction::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Transaction {
    Table,
    Id,
    Type,
    Signature,
    CreatedAt,
    BallotId,
    CandidateId,
    VoteCount,
}
