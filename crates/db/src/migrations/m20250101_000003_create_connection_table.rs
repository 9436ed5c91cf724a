//! Create connection table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Connection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Connection::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Connection::ReferralPostId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Connection::SenderId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Connection::ReceiverId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Connection::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Connection::Message).text())
                    .col(
                        ColumnDef::new(Connection::IdentityRevealed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Connection::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Connection::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_post")
                            .from(Connection::Table, Connection::ReferralPostId)
                            .to(ReferralPost::Table, ReferralPost::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_sender")
                            .from(Connection::Table, Connection::SenderId)
                            .to(Participant::Table, Participant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_receiver")
                            .from(Connection::Table, Connection::ReceiverId)
                            .to(Participant::Table, Participant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one active (pending or accepted)
        // connection per (post, sender). This is the atomic guard that makes
        // OpenConnection a conditional insert instead of a read-then-write.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_connection_active_pair \
                 ON connection (referral_post_id, sender_id) \
                 WHERE status IN ('pending', 'accepted');",
            )
            .await?;

        // A participant cannot connect to their own post
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE connection ADD CONSTRAINT chk_connection_distinct_parties \
                 CHECK (sender_id <> receiver_id);",
            )
            .await?;

        // Index: sender_id (sent listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_connection_sender_id")
                    .table(Connection::Table)
                    .col(Connection::SenderId)
                    .to_owned(),
            )
            .await?;

        // Index: receiver_id (received listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_connection_receiver_id")
                    .table(Connection::Table)
                    .col(Connection::ReceiverId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Connection::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Connection {
    Table,
    Id,
    ReferralPostId,
    SenderId,
    ReceiverId,
    Status,
    Message,
    IdentityRevealed,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ReferralPost {
    Table,
    Id,
}

#[derive(Iden)]
enum Participant {
    Table,
    Id,
}
