//! Create `identity_reveal` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IdentityReveal::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdentityReveal::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdentityReveal::ConnectionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentityReveal::RequesterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentityReveal::ResponderId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdentityReveal::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(IdentityReveal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(IdentityReveal::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_identity_reveal_connection")
                            .from(IdentityReveal::Table, IdentityReveal::ConnectionId)
                            .to(Connection::Table, Connection::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_identity_reveal_requester")
                            .from(IdentityReveal::Table, IdentityReveal::RequesterId)
                            .to(Participant::Table, Participant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_identity_reveal_responder")
                            .from(IdentityReveal::Table, IdentityReveal::ResponderId)
                            .to(Participant::Table, Participant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Partial unique index: at most one pending reveal per connection.
        // Declined reveals may pile up as history; only pending is exclusive.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_identity_reveal_pending \
                 ON identity_reveal (connection_id) \
                 WHERE status = 'pending';",
            )
            .await?;

        // Requester and responder are distinct parties by construction
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE identity_reveal ADD CONSTRAINT chk_identity_reveal_distinct_parties \
                 CHECK (requester_id <> responder_id);",
            )
            .await?;

        // Index: connection_id (reveal history per connection)
        manager
            .create_index(
                Index::create()
                    .name("idx_identity_reveal_connection_id")
                    .table(IdentityReveal::Table)
                    .col(IdentityReveal::ConnectionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdentityReveal::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IdentityReveal {
    Table,
    Id,
    ConnectionId,
    RequesterId,
    ResponderId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Connection {
    Table,
    Id,
}

#[derive(Iden)]
enum Participant {
    Table,
    Id,
}
