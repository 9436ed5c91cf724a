//! Create `referral_post` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReferralPost::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReferralPost::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReferralPost::AuthorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReferralPost::Title)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReferralPost::Body).text().not_null())
                    .col(
                        ColumnDef::new(ReferralPost::PostType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReferralPost::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(ReferralPost::TotalSlots).integer())
                    .col(ColumnDef::new(ReferralPost::AvailableSlots).integer())
                    .col(
                        ColumnDef::new(ReferralPost::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ReferralPost::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_referral_post_author")
                            .from(ReferralPost::Table, ReferralPost::AuthorId)
                            .to(Participant::Table, Participant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for listing a participant's posts)
        manager
            .create_index(
                Index::create()
                    .name("idx_referral_post_author_id")
                    .table(ReferralPost::Table)
                    .col(ReferralPost::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: status (open-post listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_referral_post_status")
                    .table(ReferralPost::Table)
                    .col(ReferralPost::Status)
                    .to_owned(),
            )
            .await?;

        // Slot accounting sanity: available never exceeds total
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE referral_post ADD CONSTRAINT chk_referral_post_slots \
                 CHECK (available_slots IS NULL OR total_slots IS NULL \
                        OR available_slots <= total_slots);",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReferralPost::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReferralPost {
    Table,
    Id,
    AuthorId,
    Title,
    Body,
    PostType,
    Status,
    TotalSlots,
    AvailableSlots,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Participant {
    Table,
    Id,
}
