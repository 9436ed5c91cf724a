//! Create engagement table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Engagement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Engagement::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Engagement::PostId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Engagement::ParticipantId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Engagement::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Engagement::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_engagement_post")
                            .from(Engagement::Table, Engagement::PostId)
                            .to(ReferralPost::Table, ReferralPost::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_engagement_participant")
                            .from(Engagement::Table, Engagement::ParticipantId)
                            .to(Participant::Table, Participant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (post_id, participant_id, kind) - the toggle key.
        // ON CONFLICT DO NOTHING against this index is what makes the toggle
        // race-safe under duplicate concurrent calls.
        manager
            .create_index(
                Index::create()
                    .name("idx_engagement_key")
                    .table(Engagement::Table)
                    .col(Engagement::PostId)
                    .col(Engagement::ParticipantId)
                    .col(Engagement::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: post_id + kind (count queries)
        manager
            .create_index(
                Index::create()
                    .name("idx_engagement_post_kind")
                    .table(Engagement::Table)
                    .col(Engagement::PostId)
                    .col(Engagement::Kind)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Engagement::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Engagement {
    Table,
    Id,
    PostId,
    ParticipantId,
    Kind,
    CreatedAt,
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
