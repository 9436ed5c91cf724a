//! Engagement entity (likes and bookmarks on referral posts).
//!
//! Row existence *is* the boolean state; there is no status column and no
//! stored counter. Counts are derived by query.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Engagement kinds. Structurally identical, toggled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EngagementKind {
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "bookmark")]
    Bookmark,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "engagement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The referral post being reacted to
    pub post_id: String,

    /// The participant who reacted
    pub participant_id: String,

    pub kind: EngagementKind,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::referral_post::Entity",
        from = "Column::PostId",
        to = "super::referral_post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,

    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::ParticipantId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Participant,
}

impl Related<super::referral_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
