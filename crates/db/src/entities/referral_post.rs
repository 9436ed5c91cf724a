//! Referral post entity (the shared context a connection anchors to).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Referral post kinds.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PostType {
    /// Author is looking for a referral
    #[sea_orm(string_value = "seeking")]
    Seeking,
    /// Author is offering referral slots
    #[sea_orm(string_value = "offering")]
    Offering,
}

/// Referral post lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PostStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referral_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The participant who authored the post
    pub author_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub post_type: PostType,

    pub status: PostStatus,

    /// Total referral slots (offering posts only)
    #[sea_orm(nullable)]
    pub total_slots: Option<i32>,

    /// Remaining referral slots, `available_slots <= total_slots`
    #[sea_orm(nullable)]
    pub available_slots: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::AuthorId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(has_many = "super::connection::Entity")]
    Connections,
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
