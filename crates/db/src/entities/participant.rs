//! Participant entity (anonymous actor identity).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Anonymous display handle (e.g. "quiet-falcon")
    #[sea_orm(unique)]
    pub handle: String,

    /// Avatar glyph shown next to the handle
    pub avatar_glyph: String,

    /// Real name; only surfaced to a counterpart once a connection's
    /// identity has been mutually revealed
    #[sea_orm(nullable)]
    pub real_name: Option<String>,

    /// Access token for API authentication
    #[sea_orm(unique, nullable)]
    pub token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::referral_post::Entity")]
    ReferralPosts,
}

impl Related<super::referral_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReferralPosts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
