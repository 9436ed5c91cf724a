//! Identity reveal entity (connection-scoped mutual-consent record).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reveal negotiation status.
///
/// Terminal states are independent of the parent connection's own status. A
/// declined reveal may be retried by either party with a fresh record.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RevealStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "identity_reveal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The parent connection; at most one pending reveal exists per
    /// connection at a time
    pub connection_id: String,

    /// The party asking for the reveal
    pub requester_id: String,

    /// The other connection party; always derived server-side from the
    /// parent connection, never caller-supplied
    pub responder_id: String,

    pub status: RevealStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::connection::Entity",
        from = "Column::ConnectionId",
        to = "super::connection::Column::Id",
        on_delete = "Cascade"
    )]
    Connection,

    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::RequesterId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Requester,

    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::ResponderId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Responder,
}

impl Related<super::connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Connection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
