//! Connection entity (a contact request from a responder to a post author).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Connection lifecycle status.
///
/// `Pending` is the only non-terminal state: the only legal transitions are
/// `pending -> accepted` and `pending -> rejected`.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ConnectionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "connection")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The referral post this connection anchors to
    pub referral_post_id: String,

    /// The responder who opened the connection
    pub sender_id: String,

    /// The post author; always derived from the post, never caller-supplied
    pub receiver_id: String,

    pub status: ConnectionStatus,

    /// Bounded free-text message, set once at creation, immutable
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    /// Monotonic flag: once true it is never unset, even if a later reveal
    /// negotiation is declined
    #[sea_orm(default_value = false)]
    pub identity_revealed: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::referral_post::Entity",
        from = "Column::ReferralPostId",
        to = "super::referral_post::Column::Id",
        on_delete = "Cascade"
    )]
    ReferralPost,

    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::SenderId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Sender,

    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::ReceiverId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Receiver,

    #[sea_orm(has_many = "super::identity_reveal::Entity")]
    IdentityReveals,
}

impl Related<super::referral_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReferralPost.def()
    }
}

impl Related<super::identity_reveal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IdentityReveals.def()
    }
}

impl Model {
    /// Whether the given participant is one of the two connection parties.
    #[must_use]
    pub fn is_party(&self, participant_id: &str) -> bool {
        self.sender_id == participant_id || self.receiver_id == participant_id
    }

    /// The connection party that is not `participant_id`.
    ///
    /// Returns `None` when `participant_id` is not a party at all; callers
    /// treat that as a forbidden actor, never as a fallback.
    #[must_use]
    pub fn counterpart_of(&self, participant_id: &str) -> Option<&str> {
        if self.sender_id == participant_id {
            Some(&self.receiver_id)
        } else if self.receiver_id == participant_id {
            Some(&self.sender_id)
        } else {
            None
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model(sender: &str, receiver: &str) -> Model {
        Model {
            id: "c1".to_string(),
            referral_post_id: "p1".to_string(),
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            status: ConnectionStatus::Pending,
            message: None,
            identity_revealed: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_counterpart_of_either_party() {
        let c = model("alice", "bob");
        assert_eq!(c.counterpart_of("alice"), Some("bob"));
        assert_eq!(c.counterpart_of("bob"), Some("alice"));
        assert_eq!(c.counterpart_of("mallory"), None);
    }
}
