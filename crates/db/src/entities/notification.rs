//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
///
/// Closed set shared by every dispatcher caller in the platform; external
/// read models switch on it to choose an icon or action button. This core
/// emits only `ReferralConnection` and `IdentityReveal`, the rest belong to
/// out-of-scope components sharing the same table.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum NotificationType {
    #[sea_orm(string_value = "follow")]
    Follow,
    #[sea_orm(string_value = "forum_post")]
    ForumPost,
    #[sea_orm(string_value = "forum_comment")]
    ForumComment,
    #[sea_orm(string_value = "forum_like")]
    ForumLike,
    #[sea_orm(string_value = "nook_post")]
    NookPost,
    #[sea_orm(string_value = "referral_connection")]
    ReferralConnection,
    #[sea_orm(string_value = "identity_reveal")]
    IdentityReveal,
    #[sea_orm(string_value = "mentorship_request")]
    MentorshipRequest,
    #[sea_orm(string_value = "mentorship_accepted")]
    MentorshipAccepted,
    #[sea_orm(string_value = "referral_comment")]
    ReferralComment,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The participant receiving the notification
    pub recipient_id: String,

    /// The participant whose action triggered it (optional for some types)
    #[sea_orm(nullable)]
    pub actor_id: Option<String>,

    pub notification_type: NotificationType,

    /// Human-readable title
    pub title: String,

    /// Human-readable message body
    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Deep-link target for the UI
    #[sea_orm(nullable)]
    pub deep_link: Option<String>,

    /// Referenced entity id (connection, reveal, post, ...)
    #[sea_orm(nullable)]
    pub reference_id: Option<String>,

    /// Referenced entity kind, e.g. "connection"
    #[sea_orm(nullable)]
    pub reference_type: Option<String>,

    /// Has this notification been read?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    /// Has the recipient acted on the embedded call-to-action?
    #[sea_orm(default_value = false)]
    pub action_taken: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::RecipientId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::ActorId",
        to = "super::participant::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
