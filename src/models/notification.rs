//! Notification documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::scheduling::{StatusChange, UserId};

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Booking,
    Approval,
    Reminder,
    System,
}

/// Notification document stored for a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }

    /// Notification shown to the requester when an admin settles their booking
    pub fn for_status_change(change: &StatusChange) -> Self {
        let occurrence = &change.occurrence;
        Self::new(
            occurrence.requester.clone(),
            NotificationKind::Approval,
            format!("Booking {}", change.new_status),
            format!(
                "Your booking of {} for {} is now {}",
                occurrence.resource_id, occurrence.interval, change.new_status
            ),
        )
    }
}
