//! Notification dispatch service
//!
//! Status changes fan out two ways: a broadcast channel feeding the SSE
//! stream (fire-and-forget, lagging consumers drop events) and a stored
//! notification document for the requester.

use tokio::sync::broadcast;

use crate::{
    error::AppResult,
    models::notification::{Notification, NotificationKind},
    models::resource::Resource,
    repository::Repository,
    scheduling::{BookingGroup, StatusChange, UserId},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
    events: broadcast::Sender<StatusChange>,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { repository, events }
    }

    /// Subscribe to live status-change events
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.events.subscribe()
    }

    /// Emit a status change: broadcast to live listeners and store a
    /// notification for the requester. Neither path blocks the transition.
    pub async fn status_changed(&self, change: &StatusChange) {
        // send() only fails when nobody is listening
        let _ = self.events.send(change.clone());

        let notification = Notification::for_status_change(change);
        if let Err(e) = self.repository.notifications.create(&notification).await {
            tracing::warn!(
                occurrence = %change.occurrence.id,
                error = %e,
                "failed to store status notification"
            );
        }
    }

    /// Store a confirmation notification after a booking submission
    pub async fn booking_submitted(&self, group: &BookingGroup, resource: &Resource) {
        let occurrences = group.occurrences();
        let requester = match occurrences.first() {
            Some(occurrence) => occurrence.requester.clone(),
            None => return,
        };
        let message = if occurrences.len() == 1 {
            format!(
                "Your booking of {} for {} is awaiting approval",
                resource.name, occurrences[0].interval
            )
        } else {
            format!(
                "Your recurring booking of {} ({} occurrences) is awaiting approval",
                resource.name,
                occurrences.len()
            )
        };
        let notification = Notification::new(
            requester,
            NotificationKind::Booking,
            "Booking submitted",
            message,
        );
        if let Err(e) = self.repository.notifications.create(&notification).await {
            tracing::warn!(
                group = %group.group_id(),
                error = %e,
                "failed to store submission notification"
            );
        }
    }

    /// Notifications addressed to one user
    pub async fn list_for(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        self.repository.notifications.list_for(user_id).await
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_read(&self, user_id: &UserId, id: &str) -> AppResult<Notification> {
        self.repository.notifications.mark_read(user_id, id).await
    }
}
