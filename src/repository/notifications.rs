//! Notification documents repository

use crate::{
    error::{AppError, AppResult},
    models::notification::Notification,
    scheduling::UserId,
};

use super::client::StoreClient;

const COLLECTION: &str = "notifications";

#[derive(Clone)]
pub struct NotificationsRepository {
    client: StoreClient,
}

impl NotificationsRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Notifications addressed to one user
    pub async fn list_for(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        self.client
            .list(COLLECTION, &[("user_id", user_id.to_string())])
            .await
    }

    /// Store a new notification
    pub async fn create(&self, notification: &Notification) -> AppResult<()> {
        self.client
            .upsert(COLLECTION, &notification.id.to_string(), notification)
            .await
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_read(&self, user_id: &UserId, id: &str) -> AppResult<Notification> {
        let mut notification: Notification = self
            .client
            .get(COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;
        if notification.user_id != *user_id {
            return Err(AppError::Authorization(
                "Cannot mark another user's notification".to_string(),
            ));
        }
        notification.read = true;
        self.client
            .upsert(COLLECTION, id, &notification)
            .await?;
        Ok(notification)
    }
}
