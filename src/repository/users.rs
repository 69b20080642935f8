//! User profile repository

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::user::{UpdateProfile, UserProfile, UserQuery},
    scheduling::{Role, UserId},
};

use super::client::StoreClient;

const COLLECTION: &str = "users";

#[derive(Clone)]
pub struct UsersRepository {
    client: StoreClient,
}

impl UsersRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Get profile by user ID
    pub async fn get_by_id(&self, uid: &UserId) -> AppResult<UserProfile> {
        self.client
            .get(COLLECTION, uid.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))
    }

    /// List profiles matching the query filters
    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<UserProfile>> {
        let mut filters: Vec<(&str, String)> = Vec::new();
        if let Some(role) = query.role {
            filters.push(("role", role.to_string()));
        }
        self.client.list(COLLECTION, &filters).await
    }

    /// Apply a partial update to a profile
    pub async fn update_profile(
        &self,
        uid: &UserId,
        data: UpdateProfile,
    ) -> AppResult<UserProfile> {
        let mut profile = self.get_by_id(uid).await?;
        if let Some(display_name) = data.display_name {
            profile.display_name = display_name;
        }
        if let Some(department) = data.department {
            profile.department = Some(department);
        }
        if let Some(phone) = data.phone {
            profile.phone = Some(phone);
        }
        profile.updated_at = Utc::now();
        self.client
            .upsert(COLLECTION, profile.uid.as_str(), &profile)
            .await?;
        Ok(profile)
    }

    /// Change a user's role
    pub async fn set_role(&self, uid: &UserId, role: Role) -> AppResult<UserProfile> {
        let mut profile = self.get_by_id(uid).await?;
        profile.role = role;
        profile.updated_at = Utc::now();
        self.client
            .upsert(COLLECTION, profile.uid.as_str(), &profile)
            .await?;
        Ok(profile)
    }
}
