//! User profile service

use crate::{
    error::AppResult,
    models::user::{UpdateProfile, UserProfile, UserQuery},
    repository::Repository,
    scheduling::{Role, UserId},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Profile of the authenticated user
    pub async fn me(&self, uid: &UserId) -> AppResult<UserProfile> {
        self.repository.users.get_by_id(uid).await
    }

    pub async fn get_by_id(&self, uid: &UserId) -> AppResult<UserProfile> {
        self.repository.users.get_by_id(uid).await
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<UserProfile>> {
        self.repository.users.list(query).await
    }

    pub async fn update_profile(
        &self,
        uid: &UserId,
        data: UpdateProfile,
    ) -> AppResult<UserProfile> {
        self.repository.users.update_profile(uid, data).await
    }

    /// Change a user's role (admin operation)
    pub async fn set_role(&self, uid: &UserId, role: Role) -> AppResult<UserProfile> {
        self.repository.users.set_role(uid, role).await
    }
}
