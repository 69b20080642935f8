//! Business logic services

pub mod bookings;
pub mod notifications;
pub mod resources;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{repository::Repository, scheduling::ConflictIndex};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub bookings: bookings::BookingsService,
    pub resources: resources::ResourcesService,
    pub users: users::UsersService,
    pub notifications: notifications::NotificationsService,
    pub stats: stats::StatsService,
    /// The live conflict index, shared by the services above
    pub index: Arc<ConflictIndex>,
}

impl Services {
    /// Create all services sharing the repository and the conflict index
    pub fn new(repository: Repository, index: Arc<ConflictIndex>) -> Self {
        let notifications = notifications::NotificationsService::new(repository.clone());
        Self {
            bookings: bookings::BookingsService::new(
                repository.clone(),
                index.clone(),
                notifications.clone(),
            ),
            resources: resources::ResourcesService::new(repository.clone(), index.clone()),
            users: users::UsersService::new(repository.clone()),
            stats: stats::StatsService::new(repository, index.clone()),
            notifications,
            index,
        }
    }
}
