//! Repository layer over the hosted document store

pub mod audit;
pub mod client;
pub mod notifications;
pub mod occurrences;
pub mod resources;
pub mod users;

use client::StoreClient;

/// Main repository struct holding the document store client
#[derive(Clone)]
pub struct Repository {
    pub client: StoreClient,
    pub occurrences: occurrences::OccurrencesRepository,
    pub resources: resources::ResourcesRepository,
    pub users: users::UsersRepository,
    pub notifications: notifications::NotificationsRepository,
    pub audit: audit::AuditRepository,
}

impl Repository {
    /// Create a new repository with the given store client
    pub fn new(client: StoreClient) -> Self {
        Self {
            occurrences: occurrences::OccurrencesRepository::new(client.clone()),
            resources: resources::ResourcesRepository::new(client.clone()),
            users: users::UsersRepository::new(client.clone()),
            notifications: notifications::NotificationsRepository::new(client.clone()),
            audit: audit::AuditRepository::new(client.clone()),
            client,
        }
    }
}
