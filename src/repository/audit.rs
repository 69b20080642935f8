//! Append-only audit trail repository

use crate::{error::AppResult, models::audit::AuditEntry};

use super::client::StoreClient;

const COLLECTION: &str = "audit";

#[derive(Clone)]
pub struct AuditRepository {
    client: StoreClient,
}

impl AuditRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Append one audit entry
    pub async fn append(&self, entry: &AuditEntry) -> AppResult<()> {
        self.client
            .upsert(COLLECTION, &entry.id.to_string(), entry)
            .await
    }
}
