//! Occurrences repository

use crate::{
    error::AppResult,
    models::booking::BookingQuery,
    scheduling::{BookingGroupId, Occurrence, ResourceId},
};

use super::client::StoreClient;

const COLLECTION: &str = "occurrences";

#[derive(Clone)]
pub struct OccurrencesRepository {
    client: StoreClient,
}

impl OccurrencesRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Active (pending/approved) occurrences of one resource, used to seed
    /// the conflict index at startup. The store filters on equality only, so
    /// the two statuses are fetched separately.
    pub async fn list_active(&self, resource_id: &ResourceId) -> AppResult<Vec<Occurrence>> {
        let mut occurrences: Vec<Occurrence> = self
            .client
            .list(
                COLLECTION,
                &[
                    ("resource_id", resource_id.to_string()),
                    ("status", "pending".to_string()),
                ],
            )
            .await?;
        let approved: Vec<Occurrence> = self
            .client
            .list(
                COLLECTION,
                &[
                    ("resource_id", resource_id.to_string()),
                    ("status", "approved".to_string()),
                ],
            )
            .await?;
        occurrences.extend(approved);
        Ok(occurrences)
    }

    /// List occurrences matching the query filters
    pub async fn list(&self, query: &BookingQuery) -> AppResult<Vec<Occurrence>> {
        let mut filters: Vec<(&str, String)> = Vec::new();
        if let Some(ref resource_id) = query.resource_id {
            filters.push(("resource_id", resource_id.to_string()));
        }
        if let Some(status) = query.status {
            filters.push(("status", status.to_string()));
        }
        if let Some(ref requester) = query.requester {
            filters.push(("requester", requester.to_string()));
        }
        self.client.list(COLLECTION, &filters).await
    }

    /// All occurrences of one booking group
    pub async fn list_group(&self, group_id: BookingGroupId) -> AppResult<Vec<Occurrence>> {
        self.client
            .list(COLLECTION, &[("group_id", group_id.to_string())])
            .await
    }

    /// Persist one occurrence
    pub async fn persist(&self, occurrence: &Occurrence) -> AppResult<()> {
        self.client
            .upsert(COLLECTION, &occurrence.id.to_string(), occurrence)
            .await
    }

    /// Persist a whole booking group in one round trip
    pub async fn persist_batch(&self, occurrences: &[Occurrence]) -> AppResult<()> {
        self.client.upsert_many(COLLECTION, occurrences).await
    }
}
