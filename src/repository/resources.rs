//! Resource catalog repository

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::resource::{CreateResource, Resource, ResourceQuery, ResourceStatus, UpdateResource},
    scheduling::ResourceId,
};

use super::client::StoreClient;

const COLLECTION: &str = "resources";

#[derive(Clone)]
pub struct ResourcesRepository {
    client: StoreClient,
}

impl ResourcesRepository {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Get resource by ID
    pub async fn get_by_id(&self, id: &ResourceId) -> AppResult<Resource> {
        self.client
            .get(COLLECTION, id.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", id)))
    }

    /// List resources matching the query filters
    pub async fn list(&self, query: &ResourceQuery) -> AppResult<Vec<Resource>> {
        let mut filters: Vec<(&str, String)> = Vec::new();
        if let Some(resource_type) = query.resource_type {
            filters.push(("type", resource_type.to_string()));
        }
        if let Some(status) = query.status {
            filters.push(("status", status.to_string()));
        }
        self.client.list(COLLECTION, &filters).await
    }

    /// Create a new resource document
    pub async fn create(&self, data: CreateResource) -> AppResult<Resource> {
        let now = Utc::now();
        let resource = Resource {
            id: ResourceId::from(Uuid::new_v4().to_string()),
            name: data.name,
            resource_type: data.resource_type,
            location: data.location,
            capacity: data.capacity,
            status: data.status.unwrap_or(ResourceStatus::Available),
            description: data.description,
            features: data.features,
            created_at: now,
            updated_at: now,
        };
        self.client
            .upsert(COLLECTION, resource.id.as_str(), &resource)
            .await?;
        Ok(resource)
    }

    /// Apply a partial update to a resource
    pub async fn update(&self, id: &ResourceId, data: UpdateResource) -> AppResult<Resource> {
        let mut resource = self.get_by_id(id).await?;
        if let Some(name) = data.name {
            resource.name = name;
        }
        if let Some(resource_type) = data.resource_type {
            resource.resource_type = resource_type;
        }
        if let Some(location) = data.location {
            resource.location = location;
        }
        if let Some(capacity) = data.capacity {
            resource.capacity = capacity;
        }
        if let Some(status) = data.status {
            resource.status = status;
        }
        if let Some(description) = data.description {
            resource.description = Some(description);
        }
        if let Some(features) = data.features {
            resource.features = features;
        }
        resource.updated_at = Utc::now();
        self.client
            .upsert(COLLECTION, resource.id.as_str(), &resource)
            .await?;
        Ok(resource)
    }

    /// Delete a resource document
    pub async fn delete(&self, id: &ResourceId) -> AppResult<()> {
        self.client.delete(COLLECTION, id.as_str()).await
    }
}
