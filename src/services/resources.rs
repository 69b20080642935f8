//! Resource catalog service

use std::sync::Arc;

use serde_json::json;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::audit::AuditEntry,
    models::resource::{CreateResource, Resource, ResourceQuery, UpdateResource},
    repository::Repository,
    scheduling::{Actor, ConflictIndex, Occurrence, ResourceId, TimeInterval},
};

#[derive(Clone)]
pub struct ResourcesService {
    repository: Repository,
    index: Arc<ConflictIndex>,
}

impl ResourcesService {
    pub fn new(repository: Repository, index: Arc<ConflictIndex>) -> Self {
        Self { repository, index }
    }

    pub async fn list(&self, query: &ResourceQuery) -> AppResult<Vec<Resource>> {
        self.repository.resources.list(query).await
    }

    pub async fn get_by_id(&self, id: &ResourceId) -> AppResult<Resource> {
        self.repository.resources.get_by_id(id).await
    }

    pub async fn create(&self, actor: &Actor, data: CreateResource) -> AppResult<Resource> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let resource = self.repository.resources.create(data).await?;
        self.audit(actor, "resource.create", &resource, json!({ "name": resource.name }))
            .await;
        Ok(resource)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &ResourceId,
        data: UpdateResource,
    ) -> AppResult<Resource> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let resource = self.repository.resources.update(id, data).await?;
        self.audit(actor, "resource.update", &resource, json!({ "name": resource.name }))
            .await;
        Ok(resource)
    }

    /// Delete a resource. Refused while bookings are still held against it.
    pub async fn delete(&self, actor: &Actor, id: &ResourceId) -> AppResult<()> {
        let resource = self.repository.resources.get_by_id(id).await?;
        if self.index.has_active(id).await {
            return Err(AppError::BusinessRule(format!(
                "Resource {} still has active bookings",
                resource.name
            )));
        }
        self.repository.resources.delete(id).await?;
        self.audit(actor, "resource.delete", &resource, json!({ "name": resource.name }))
            .await;
        Ok(())
    }

    /// Active occurrences overlapping a candidate interval
    pub async fn availability(
        &self,
        id: &ResourceId,
        interval: &TimeInterval,
    ) -> AppResult<Vec<Occurrence>> {
        // 404 for unknown resources rather than an empty, reassuring answer
        self.repository.resources.get_by_id(id).await?;
        Ok(self.index.query(id, interval).await)
    }

    async fn audit(
        &self,
        actor: &Actor,
        action: &str,
        resource: &Resource,
        details: serde_json::Value,
    ) {
        let entry = AuditEntry::new(actor.uid.clone(), action, resource.id.as_str(), details);
        if let Err(e) = self.repository.audit.append(&entry).await {
            tracing::warn!(action = %entry.action, error = %e, "failed to append audit entry");
        }
    }
}
