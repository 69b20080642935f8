//! Booking orchestration service
//!
//! Wires the scheduling core to its collaborators: the resource catalog
//! precondition before submission, persistence after the in-memory commit,
//! the audit trail and notification dispatch. The index commit is the
//! transaction; a persistence failure is logged and the store catches up
//! eventually.

use std::sync::Arc;

use serde_json::json;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::audit::AuditEntry,
    models::booking::{BookingQuery, CreateBooking},
    models::resource::ResourceStatus,
    repository::Repository,
    scheduling::{
        Action, Actor, Approvals, BookingGroup, BookingGroupId, ConflictIndex, Occurrence,
        OccurrenceId, Role, Scheduler, StatusChange,
    },
};

use super::notifications::NotificationsService;

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    scheduler: Scheduler,
    approvals: Approvals,
    notifications: NotificationsService,
}

impl BookingsService {
    pub fn new(
        repository: Repository,
        index: Arc<ConflictIndex>,
        notifications: NotificationsService,
    ) -> Self {
        Self {
            repository,
            scheduler: Scheduler::new(index.clone()),
            approvals: Approvals::new(index),
            notifications,
        }
    }

    /// Submit a booking request on behalf of the actor
    pub async fn submit(&self, actor: &Actor, payload: CreateBooking) -> AppResult<BookingGroup> {
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Catalog precondition: the resource must exist and be bookable.
        let resource = self.repository.resources.get_by_id(&payload.resource_id).await?;
        if resource.status != ResourceStatus::Available {
            return Err(AppError::BusinessRule(format!(
                "Resource {} is {}",
                resource.name, resource.status
            )));
        }

        let request = payload.into_request(actor.uid.clone());
        let group = self.scheduler.submit(request).await?;

        if let Err(e) = self
            .repository
            .occurrences
            .persist_batch(group.occurrences())
            .await
        {
            tracing::error!(
                group = %group.group_id(),
                error = %e,
                "failed to persist booking group; in-memory state remains authoritative"
            );
        }
        self.audit(
            actor,
            "booking.submit",
            resource.id.as_str(),
            json!({
                "group_id": group.group_id(),
                "occurrences": group.len(),
            }),
        )
        .await;
        self.notifications.booking_submitted(&group, &resource).await;

        Ok(group)
    }

    /// Approve a pending occurrence (admin)
    pub async fn approve(&self, actor: &Actor, id: OccurrenceId) -> AppResult<StatusChange> {
        let change = self.approvals.approve(actor, id).await?;
        self.finish_transition(actor, Action::Approve, &change).await;
        Ok(change)
    }

    /// Reject a pending occurrence (admin)
    pub async fn reject(&self, actor: &Actor, id: OccurrenceId) -> AppResult<StatusChange> {
        let change = self.approvals.reject(actor, id).await?;
        self.finish_transition(actor, Action::Reject, &change).await;
        Ok(change)
    }

    /// Cancel an approved occurrence (requester or admin)
    pub async fn cancel(&self, actor: &Actor, id: OccurrenceId) -> AppResult<StatusChange> {
        let change = self.approvals.cancel(actor, id).await?;
        self.finish_transition(actor, Action::Cancel, &change).await;
        Ok(change)
    }

    /// List occurrences. Non-admins only ever see their own bookings.
    pub async fn list(&self, actor: &Actor, query: BookingQuery) -> AppResult<Vec<Occurrence>> {
        let query = if actor.role == Role::Admin {
            query
        } else {
            BookingQuery {
                requester: Some(actor.uid.clone()),
                ..query
            }
        };
        self.repository.occurrences.list(&query).await
    }

    /// Fetch one booking group
    pub async fn group(
        &self,
        actor: &Actor,
        group_id: BookingGroupId,
    ) -> AppResult<Vec<Occurrence>> {
        let occurrences = self.repository.occurrences.list_group(group_id).await?;
        if occurrences.is_empty() {
            return Err(AppError::NotFound(format!(
                "Booking group {} not found",
                group_id
            )));
        }
        if !actor.is_admin() && occurrences.iter().any(|o| o.requester != actor.uid) {
            return Err(AppError::Authorization(
                "Cannot view another user's booking".to_string(),
            ));
        }
        Ok(occurrences)
    }

    async fn finish_transition(&self, actor: &Actor, action: Action, change: &StatusChange) {
        let occurrence = &change.occurrence;
        if let Err(e) = self.repository.occurrences.persist(occurrence).await {
            tracing::error!(
                occurrence = %occurrence.id,
                error = %e,
                "failed to persist status change; in-memory state remains authoritative"
            );
        }
        self.audit(
            actor,
            &format!("booking.{}", action),
            occurrence.resource_id.as_str(),
            json!({
                "occurrence_id": occurrence.id,
                "old_status": change.old_status,
                "new_status": change.new_status,
            }),
        )
        .await;
        self.notifications.status_changed(change).await;
    }

    async fn audit(&self, actor: &Actor, action: &str, resource: &str, details: serde_json::Value) {
        let entry = AuditEntry::new(actor.uid.clone(), action, resource, details);
        if let Err(e) = self.repository.audit.append(&entry).await {
            tracing::warn!(action = %entry.action, error = %e, "failed to append audit entry");
        }
    }
}
