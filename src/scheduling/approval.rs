//! Approval state machine.
//!
//! Transitions: pending -> approved | rejected, approved -> cancelled.
//! Rejected and cancelled are terminal. Who may trigger what is a closed
//! capability table checked here, at the state machine boundary, and nowhere
//! else.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    BookingStatus, ConflictIndex, Occurrence, OccurrenceId, SchedulingError, UserId,
};

/// Closed set of campus roles, as asserted by the identity provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lecturer,
    Student,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Admin => "admin",
            Role::Lecturer => "lecturer",
            Role::Student => "student",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "lecturer" => Ok(Role::Lecturer),
            "student" => Ok(Role::Student),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// The authenticated principal acting on an occurrence.
#[derive(Debug, Clone)]
pub struct Actor {
    pub uid: UserId,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Status transition an actor can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Approve,
    Reject,
    Cancel,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Cancel => "cancel",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permit {
    AdminOnly,
    RequesterOrAdmin,
}

static CAPABILITIES: Lazy<HashMap<Action, Permit>> = Lazy::new(|| {
    HashMap::from([
        (Action::Approve, Permit::AdminOnly),
        (Action::Reject, Permit::AdminOnly),
        (Action::Cancel, Permit::RequesterOrAdmin),
    ])
});

fn ensure_permitted(
    actor: &Actor,
    action: Action,
    requester: &UserId,
) -> Result<(), SchedulingError> {
    let permitted = match CAPABILITIES[&action] {
        Permit::AdminOnly => actor.is_admin(),
        Permit::RequesterOrAdmin => actor.is_admin() || actor.uid == *requester,
    };
    if permitted {
        Ok(())
    } else {
        Err(SchedulingError::NotPermitted {
            role: actor.role,
            action,
        })
    }
}

/// A committed status transition, emitted towards the notification layer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusChange {
    pub occurrence: Occurrence,
    pub old_status: BookingStatus,
    pub new_status: BookingStatus,
    pub at: DateTime<Utc>,
}

/// Drives occurrence status transitions against the conflict index.
#[derive(Clone)]
pub struct Approvals {
    index: Arc<ConflictIndex>,
}

impl Approvals {
    pub fn new(index: Arc<ConflictIndex>) -> Self {
        Self { index }
    }

    /// Approve a pending occurrence.
    ///
    /// Competing pending requests may hold the same slot, so approval
    /// re-checks against approved occurrences under the resource's write
    /// lock; losing requests surface as `AlreadyBooked` when their turn
    /// comes.
    pub async fn approve(
        &self,
        actor: &Actor,
        id: OccurrenceId,
    ) -> Result<StatusChange, SchedulingError> {
        let slots = self.slots_of(&id)?;
        let mut slots = slots.write().await;
        let occurrence = slots
            .get(&id)
            .ok_or(SchedulingError::UnknownOccurrence(id))?
            .clone();
        ensure_permitted(actor, Action::Approve, &occurrence.requester)?;
        if occurrence.status != BookingStatus::Pending {
            return Err(SchedulingError::InvalidTransition {
                status: occurrence.status,
                action: Action::Approve,
            });
        }
        if let Some(conflict) = slots.overlapping_approved(&occurrence.interval).first() {
            return Err(SchedulingError::AlreadyBooked {
                conflict: (*conflict).clone(),
            });
        }
        self.commit(&mut slots, &id, BookingStatus::Pending, BookingStatus::Approved)
    }

    /// Reject a pending occurrence, dropping it from the active set.
    pub async fn reject(
        &self,
        actor: &Actor,
        id: OccurrenceId,
    ) -> Result<StatusChange, SchedulingError> {
        let slots = self.slots_of(&id)?;
        let mut slots = slots.write().await;
        let occurrence = slots
            .get(&id)
            .ok_or(SchedulingError::UnknownOccurrence(id))?
            .clone();
        ensure_permitted(actor, Action::Reject, &occurrence.requester)?;
        if occurrence.status != BookingStatus::Pending {
            return Err(SchedulingError::InvalidTransition {
                status: occurrence.status,
                action: Action::Reject,
            });
        }
        self.commit(&mut slots, &id, BookingStatus::Pending, BookingStatus::Rejected)
    }

    /// Cancel an approved occurrence, freeing its slot.
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: OccurrenceId,
    ) -> Result<StatusChange, SchedulingError> {
        let slots = self.slots_of(&id)?;
        let mut slots = slots.write().await;
        let occurrence = slots
            .get(&id)
            .ok_or(SchedulingError::UnknownOccurrence(id))?
            .clone();
        ensure_permitted(actor, Action::Cancel, &occurrence.requester)?;
        if occurrence.status != BookingStatus::Approved {
            return Err(SchedulingError::InvalidTransition {
                status: occurrence.status,
                action: Action::Cancel,
            });
        }
        self.commit(&mut slots, &id, BookingStatus::Approved, BookingStatus::Cancelled)
    }

    fn slots_of(
        &self,
        id: &OccurrenceId,
    ) -> Result<Arc<tokio::sync::RwLock<super::index::ResourceSlots>>, SchedulingError> {
        let resource_id = self
            .index
            .locate(id)
            .ok_or(SchedulingError::UnknownOccurrence(*id))?;
        Ok(self.index.resource(&resource_id))
    }

    fn commit(
        &self,
        slots: &mut super::index::ResourceSlots,
        id: &OccurrenceId,
        old_status: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<StatusChange, SchedulingError> {
        let occurrence = slots
            .set_status(id, new_status)
            .ok_or(SchedulingError::UnknownOccurrence(*id))?;
        Ok(StatusChange {
            at: occurrence.updated_at,
            occurrence,
            old_status,
            new_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::{BookingRequest, ResourceId, Scheduler, TimeInterval};
    use chrono::TimeZone;

    fn admin() -> Actor {
        Actor {
            uid: UserId::from("admin-1"),
            role: Role::Admin,
        }
    }

    fn student(uid: &str) -> Actor {
        Actor {
            uid: UserId::from(uid),
            role: Role::Student,
        }
    }

    fn request(uid: &str, start_h: u32, end_h: u32) -> BookingRequest {
        BookingRequest {
            requester: UserId::from(uid),
            resource_id: ResourceId::from("room-101"),
            interval: TimeInterval {
                start: Utc.with_ymd_and_hms(2024, 5, 1, start_h, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 5, 1, end_h, 0, 0).unwrap(),
            },
            purpose: "seminar".to_string(),
            recurrence: None,
        }
    }

    struct Fixture {
        scheduler: Scheduler,
        approvals: Approvals,
    }

    fn fixture() -> Fixture {
        let index = Arc::new(ConflictIndex::new());
        Fixture {
            scheduler: Scheduler::new(index.clone()),
            approvals: Approvals::new(index),
        }
    }

    async fn submit_one(f: &Fixture, uid: &str, start_h: u32, end_h: u32) -> OccurrenceId {
        let group = f.scheduler.submit(request(uid, start_h, end_h)).await.unwrap();
        group.occurrences()[0].id
    }

    #[tokio::test]
    async fn test_approve_then_competing_approve_fails() {
        let f = fixture();
        let a = submit_one(&f, "student-1", 9, 11).await;
        let b = submit_one(&f, "student-2", 10, 12).await;

        let change = f.approvals.approve(&admin(), a).await.unwrap();
        assert_eq!(change.new_status, BookingStatus::Approved);

        let err = f.approvals.approve(&admin(), b).await.unwrap_err();
        assert!(matches!(err, SchedulingError::AlreadyBooked { .. }));
    }

    #[tokio::test]
    async fn test_reject_frees_the_slot() {
        let f = fixture();
        let a = submit_one(&f, "student-1", 9, 11).await;
        f.approvals.reject(&admin(), a).await.unwrap();

        // The slot is free again: an overlapping submission can be approved.
        let b = submit_one(&f, "student-2", 9, 11).await;
        f.approvals.approve(&admin(), b).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_requires_approved() {
        let f = fixture();
        let a = submit_one(&f, "student-1", 9, 11).await;
        let err = f.approvals.cancel(&admin(), a).await.unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::InvalidTransition {
                status: BookingStatus::Pending,
                action: Action::Cancel,
            }
        ));

        f.approvals.approve(&admin(), a).await.unwrap();
        let change = f.approvals.cancel(&admin(), a).await.unwrap();
        assert_eq!(change.new_status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_terminal_states_stay_terminal() {
        let f = fixture();
        let a = submit_one(&f, "student-1", 9, 11).await;
        f.approvals.reject(&admin(), a).await.unwrap();

        for result in [
            f.approvals.approve(&admin(), a).await,
            f.approvals.reject(&admin(), a).await,
            f.approvals.cancel(&admin(), a).await,
        ] {
            assert!(matches!(
                result.unwrap_err(),
                SchedulingError::InvalidTransition { .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_students_cannot_approve_or_reject() {
        let f = fixture();
        let a = submit_one(&f, "student-1", 9, 11).await;

        let err = f.approvals.approve(&student("student-1"), a).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotPermitted { .. }));
        let err = f.approvals.reject(&student("student-1"), a).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotPermitted { .. }));
    }

    #[tokio::test]
    async fn test_requester_can_cancel_own_booking() {
        let f = fixture();
        let a = submit_one(&f, "student-1", 9, 11).await;
        f.approvals.approve(&admin(), a).await.unwrap();

        // A different student may not cancel it.
        let err = f.approvals.cancel(&student("student-2"), a).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotPermitted { .. }));

        f.approvals.cancel(&student("student-1"), a).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_transition_has_no_side_effect() {
        let f = fixture();
        let a = submit_one(&f, "student-1", 9, 11).await;
        let b = submit_one(&f, "student-2", 9, 11).await;
        f.approvals.approve(&admin(), a).await.unwrap();

        // Approving b fails, and b must still be pending afterwards.
        let err = f.approvals.approve(&admin(), b).await.unwrap_err();
        assert!(matches!(err, SchedulingError::AlreadyBooked { .. }));
        let change = f.approvals.reject(&admin(), b).await.unwrap();
        assert_eq!(change.old_status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_occurrence() {
        let f = fixture();
        let err = f
            .approvals
            .approve(&admin(), OccurrenceId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::UnknownOccurrence(_)));
    }
}
