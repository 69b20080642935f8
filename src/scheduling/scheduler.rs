//! Booking submission.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    expand, BookingGroupId, BookingStatus, ConflictIndex, Occurrence, OccurrenceId,
    RecurrenceRule, ResourceId, SchedulingError, TimeInterval, UserId,
};

/// A user's request to reserve a resource, immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub requester: UserId,
    pub resource_id: ResourceId,
    pub interval: TimeInterval,
    pub purpose: String,
    pub recurrence: Option<RecurrenceRule>,
}

impl BookingRequest {
    fn validate(&self) -> Result<(), SchedulingError> {
        self.interval
            .validate()
            .map_err(|e| SchedulingError::InvalidRequest(e.to_string()))?;
        if self.purpose.trim().is_empty() {
            return Err(SchedulingError::InvalidRequest(
                "purpose must not be empty".to_string(),
            ));
        }
        if let Some(ref rule) = self.recurrence {
            rule.validate(&self.interval)?;
        }
        Ok(())
    }
}

/// The occurrences committed for one submission.
///
/// The variant split keeps the all-or-nothing commit structural: a recurring
/// group is created, approved and cancelled occurrence by occurrence, but it
/// enters the index as one unit.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BookingGroup {
    Single(Occurrence),
    Recurring {
        group_id: BookingGroupId,
        occurrences: Vec<Occurrence>,
    },
}

impl BookingGroup {
    pub fn group_id(&self) -> BookingGroupId {
        match self {
            BookingGroup::Single(occurrence) => occurrence.group_id,
            BookingGroup::Recurring { group_id, .. } => *group_id,
        }
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        match self {
            BookingGroup::Single(occurrence) => std::slice::from_ref(occurrence),
            BookingGroup::Recurring { occurrences, .. } => occurrences,
        }
    }

    pub fn len(&self) -> usize {
        self.occurrences().len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences().is_empty()
    }
}

/// Validates booking requests against the conflict index and commits
/// accepted groups atomically.
#[derive(Clone)]
pub struct Scheduler {
    index: Arc<ConflictIndex>,
}

impl Scheduler {
    pub fn new(index: Arc<ConflictIndex>) -> Self {
        Self { index }
    }

    /// Submit a booking request.
    ///
    /// Occurrences are checked against *approved* reservations only: pending
    /// occurrences are soft holds, competing requests stay pending side by
    /// side and the race is settled at approval time. A conflict on any
    /// occurrence rejects the whole request; nothing is inserted.
    pub async fn submit(&self, request: BookingRequest) -> Result<BookingGroup, SchedulingError> {
        request.validate()?;
        let intervals = expand(request.interval, request.recurrence)?;

        let slots = self.index.resource(&request.resource_id);
        let mut slots = slots.write().await;

        for interval in &intervals {
            if let Some(conflict) = slots.overlapping_approved(interval).first() {
                return Err(SchedulingError::ResourceUnavailable {
                    conflict: (*conflict).clone(),
                });
            }
        }

        let group_id = BookingGroupId::new();
        let now = Utc::now();
        let mut occurrences: Vec<Occurrence> = intervals
            .into_iter()
            .map(|interval| Occurrence {
                id: OccurrenceId::new(),
                group_id,
                resource_id: request.resource_id.clone(),
                requester: request.requester.clone(),
                purpose: request.purpose.clone(),
                interval,
                status: BookingStatus::Pending,
                created_at: now,
                updated_at: now,
            })
            .collect();

        slots.insert_group(&occurrences)?;
        for occurrence in &occurrences {
            self.index
                .record_location(occurrence.id, occurrence.resource_id.clone());
        }
        drop(slots);

        Ok(if request.recurrence.is_none() {
            BookingGroup::Single(occurrences.remove(0))
        } else {
            BookingGroup::Recurring {
                group_id,
                occurrences,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::Frequency;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, 0, 0).unwrap()
    }

    fn request(resource: &str, day: u32, start_h: u32, end_h: u32) -> BookingRequest {
        BookingRequest {
            requester: UserId::from("student-7"),
            resource_id: ResourceId::from(resource),
            interval: TimeInterval {
                start: at(day, start_h),
                end: at(day, end_h),
            },
            purpose: "study group".to_string(),
            recurrence: None,
        }
    }

    fn scheduler() -> (Scheduler, Arc<ConflictIndex>) {
        let index = Arc::new(ConflictIndex::new());
        (Scheduler::new(index.clone()), index)
    }

    #[test]
    fn test_rejects_empty_purpose() {
        let (scheduler, _) = scheduler();
        let mut req = request("room-101", 1, 9, 10);
        req.purpose = "   ".to_string();
        let err = tokio_test::block_on(scheduler.submit(req)).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidRequest(_)));
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let (scheduler, _) = scheduler();
        let mut req = request("room-101", 1, 9, 10);
        req.interval = TimeInterval {
            start: at(1, 10),
            end: at(1, 9),
        };
        let err = tokio_test::block_on(scheduler.submit(req)).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_disjoint_singles_both_land() {
        let (scheduler, index) = scheduler();
        scheduler.submit(request("room-101", 1, 9, 10)).await.unwrap();
        scheduler.submit(request("room-101", 1, 10, 11)).await.unwrap();

        let slots = index.resource(&ResourceId::from("room-101"));
        assert_eq!(slots.read().await.active_len(), 2);
    }

    #[tokio::test]
    async fn test_pending_is_a_soft_hold() {
        let (scheduler, _) = scheduler();
        scheduler.submit(request("room-101", 1, 9, 11)).await.unwrap();
        // Same slot, still pending: competing holds are allowed.
        scheduler.submit(request("room-101", 1, 9, 11)).await.unwrap();
    }

    #[tokio::test]
    async fn test_approved_occurrence_blocks_submission() {
        let (scheduler, index) = scheduler();
        let group = scheduler.submit(request("room-101", 1, 9, 11)).await.unwrap();

        let slots = index.resource(&ResourceId::from("room-101"));
        slots
            .write()
            .await
            .set_status(&group.occurrences()[0].id, BookingStatus::Approved);

        let err = scheduler
            .submit(request("room-101", 1, 10, 12))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::ResourceUnavailable { .. }));

        // The adjacent slot is fine: intervals are half-open.
        scheduler.submit(request("room-101", 1, 11, 12)).await.unwrap();
    }

    #[tokio::test]
    async fn test_recurring_request_is_all_or_nothing() {
        let (scheduler, index) = scheduler();

        // Approve a slot that collides with the third weekly occurrence.
        let blocker = scheduler.submit(request("room-101", 15, 9, 10)).await.unwrap();
        let slots = index.resource(&ResourceId::from("room-101"));
        slots
            .write()
            .await
            .set_status(&blocker.occurrences()[0].id, BookingStatus::Approved);
        let active_before = slots.read().await.active_len();

        let mut recurring = request("room-101", 1, 9, 10);
        recurring.recurrence = Some(RecurrenceRule {
            frequency: Frequency::Weekly,
            until: at(29, 9),
        });
        let err = scheduler.submit(recurring).await.unwrap_err();
        assert!(matches!(err, SchedulingError::ResourceUnavailable { .. }));

        // No partial group was committed.
        assert_eq!(slots.read().await.active_len(), active_before);
    }

    #[tokio::test]
    async fn test_recurring_group_shares_group_id() {
        let (scheduler, _) = scheduler();
        let mut recurring = request("lab-3", 1, 9, 10);
        recurring.recurrence = Some(RecurrenceRule {
            frequency: Frequency::Weekly,
            until: at(22, 9),
        });
        let group = scheduler.submit(recurring).await.unwrap();
        assert_eq!(group.len(), 4);
        let group_id = group.group_id();
        assert!(group
            .occurrences()
            .iter()
            .all(|o| o.group_id == group_id && o.status == BookingStatus::Pending));
    }

    #[tokio::test]
    async fn test_different_resources_do_not_conflict() {
        let (scheduler, index) = scheduler();
        let group = scheduler.submit(request("room-101", 1, 9, 11)).await.unwrap();
        let slots = index.resource(&ResourceId::from("room-101"));
        slots
            .write()
            .await
            .set_status(&group.occurrences()[0].id, BookingStatus::Approved);

        scheduler.submit(request("lab-3", 1, 9, 11)).await.unwrap();
    }
}
