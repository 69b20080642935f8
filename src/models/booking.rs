//! Booking request payloads and API views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::scheduling::{
    BookingGroup, BookingGroupId, BookingRequest, BookingStatus, Occurrence, RecurrenceRule,
    ResourceId, TimeInterval, UserId,
};

/// Create booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    pub resource_id: ResourceId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(length(min = 1, max = 500, message = "Purpose must be 1-500 characters"))]
    pub purpose: String,
    pub recurrence: Option<RecurrenceRule>,
}

impl CreateBooking {
    /// Build the immutable core request for the given requester. Interval
    /// and recurrence invariants are enforced by the scheduler.
    pub fn into_request(self, requester: UserId) -> BookingRequest {
        BookingRequest {
            requester,
            resource_id: self.resource_id,
            interval: TimeInterval {
                start: self.start_time,
                end: self.end_time,
            },
            purpose: self.purpose,
            recurrence: self.recurrence,
        }
    }
}

/// Committed booking group response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingGroupResponse {
    pub group_id: BookingGroupId,
    pub recurring: bool,
    pub occurrences: Vec<Occurrence>,
}

impl From<BookingGroup> for BookingGroupResponse {
    fn from(group: BookingGroup) -> Self {
        let group_id = group.group_id();
        match group {
            BookingGroup::Single(occurrence) => Self {
                group_id,
                recurring: false,
                occurrences: vec![occurrence],
            },
            BookingGroup::Recurring { occurrences, .. } => Self {
                group_id,
                recurring: true,
                occurrences,
            },
        }
    }
}

/// Booking listing query parameters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct BookingQuery {
    /// Filter by resource
    pub resource_id: Option<ResourceId>,
    /// Filter by status
    pub status: Option<BookingStatus>,
    /// Filter by requester (admins only; others are pinned to themselves)
    pub requester: Option<UserId>,
}
