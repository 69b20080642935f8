//! Booking scheduling core.
//!
//! Everything conflict-safety lives here: the half-open time interval model,
//! recurrence expansion, the per-resource conflict index, the scheduler that
//! commits booking groups all-or-nothing, and the approval state machine.
//! The in-memory index is authoritative for conflict detection; the document
//! store is written after a transaction commits and trails it eventually.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod approval;
pub mod index;
pub mod interval;
pub mod recurrence;
pub mod scheduler;

pub use approval::{Action, Actor, Approvals, Role, StatusChange};
pub use index::ConflictIndex;
pub use interval::{InvalidInterval, TimeInterval};
pub use recurrence::{expand, Frequency, RecurrenceRule, MAX_OCCURRENCES};
pub use scheduler::{BookingGroup, BookingRequest, Scheduler};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque identifier of a bookable resource (document store id).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a user, as issued by the identity provider.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a single occurrence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct OccurrenceId(Uuid);

impl OccurrenceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Smallest possible id, used as a range bound in the index.
    pub(crate) fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for OccurrenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OccurrenceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier shared by all occurrences of one submission.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct BookingGroupId(Uuid);

impl BookingGroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookingGroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for BookingGroupId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BookingGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Occurrence
// ---------------------------------------------------------------------------

/// Lifecycle state of an occurrence.
///
/// `Rejected` and `Cancelled` are terminal. Only `Pending` and `Approved`
/// occurrences participate in conflict detection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    /// Part of the active set, relevant to conflict detection.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", label)
    }
}

/// One concrete time-slot reservation, the unit stored in the conflict index
/// and persisted to the document store. A single-shot request produces one
/// occurrence; a recurring request produces one per generated interval, all
/// sharing the same `group_id`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub group_id: BookingGroupId,
    pub resource_id: ResourceId,
    pub requester: UserId,
    pub purpose: String,
    pub interval: TimeInterval,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Scheduling core error taxonomy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    /// Malformed interval, empty purpose or invalid recurrence rule.
    #[error("invalid booking request: {0}")]
    InvalidRequest(String),

    /// Recurrence expansion exceeded the hard occurrence ceiling.
    #[error("recurrence expands to more than {} occurrences; shorten the end date", MAX_OCCURRENCES)]
    RecurrenceTooLong,

    /// The request overlaps an approved occurrence at submission time.
    #[error("resource unavailable: conflicts with approved occurrence {} ({})", conflict.id, conflict.interval)]
    ResourceUnavailable { conflict: Occurrence },

    /// Conflict discovered at approval time against another approved occurrence.
    #[error("slot already booked: approved occurrence {} ({})", conflict.id, conflict.interval)]
    AlreadyBooked { conflict: Occurrence },

    /// An occurrence with this id is already present in the index.
    #[error("occurrence {0} is already present in the conflict index")]
    DuplicateOccurrence(OccurrenceId),

    /// The requested transition is not legal from the current status.
    #[error("cannot {action} an occurrence in status {status}")]
    InvalidTransition {
        status: BookingStatus,
        action: Action,
    },

    /// No occurrence with this id is known to the index.
    #[error("unknown occurrence {0}")]
    UnknownOccurrence(OccurrenceId),

    /// The actor's role does not permit this transition.
    #[error("role {role} is not permitted to {action} this occurrence")]
    NotPermitted { role: Role, action: Action },
}
