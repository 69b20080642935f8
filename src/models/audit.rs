//! Audit trail documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduling::UserId;

/// One audit log entry, append-only.
///
/// Terminal occurrences also stay in the occurrences collection, so the
/// store keeps the full booking history on top of these entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor: UserId,
    pub action: String,
    pub resource: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: UserId,
        action: impl Into<String>,
        resource: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor,
            action: action.into(),
            resource: resource.into(),
            details,
            timestamp: Utc::now(),
        }
    }
}
