//! Bookable resource model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::scheduling::ResourceId;

/// Kind of bookable resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Room,
    Lab,
    Equipment,
    Vehicle,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ResourceType::Room => "room",
            ResourceType::Lab => "lab",
            ResourceType::Equipment => "equipment",
            ResourceType::Vehicle => "vehicle",
        };
        write!(f, "{}", label)
    }
}

/// Administrative availability of a resource.
///
/// Slot-level availability is answered by the conflict index, not stored
/// here; `Maintenance` and `Unavailable` take the resource out of booking
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Available,
    Maintenance,
    Unavailable,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ResourceStatus::Available => "available",
            ResourceStatus::Maintenance => "maintenance",
            ResourceStatus::Unavailable => "unavailable",
        };
        write!(f, "{}", label)
    }
}

/// Resource document from the store
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub location: String,
    pub capacity: u32,
    pub status: ResourceStatus,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create resource request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResource {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: String,
    pub capacity: u32,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Update resource request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateResource {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
    pub location: Option<String>,
    pub capacity: Option<u32>,
    pub status: Option<ResourceStatus>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
}

/// Resource query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ResourceQuery {
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
    pub status: Option<ResourceStatus>,
}
