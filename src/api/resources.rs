//! Resource catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::resource::{CreateResource, Resource, ResourceQuery, UpdateResource},
    scheduling::{Occurrence, ResourceId, TimeInterval},
};

use super::AuthenticatedUser;

/// Availability probe query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Start of the candidate interval (RFC 3339)
    pub start: DateTime<Utc>,
    /// End of the candidate interval (RFC 3339)
    pub end: DateTime<Utc>,
}

/// Availability probe response
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Whether the interval is free of active occurrences
    pub available: bool,
    /// Active occurrences overlapping the interval
    pub conflicts: Vec<Occurrence>,
}

/// List resources
#[utoipa::path(
    get,
    path = "/resources",
    tag = "resources",
    security(("bearer_auth" = [])),
    params(ResourceQuery),
    responses(
        (status = 200, description = "Matching resources", body = Vec<Resource>)
    )
)]
pub async fn list_resources(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ResourceQuery>,
) -> AppResult<Json<Vec<Resource>>> {
    let resources = state.services.resources.list(&query).await?;
    Ok(Json(resources))
}

/// Get a resource
#[utoipa::path(
    get,
    path = "/resources/{id}",
    tag = "resources",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "The resource", body = Resource),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn get_resource(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Resource>> {
    let resource = state
        .services
        .resources
        .get_by_id(&ResourceId::from(id))
        .await?;
    Ok(Json(resource))
}

/// Create a resource (admin)
#[utoipa::path(
    post,
    path = "/resources",
    tag = "resources",
    security(("bearer_auth" = [])),
    request_body = CreateResource,
    responses(
        (status = 201, description = "Resource created", body = Resource),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_resource(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateResource>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    claims.require_admin()?;

    let resource = state
        .services
        .resources
        .create(&claims.actor(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

/// Update a resource (admin)
#[utoipa::path(
    put,
    path = "/resources/{id}",
    tag = "resources",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Resource ID")
    ),
    request_body = UpdateResource,
    responses(
        (status = 200, description = "Resource updated", body = Resource),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn update_resource(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateResource>,
) -> AppResult<Json<Resource>> {
    claims.require_admin()?;

    let resource = state
        .services
        .resources
        .update(&claims.actor(), &ResourceId::from(id), request)
        .await?;
    Ok(Json(resource))
}

/// Delete a resource (admin)
#[utoipa::path(
    delete,
    path = "/resources/{id}",
    tag = "resources",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Resource ID")
    ),
    responses(
        (status = 204, description = "Resource deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Resource not found"),
        (status = 422, description = "Resource still has active bookings")
    )
)]
pub async fn delete_resource(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state
        .services
        .resources
        .delete(&claims.actor(), &ResourceId::from(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Probe a resource's availability for a candidate interval
#[utoipa::path(
    get,
    path = "/resources/{id}/availability",
    tag = "resources",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Resource ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Overlapping active occurrences", body = AvailabilityResponse),
        (status = 400, description = "Invalid interval"),
        (status = 404, description = "Resource not found")
    )
)]
pub async fn resource_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let interval = TimeInterval::new(query.start, query.end)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let conflicts = state
        .services
        .resources
        .availability(&ResourceId::from(id), &interval)
        .await?;
    Ok(Json(AvailabilityResponse {
        available: conflicts.is_empty(),
        conflicts,
    }))
}
