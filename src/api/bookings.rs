//! Booking and approval endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::booking::{BookingGroupResponse, BookingQuery, CreateBooking},
    scheduling::{BookingGroupId, BookingStatus, Occurrence, OccurrenceId, StatusChange},
};

use super::AuthenticatedUser;

/// Committed status transition response
#[derive(Serialize, ToSchema)]
pub struct StatusChangeResponse {
    /// The occurrence after the transition
    pub occurrence: Occurrence,
    pub old_status: BookingStatus,
    pub new_status: BookingStatus,
}

impl From<StatusChange> for StatusChangeResponse {
    fn from(change: StatusChange) -> Self {
        Self {
            occurrence: change.occurrence,
            old_status: change.old_status,
            new_status: change.new_status,
        }
    }
}

/// Submit a booking request (single or recurring)
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking group committed as pending", body = BookingGroupResponse),
        (status = 400, description = "Invalid interval, purpose or recurrence rule"),
        (status = 404, description = "Resource not found"),
        (status = 409, description = "Conflicts with an approved occurrence"),
        (status = 422, description = "Recurrence too long or resource not bookable")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingGroupResponse>)> {
    let group = state
        .services
        .bookings
        .submit(&claims.actor(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(BookingGroupResponse::from(group))))
}

/// List bookings visible to the caller
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(BookingQuery),
    responses(
        (status = 200, description = "Matching occurrences", body = Vec<Occurrence>)
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<Occurrence>>> {
    let occurrences = state
        .services
        .bookings
        .list(&claims.actor(), query)
        .await?;
    Ok(Json(occurrences))
}

/// Fetch one booking group
#[utoipa::path(
    get,
    path = "/bookings/{group_id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("group_id" = Uuid, Path, description = "Booking group ID")
    ),
    responses(
        (status = 200, description = "Occurrences of the group", body = Vec<Occurrence>),
        (status = 404, description = "Group not found")
    )
)]
pub async fn get_booking_group(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(group_id): Path<Uuid>,
) -> AppResult<Json<Vec<Occurrence>>> {
    let occurrences = state
        .services
        .bookings
        .group(&claims.actor(), BookingGroupId::from(group_id))
        .await?;
    Ok(Json(occurrences))
}

/// Approve a pending occurrence
#[utoipa::path(
    post,
    path = "/bookings/occurrences/{id}/approve",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Occurrence ID")
    ),
    responses(
        (status = 200, description = "Occurrence approved", body = StatusChangeResponse),
        (status = 403, description = "Only administrators approve bookings"),
        (status = 404, description = "Occurrence not found"),
        (status = 409, description = "Slot already booked by an approved occurrence")
    )
)]
pub async fn approve_occurrence(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StatusChangeResponse>> {
    let change = state
        .services
        .bookings
        .approve(&claims.actor(), OccurrenceId::from(id))
        .await?;
    Ok(Json(change.into()))
}

/// Reject a pending occurrence
#[utoipa::path(
    post,
    path = "/bookings/occurrences/{id}/reject",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Occurrence ID")
    ),
    responses(
        (status = 200, description = "Occurrence rejected", body = StatusChangeResponse),
        (status = 403, description = "Only administrators reject bookings"),
        (status = 404, description = "Occurrence not found")
    )
)]
pub async fn reject_occurrence(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StatusChangeResponse>> {
    let change = state
        .services
        .bookings
        .reject(&claims.actor(), OccurrenceId::from(id))
        .await?;
    Ok(Json(change.into()))
}

/// Cancel an approved occurrence
#[utoipa::path(
    post,
    path = "/bookings/occurrences/{id}/cancel",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Occurrence ID")
    ),
    responses(
        (status = 200, description = "Occurrence cancelled", body = StatusChangeResponse),
        (status = 403, description = "Only the requester or an administrator may cancel"),
        (status = 404, description = "Occurrence not found")
    )
)]
pub async fn cancel_occurrence(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StatusChangeResponse>> {
    let change = state
        .services
        .bookings
        .cancel(&claims.actor(), OccurrenceId::from(id))
        .await?;
    Ok(Json(change.into()))
}
