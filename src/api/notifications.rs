//! Notification endpoints: stored documents and the live event stream

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{error::AppResult, models::notification::Notification, scheduling::UserId};

use super::AuthenticatedUser;

/// Notifications for the authenticated user
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stored notifications", body = Vec<Notification>)
    )
)]
pub async fn list_notifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state
        .services
        .notifications
        .list_for(&UserId::from(claims.sub.clone()))
        .await?;
    Ok(Json(notifications))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Updated notification", body = Notification),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_notification_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Notification>> {
    let notification = state
        .services
        .notifications
        .mark_read(&UserId::from(claims.sub.clone()), &id)
        .await?;
    Ok(Json(notification))
}

/// Live server-sent events feed of booking status changes.
///
/// Delivery is fire-and-forget: consumers that fall behind the broadcast
/// buffer silently miss events and should re-fetch their bookings.
#[utoipa::path(
    get,
    path = "/notifications/stream",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "text/event-stream of status_changed events")
    )
)]
pub async fn stream_notifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.services.notifications.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|change| match change {
        Ok(change) => Event::default()
            .event("status_changed")
            .json_data(&change)
            .ok()
            .map(Ok),
        // Lagged receivers skip the events they missed
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
