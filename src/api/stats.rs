//! Dashboard statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Resource catalog statistics
    pub resources: ResourceStats,
    /// Booking statistics
    pub bookings: BookingStats,
}

#[derive(Serialize, ToSchema)]
pub struct ResourceStats {
    /// Total number of resources
    pub total: i64,
    /// Resources by type
    pub by_type: Vec<StatEntry>,
    /// Resources by status
    pub by_status: Vec<StatEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct BookingStats {
    /// Active occurrences (pending + approved)
    pub active: i64,
    /// Pending occurrences awaiting approval
    pub pending: i64,
    /// Approved occurrences
    pub approved: i64,
    /// Share of bookable resource-hours reserved over the next 7 days
    pub utilization_rate: f64,
}

#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

/// Get dashboard statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
