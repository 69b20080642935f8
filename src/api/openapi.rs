//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, health, notifications, resources, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quadrangle API",
        version = "0.3.0",
        description = "Campus Resource Booking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Quadrangle Team", email = "dev@quadrangle.app")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        users::me,
        users::update_my_profile,
        // Users
        users::list_users,
        users::get_user,
        users::update_role,
        // Resources
        resources::list_resources,
        resources::get_resource,
        resources::create_resource,
        resources::update_resource,
        resources::delete_resource,
        resources::resource_availability,
        // Bookings
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking_group,
        bookings::approve_occurrence,
        bookings::reject_occurrence,
        bookings::cancel_occurrence,
        // Notifications
        notifications::list_notifications,
        notifications::mark_notification_read,
        notifications::stream_notifications,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Scheduling core
            crate::scheduling::Occurrence,
            crate::scheduling::BookingStatus,
            crate::scheduling::TimeInterval,
            crate::scheduling::Frequency,
            crate::scheduling::RecurrenceRule,
            crate::scheduling::Role,
            crate::scheduling::OccurrenceId,
            crate::scheduling::BookingGroupId,
            crate::scheduling::ResourceId,
            crate::scheduling::UserId,
            // Bookings
            crate::models::booking::CreateBooking,
            crate::models::booking::BookingGroupResponse,
            bookings::StatusChangeResponse,
            // Resources
            crate::models::resource::Resource,
            crate::models::resource::ResourceType,
            crate::models::resource::ResourceStatus,
            crate::models::resource::CreateResource,
            crate::models::resource::UpdateResource,
            resources::AvailabilityResponse,
            // Users
            crate::models::user::UserProfile,
            crate::models::user::UpdateProfile,
            crate::models::user::UpdateRole,
            // Notifications
            crate::models::notification::Notification,
            crate::models::notification::NotificationKind,
            // Stats
            stats::StatsResponse,
            stats::ResourceStats,
            stats::BookingStats,
            stats::StatEntry,
            // Health
            health::HealthResponse,
            health::ReadyResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authenticated user profile"),
        (name = "users", description = "User administration"),
        (name = "resources", description = "Resource catalog"),
        (name = "bookings", description = "Booking submission and approval"),
        (name = "notifications", description = "Notifications and event stream"),
        (name = "stats", description = "Dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
