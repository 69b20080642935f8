//! Data models for Quadrangle

pub mod audit;
pub mod booking;
pub mod notification;
pub mod resource;
pub mod user;

// Re-export commonly used types
pub use booking::{BookingGroupResponse, BookingQuery, CreateBooking};
pub use notification::{Notification, NotificationKind};
pub use resource::{Resource, ResourceStatus, ResourceType};
pub use user::{UserClaims, UserProfile};
