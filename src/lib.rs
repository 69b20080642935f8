//! Quadrangle Campus Resource Booking System
//!
//! A Rust implementation of the Quadrangle booking server, providing a REST
//! JSON API for reserving shared campus resources (rooms, labs, equipment,
//! vehicles) with conflict-safe scheduling and role-gated approvals.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
