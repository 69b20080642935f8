//! Dashboard statistics service

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    api::stats::{BookingStats, ResourceStats, StatEntry, StatsResponse},
    error::AppResult,
    models::resource::{ResourceQuery, ResourceStatus},
    repository::Repository,
    scheduling::{BookingStatus, ConflictIndex, TimeInterval},
};

/// Window over which the utilization rate is computed
const UTILIZATION_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    index: Arc<ConflictIndex>,
}

impl StatsService {
    pub fn new(repository: Repository, index: Arc<ConflictIndex>) -> Self {
        Self { repository, index }
    }

    /// Dashboard statistics, computed from the catalog and the live index
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let resources = self.repository.resources.list(&ResourceQuery::default()).await?;

        let mut by_type: BTreeMap<String, i64> = BTreeMap::new();
        let mut by_status: BTreeMap<String, i64> = BTreeMap::new();
        for resource in &resources {
            *by_type.entry(resource.resource_type.to_string()).or_insert(0) += 1;
            *by_status.entry(resource.status.to_string()).or_insert(0) += 1;
        }

        let active = self.index.snapshot_active().await;
        let pending = active
            .iter()
            .filter(|o| o.status == BookingStatus::Pending)
            .count() as i64;
        let approved = active
            .iter()
            .filter(|o| o.status == BookingStatus::Approved)
            .count() as i64;

        let now = Utc::now();
        let window = TimeInterval {
            start: now,
            end: now + Duration::days(UTILIZATION_WINDOW_DAYS),
        };
        let booked_hours: f64 = active
            .iter()
            .filter(|o| o.status == BookingStatus::Approved)
            .map(|o| o.interval.intersection_with(&window).num_minutes() as f64 / 60.0)
            .sum();
        let bookable = resources
            .iter()
            .filter(|r| r.status == ResourceStatus::Available)
            .count();
        let capacity_hours = bookable as f64 * 24.0 * UTILIZATION_WINDOW_DAYS as f64;
        let utilization_rate = if capacity_hours > 0.0 {
            (booked_hours / capacity_hours).min(1.0)
        } else {
            0.0
        };

        Ok(StatsResponse {
            resources: ResourceStats {
                total: resources.len() as i64,
                by_type: entries(by_type),
                by_status: entries(by_status),
            },
            bookings: BookingStats {
                active: active.len() as i64,
                pending,
                approved,
                utilization_rate,
            },
        })
    }
}

fn entries(counts: BTreeMap<String, i64>) -> Vec<StatEntry> {
    counts
        .into_iter()
        .map(|(label, value)| StatEntry { label, value })
        .collect()
}
