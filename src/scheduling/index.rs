//! Per-resource conflict index.
//!
//! The index is the authoritative in-memory view of reserved time slots. It
//! is seeded from the document store at startup and updated synchronously by
//! the scheduler and the approval state machine; persistence trails it.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, RwLock as StdRwLock};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::{
    BookingStatus, Occurrence, OccurrenceId, ResourceId, SchedulingError, TimeInterval,
};

/// Reservations of a single resource.
///
/// Active occurrences are kept ordered by interval start. `max_len` is a
/// watermark of the longest interval ever inserted: an occurrence overlapping
/// `[s, e)` must start in `[s - max_len, e)`, so overlap queries scan only
/// that key range instead of the whole set. The watermark never shrinks.
///
/// Terminal occurrences leave the ordered set but keep their entry, so that
/// illegal transitions on them are detected rather than reported as unknown.
#[derive(Debug)]
pub struct ResourceSlots {
    resource_id: ResourceId,
    entries: HashMap<OccurrenceId, Occurrence>,
    by_start: BTreeMap<(DateTime<Utc>, OccurrenceId), ()>,
    max_len: Duration,
}

impl ResourceSlots {
    pub fn new(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            entries: HashMap::new(),
            by_start: BTreeMap::new(),
            max_len: Duration::zero(),
        }
    }

    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    /// Add an occurrence to the slot table (and, when active, to the ordered
    /// set used by overlap queries).
    pub fn insert(&mut self, occurrence: Occurrence) -> Result<(), SchedulingError> {
        if self.entries.contains_key(&occurrence.id) {
            return Err(SchedulingError::DuplicateOccurrence(occurrence.id));
        }
        if occurrence.status.is_active() {
            self.by_start
                .insert((occurrence.interval.start, occurrence.id), ());
            let len = occurrence.interval.duration();
            if len > self.max_len {
                self.max_len = len;
            }
        }
        self.entries.insert(occurrence.id, occurrence);
        Ok(())
    }

    /// Insert a whole booking group or nothing at all.
    pub fn insert_group(&mut self, occurrences: &[Occurrence]) -> Result<(), SchedulingError> {
        for occurrence in occurrences {
            if self.entries.contains_key(&occurrence.id) {
                return Err(SchedulingError::DuplicateOccurrence(occurrence.id));
            }
        }
        for occurrence in occurrences {
            self.insert(occurrence.clone())?;
        }
        Ok(())
    }

    /// Drop an occurrence from the active set. No-op if absent.
    pub fn remove(&mut self, id: &OccurrenceId) {
        if let Some(occurrence) = self.entries.get(id) {
            self.by_start.remove(&(occurrence.interval.start, *id));
        }
    }

    pub fn get(&self, id: &OccurrenceId) -> Option<&Occurrence> {
        self.entries.get(id)
    }

    /// Flip an occurrence's status, maintaining the active set. Returns the
    /// updated occurrence.
    pub fn set_status(&mut self, id: &OccurrenceId, status: BookingStatus) -> Option<Occurrence> {
        let occurrence = self.entries.get_mut(id)?;
        occurrence.status = status;
        occurrence.updated_at = Utc::now();
        let updated = occurrence.clone();
        if status.is_terminal() {
            self.by_start.remove(&(updated.interval.start, *id));
        }
        Some(updated)
    }

    /// All active occurrences overlapping `interval`, ordered by start.
    pub fn overlapping(&self, interval: &TimeInterval) -> Vec<&Occurrence> {
        self.scan(interval, |_| true)
    }

    /// Approved occurrences overlapping `interval`. Pending occurrences are
    /// soft holds and do not block anything.
    pub fn overlapping_approved(&self, interval: &TimeInterval) -> Vec<&Occurrence> {
        self.scan(interval, |occurrence| {
            occurrence.status == BookingStatus::Approved
        })
    }

    fn scan<F>(&self, interval: &TimeInterval, keep: F) -> Vec<&Occurrence>
    where
        F: Fn(&Occurrence) -> bool,
    {
        let lower = (interval.start - self.max_len, OccurrenceId::nil());
        let upper = (interval.end, OccurrenceId::nil());
        self.by_start
            .range((Bound::Included(lower), Bound::Excluded(upper)))
            .filter_map(|((_, id), _)| self.entries.get(id))
            .filter(|occurrence| occurrence.interval.overlaps(interval))
            .filter(|occurrence| keep(occurrence))
            .collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &Occurrence> {
        self.by_start
            .keys()
            .filter_map(|(_, id)| self.entries.get(id))
    }

    pub fn active_len(&self) -> usize {
        self.by_start.len()
    }
}

/// Registry of per-resource slot tables.
///
/// Each resource carries its own `tokio::sync::RwLock` (write-preferring, so
/// bursts of availability probes cannot starve approvals); operations on
/// different resources never contend. The outer maps use std locks held only
/// for map access, never across an await point.
#[derive(Debug, Default)]
pub struct ConflictIndex {
    resources: StdRwLock<HashMap<ResourceId, Arc<RwLock<ResourceSlots>>>>,
    locations: StdRwLock<HashMap<OccurrenceId, ResourceId>>,
}

impl ConflictIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot table for a resource, created on first touch.
    pub fn resource(&self, id: &ResourceId) -> Arc<RwLock<ResourceSlots>> {
        if let Some(slots) = self
            .resources
            .read()
            .expect("conflict index lock poisoned")
            .get(id)
        {
            return slots.clone();
        }
        self.resources
            .write()
            .expect("conflict index lock poisoned")
            .entry(id.clone())
            .or_insert_with(|| Arc::new(RwLock::new(ResourceSlots::new(id.clone()))))
            .clone()
    }

    /// Resource an occurrence was scheduled on.
    pub fn locate(&self, id: &OccurrenceId) -> Option<ResourceId> {
        self.locations
            .read()
            .expect("conflict index lock poisoned")
            .get(id)
            .cloned()
    }

    pub(crate) fn record_location(&self, id: OccurrenceId, resource_id: ResourceId) {
        self.locations
            .write()
            .expect("conflict index lock poisoned")
            .insert(id, resource_id);
    }

    /// Seed the index from occurrences loaded out of the document store.
    /// Duplicate documents are skipped with a warning.
    pub async fn preload(&self, occurrences: Vec<Occurrence>) {
        for occurrence in occurrences {
            let slots = self.resource(&occurrence.resource_id);
            let mut slots = slots.write().await;
            let id = occurrence.id;
            let resource_id = occurrence.resource_id.clone();
            match slots.insert(occurrence) {
                Ok(()) => self.record_location(id, resource_id),
                Err(e) => tracing::warn!(occurrence = %id, error = %e, "skipping occurrence while seeding index"),
            }
        }
    }

    /// Read-only overlap probe against the active set.
    pub async fn query(&self, resource_id: &ResourceId, interval: &TimeInterval) -> Vec<Occurrence> {
        let slots = self.resource(resource_id);
        let slots = slots.read().await;
        slots
            .overlapping(interval)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Whether a resource still carries active occurrences.
    pub async fn has_active(&self, resource_id: &ResourceId) -> bool {
        let slots = self.resource(resource_id);
        let slots = slots.read().await;
        slots.active_len() > 0
    }

    /// Number of tracked resources and active occurrences, for readiness
    /// reporting.
    pub async fn summary(&self) -> (usize, usize) {
        let tables: Vec<_> = self
            .resources
            .read()
            .expect("conflict index lock poisoned")
            .values()
            .cloned()
            .collect();
        let mut active = 0;
        for slots in &tables {
            active += slots.read().await.active_len();
        }
        (tables.len(), active)
    }

    /// Snapshot of the active set across all resources, for statistics.
    pub async fn snapshot_active(&self) -> Vec<Occurrence> {
        let tables: Vec<_> = self
            .resources
            .read()
            .expect("conflict index lock poisoned")
            .values()
            .cloned()
            .collect();
        let mut occurrences = Vec::new();
        for slots in tables {
            let slots = slots.read().await;
            occurrences.extend(slots.active().cloned());
        }
        occurrences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::BookingGroupId;
    use chrono::TimeZone;

    fn interval(day: u32, start_h: u32, end_h: u32) -> TimeInterval {
        TimeInterval {
            start: Utc.with_ymd_and_hms(2024, 3, day, start_h, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, day, end_h, 0, 0).unwrap(),
        }
    }

    fn occurrence(iv: TimeInterval, status: BookingStatus) -> Occurrence {
        let now = Utc::now();
        Occurrence {
            id: OccurrenceId::new(),
            group_id: BookingGroupId::new(),
            resource_id: ResourceId::from("room-101"),
            requester: crate::scheduling::UserId::from("user-1"),
            purpose: "lecture".to_string(),
            interval: iv,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut slots = ResourceSlots::new(ResourceId::from("room-101"));
        let occ = occurrence(interval(1, 9, 10), BookingStatus::Pending);
        slots.insert(occ.clone()).unwrap();
        let err = slots.insert(occ).unwrap_err();
        assert!(matches!(err, SchedulingError::DuplicateOccurrence(_)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut slots = ResourceSlots::new(ResourceId::from("room-101"));
        slots.remove(&OccurrenceId::new());
        assert_eq!(slots.active_len(), 0);
    }

    #[test]
    fn test_overlap_query_finds_straddling_interval() {
        let mut slots = ResourceSlots::new(ResourceId::from("room-101"));
        // A long reservation starting well before the probe window.
        let long = occurrence(
            TimeInterval {
                start: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
            },
            BookingStatus::Approved,
        );
        slots.insert(long.clone()).unwrap();
        slots
            .insert(occurrence(interval(2, 9, 10), BookingStatus::Approved))
            .unwrap();

        let hits = slots.overlapping(&interval(1, 12, 13));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, long.id);
    }

    #[test]
    fn test_approved_filter_ignores_pending() {
        let mut slots = ResourceSlots::new(ResourceId::from("room-101"));
        slots
            .insert(occurrence(interval(1, 9, 11), BookingStatus::Pending))
            .unwrap();
        let approved = occurrence(interval(1, 10, 12), BookingStatus::Approved);
        slots.insert(approved.clone()).unwrap();

        let probe = interval(1, 9, 12);
        assert_eq!(slots.overlapping(&probe).len(), 2);
        let hits = slots.overlapping_approved(&probe);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, approved.id);
    }

    #[test]
    fn test_terminal_status_leaves_active_set_but_stays_known() {
        let mut slots = ResourceSlots::new(ResourceId::from("room-101"));
        let occ = occurrence(interval(1, 9, 10), BookingStatus::Pending);
        slots.insert(occ.clone()).unwrap();
        assert_eq!(slots.active_len(), 1);

        slots.set_status(&occ.id, BookingStatus::Rejected);
        assert_eq!(slots.active_len(), 0);
        assert!(slots.overlapping(&interval(1, 9, 10)).is_empty());
        assert_eq!(slots.get(&occ.id).map(|o| o.status), Some(BookingStatus::Rejected));
    }

    #[test]
    fn test_query_results_ordered_by_start() {
        let mut slots = ResourceSlots::new(ResourceId::from("room-101"));
        let later = occurrence(interval(1, 14, 15), BookingStatus::Pending);
        let earlier = occurrence(interval(1, 9, 10), BookingStatus::Pending);
        slots.insert(later.clone()).unwrap();
        slots.insert(earlier.clone()).unwrap();

        let hits = slots.overlapping(&interval(1, 8, 16));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, earlier.id);
        assert_eq!(hits[1].id, later.id);
    }

    #[tokio::test]
    async fn test_index_isolates_resources() {
        let index = ConflictIndex::new();
        let mut occ = occurrence(interval(1, 9, 10), BookingStatus::Approved);
        occ.resource_id = ResourceId::from("room-101");
        index.preload(vec![occ]).await;

        assert_eq!(
            index
                .query(&ResourceId::from("room-101"), &interval(1, 9, 10))
                .await
                .len(),
            1
        );
        assert!(index
            .query(&ResourceId::from("lab-7"), &interval(1, 9, 10))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_preload_records_locations() {
        let index = ConflictIndex::new();
        let occ = occurrence(interval(1, 9, 10), BookingStatus::Pending);
        let id = occ.id;
        index.preload(vec![occ]).await;
        assert_eq!(index.locate(&id), Some(ResourceId::from("room-101")));
        assert!(index.locate(&OccurrenceId::new()).is_none());
    }
}
