//! Half-open time intervals.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A half-open time range `[start, end)`.
///
/// Two intervals overlap iff `a.start < b.end && b.start < a.end`; touching
/// boundaries (`a.end == b.start`) do not overlap, so back-to-back bookings
/// of the same resource are always legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Violation of the `start < end` invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid interval: start {start} is not before end {end}")]
pub struct InvalidInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidInterval> {
        let interval = Self { start, end };
        interval.validate()?;
        Ok(interval)
    }

    pub fn validate(&self) -> Result<(), InvalidInterval> {
        if self.start >= self.end {
            return Err(InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Duration shared with `other`; zero when disjoint.
    pub fn intersection_with(&self, other: &TimeInterval) -> Duration {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            end - start
        } else {
            Duration::zero()
        }
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn interval(start_h: u32, end_h: u32) -> TimeInterval {
        TimeInterval {
            start: Utc.with_ymd_and_hms(2024, 1, 1, start_h, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, end_h, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_validate_rejects_inverted_and_empty() {
        assert!(TimeInterval::new(interval(10, 11).end, interval(10, 11).start).is_err());
        let point = interval(10, 10);
        assert!(point.validate().is_err());
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = interval(9, 12);
        let b = interval(11, 14);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = interval(13, 15);
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_overlap_with_self() {
        let a = interval(9, 10);
        assert!(a.overlaps(&a));
    }

    #[test]
    fn test_touching_boundaries_do_not_overlap() {
        let a = interval(9, 10);
        let b = interval(10, 11);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = interval(8, 18);
        let inner = interval(10, 11);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_intersection_duration() {
        let a = interval(9, 12);
        let b = interval(11, 14);
        assert_eq!(a.intersection_with(&b), Duration::hours(1));
        assert_eq!(a.intersection_with(&interval(13, 14)), Duration::zero());
    }
}
