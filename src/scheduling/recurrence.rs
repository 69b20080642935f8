//! Recurring booking expansion.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{interval::TimeInterval, SchedulingError};

/// Hard ceiling on the number of occurrences a single request may expand to.
/// A daily rule over one year hits exactly this bound.
pub const MAX_OCCURRENCES: usize = 366;

/// Step size of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        write!(f, "{}", label)
    }
}

/// Repetition of a base interval until (inclusively) `until`.
///
/// Element `n` of the expansion is the base interval translated by `n`
/// periods; it is produced while its translated start is `<= until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub until: DateTime<Utc>,
}

impl RecurrenceRule {
    /// The rule must end strictly after the base interval starts.
    pub fn validate(&self, base: &TimeInterval) -> Result<(), SchedulingError> {
        if self.until <= base.start {
            return Err(SchedulingError::InvalidRequest(format!(
                "recurrence end {} is not after the booking start {}",
                self.until, base.start
            )));
        }
        Ok(())
    }
}

/// Lazy, restartable sequence of occurrence intervals.
///
/// Without a rule it yields exactly the base interval. Monthly translation
/// goes through [`chrono::Months`], which keeps the day-of-month where it
/// exists and clamps to the last day of shorter months (Jan 31 -> Feb 29),
/// never rolling into the following month.
#[derive(Debug, Clone)]
pub struct Expansion {
    base: TimeInterval,
    rule: Option<RecurrenceRule>,
    step: u32,
}

impl Expansion {
    pub fn new(base: TimeInterval, rule: Option<RecurrenceRule>) -> Self {
        Self {
            base,
            rule,
            step: 0,
        }
    }
}

impl Iterator for Expansion {
    type Item = TimeInterval;

    fn next(&mut self) -> Option<TimeInterval> {
        let n = self.step;
        let rule = match self.rule {
            Some(rule) => rule,
            None => {
                if n > 0 {
                    return None;
                }
                self.step = 1;
                return Some(self.base);
            }
        };

        let start = shift_start(self.base.start, rule.frequency, n)?;
        if start > rule.until {
            return None;
        }
        let end = start.checked_add_signed(self.base.duration())?;
        self.step = n.checked_add(1)?;
        Some(TimeInterval { start, end })
    }
}

/// Base start translated by `n` periods. `None` on arithmetic overflow,
/// which ends the expansion.
fn shift_start(start: DateTime<Utc>, frequency: Frequency, n: u32) -> Option<DateTime<Utc>> {
    match frequency {
        Frequency::Daily => start.checked_add_signed(Duration::days(i64::from(n))),
        Frequency::Weekly => start.checked_add_signed(Duration::days(7 * i64::from(n))),
        Frequency::Monthly => start.checked_add_months(Months::new(n)),
    }
}

/// Materialize the full expansion, enforcing the occurrence ceiling.
pub fn expand(
    base: TimeInterval,
    rule: Option<RecurrenceRule>,
) -> Result<Vec<TimeInterval>, SchedulingError> {
    if let Some(ref rule) = rule {
        rule.validate(&base)?;
    }

    let mut intervals = Vec::new();
    for interval in Expansion::new(base, rule) {
        if intervals.len() == MAX_OCCURRENCES {
            return Err(SchedulingError::RecurrenceTooLong);
        }
        intervals.push(interval);
    }
    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn base(y: i32, m: u32, d: u32) -> TimeInterval {
        TimeInterval {
            start: at(y, m, d, 10),
            end: at(y, m, d, 11),
        }
    }

    #[test]
    fn test_no_rule_yields_base_only() {
        let intervals = expand(base(2024, 1, 1), None).unwrap();
        assert_eq!(intervals, vec![base(2024, 1, 1)]);
    }

    #[test]
    fn test_first_element_is_base() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            until: at(2024, 1, 5, 0),
        };
        let intervals = expand(base(2024, 1, 1), Some(rule)).unwrap();
        assert_eq!(intervals[0], base(2024, 1, 1));
    }

    #[test]
    fn test_weekly_expansion_inclusive_until() {
        // Jan 1, 8, 15, 22: the until boundary lands exactly on the 22nd 10:00.
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            until: at(2024, 1, 22, 10),
        };
        let intervals = expand(base(2024, 1, 1), Some(rule)).unwrap();
        assert_eq!(intervals.len(), 4);
        assert_eq!(intervals[3].start, at(2024, 1, 22, 10));
        assert_eq!(intervals[3].end, at(2024, 1, 22, 11));
    }

    #[test]
    fn test_starts_are_non_decreasing() {
        for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            let rule = RecurrenceRule {
                frequency,
                until: at(2024, 6, 30, 0),
            };
            let intervals = expand(base(2024, 1, 31), Some(rule)).unwrap();
            assert!(intervals.len() > 1);
            for pair in intervals.windows(2) {
                assert!(pair[0].start < pair[1].start);
            }
        }
    }

    #[test]
    fn test_monthly_clamps_to_end_of_february() {
        let rule = RecurrenceRule {
            frequency: Frequency::Monthly,
            until: at(2024, 4, 1, 0),
        };
        let intervals = expand(base(2024, 1, 31), Some(rule)).unwrap();
        // Jan 31, Feb 29 (leap year), Mar 31.
        assert_eq!(intervals.len(), 3);
        assert_eq!(intervals[1].start, at(2024, 2, 29, 10));
        assert_eq!(intervals[2].start, at(2024, 3, 31, 10));
    }

    #[test]
    fn test_monthly_clamps_in_non_leap_year() {
        let rule = RecurrenceRule {
            frequency: Frequency::Monthly,
            until: at(2025, 3, 1, 0),
        };
        let intervals = expand(base(2025, 1, 31), Some(rule)).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[1].start, at(2025, 2, 28, 10));
    }

    #[test]
    fn test_duration_is_preserved() {
        let rule = RecurrenceRule {
            frequency: Frequency::Monthly,
            until: at(2024, 6, 1, 0),
        };
        for interval in expand(base(2024, 1, 31), Some(rule)).unwrap() {
            assert_eq!(interval.duration(), Duration::hours(1));
        }
    }

    #[test]
    fn test_expansion_cap() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            until: at(2030, 1, 1, 0),
        };
        let err = expand(base(2024, 1, 1), Some(rule)).unwrap_err();
        assert!(matches!(err, SchedulingError::RecurrenceTooLong));
    }

    #[test]
    fn test_daily_rule_at_the_cap_is_accepted() {
        // 2024 is a leap year: Jan 1 2024 + 365 days = Dec 31 2024, 366 total.
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            until: at(2024, 12, 31, 10),
        };
        let intervals = expand(base(2024, 1, 1), Some(rule)).unwrap();
        assert_eq!(intervals.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn test_until_not_after_start_is_rejected() {
        let rule = RecurrenceRule {
            frequency: Frequency::Weekly,
            until: at(2024, 1, 1, 10),
        };
        let err = expand(base(2024, 1, 1), Some(rule)).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidRequest(_)));
    }

    #[test]
    fn test_expansion_is_restartable() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            until: at(2024, 1, 3, 10),
        };
        let expansion = Expansion::new(base(2024, 1, 1), Some(rule));
        let first: Vec<_> = expansion.clone().collect();
        let second: Vec<_> = expansion.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
