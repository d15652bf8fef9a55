use crate::error::AnalyticsError;
use chrono::{
    Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Weekday,
};
use serde::{Deserialize, Serialize};

/// Runs starting before this hour belong to the previous day's batch.
pub const DEFAULT_CUTOFF_HOUR: u32 = 14;
/// The nightly batch is assumed complete after this hour.
pub const DEFAULT_PUBLISH_HOUR: u32 = 21;
/// Format used for operator supplied dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolves processing dates and business days for the nightly batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    pub cutoff_hour: u32,
    pub publish_hour: u32,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self {
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
            publish_hour: DEFAULT_PUBLISH_HOUR,
        }
    }
}

impl BusinessCalendar {
    pub fn new(cutoff_hour: u32, publish_hour: u32) -> Self {
        Self {
            cutoff_hour,
            publish_hour,
        }
    }

    /// See [resolve_processing_date].
    pub fn processing_date(&self, start_time: NaiveDateTime) -> NaiveDate {
        resolve_processing_date(start_time, self.cutoff_hour)
    }

    /// See [processing_window].
    pub fn processing_window(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        processing_window(date, self.cutoff_hour)
    }

    /// See [check_eligibility].
    pub fn eligibility(&self, selected: NaiveDate, now: NaiveDateTime) -> Eligibility {
        check_eligibility(selected, now, self.publish_hour)
    }
}

/// Why a date cannot be reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IneligibleReason {
    /// The selected date is a Saturday or Sunday
    Weekend,
    /// The selected date is after today
    FutureDate,
    /// The selected date is today and the batch has not been published yet
    BatchPending,
}

impl IneligibleReason {
    /// Operator facing explanation
    pub fn message(&self) -> &'static str {
        match self {
            IneligibleReason::Weekend => "No data available due to holidays or weekends",
            IneligibleReason::FutureDate | IneligibleReason::BatchPending => "Batch yet to start",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibleReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// A lookback period ending at `end`, matched against run start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TrailingWindow {
    /// The `days` calendar days leading up to `now`.
    pub fn days(now: NaiveDateTime, days: u64) -> Self {
        Self {
            start: now
                .checked_sub_days(Days::new(days))
                .unwrap_or(NaiveDateTime::MIN),
            end: now,
        }
    }

    /// The `months` calendar months leading up to `now`.
    pub fn months(now: NaiveDateTime, months: u32) -> Self {
        Self {
            start: now
                .checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDateTime::MIN),
            end: now,
        }
    }

    pub fn contains(&self, start_time: NaiveDateTime) -> bool {
        start_time >= self.start && start_time <= self.end
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The business day to report on by default when looking at the batch on `reference`.
///
/// Steps back over the weekend from Monday and Sunday. If that leaves the month of `reference`,
/// the last weekday of the previous month is used instead.
pub fn last_business_day(reference: NaiveDate) -> NaiveDate {
    let days_back = match reference.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    let candidate = days_before(reference, days_back);
    if candidate.month() == reference.month() {
        return candidate;
    }

    // `day()` days back from any date is the last day of the previous month
    let mut day = days_before(reference, u64::from(reference.day()));
    while is_weekend(day) {
        let Some(previous) = day.pred_opt() else {
            break;
        };
        day = previous;
    }
    day
}

/// The `n` most recent weekdays up to and including `anchor`, newest first.
///
/// Fewer than `n` days are returned when the calendar runs out before then.
pub fn last_n_business_days(anchor: NaiveDate, n: usize) -> Vec<NaiveDate> {
    std::iter::successors(Some(anchor), |day| day.pred_opt())
        .filter(|day| !is_weekend(*day))
        .take(n)
        .collect()
}

// Saturates at the earliest representable date.
fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// The processing date a run belongs to.
///
/// The nightly batch spans midnight, so a run that starts before `cutoff_hour` is attributed to
/// the previous calendar day.
pub fn resolve_processing_date(start_time: NaiveDateTime, cutoff_hour: u32) -> NaiveDate {
    let date = start_time.date();
    if start_time.hour() < cutoff_hour {
        days_before(date, 1)
    } else {
        date
    }
}

/// The half open range of start times `[start, end)` that resolve to `date`.
///
/// The end saturates at the latest representable time.
pub fn processing_window(date: NaiveDate, cutoff_hour: u32) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(cutoff_hour));
    let end = start
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}

/// Whether the batch for `selected` can be reported on at `now`.
///
/// Checks, in order: weekend, a date after today, and today before `publish_hour`.
pub fn check_eligibility(
    selected: NaiveDate,
    now: NaiveDateTime,
    publish_hour: u32,
) -> Eligibility {
    let today = now.date();
    if is_weekend(selected) {
        Eligibility::Ineligible(IneligibleReason::Weekend)
    } else if selected > today {
        Eligibility::Ineligible(IneligibleReason::FutureDate)
    } else if selected == today && now.hour() < publish_hour {
        Eligibility::Ineligible(IneligibleReason::BatchPending)
    } else {
        Eligibility::Eligible
    }
}

pub fn is_eligible_for_reporting(
    selected: NaiveDate,
    now: NaiveDateTime,
    publish_hour: u32,
) -> bool {
    check_eligibility(selected, now, publish_hour).is_eligible()
}

/// Parse an operator supplied date in `YYYY-MM-DD` form.
pub fn parse_selected_date(input: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|source| {
        AnalyticsError::InvalidDateFormat {
            input: input.to_string(),
            source,
        }
    })
}
