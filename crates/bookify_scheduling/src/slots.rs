// --- File: crates/bookify_scheduling/src/slots.rs ---
//! Candidate slot generation under a business-hours policy.

use crate::error::SchedulingError;
use bookify_config::SchedulingConfig;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// One allowed span of the working day, `[open, close)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRange {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

/// Configuration of allowed weekdays, hour ranges and slot granularity.
///
/// The two presets cover the two policies the business runs under; the
/// active one is selected by configuration, never by call site.
#[derive(Debug, Clone)]
pub struct BusinessHoursPolicy {
    pub ranges: Vec<HourRange>,
    pub weekdays: Vec<Weekday>,
    pub step: Duration,
}

impl BusinessHoursPolicy {
    /// 09:00-18:00, Monday to Friday, 30-minute granularity.
    pub fn office_hours() -> Self {
        BusinessHoursPolicy {
            ranges: vec![HourRange {
                open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                close: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            }],
            weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            step: Duration::minutes(30),
        }
    }

    /// 10:00-22:00, Monday to Saturday, 30-minute granularity.
    pub fn extended_hours() -> Self {
        BusinessHoursPolicy {
            ranges: vec![HourRange {
                open: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                close: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            }],
            weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            step: Duration::minutes(30),
        }
    }

    /// Resolves the configured policy: named preset first, per-field
    /// overrides on top.
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, SchedulingError> {
        let mut policy = match config.policy.as_deref() {
            None | Some("office_hours") => Self::office_hours(),
            Some("extended_hours") => Self::extended_hours(),
            Some(other) => {
                return Err(SchedulingError::Validation(format!(
                    "unknown business-hours policy: {other}"
                )))
            }
        };

        if let Some(start) = &config.work_start_time {
            policy.ranges[0].open = parse_time(start)?;
        }
        if let Some(end) = &config.work_end_time {
            policy.ranges[0].close = parse_time(end)?;
        }
        if let Some(days) = &config.working_days {
            let weekdays: Vec<Weekday> = days.iter().filter_map(|d| parse_weekday(d)).collect();
            if weekdays.is_empty() {
                return Err(SchedulingError::Validation(
                    "working_days resolved to an empty set".to_string(),
                ));
            }
            policy.weekdays = weekdays;
        }
        if let Some(step) = config.slot_step_minutes {
            if step == 0 {
                return Err(SchedulingError::Validation(
                    "slot_step_minutes must be positive".to_string(),
                ));
            }
            policy.step = Duration::minutes(step as i64);
        }

        for range in &policy.ranges {
            if range.open >= range.close {
                return Err(SchedulingError::Validation(format!(
                    "work_start_time {} is not before work_end_time {}",
                    range.open, range.close
                )));
            }
        }
        Ok(policy)
    }

    pub fn is_working_day(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day)
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, SchedulingError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| SchedulingError::Validation(format!("invalid time of day: {value}")))
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value {
        "Mon" => Some(Weekday::Mon),
        "Tue" => Some(Weekday::Tue),
        "Wed" => Some(Weekday::Wed),
        "Thu" => Some(Weekday::Thu),
        "Fri" => Some(Weekday::Fri),
        "Sat" => Some(Weekday::Sat),
        "Sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Produces candidate start times for a date. Pure: no clock, no storage.
#[derive(Debug, Clone)]
pub struct SlotGenerator {
    policy: BusinessHoursPolicy,
}

impl SlotGenerator {
    pub fn new(policy: BusinessHoursPolicy) -> Self {
        SlotGenerator { policy }
    }

    pub fn policy(&self) -> &BusinessHoursPolicy {
        &self.policy
    }

    /// Chronologically ordered candidate starts within `date`, stepped at
    /// the policy granularity from each range's opening time. A slot is
    /// only emitted when the whole `[start, start + duration)` window fits
    /// inside one allowed range.
    pub fn slots_for_date(&self, date: NaiveDate, duration: Duration) -> Vec<NaiveDateTime> {
        if duration <= Duration::zero() || !self.policy.is_working_day(date.weekday()) {
            return Vec::new();
        }

        let mut slots = Vec::new();
        for range in &self.policy.ranges {
            let close = date.and_time(range.close);
            let mut cursor = date.and_time(range.open);
            while cursor + duration <= close {
                slots.push(cursor);
                cursor += self.policy.step;
            }
        }
        slots.sort();
        slots.dedup();
        slots
    }
}
