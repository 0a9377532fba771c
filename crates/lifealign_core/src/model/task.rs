//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted by the task store.
//! - Parse and validate user-supplied clock times, categories and alert tags.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `end_time` must not be earlier than `start_time` at submission time.
//! - `notif_id` lists exactly the reminder handles currently outstanding.
//!
//! # See also
//! - model::reminder

use crate::model::reminder::ReminderHandle;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid clock time regex"));

/// Stable identifier for every task.
pub type TaskId = Uuid;

/// Upper bound of the "repeat every N" picker.
pub const MAX_REPEAT_NUM: u32 = 10;

/// Fallback display color for unknown category tags.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b917f";

/// Validation failures for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    InvalidTimeRange { start: ClockTime, end: ClockTime },
    InvalidClockTime(String),
    InvalidDate(String),
    InvalidRecurrence(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::InvalidTimeRange { start, end } => {
                write!(f, "end time {end} cannot be before start time {start}")
            }
            Self::InvalidClockTime(value) => {
                write!(f, "invalid clock time `{value}`; expected HH:mm")
            }
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`; expected YYYY-MM-DD"),
            Self::InvalidRecurrence(details) => write!(f, "invalid recurrence: {details}"),
        }
    }
}

impl Error for TaskValidationError {}

/// Local wall-clock time of day with minute precision (`HH:mm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Builds a clock time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parses a strict `HH:mm` string.
    pub fn parse(value: &str) -> Result<Self, TaskValidationError> {
        let trimmed = value.trim();
        let captures = CLOCK_TIME_RE
            .captures(trimmed)
            .ok_or_else(|| TaskValidationError::InvalidClockTime(value.to_string()))?;
        let hour = captures[1].parse::<u32>().ok();
        let minute = captures[2].parse::<u32>().ok();
        hour.zip(minute)
            .and_then(|(hour, minute)| Self::from_hm(hour, minute))
            .ok_or_else(|| TaskValidationError::InvalidClockTime(value.to_string()))
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Combines this time with a calendar day.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, TaskValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TaskValidationError::InvalidDate(value.to_string()))
}

/// Time-of-day range on a single day. Overlap rules live in `schedule::conflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, TaskValidationError> {
        if end < start {
            return Err(TaskValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }
}

/// Closed set of task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wellness,
    Grocery,
    Home,
    Car,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Wellness, Self::Grocery, Self::Home, Self::Car];

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Wellness => "wellness",
            Self::Grocery => "grocery",
            Self::Home => "home",
            Self::Car => "car",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Wellness => "Wellness",
            Self::Grocery => "Grocery",
            Self::Home => "Home",
            Self::Car => "Car",
        }
    }

    /// Display color as `#RRGGBB`.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Wellness => "#4A90E2",
            Self::Grocery => "#2ECC71",
            Self::Home => "#F1C40F",
            Self::Car => "#E74C3C",
        }
    }

    pub fn from_tag(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_tag() == normalized)
    }
}

/// Returns the display color for a raw category tag, with fallback.
pub fn category_color(tag: &str) -> &'static str {
    Category::from_tag(tag).map_or(DEFAULT_CATEGORY_COLOR, |category| category.color())
}

/// Alert policy governing how many reminders a task gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// No reminders.
    #[default]
    None,
    /// One reminder at the due instant.
    Standard,
    /// The due reminder plus lead-time reminders before it.
    Gradual,
}

impl AlertType {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Standard => "standard",
            Self::Gradual => "gradual",
        }
    }

    /// Parses an alert tag. Unknown or malformed tags map to `None`.
    pub fn from_tag(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Self::Standard,
            "gradual" => Self::Gradual,
            _ => Self::None,
        }
    }
}

impl<'de> Deserialize<'de> for AlertType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::None, Self::from_tag))
    }
}

/// Unit of the recurrence hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatPeriod {
    Days,
    Weeks,
    Months,
    Years,
}

impl RepeatPeriod {
    pub fn from_tag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => Some(Self::Days),
            "weeks" | "week" | "w" => Some(Self::Weeks),
            "months" | "month" | "m" => Some(Self::Months),
            "years" | "year" | "y" => Some(Self::Years),
            _ => None,
        }
    }
}

/// Recurrence hint. Stored only; never materialized into new tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub count: u32,
    pub period: RepeatPeriod,
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub category: Category,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub alert_type: AlertType,
    #[serde(default)]
    pub repeat_num: u32,
    #[serde(default)]
    pub repeat_period: Option<RepeatPeriod>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notif_id: Vec<ReminderHandle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Materializes a validated request into a new task with a fresh id.
    ///
    /// `notif_id` starts empty; the caller installs reminders.
    pub fn from_new(request: &NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            category: request.category,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            alert_type: request.alert_type,
            repeat_num: request.repeat.map_or(0, |repeat| repeat.count),
            repeat_period: request.repeat.map(|repeat| repeat.period),
            completed: false,
            notif_id: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Local wall-clock instant the task is due (`date + start_time`).
    pub fn due_at(&self) -> NaiveDateTime {
        self.start_time.on(self.date)
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn recurrence(&self) -> Option<Recurrence> {
        match (self.repeat_num, self.repeat_period) {
            (0, _) | (_, None) => None,
            (count, Some(period)) => Some(Recurrence { count, period }),
        }
    }

    pub fn holds_handle(&self, handle: &ReminderHandle) -> bool {
        self.notif_id.iter().any(|candidate| candidate == handle)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)?;
        TimeRange::new(self.start_time, self.end_time)?;
        validate_repeat(self.repeat_num, self.repeat_period)?;
        Ok(())
    }
}

/// Input for task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub category: Category,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub alert_type: AlertType,
    pub repeat: Option<Recurrence>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)?;
        TimeRange::new(self.start_time, self.end_time)?;
        if let Some(repeat) = self.repeat {
            validate_repeat(repeat.count, Some(repeat.period))?;
        }
        Ok(())
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<ClockTime>,
    pub end_time: Option<ClockTime>,
    pub alert_type: Option<AlertType>,
    /// `Some(None)` clears the recurrence hint.
    pub repeat: Option<Option<Recurrence>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Whether the patch touches fields that affect reminders or conflicts.
    pub fn touches_timing(&self) -> bool {
        self.date.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
            || self.alert_type.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies every set field onto `task` without touching reminders.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(start_time) = self.start_time {
            task.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            task.end_time = end_time;
        }
        if let Some(alert_type) = self.alert_type {
            task.alert_type = alert_type;
        }
        if let Some(repeat) = self.repeat {
            task.repeat_num = repeat.map_or(0, |value| value.count);
            task.repeat_period = repeat.map(|value| value.period);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

fn validate_repeat(count: u32, period: Option<RepeatPeriod>) -> Result<(), TaskValidationError> {
    if count > MAX_REPEAT_NUM {
        return Err(TaskValidationError::InvalidRecurrence(format!(
            "repeat count {count} exceeds {MAX_REPEAT_NUM}"
        )));
    }
    if count > 0 && period.is_none() {
        return Err(TaskValidationError::InvalidRecurrence(
            "repeat count set without a period".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{category_color, AlertType, Category, ClockTime, TaskValidationError, TimeRange};

    #[test]
    fn clock_time_parses_strict_format() {
        assert_eq!(ClockTime::parse("09:30").unwrap().to_string(), "09:30");
        assert_eq!(ClockTime::parse(" 23:59 ").unwrap().to_string(), "23:59");
        assert!(ClockTime::parse("9:30").is_err());
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("12:60").is_err());
    }

    #[test]
    fn time_range_allows_equal_bounds_and_rejects_inverted() {
        let nine = ClockTime::from_hm(9, 0).unwrap();
        let eight = ClockTime::from_hm(8, 0).unwrap();
        assert!(TimeRange::new(nine, nine).is_ok());
        let err = TimeRange::new(nine, eight).unwrap_err();
        assert!(matches!(err, TaskValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn unknown_alert_tag_maps_to_none() {
        assert_eq!(AlertType::from_tag("GRADUAL"), AlertType::Gradual);
        assert_eq!(AlertType::from_tag("hourly"), AlertType::None);
        let parsed: AlertType = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, AlertType::None);
    }

    #[test]
    fn category_color_falls_back_for_unknown_tags() {
        assert_eq!(category_color("Home"), Category::Home.color());
        assert_eq!(category_color("garden"), "#6b917f");
    }
}
