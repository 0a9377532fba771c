//! Reminder planning.
//!
//! # Responsibility
//! - Map a task's due instant and alert policy to the reminder instants that
//!   are still in the future.
//!
//! # Invariants
//! - Pure: no I/O, no clock reads; `now` is an argument.
//! - Every returned instant is strictly after `now`.
//! - Output order is deterministic: due instant first, then lead times from
//!   shortest to longest.

use crate::model::reminder::ReminderInstant;
use crate::model::task::{AlertType, ClockTime, Task};
use chrono::{Duration, Months, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeadUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl LeadUnit {
    fn name(&self, amount: u32) -> &'static str {
        let plural = amount != 1;
        match (self, plural) {
            (Self::Minute, false) => "minute",
            (Self::Minute, true) => "minutes",
            (Self::Hour, false) => "hour",
            (Self::Hour, true) => "hours",
            (Self::Day, false) => "day",
            (Self::Day, true) => "days",
            (Self::Week, false) => "week",
            (Self::Week, true) => "weeks",
            (Self::Month, false) => "month",
            (Self::Month, true) => "months",
        }
    }
}

/// How long before the due instant an early reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadTime {
    amount: u32,
    unit: LeadUnit,
}

impl LeadTime {
    const fn new(amount: u32, unit: LeadUnit) -> Self {
        Self { amount, unit }
    }

    /// Human phrase such as `30 minutes` or `1 week`.
    pub fn label(&self) -> String {
        format!("{} {}", self.amount, self.unit.name(self.amount))
    }

    /// Instant `self` before `due`. Months are calendar months, clamped to
    /// the last day of shorter months.
    pub fn before(&self, due: NaiveDateTime) -> Option<NaiveDateTime> {
        let amount = i64::from(self.amount);
        match self.unit {
            LeadUnit::Minute => due.checked_sub_signed(Duration::minutes(amount)),
            LeadUnit::Hour => due.checked_sub_signed(Duration::hours(amount)),
            LeadUnit::Day => due.checked_sub_signed(Duration::days(amount)),
            LeadUnit::Week => due.checked_sub_signed(Duration::weeks(amount)),
            LeadUnit::Month => due.checked_sub_months(Months::new(self.amount)),
        }
    }
}

/// Lead times used by the gradual policy, shortest first.
pub const GRADUAL_LEAD_TIMES: [LeadTime; 9] = [
    LeadTime::new(30, LeadUnit::Minute),
    LeadTime::new(1, LeadUnit::Hour),
    LeadTime::new(3, LeadUnit::Hour),
    LeadTime::new(1, LeadUnit::Day),
    LeadTime::new(3, LeadUnit::Day),
    LeadTime::new(1, LeadUnit::Week),
    LeadTime::new(2, LeadUnit::Week),
    LeadTime::new(1, LeadUnit::Month),
    LeadTime::new(2, LeadUnit::Month),
];

/// Message shown at the due instant.
pub fn due_now_message(title: &str) -> String {
    format!("{title} is due now!")
}

/// Message shown `lead` before the due instant.
pub fn due_in_message(title: &str, lead: &LeadTime) -> String {
    format!("{title} is due in {}!", lead.label())
}

/// Plans every future reminder for one task occurrence.
pub fn plan(
    title: &str,
    due_date: NaiveDate,
    due_time: ClockTime,
    alert_type: AlertType,
    now: NaiveDateTime,
) -> Vec<ReminderInstant> {
    let due = due_time.on(due_date);
    let leads: &[LeadTime] = match alert_type {
        AlertType::None => return Vec::new(),
        AlertType::Standard => &[],
        AlertType::Gradual => &GRADUAL_LEAD_TIMES,
    };

    let mut instants = Vec::with_capacity(1 + leads.len());
    if due > now {
        instants.push(ReminderInstant {
            fire_at: due,
            message: due_now_message(title),
        });
    }
    instants.extend(leads.iter().filter_map(|lead| {
        lead.before(due)
            .filter(|fire_at| *fire_at > now)
            .map(|fire_at| ReminderInstant {
                fire_at,
                message: due_in_message(title, lead),
            })
    }));
    instants
}

/// Plans reminders for a stored task using its current fields.
pub fn plan_for_task(task: &Task, now: NaiveDateTime) -> Vec<ReminderInstant> {
    plan(&task.title, task.date, task.start_time, task.alert_type, now)
}
