//! Derived views over a snapshot of the application collection.
//!
//! Every function here is pure: it takes the records it works on and the
//! current calendar day explicitly, and recomputes from scratch.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;

use crate::models::{ApplicationRecord, ApplicationStatus, Deadline};

/// Days after a deadline before an interviewed application needs a nudge.
/// The deadline stands in for the last interaction date.
pub const FOLLOW_UP_AFTER_DAYS: u64 = 5;

/// Upper bound (inclusive) of the "due soon" window, in days.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeadlineBucket {
    Overdue,
    DueToday,
    DueWithinWeek,
    None,
}

/// Optional table filters. Empty strings count as "not supplied".
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl FilterCriteria {
    fn matches(&self, record: &ApplicationRecord) -> bool {
        if let Some(company) = non_empty(&self.company) {
            if !contains_ignore_case(&record.company, company) {
                return false;
            }
        }
        if let Some(role) = non_empty(&self.role) {
            if !contains_ignore_case(&record.role, role) {
                return false;
            }
        }
        if let Some(status) = non_empty(&self.status) {
            if record.status.as_str() != status {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: usize,
    /// Share of the total, one decimal place; 0 for an empty collection.
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    #[serde(flatten)]
    pub record: ApplicationRecord,
    pub bucket: DeadlineBucket,
}

/// Everything a view layer needs for one render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: NaiveDate,
    pub rows: Vec<TableRow>,
    pub total: usize,
    pub status_counts: Vec<StatusCount>,
    pub upcoming: Vec<ApplicationRecord>,
    pub past: Vec<ApplicationRecord>,
    pub pending: Vec<ApplicationRecord>,
    pub follow_up: Vec<ApplicationRecord>,
}

impl Dashboard {
    /// Table rows honor `criteria`; the analysis views always use every record.
    pub fn build(records: &[ApplicationRecord], criteria: &FilterCriteria, today: NaiveDate) -> Self {
        let rows = filter_and_sort(records, criteria)
            .into_iter()
            .map(|record| {
                let bucket = deadline_bucket(&record.deadline, today);
                TableRow { record, bucket }
            })
            .collect();

        Self {
            today,
            rows,
            total: records.len(),
            status_counts: status_counts(records),
            upcoming: upcoming_deadlines(records, today),
            past: past_deadlines(records, today),
            pending: pending_applications(records),
            follow_up: follow_up_reminders(records, today),
        }
    }
}

pub fn filter_and_sort(records: &[ApplicationRecord], criteria: &FilterCriteria) -> Vec<ApplicationRecord> {
    let mut filtered: Vec<ApplicationRecord> = records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect();
    filtered.sort_by(ascending);
    filtered
}

fn diff_days(deadline: &Deadline, today: NaiveDate) -> Option<i64> {
    deadline.date().map(|d| (d - today).num_days())
}

pub fn deadline_bucket(deadline: &Deadline, today: NaiveDate) -> DeadlineBucket {
    match diff_days(deadline, today) {
        Some(d) if d < 0 => DeadlineBucket::Overdue,
        Some(0) => DeadlineBucket::DueToday,
        Some(d) if d <= UPCOMING_WINDOW_DAYS => DeadlineBucket::DueWithinWeek,
        _ => DeadlineBucket::None,
    }
}

pub fn status_counts(records: &[ApplicationRecord]) -> Vec<StatusCount> {
    let total = records.len();
    ApplicationStatus::DISPLAY_ORDER
        .iter()
        .map(|&status| {
            let count = records.iter().filter(|r| r.status.bucket() == status).count();
            StatusCount {
                status,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

pub fn upcoming_deadlines(records: &[ApplicationRecord], today: NaiveDate) -> Vec<ApplicationRecord> {
    let mut upcoming: Vec<ApplicationRecord> = records
        .iter()
        .filter(|r| {
            diff_days(&r.deadline, today).is_some_and(|d| (0..=UPCOMING_WINDOW_DAYS).contains(&d))
        })
        .cloned()
        .collect();
    upcoming.sort_by(ascending);
    upcoming
}

pub fn past_deadlines(records: &[ApplicationRecord], today: NaiveDate) -> Vec<ApplicationRecord> {
    let mut past: Vec<ApplicationRecord> = records
        .iter()
        .filter(|r| r.deadline.date().is_some_and(|d| d < today))
        .cloned()
        .collect();
    past.sort_by(descending);
    past
}

pub fn pending_applications(records: &[ApplicationRecord]) -> Vec<ApplicationRecord> {
    let mut pending: Vec<ApplicationRecord> = records
        .iter()
        .filter(|r| r.status.is_pending())
        .cloned()
        .collect();
    pending.sort_by(ascending);
    pending
}

pub fn follow_up_reminders(records: &[ApplicationRecord], today: NaiveDate) -> Vec<ApplicationRecord> {
    let Some(cutoff) = today.checked_sub_days(Days::new(FOLLOW_UP_AFTER_DAYS)) else {
        return Vec::new();
    };
    let mut follow_up: Vec<ApplicationRecord> = records
        .iter()
        .filter(|r| r.status == ApplicationStatus::Interviewed)
        .filter(|r| r.deadline.date().is_some_and(|d| d < cutoff))
        .cloned()
        .collect();
    follow_up.sort_by(ascending);
    follow_up
}

// Unparseable deadlines sort last in both directions.
fn ascending(a: &ApplicationRecord, b: &ApplicationRecord) -> Ordering {
    match (a.deadline.date(), b.deadline.date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn descending(a: &ApplicationRecord, b: &ApplicationRecord) -> Ordering {
    match (a.deadline.date(), b.deadline.date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
