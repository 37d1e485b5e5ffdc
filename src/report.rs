//! Dashboard aggregates over the full, unfiltered snapshot.

use std::collections::{BTreeMap, HashMap};

use crate::dates::{month_key, month_label, parse_date};
use crate::models::{DEADLINE_OVERDUE, DEADLINE_UPCOMING, ProjectRecord};

/// Everything the dashboard tab draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub total: usize,
    pub overdue: usize,
    pub upcoming: usize,
    pub by_status: Vec<(String, usize)>,
    pub by_month: Vec<(String, usize)>,
    pub by_return_type: Vec<(String, usize)>,
    /// Records whose planned end could not be read as a date.
    pub undated: usize,
}

impl Dashboard {
    pub fn from_records(records: &[ProjectRecord]) -> Self {
        Self {
            total: records.len(),
            overdue: count_deadline(records, DEADLINE_OVERDUE),
            upcoming: count_deadline(records, DEADLINE_UPCOMING),
            by_status: count_by(records, |r| &r.entry.task_status),
            by_month: count_by_month(records),
            by_return_type: count_by(records, |r| &r.entry.return_type),
            undated: records
                .iter()
                .filter(|r| parse_date(&r.entry.planned_end).is_none())
                .count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Exact, case-sensitive match on the deadline label.
pub fn count_deadline(records: &[ProjectRecord], label: &str) -> usize {
    records
        .iter()
        .filter(|r| r.entry.deadline_status == label)
        .count()
}

/// Group by the literal value of one column, most frequent first. Ties keep
/// first-appearance order and empty values are left out; whitespace-only
/// values are groups of their own.
pub fn count_by<F>(records: &[ProjectRecord], key: F) -> Vec<(String, usize)>
where
    F: Fn(&ProjectRecord) -> &String,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let value = key(record).as_str();
        if value.is_empty() {
            continue;
        }
        let count = counts.entry(value).or_insert_with(|| {
            order.push(value);
            0
        });
        *count += 1;
    }

    let mut grouped: Vec<(String, usize)> = order
        .into_iter()
        .map(|value| (value.to_string(), counts[value]))
        .collect();
    grouped.sort_by(|a, b| b.1.cmp(&a.1));
    grouped
}

/// Records per calendar month of the planned end, oldest month first.
pub fn count_by_month(records: &[ProjectRecord]) -> Vec<(String, usize)> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for date in records
        .iter()
        .filter_map(|r| parse_date(&r.entry.planned_end))
    {
        *months.entry(month_key(date)).or_default() += 1;
    }

    months
        .into_iter()
        .map(|(key, count)| (month_label(key), count))
        .collect()
}
