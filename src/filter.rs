use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::dates::parse_date;
use crate::models::{ProjectRecord, TASK_STATUSES};

/// Which records the editing grid shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub who: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
    /// Inclusive bounds on the parsed planned end date.
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterCriteria {
    /// Everyone present in `records`, every standard status, and the given
    /// date range.
    pub fn with_defaults(records: &[ProjectRecord], start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            who: distinct_who(records).into_iter().collect(),
            statuses: TASK_STATUSES.iter().map(|s| s.to_string()).collect(),
            start,
            end,
        }
    }

    pub fn matches(&self, record: &ProjectRecord) -> bool {
        let entry = &record.entry;
        if !self.who.contains(&entry.who) || !self.statuses.contains(&entry.task_status) {
            return false;
        }

        // Unparseable planned ends never match a range.
        parse_date(&entry.planned_end)
            .is_some_and(|date| self.start <= date && date <= self.end)
    }
}

/// Records passing `criteria`, in their original order.
pub fn apply(records: &[ProjectRecord], criteria: &FilterCriteria) -> Vec<ProjectRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}

/// Responsible parties in order of first appearance.
pub fn distinct_who(records: &[ProjectRecord]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.entry.who.as_str()))
        .map(|record| record.entry.who.clone())
        .collect()
}

/// Earliest and latest parseable planned end, if any record has one.
pub fn planned_end_span(records: &[ProjectRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = records
        .iter()
        .filter_map(|record| parse_date(&record.entry.planned_end));
    let first = dates.next()?;

    Some(dates.fold((first, first), |(lo, hi), date| (lo.min(date), hi.max(date))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::entry;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn records(entries: &[(&str, &str, &str)]) -> Vec<ProjectRecord> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (who, status, end))| ProjectRecord {
                id: i as i64 + 1,
                entry: entry(who, status, end),
            })
            .collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn narrows_by_who_status_and_range() {
        let all = records(&[
            ("Alice", "Completed", "2024-01-10"),
            ("Bob", "Completed", "2024-01-10"),
            ("Alice", "In progress", "2024-01-10"),
            ("Alice", "Completed", "2024-03-05"),
        ]);
        let criteria = FilterCriteria {
            who: set(&["Alice"]),
            statuses: set(&["Completed"]),
            start: ymd(2024, 1, 1),
            end: ymd(2024, 1, 31),
        };

        let shown = apply(&all, &criteria);

        assert_eq!(shown, vec![all[0].clone()]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let all = records(&[
            ("Alice", "Completed", "2024-01-01"),
            ("Alice", "Completed", "2024-01-31"),
            ("Alice", "Completed", "2024-02-01"),
        ]);
        let criteria = FilterCriteria::with_defaults(&all, ymd(2024, 1, 1), ymd(2024, 1, 31));

        let ids: Vec<i64> = apply(&all, &criteria).iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn unparseable_dates_never_match() {
        let all = records(&[("Alice", "Completed", "not-a-date"), ("Alice", "Completed", "")]);
        let criteria = FilterCriteria::with_defaults(&all, NaiveDate::MIN, NaiveDate::MAX);

        assert!(apply(&all, &criteria).is_empty());
    }

    #[test]
    fn defaults_exclude_nonstandard_statuses_only() {
        let all = records(&[
            ("Alice", "On hold", "2024-05-01"),
            ("Bob", "Blocked", "2024-05-01"),
            ("Carol", "Not started", "2024-05-02"),
        ]);
        let criteria = FilterCriteria::with_defaults(&all, ymd(2024, 5, 1), ymd(2024, 5, 31));

        let who: Vec<String> = apply(&all, &criteria).into_iter().map(|r| r.entry.who).collect();

        assert_eq!(who, vec!["Alice", "Carol"]);
        assert_eq!(criteria.who, set(&["Alice", "Bob", "Carol"]));
    }

    #[test]
    fn distinct_who_keeps_first_appearance_order() {
        let all = records(&[
            ("Bob", "", ""),
            ("Alice", "", ""),
            ("Bob", "", ""),
        ]);

        assert_eq!(distinct_who(&all), vec!["Bob", "Alice"]);
    }

    #[test]
    fn span_covers_parseable_dates() {
        let all = records(&[
            ("A", "", "2024-03-05"),
            ("B", "", "garbage"),
            ("C", "", "2023-12-31"),
        ]);

        assert_eq!(planned_end_span(&all), Some((ymd(2023, 12, 31), ymd(2024, 3, 5))));
        assert_eq!(planned_end_span(&all[1..2]), None);
    }
}
