use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::Field;

/// The 5W2H fields of a tracked action, without its storage id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectEntry {
    pub who: String,
    pub what: String,
    pub why: String,
    /// The "where" of 5W2H.
    pub place: String,
    pub when: String,
    pub how: String,
    pub cost: Option<f64>,
    pub planned_end: String,
    pub deadline_status: String,
    pub task_status: String,
    pub return_type: String,
    pub return_estimate: Option<f64>,
    pub history: String,
    pub notes: String,
}

/// A stored entry. The id only lives until the next bulk replace.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub id: i64,
    pub entry: ProjectEntry,
}

impl ProjectEntry {
    /// Text rendering of one field; missing amounts render as "".
    pub fn text(&self, field: Field) -> String {
        match field {
            Field::Who => self.who.clone(),
            Field::What => self.what.clone(),
            Field::Why => self.why.clone(),
            Field::Where => self.place.clone(),
            Field::When => self.when.clone(),
            Field::How => self.how.clone(),
            Field::Cost => format_amount(self.cost),
            Field::PlannedEnd => self.planned_end.clone(),
            Field::DeadlineStatus => self.deadline_status.clone(),
            Field::TaskStatus => self.task_status.clone(),
            Field::ReturnType => self.return_type.clone(),
            Field::ReturnEstimate => format_amount(self.return_estimate),
            Field::History => self.history.clone(),
            Field::Notes => self.notes.clone(),
        }
    }

    /// Build an entry from raw cells. Absent text becomes "", absent or
    /// unparseable amounts become `None`.
    pub fn from_draft(draft: &RecordDraft) -> Self {
        let text = |field: Field| draft.get(field).unwrap_or_default().to_string();
        let amount = |field: Field| draft.get(field).and_then(parse_amount);

        Self {
            who: text(Field::Who),
            what: text(Field::What),
            why: text(Field::Why),
            place: text(Field::Where),
            when: text(Field::When),
            how: text(Field::How),
            cost: amount(Field::Cost),
            planned_end: text(Field::PlannedEnd),
            deadline_status: text(Field::DeadlineStatus),
            task_status: text(Field::TaskStatus),
            return_type: text(Field::ReturnType),
            return_estimate: amount(Field::ReturnEstimate),
            history: text(Field::History),
            notes: text(Field::Notes),
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for ProjectRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let text = |field: Field| -> Result<String, sqlx::Error> {
            Ok(row
                .try_get::<Option<String>, _>(field.column())?
                .unwrap_or_default())
        };

        Ok(Self {
            id: row.try_get("id")?,
            entry: ProjectEntry {
                who: text(Field::Who)?,
                what: text(Field::What)?,
                why: text(Field::Why)?,
                place: text(Field::Where)?,
                when: text(Field::When)?,
                how: text(Field::How)?,
                cost: row.try_get(Field::Cost.column())?,
                planned_end: text(Field::PlannedEnd)?,
                deadline_status: text(Field::DeadlineStatus)?,
                task_status: text(Field::TaskStatus)?,
                return_type: text(Field::ReturnType)?,
                return_estimate: row.try_get(Field::ReturnEstimate.column())?,
                history: text(Field::History)?,
                notes: text(Field::Notes)?,
            },
        })
    }
}

/// Record-like input: raw text cells keyed by field. Grid rows and decoded
/// CSV rows are both drafts; neither carries an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    cells: HashMap<Field, String>,
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.cells.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.cells.insert(field, value.into());
    }

    #[cfg(test)]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

impl From<&ProjectEntry> for RecordDraft {
    fn from(entry: &ProjectEntry) -> Self {
        let cells = Field::ALL
            .into_iter()
            .map(|field| (field, entry.text(field)))
            .collect();
        Self { cells }
    }
}

/// Lenient amount parsing: blanks, garbage and non-finite values yield `None`.
/// A lone decimal comma ("12,5") is accepted.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = raw.parse::<f64>().ok().or_else(|| {
        if raw.matches(',').count() == 1 && !raw.contains('.') {
            raw.replace(',', ".").parse::<f64>().ok()
        } else {
            None
        }
    });

    parsed.filter(|value| value.is_finite())
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map(|value| value.to_string()).unwrap_or_default()
}
