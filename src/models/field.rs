/// One of the fourteen user-facing columns of a project record.
///
/// The declaration order is the column order of the table, the CSV header
/// and the editing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Who,
    What,
    Why,
    Where,
    When,
    How,
    Cost,
    PlannedEnd,
    DeadlineStatus,
    TaskStatus,
    ReturnType,
    ReturnEstimate,
    History,
    Notes,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Who,
        Field::What,
        Field::Why,
        Field::Where,
        Field::When,
        Field::How,
        Field::Cost,
        Field::PlannedEnd,
        Field::DeadlineStatus,
        Field::TaskStatus,
        Field::ReturnType,
        Field::ReturnEstimate,
        Field::History,
        Field::Notes,
    ];

    /// Column name used by both the table and the CSV header.
    pub const fn column(self) -> &'static str {
        match self {
            Field::Who => "who",
            Field::What => "what",
            Field::Why => "why",
            Field::Where => "where",
            Field::When => "when",
            Field::How => "how",
            Field::Cost => "cost",
            Field::PlannedEnd => "planned_end",
            Field::DeadlineStatus => "deadline_status",
            Field::TaskStatus => "task_status",
            Field::ReturnType => "return_type",
            Field::ReturnEstimate => "return_estimate",
            Field::History => "history",
            Field::Notes => "notes",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Field::Who => "Who",
            Field::What => "What",
            Field::Why => "Why",
            Field::Where => "Where",
            Field::When => "When",
            Field::How => "How",
            Field::Cost => "Cost",
            Field::PlannedEnd => "Planned End",
            Field::DeadlineStatus => "Deadline Status",
            Field::TaskStatus => "Task Status",
            Field::ReturnType => "Return Type",
            Field::ReturnEstimate => "Return Estimate",
            Field::History => "History",
            Field::Notes => "Notes",
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(self, Field::Cost | Field::ReturnEstimate)
    }

    /// Look a field up by column name, ignoring case and surrounding blanks.
    pub fn from_column(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.column().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup_is_lenient() {
        assert_eq!(Field::from_column(" Planned_End "), Some(Field::PlannedEnd));
        assert_eq!(Field::from_column("WHERE"), Some(Field::Where));
        assert_eq!(Field::from_column("id"), None);
    }

    #[test]
    fn only_money_columns_are_numeric() {
        let numeric: Vec<Field> = Field::ALL.into_iter().filter(|f| f.is_numeric()).collect();
        assert_eq!(numeric, vec![Field::Cost, Field::ReturnEstimate]);
    }
}
