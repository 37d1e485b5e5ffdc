/// Task status options offered by the grid filter. The store accepts any text.
pub const TASK_STATUSES: [&str; 5] = [
    "Not started",
    "In progress",
    "Completed",
    "Cancelled",
    "On hold",
];

pub const DEADLINE_OVERDUE: &str = "Overdue";
pub const DEADLINE_UPCOMING: &str = "Upcoming";
