mod field;
mod record;
mod status;

pub use field::Field;
pub use record::{parse_amount, ProjectEntry, ProjectRecord, RecordDraft};
pub use status::{DEADLINE_OVERDUE, DEADLINE_UPCOMING, TASK_STATUSES};
