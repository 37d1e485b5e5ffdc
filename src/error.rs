use std::fmt;

/// Coarse classification of a [`TrackerError`], used by the UI to pick how a
/// failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Query,
    Persistence,
    ImportParse,
    Export,
    Io,
}

impl ErrorKind {
    /// Short human-facing summary for logs and the status line.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::Schema => "Could not prepare the project store",
            Self::Query => "Could not load records",
            Self::Persistence => "Error saving data",
            Self::ImportParse => "Error importing CSV",
            Self::Export => "Error exporting CSV",
            Self::Io => "File error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("schema setup failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("reading records failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("replacing records failed: {0}")]
    Persistence(#[source] sqlx::Error),

    #[error("malformed CSV: {0}")]
    ImportParse(String),

    #[error("CSV export failed: {0}")]
    Export(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) => ErrorKind::Schema,
            Self::Query(_) => ErrorKind::Query,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::ImportParse(_) => ErrorKind::ImportParse,
            Self::Export(_) => ErrorKind::Export,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Message shown to the user at the presentation boundary.
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        Self::ImportParse(err.to_string())
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_leads_with_kind_summary() {
        let err = TrackerError::ImportParse("row 3 has 15 fields, header has 14".into());

        assert_eq!(err.kind(), ErrorKind::ImportParse);
        assert_eq!(
            err.user_message(),
            "Error importing CSV: malformed CSV: row 3 has 15 fields, header has 14"
        );
    }

    #[test]
    fn persistence_errors_keep_their_source() {
        let err = TrackerError::Persistence(sqlx::Error::RowNotFound);

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(std::error::Error::source(&err).is_some());
    }
}
