pub mod cache;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{ProjectEntry, ProjectRecord};

pub use cache::QueryCache;

const CREATE_PROJECTS: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        who TEXT,
        what TEXT,
        why TEXT,
        "where" TEXT,
        "when" TEXT,
        how TEXT,
        cost REAL,
        planned_end TEXT,
        deadline_status TEXT,
        task_status TEXT,
        return_type TEXT,
        return_estimate REAL,
        history TEXT,
        notes TEXT
    )
"#;

const SELECT_PROJECTS: &str = r#"
    SELECT id, who, what, why, "where", "when", how, cost, planned_end,
           deadline_status, task_status, return_type, return_estimate,
           history, notes
    FROM projects
    ORDER BY id ASC
"#;

const INSERT_PROJECT: &str = r#"
    INSERT INTO projects (
        who, what, why, "where", "when", how, cost, planned_end,
        deadline_status, task_status, return_type, return_estimate,
        history, notes
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool on `url`, creating the database file if it does not exist
    pub async fn connect(url: &str) -> TrackerResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(TrackerError::Schema)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(TrackerError::Schema)?;

        Ok(Self { pool })
    }

    /// Single-connection in-memory database. Every pooled connection to
    /// `sqlite::memory:` is its own database, so the pool is pinned to one.
    #[cfg(test)]
    pub async fn in_memory() -> TrackerResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(TrackerError::Schema)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(TrackerError::Schema)?;

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the projects table if it is missing. Safe on every start.
    pub async fn ensure_schema(&self) -> TrackerResult<()> {
        sqlx::query(CREATE_PROJECTS)
            .execute(self.get_pool())
            .await
            .map_err(TrackerError::Schema)?;

        Ok(())
    }

    /// Every stored record, ordered by id
    pub async fn read_all(&self) -> TrackerResult<Vec<ProjectRecord>> {
        let records = sqlx::query_as::<_, ProjectRecord>(SELECT_PROJECTS)
            .fetch_all(self.get_pool())
            .await
            .map_err(TrackerError::Query)?;

        debug!(count = records.len(), "read project records");
        Ok(records)
    }

    /// Replace the whole table with `entries`, in order, inside a single
    /// transaction. Ids restart at 1. Nothing is applied if any insert fails.
    pub async fn replace_all(&self, entries: &[ProjectEntry]) -> TrackerResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(TrackerError::Persistence)?;

        sqlx::query("DELETE FROM projects")
            .execute(&mut *tx)
            .await
            .map_err(TrackerError::Persistence)?;

        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'projects'")
            .execute(&mut *tx)
            .await
            .map_err(TrackerError::Persistence)?;

        for entry in entries {
            sqlx::query(INSERT_PROJECT)
                .bind(entry.who.as_str())
                .bind(entry.what.as_str())
                .bind(entry.why.as_str())
                .bind(entry.place.as_str())
                .bind(entry.when.as_str())
                .bind(entry.how.as_str())
                .bind(entry.cost)
                .bind(entry.planned_end.as_str())
                .bind(entry.deadline_status.as_str())
                .bind(entry.task_status.as_str())
                .bind(entry.return_type.as_str())
                .bind(entry.return_estimate)
                .bind(entry.history.as_str())
                .bind(entry.notes.as_str())
                .execute(&mut *tx)
                .await
                .map_err(TrackerError::Persistence)?;
        }

        tx.commit().await.map_err(TrackerError::Persistence)?;

        info!(count = entries.len(), "replaced project records");
        Ok(entries.len())
    }
}

/// Open the database and make sure the projects table exists
pub async fn init(config: &Config) -> TrackerResult<Database> {
    let db = Database::connect(config.database_url()).await?;
    db.ensure_schema().await?;

    info!(url = config.database_url(), "project store ready");
    Ok(db)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;

    pub(crate) fn entry(who: &str, status: &str, planned_end: &str) -> ProjectEntry {
        ProjectEntry {
            who: who.into(),
            what: format!("task for {who}"),
            task_status: status.into(),
            planned_end: planned_end.into(),
            ..ProjectEntry::default()
        }
    }

    /// Makes any insert with `who = 'boom'` abort, to exercise rollback.
    pub(crate) async fn arm_failing_insert(db: &Database) {
        sqlx::query(
            r#"
            CREATE TRIGGER reject_boom BEFORE INSERT ON projects
            WHEN NEW.who = 'boom'
            BEGIN
                SELECT RAISE(ABORT, 'boom rejected');
            END
            "#,
        )
        .execute(db.get_pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();

        assert!(db.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replacing_with_nothing_empties_the_table() {
        let db = Database::in_memory().await.unwrap();
        db.replace_all(&[entry("Alice", "Completed", "2024-01-10")])
            .await
            .unwrap();

        db.replace_all(&[]).await.unwrap();

        assert!(db.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_keeps_order_and_values_and_renumbers() {
        let db = Database::in_memory().await.unwrap();
        db.replace_all(&[entry("Zoe", "On hold", "")]).await.unwrap();

        let mut priced = entry("Bob", "In progress", "2024-03-05");
        priced.cost = Some(1250.5);
        priced.place = "Plant B".into();
        priced.when = "Q1".into();
        let input = vec![entry("Alice", "Completed", "2024-01-10"), priced];

        let written = db.replace_all(&input).await.unwrap();
        let records = db.read_all().await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        let entries: Vec<ProjectEntry> = records.into_iter().map(|r| r.entry).collect();
        assert_eq!(entries, input);
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_the_whole_replace() {
        let db = Database::in_memory().await.unwrap();
        let original = vec![entry("Alice", "Completed", "2024-01-10")];
        db.replace_all(&original).await.unwrap();
        arm_failing_insert(&db).await;

        let err = db
            .replace_all(&[entry("Carol", "Not started", ""), entry("boom", "", "")])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        let records = db.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].entry, original[0]);
    }

    #[tokio::test]
    async fn null_text_columns_read_back_as_blank() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query("INSERT INTO projects (who, cost) VALUES ('Dana', NULL)")
            .execute(db.get_pool())
            .await
            .unwrap();

        let records = db.read_all().await.unwrap();

        assert_eq!(records[0].entry.who, "Dana");
        assert_eq!(records[0].entry.what, "");
        assert_eq!(records[0].entry.cost, None);
    }
}
