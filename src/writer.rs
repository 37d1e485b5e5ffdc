//! Bulk replace: the one write path shared by grid saves and CSV imports.

use tracing::{info, warn};

use crate::csv_codec;
use crate::db::{Database, QueryCache};
use crate::error::TrackerResult;
use crate::models::{ProjectEntry, RecordDraft};

/// Replace every stored record with `drafts`, then invalidate the snapshot
/// cache. The cache is left alone when the store rejects the write.
pub async fn save_records(
    db: &Database,
    cache: &QueryCache,
    drafts: &[RecordDraft],
) -> TrackerResult<usize> {
    let entries: Vec<ProjectEntry> = drafts.iter().map(ProjectEntry::from_draft).collect();

    match db.replace_all(&entries).await {
        Ok(count) => {
            cache.invalidate();
            Ok(count)
        }
        Err(err) => {
            warn!(error = %err, "bulk replace rejected; cache kept");
            Err(err)
        }
    }
}

/// Decode CSV bytes and write them as the new record set. Nothing is written
/// when the CSV cannot be parsed.
pub async fn import_csv(db: &Database, cache: &QueryCache, bytes: &[u8]) -> TrackerResult<usize> {
    let drafts = csv_codec::decode(bytes)?;
    info!(rows = drafts.len(), "importing CSV");

    save_records(db, cache, &drafts).await
}

/// CSV of the full, unfiltered record set.
pub async fn export_csv(db: &Database, cache: &QueryCache) -> TrackerResult<Vec<u8>> {
    let snapshot = cache.get_all(db).await?;

    csv_codec::encode(snapshot.iter().map(|record| &record.entry))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::cache::tests::ManualClock;
    use crate::db::tests::{arm_failing_insert, entry};
    use crate::error::ErrorKind;
    use crate::models::Field;

    fn cache() -> QueryCache {
        QueryCache::with_clock(Duration::from_secs(600), ManualClock::new())
    }

    #[tokio::test]
    async fn saving_coerces_amounts_and_invalidates() {
        let db = Database::in_memory().await.unwrap();
        let cache = cache();
        assert!(cache.get_all(&db).await.unwrap().is_empty());

        let drafts = vec![
            RecordDraft::new()
                .with(Field::Who, "Alice")
                .with(Field::Cost, "1200.50")
                .with(Field::ReturnEstimate, "lots"),
            RecordDraft::new().with(Field::Who, "Bob"),
        ];
        let saved = save_records(&db, &cache, &drafts).await.unwrap();

        assert_eq!(saved, 2);
        assert!(!cache.has_snapshot());
        let snapshot = cache.get_all(&db).await.unwrap();
        assert_eq!(snapshot[0].entry.cost, Some(1200.5));
        assert_eq!(snapshot[0].entry.return_estimate, None);
        assert_eq!(snapshot[1].entry.cost, None);
        assert_eq!(snapshot[1].entry.what, "");
    }

    #[tokio::test]
    async fn failed_save_keeps_the_cached_snapshot() {
        let db = Database::in_memory().await.unwrap();
        let cache = cache();
        db.replace_all(&[entry("Alice", "Completed", "2024-01-10")])
            .await
            .unwrap();
        let before = cache.get_all(&db).await.unwrap();
        arm_failing_insert(&db).await;

        let err = save_records(&db, &cache, &[RecordDraft::new().with(Field::Who, "boom")])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(cache.has_snapshot());
        assert_eq!(cache.get_all(&db).await.unwrap(), before);
        assert_eq!(db.read_all().await.unwrap(), *before);
    }

    #[tokio::test]
    async fn malformed_import_never_touches_the_store() {
        let db = Database::in_memory().await.unwrap();
        let cache = cache();
        db.replace_all(&[entry("Alice", "Completed", "2024-01-10")])
            .await
            .unwrap();
        cache.get_all(&db).await.unwrap();

        let err = import_csv(&db, &cache, b"who\nAlice,extra\n").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ImportParse);
        assert!(cache.has_snapshot());
        assert_eq!(db.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn export_then_import_reproduces_every_field() {
        let db = Database::in_memory().await.unwrap();
        let cache = cache();
        let original = vec![
            ProjectEntry {
                who: "Alice".into(),
                what: "Renegotiate freight, Q2".into(),
                why: "Cut \"landed\" cost".into(),
                place: "São Paulo".into(),
                when: "April".into(),
                how: "RFQ".into(),
                cost: Some(1500.0),
                planned_end: "2024-01-10".into(),
                deadline_status: "Overdue".into(),
                task_status: "Completed".into(),
                return_type: "Savings".into(),
                return_estimate: Some(0.1),
                history: "opened\nreviewed".into(),
                notes: String::new(),
            },
            entry("Bob", "In progress", "not-a-date"),
        ];
        db.replace_all(&original).await.unwrap();

        let bytes = export_csv(&db, &cache).await.unwrap();
        db.replace_all(&[]).await.unwrap();
        cache.invalidate();
        let imported = import_csv(&db, &cache, &bytes).await.unwrap();

        assert_eq!(imported, 2);
        let snapshot = cache.get_all(&db).await.unwrap();
        let entries: Vec<ProjectEntry> = snapshot.iter().map(|r| r.entry.clone()).collect();
        assert_eq!(entries, original);
        assert_eq!(snapshot.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
