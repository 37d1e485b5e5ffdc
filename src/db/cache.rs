//! Time-bounded memoization of the "all records" query.
//!
//! The cache holds at most one snapshot of the whole table. A snapshot is
//! served while it is younger than the configured time-to-live; writers call
//! [`QueryCache::invalidate`] after every successful replace so the next read
//! goes back to the store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use super::Database;
use crate::error::TrackerResult;
use crate::models::ProjectRecord;

/// Immutable copy of every record at one point in time.
pub type Snapshot = Arc<Vec<ProjectRecord>>;

/// Source of "now" for staleness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Cached {
    snapshot: Snapshot,
    loaded_at: Instant,
}

#[derive(Default)]
struct CacheState {
    cached: Option<Cached>,
    // Bumped by every invalidate; a read that started under an older
    // generation must not publish its result.
    generation: u64,
}

pub struct QueryCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached snapshot if it is still fresh, otherwise a new one read
    /// from `db`.
    pub async fn get_all(&self, db: &Database) -> TrackerResult<Snapshot> {
        let generation = {
            let state = self.lock();
            if let Some(cached) = &state.cached {
                let age = self.clock.now().saturating_duration_since(cached.loaded_at);
                if age < self.ttl {
                    debug!(age_ms = age.as_millis() as u64, "serving cached snapshot");
                    return Ok(Arc::clone(&cached.snapshot));
                }
            }
            state.generation
        };

        let snapshot: Snapshot = Arc::new(db.read_all().await?);

        let mut state = self.lock();
        if state.generation == generation {
            state.cached = Some(Cached {
                snapshot: Arc::clone(&snapshot),
                loaded_at: self.clock.now(),
            });
            debug!(count = snapshot.len(), "cached fresh snapshot");
        }

        Ok(snapshot)
    }

    /// Drop the cached snapshot, if any.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.cached = None;
        state.generation = state.generation.wrapping_add(1);
        debug!("snapshot cache invalidated");
    }

    #[cfg(test)]
    pub fn has_snapshot(&self) -> bool {
        self.lock().cached.is_some()
    }
}
