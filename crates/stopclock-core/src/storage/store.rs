//! Stopwatch snapshot persistence.
//!
//! Bridges the [`Stopwatch`] state machine and the kv store. Reads are
//! forgiving: an absent, unreadable, or malformed record loads as the
//! default stopped state and is never surfaced to the user. Writes report
//! failure to the caller, who treats the in-memory state as authoritative
//! for the rest of the invocation.

use crate::error::CoreError;
use crate::events::Event;
use crate::timer::{now_ms, Snapshot, Stopwatch};

use super::database::Database;

const STATE_KEY: &str = "stopwatch_state_v1";

/// Persistence wrapper for the single stopwatch record.
pub struct StopwatchStore {
    db: Database,
}

impl StopwatchStore {
    /// Open the backing database.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self {
            db: Database::open()?,
        })
    }

    #[cfg(test)]
    fn open_memory() -> Result<Self, CoreError> {
        Ok(Self {
            db: Database::open_memory()?,
        })
    }

    /// Load the persisted snapshot and restore it at `now_ms`.
    ///
    /// Missing or malformed records yield the default stopped state. A
    /// restored running snapshot is credited with its downtime and
    /// re-anchored; the accompanying event reports the credit, and the
    /// caller should persist the re-anchored state.
    pub fn load_at(&self, now_ms: u64) -> (Stopwatch, Option<Event>) {
        match self.db.kv_get(STATE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Snapshot>(&json) {
                Ok(snapshot) => Stopwatch::restore(snapshot, now_ms),
                Err(_) => (Stopwatch::default(), None),
            },
            _ => (Stopwatch::default(), None),
        }
    }

    pub fn load(&self) -> (Stopwatch, Option<Event>) {
        self.load_at(now_ms())
    }

    /// Persist the current snapshot.
    ///
    /// # Errors
    /// Returns an error if serialization or the kv write fails. Callers
    /// treat this as non-fatal; the next triggering event retries naturally.
    pub fn save(&self, stopwatch: &Stopwatch) -> Result<(), CoreError> {
        let json = serde_json::to_string(&stopwatch.snapshot())?;
        self.db.kv_set(STATE_KEY, &json)?;
        Ok(())
    }

    /// Delete the persisted record. The next load yields the default
    /// stopped state.
    ///
    /// # Errors
    /// Returns an error if the kv delete fails. Callers treat this as
    /// non-fatal, like [`save`](Self::save).
    pub fn clear(&self) -> Result<(), CoreError> {
        self.db.kv_delete(STATE_KEY)?;
        Ok(())
    }
}
