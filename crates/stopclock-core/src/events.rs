use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the stopwatch produces an Event.
/// The CLI prints them as JSON; a GUI surface would poll for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new run began.
    Started { at: DateTime<Utc> },
    /// The open run was folded into the accumulated total and closed.
    Stopped { elapsed_ms: u64, at: DateTime<Utc> },
    /// Everything was reset to zero.
    Cleared { at: DateTime<Utc> },
    /// Periodic drift-correction fold while running. The snapshot persisted
    /// after this event is what a crash would restore.
    Folded { elapsed_ms: u64, at: DateTime<Utc> },
    /// A running snapshot was restored; `credited_ms` is the downtime that
    /// was added to the total.
    Resumed {
        credited_ms: u64,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    /// Full state readout. Unlike `elapsed_ms` elsewhere, `display_ms`
    /// includes the in-flight delta of an open run.
    StateSnapshot {
        running: bool,
        display_ms: u64,
        display: String,
        at: DateTime<Utc>,
    },
}
