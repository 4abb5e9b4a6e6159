//! Stopwatch state machine.
//!
//! The stopwatch is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically while running, and for persisting the snapshot whenever an
//! operation returns an event.
//!
//! ## State
//!
//! ```text
//! stopped: displayed value = elapsed_ms
//! running: displayed value = elapsed_ms + (now - anchor)
//! ```
//!
//! While running, `tick()` periodically folds the in-flight delta into
//! `elapsed_ms` and re-anchors to now, so a crash loses at most one fold
//! interval of time.
//!
//! Every mutating operation has an `_at(now_ms)` form taking an explicit
//! epoch-millisecond clock; the parameterless form reads the system clock.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::display::format_min_sec;
use crate::events::Event;

/// Lower bound between persisted folds while running.
pub const MIN_FOLD_INTERVAL_MS: u64 = 900;

/// Persisted stopwatch snapshot. The single record written to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub elapsed_ms: u64,
    pub running: bool,
    /// Epoch-millisecond anchor of the open run. `None` whenever stopped.
    pub last_start_epoch_ms: Option<u64>,
}

/// Core stopwatch.
///
/// Operates on wall-clock deltas -- no internal thread. All subtraction is
/// saturating, so a clock that jumps backwards yields a zero delta rather
/// than a panic.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    /// Accumulated running time, excluding the open run.
    elapsed_ms: u64,
    running: bool,
    /// Anchor of the open run (epoch ms). `Some` iff running.
    last_start_epoch_ms: Option<u64>,
    /// When the in-flight delta was last folded into `elapsed_ms`.
    /// Runtime-only; not part of the persisted snapshot.
    last_fold_epoch_ms: u64,
}

impl Stopwatch {
    /// Reconstruct a stopwatch from a persisted snapshot.
    ///
    /// A running snapshot is credited with the gap since its anchor (time
    /// that passed while the process was down), stays running, and is
    /// re-anchored to `now_ms`; the returned event reports the credit. A
    /// stopped snapshot loads as-is, discarding any stray anchor. The
    /// re-anchored state should be persisted by the caller.
    pub fn restore(snapshot: Snapshot, now_ms: u64) -> (Self, Option<Event>) {
        match (snapshot.running, snapshot.last_start_epoch_ms) {
            (true, Some(anchor)) => {
                let credited_ms = now_ms.saturating_sub(anchor);
                let stopwatch = Self {
                    elapsed_ms: snapshot.elapsed_ms + credited_ms,
                    running: true,
                    last_start_epoch_ms: Some(now_ms),
                    last_fold_epoch_ms: now_ms,
                };
                let event = Event::Resumed {
                    credited_ms,
                    elapsed_ms: stopwatch.elapsed_ms,
                    at: Utc::now(),
                };
                (stopwatch, Some(event))
            }
            // A running flag without an anchor is malformed; load stopped.
            _ => (
                Self {
                    elapsed_ms: snapshot.elapsed_ms,
                    ..Self::default()
                },
                None,
            ),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Accumulated total, excluding the open run.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Displayed value at `now_ms`. Pure; mutates nothing.
    pub fn display_ms_at(&self, now_ms: u64) -> u64 {
        match self.last_start_epoch_ms {
            Some(anchor) if self.running => {
                self.elapsed_ms + now_ms.saturating_sub(anchor)
            }
            _ => self.elapsed_ms,
        }
    }

    pub fn display_ms(&self) -> u64 {
        self.display_ms_at(now_ms())
    }

    /// Displayed value formatted as `minutes:seconds`.
    pub fn display_at(&self, now_ms: u64) -> String {
        format_min_sec(self.display_ms_at(now_ms))
    }

    pub fn display(&self) -> String {
        self.display_at(now_ms())
    }

    /// The persistable snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            elapsed_ms: self.elapsed_ms,
            running: self.running,
            last_start_epoch_ms: self.last_start_epoch_ms,
        }
    }

    /// Build a full state readout event.
    pub fn status_event_at(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            running: self.running,
            display_ms: self.display_ms_at(now_ms),
            display: self.display_at(now_ms),
            at: Utc::now(),
        }
    }

    pub fn status_event(&self) -> Event {
        self.status_event_at(now_ms())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run. No-op if already running.
    pub fn start_at(&mut self, now_ms: u64) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.last_start_epoch_ms = Some(now_ms);
        self.last_fold_epoch_ms = now_ms;
        Some(Event::Started { at: Utc::now() })
    }

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    /// Close the open run, folding its delta into the total. No-op if
    /// stopped.
    pub fn stop_at(&mut self, now_ms: u64) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.fold_at(now_ms);
        self.running = false;
        self.last_start_epoch_ms = None;
        Some(Event::Stopped {
            elapsed_ms: self.elapsed_ms,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        self.stop_at(now_ms())
    }

    /// Unconditional reset to zero, stopped.
    pub fn clear(&mut self) -> Option<Event> {
        self.elapsed_ms = 0;
        self.running = false;
        self.last_start_epoch_ms = None;
        self.last_fold_epoch_ms = 0;
        Some(Event::Cleared { at: Utc::now() })
    }

    /// Call periodically while running. Folds the in-flight delta into the
    /// total once at least `min_interval_ms` has passed since the last fold;
    /// the returned event tells the caller to persist the folded snapshot.
    ///
    /// `min_interval_ms` is clamped to [`MIN_FOLD_INTERVAL_MS`].
    pub fn tick_every_at(&mut self, min_interval_ms: u64, now_ms: u64) -> Option<Event> {
        if !self.running {
            return None;
        }
        let min_interval_ms = min_interval_ms.max(MIN_FOLD_INTERVAL_MS);
        if now_ms.saturating_sub(self.last_fold_epoch_ms) < min_interval_ms {
            return None;
        }
        self.fold_at(now_ms);
        Some(Event::Folded {
            elapsed_ms: self.elapsed_ms,
            at: Utc::now(),
        })
    }

    pub fn tick_every(&mut self, min_interval_ms: u64) -> Option<Event> {
        self.tick_every_at(min_interval_ms, now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> Option<Event> {
        self.tick_every_at(MIN_FOLD_INTERVAL_MS, now_ms)
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Suspend/unload hook. Folds the open run (if any) so no time is lost
    /// while the tick driver is torn down, and returns the snapshot to
    /// persist. Stopped state is returned as-is for a defensive write.
    pub fn checkpoint_at(&mut self, now_ms: u64) -> Snapshot {
        if self.running {
            self.fold_at(now_ms);
        }
        self.snapshot()
    }

    pub fn checkpoint(&mut self) -> Snapshot {
        self.checkpoint_at(now_ms())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Fold the in-flight delta into the total and re-anchor to `now_ms`.
    /// Caller guarantees `running`.
    fn fold_at(&mut self, now_ms: u64) {
        if let Some(anchor) = self.last_start_epoch_ms {
            self.elapsed_ms += now_ms.saturating_sub(anchor);
            self.last_start_epoch_ms = Some(now_ms);
            self.last_fold_epoch_ms = now_ms;
        }
    }
}

/// Current wall clock as epoch milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn start_stop_accumulates_run_durations() {
        let mut sw = Stopwatch::default();
        assert!(sw.start_at(T0).is_some());
        assert!(sw.is_running());

        assert!(sw.stop_at(T0 + 65_000).is_some());
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_ms(), 65_000);
        assert_eq!(sw.display_at(T0 + 65_000), "1:05");

        assert!(sw.start_at(T0 + 70_000).is_some());
        assert_eq!(sw.display_at(T0 + 75_000), "1:10");

        sw.clear();
        assert_eq!(sw.display_at(T0 + 75_000), "0:00");
        assert!(!sw.is_running());
    }

    #[test]
    fn start_while_running_is_a_noop() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        assert!(sw.start_at(T0 + 5_000).is_none());
        // The original anchor is untouched.
        assert_eq!(sw.display_ms_at(T0 + 10_000), 10_000);
    }

    #[test]
    fn stop_while_stopped_is_a_noop() {
        let mut sw = Stopwatch::default();
        assert!(sw.stop_at(T0).is_none());
        assert_eq!(sw.snapshot(), Snapshot::default());
    }

    #[test]
    fn clear_resets_regardless_of_prior_state() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        sw.tick_at(T0 + 2_000);
        assert!(sw.clear().is_some());
        assert_eq!(sw.snapshot(), Snapshot::default());
    }

    #[test]
    fn tick_folds_only_after_min_interval() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);

        assert!(sw.tick_at(T0 + 500).is_none());
        assert_eq!(sw.elapsed_ms(), 0);

        let folded = sw.tick_at(T0 + 950);
        assert!(matches!(folded, Some(Event::Folded { elapsed_ms: 950, .. })));
        assert_eq!(sw.elapsed_ms(), 950);
        assert_eq!(sw.snapshot().last_start_epoch_ms, Some(T0 + 950));
    }

    #[test]
    fn fold_does_not_change_the_displayed_value() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        let before = sw.display_ms_at(T0 + 1_200);
        sw.tick_at(T0 + 1_200);
        assert_eq!(sw.display_ms_at(T0 + 1_200), before);
    }

    #[test]
    fn tick_interval_clamps_to_minimum() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        // Asking for a 100ms interval still waits out the 900ms floor.
        assert!(sw.tick_every_at(100, T0 + 500).is_none());
        assert!(sw.tick_every_at(100, T0 + 900).is_some());
    }

    #[test]
    fn restore_running_snapshot_credits_downtime() {
        let snapshot = Snapshot {
            elapsed_ms: 2_000,
            running: true,
            last_start_epoch_ms: Some(T0 - 10_000),
        };
        let (sw, event) = Stopwatch::restore(snapshot, T0);
        assert!(sw.is_running());
        assert_eq!(sw.elapsed_ms(), 12_000);
        assert_eq!(sw.snapshot().last_start_epoch_ms, Some(T0));
        match event {
            Some(Event::Resumed {
                credited_ms,
                elapsed_ms,
                ..
            }) => {
                assert_eq!(credited_ms, 10_000);
                assert_eq!(elapsed_ms, 12_000);
            }
            other => panic!("Expected Resumed, got {other:?}"),
        }
    }

    #[test]
    fn restore_stopped_snapshot_loads_as_is() {
        let snapshot = Snapshot {
            elapsed_ms: 42_000,
            running: false,
            last_start_epoch_ms: None,
        };
        let (sw, event) = Stopwatch::restore(snapshot, T0);
        assert!(event.is_none());
        assert!(!sw.is_running());
        assert_eq!(sw.display_ms_at(T0), 42_000);
    }

    #[test]
    fn restore_running_without_anchor_loads_stopped() {
        let snapshot = Snapshot {
            elapsed_ms: 7_000,
            running: true,
            last_start_epoch_ms: None,
        };
        let (sw, event) = Stopwatch::restore(snapshot, T0);
        assert!(event.is_none());
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_ms(), 7_000);
    }

    #[test]
    fn restore_with_no_gap_reproduces_displayed_value() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        sw.stop_at(T0 + 3_000);
        sw.start_at(T0 + 5_000);

        let shown = sw.display_ms_at(T0 + 8_000);
        let folded = sw.checkpoint_at(T0 + 8_000);
        let (restored, _) = Stopwatch::restore(folded, T0 + 8_000);
        assert_eq!(restored.display_ms_at(T0 + 8_000), shown);
        assert_eq!(restored.is_running(), sw.is_running());
    }

    #[test]
    fn simulated_restart_mid_run_stays_running() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        // The snapshot written at start is what a reload would read back.
        let persisted = sw.snapshot();

        let (restored, _) = Stopwatch::restore(persisted, T0 + 3_000);
        assert!(restored.is_running());
        assert_eq!(restored.display_ms_at(T0 + 3_000), 3_000);
    }

    #[test]
    fn checkpoint_folds_open_run() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        let snapshot = sw.checkpoint_at(T0 + 4_200);
        assert_eq!(snapshot.elapsed_ms, 4_200);
        assert!(snapshot.running);
        assert_eq!(snapshot.last_start_epoch_ms, Some(T0 + 4_200));
    }

    #[test]
    fn checkpoint_while_stopped_is_defensive_write_only() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        sw.stop_at(T0 + 1_000);
        let snapshot = sw.checkpoint_at(T0 + 9_000);
        assert_eq!(snapshot.elapsed_ms, 1_000);
        assert!(!snapshot.running);
    }

    #[test]
    fn backwards_clock_yields_zero_delta() {
        let mut sw = Stopwatch::default();
        sw.start_at(T0);
        assert!(sw.stop_at(T0 - 5_000).is_some());
        assert_eq!(sw.elapsed_ms(), 0);
    }

    #[test]
    fn invariant_holds_across_operations() {
        let mut sw = Stopwatch::default();
        assert_eq!(sw.snapshot().last_start_epoch_ms, None);
        sw.start_at(T0);
        assert!(sw.snapshot().last_start_epoch_ms.is_some());
        sw.stop_at(T0 + 100);
        let snap = sw.snapshot();
        assert!(!snap.running);
        assert_eq!(snap.last_start_epoch_ms, None);
        assert_eq!(sw.display_ms_at(T0 + 60_000), snap.elapsed_ms);
    }

    proptest! {
        /// Elapsed time after a stop equals the sum of all run durations,
        /// no matter how the runs and pauses are spaced.
        #[test]
        fn elapsed_is_sum_of_run_durations(
            segments in prop::collection::vec((0u64..120_000, 0u64..120_000), 0..24)
        ) {
            let mut sw = Stopwatch::default();
            let mut clock = T0;
            let mut expected = 0u64;

            for (run_ms, pause_ms) in segments {
                sw.start_at(clock);
                clock += run_ms;
                sw.stop_at(clock);
                expected += run_ms;
                clock += pause_ms;
            }

            prop_assert_eq!(sw.elapsed_ms(), expected);
            prop_assert!(!sw.is_running());
        }

        /// Interleaved ticks never lose or double-count time.
        #[test]
        fn ticks_preserve_the_displayed_total(
            tick_gaps in prop::collection::vec(1u64..5_000, 1..64)
        ) {
            let mut sw = Stopwatch::default();
            let mut clock = T0;
            sw.start_at(clock);

            let mut total = 0u64;
            for gap in tick_gaps {
                clock += gap;
                total += gap;
                sw.tick_at(clock);
                prop_assert_eq!(sw.display_ms_at(clock), total);
            }

            sw.stop_at(clock);
            prop_assert_eq!(sw.elapsed_ms(), total);
        }
    }
}
