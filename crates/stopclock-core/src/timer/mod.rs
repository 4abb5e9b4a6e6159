mod display;
mod stopwatch;

pub use display::format_min_sec;
pub use stopwatch::{now_ms, Snapshot, Stopwatch, MIN_FOLD_INTERVAL_MS};
