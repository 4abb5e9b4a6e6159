//! Minutes:seconds formatting.

/// Format a millisecond total as `minutes:seconds`, seconds zero-padded to
/// two digits. Resolution is whole seconds; sub-second remainders are
/// truncated, never rounded up.
pub fn format_min_sec(total_ms: u64) -> String {
    let total_sec = total_ms / 1000;
    format!("{}:{:02}", total_sec / 60, total_sec % 60)
}
