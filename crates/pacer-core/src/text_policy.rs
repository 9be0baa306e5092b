//! Short labels for status surfaces.

use core::fmt::Write;

use heapless::String;

pub const REMAINING_LABEL_BYTES: usize = 16;

/// Render a remaining-time estimate as `MM:SS`, or `H:MM:SS` past an hour.
///
/// Negative or non-finite estimates read as `00:00`.
pub fn remaining_label(remaining_ms: f64) -> String<REMAINING_LABEL_BYTES> {
    let total_secs = if remaining_ms.is_finite() && remaining_ms > 0.0 {
        (remaining_ms / 1_000.0) as u64
    } else {
        0
    };
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    let _ = if hours > 0 {
        write!(out, "{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        write!(out, "{:02}:{:02}", minutes, seconds)
    };
    out
}

/// Whole minutes left, rounded to nearest.
pub fn remaining_minutes(remaining_ms: f64) -> u64 {
    if remaining_ms.is_finite() && remaining_ms > 0.0 {
        (remaining_ms / 60_000.0 + 0.5) as u64
    } else {
        0
    }
}
