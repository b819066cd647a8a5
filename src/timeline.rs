//! Conversions between a track's millisecond timeline and its envelope frames.

use crate::similarity::ReferenceWindow;

/// Default length of a fresh selection on the reference track.
pub const DEFAULT_WINDOW_MS: f64 = 15_000.0;

/// Map a selection in milliseconds onto envelope frames.
///
/// The start is floored and kept at or above 0; the end is floored and capped
/// at the last frame. A track without duration or frames gives an empty window.
pub fn window_from_ms(start_ms: f64, end_ms: f64, duration_ms: f64, env_len: usize) -> ReferenceWindow {
    if duration_ms.is_nan() || duration_ms <= 0.0 || env_len == 0 {
        return ReferenceWindow::default();
    }
    let to_frame = |ms: f64| -> usize {
        let frame = (ms / duration_ms * env_len as f64).floor();
        if frame.is_nan() || frame <= 0.0 {
            0
        } else {
            frame as usize
        }
    };
    let start = to_frame(start_ms);
    let end = to_frame(end_ms).min(env_len - 1);
    ReferenceWindow::new(start, end)
}

pub fn index_to_ms(idx: usize, env_len: usize, duration_ms: f64) -> f64 {
    if env_len == 0 {
        return 0.0;
    }
    idx as f64 / env_len as f64 * duration_ms
}

/// Initial `(start_ms, end_ms)` selection for a reference track.
pub fn default_selection(duration_ms: f64, window_ms: f64) -> (f64, f64) {
    (0.0, window_ms.min(duration_ms.max(0.0)))
}

/// `m:ss` rendering used in match listings.
pub fn format_timestamp(ms: f64) -> String {
    if ms.is_nan() || ms < 0.0 {
        return "0:00".to_string();
    }
    let total_secs = (ms / 1000.0).floor() as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
