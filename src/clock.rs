//! Elapsed-time display.

/// Render elapsed milliseconds as `SS:T`.
///
/// `SS` is whole seconds modulo 100 (the counter wraps after 99 seconds) and
/// `T` the tenths digit.
pub fn format_time(elapsed_ms: u64) -> String {
    let seconds = (elapsed_ms / 1000) % 100;
    let tenths = (elapsed_ms % 1000) / 100;
    format!("{seconds:02}:{tenths}")
}
