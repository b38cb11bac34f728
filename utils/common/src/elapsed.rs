use std::time::Duration;

/// Convert a [`std::time::Duration`] into a compact string.
///
/// * < 1 s  ->  "{milli}ms"
/// * < 60 s ->  "{sec:.2}s"
/// * >= 60 s ->  "{min}m {sec:02}s"
pub fn format_duration(duration: Duration) -> String {
    format_elapsed_ms(duration.as_millis() as i64)
}

/// Same as [`format_duration`] for a millisecond count. Negative values are
/// treated as zero.
pub fn format_elapsed_ms(millis: i64) -> String {
    let millis = millis.max(0);
    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.2}s", millis as f64 / 1000.0)
    } else {
        let minutes = millis / 60_000;
        let seconds = (millis % 60_000) / 1000;
        format!("{minutes}m {seconds:02}s")
    }
}

#[cfg(test)]
#[path = "elapsed.test.rs"]
mod tests;
