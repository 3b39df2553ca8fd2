//! Elapsed-time rendering.

/// Render `seconds` as `"1h 2m 3s"`.
///
/// The input is rounded to the nearest second. Hour and minute components
/// are omitted when zero; seconds are always shown. Negative and NaN inputs
/// render as `"0s"`.
///
/// ```
/// use core_playback::human_readable_time;
///
/// assert_eq!(human_readable_time(0.0), "0s");
/// assert_eq!(human_readable_time(65.0), "1m 5s");
/// assert_eq!(human_readable_time(3661.0), "1h 1m 1s");
/// ```
pub fn human_readable_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m ", minutes));
    }
    out.push_str(&format!("{}s", secs));
    out
}

/// `"<current> / <duration>"`, with `--` while the duration is unknown.
pub fn time_display(current: f64, duration: Option<f64>) -> String {
    let total = match duration {
        Some(d) if d.is_finite() => human_readable_time(d),
        _ => "--".to_string(),
    };
    format!("{} / {}", human_readable_time(current), total)
}
