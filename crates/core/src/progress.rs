//! Progress helpers.

/// Clamp a reported percentage into `[0, 100]`. `NaN` maps to `0`.
pub fn clamp_progress(pct: f64) -> f64 {
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, 100.0)
    }
}

/// Text shown next to the progress bar, e.g. `42%`.
pub fn progress_label(pct: f64) -> String {
    format!("{:.0}%", clamp_progress(pct))
}

/// Status message with a page counter appended when the backend knows
/// the page total, e.g. `a.pdf: page 3/7 (2/7 pages)`.
pub fn message_with_pages(message: &str, processed: u64, total: u64) -> String {
    if total == 0 {
        return message.to_string();
    }
    if message.is_empty() {
        format!("{processed}/{total} pages")
    } else {
        format!("{message} ({processed}/{total} pages)")
    }
}
