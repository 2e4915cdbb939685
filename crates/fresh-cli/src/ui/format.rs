//! Formatting helpers for banners and durations.

use super::messages::paint;
use owo_colors::Style;
use std::time::Duration;

/// Width of the right-justified banner label column.
const LABEL_WIDTH: usize = 12;

/// Right-justify `label` in the banner column. Longer labels are kept whole.
fn pad_label(label: &str) -> String {
    format!("{:>width$}", label, width = LABEL_WIDTH)
}

/// Print a banner line to stderr: the label right-justified in a fixed
/// column in bold green, followed by the message.
pub fn banner(label: &str, message: &str) {
    eprintln!(
        "{} {}",
        paint(&pad_label(label), Style::new().green().bold()),
        message
    );
}

/// Format a duration in a human-readable way.
///
/// ```
/// use fresh_cli::ui::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();

    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
