//! Terminal status output.
//!
//! Status lines go to stderr so stdout stays free for anything a caller
//! pipes. Colors are turned off globally with `--no-color`, `NO_COLOR`, or
//! when stderr is not a terminal.
//!
//! ```no_run
//! use fresh_cli::ui;
//!
//! ui::init_colors(false);
//! ui::banner("Serving", "public/ at http://127.0.0.1:8080");
//! ui::success("Build succeeded");
//! ```

mod format;
mod messages;

pub use format::{banner, format_duration};
pub use messages::{error, info, success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Set the global color mode for owo-colors and console.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    owo_colors::set_override(enabled);
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}
