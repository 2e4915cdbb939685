//! Status message functions for terminal output.

use owo_colors::{OwoColorize, Stream, Style};

/// Apply `style` when stderr supports colors and they were not turned off.
pub(super) fn paint(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |t| style.style(t)).to_string()
}

/// Print a success message to stderr.
///
/// ```no_run
/// use fresh_cli::ui::success;
///
/// success("Site is up to date");
/// ```
pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}

/// Print an error message to stderr.
///
/// Multi-line messages (build output) keep their line breaks.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        paint("✗", Style::new().red().bold()),
        paint(message, Style::new().red())
    );
}
