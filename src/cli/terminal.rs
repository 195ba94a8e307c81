//! Terminal capability detection and colouring

use inverter_docs::{Priority, Status};
use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 80 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 80)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as error (red)
    fn error(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn error(&self) -> String {
        if supports_color() {
            self.fg::<css::Red>().to_string()
        } else {
            self.to_string()
        }
    }

    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn error(&self) -> String {
        self.as_str().error()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// Priority badge, padded to `width` before colouring so columns stay
/// aligned.
pub fn priority_badge(priority: Priority, width: usize) -> String {
    let text = format!("{:<width$}", priority.as_str());
    match priority {
        Priority::Critical => text.error(),
        Priority::High => text.warning(),
        Priority::Medium => {
            if supports_color() {
                text.fg::<css::Gold>().to_string()
            } else {
                text
            }
        }
        Priority::Low => text.success(),
    }
}

/// Status icon: pass, fail or pending.
pub fn status_icon(status: Status) -> String {
    match status {
        Status::Pass => "✓".success(),
        Status::Fail => "✗".error(),
        Status::Pending => "…".dim(),
    }
}

/// On/off marker for a switching device.
pub fn conduction_marker(on: bool) -> String {
    if on { "ON ".success() } else { "OFF".dim() }
}
