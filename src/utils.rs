//! Utility functions for terminal output formatting
//!
//! Consistent, colored status lines for the end of each command. Per-entry
//! diagnostics go through the `log` macros instead.

use colored::*;

use crate::constants::{ICON_ARROW, ICON_ERROR, ICON_INFO, ICON_SUCCESS, ICON_WARNING};

/// Displays a success message with a green checkmark
///
/// # Example
///
/// ```no_run
/// use git_nest::utils::print_success;
///
/// print_success("Manifests up to date");
/// ```
pub fn print_success(message: &str) {
    println!("{} {}", ICON_SUCCESS.green(), message);
}

/// Displays a warning message in yellow
pub fn print_warning(message: &str) {
    println!("{} {}", ICON_WARNING.yellow(), message.yellow());
}

/// Displays an error message with a red X mark on stderr
pub fn print_error(message: &str) {
    eprintln!("{} {}", ICON_ERROR.red(), message);
}

/// Displays an informational message in blue
pub fn print_info(message: &str) {
    println!("{} {}", ICON_INFO.blue(), message);
}

/// Displays one indented list item
pub fn print_item(message: &str) {
    println!("  {} {}", ICON_ARROW.bright_black(), message);
}

/// Formats a `label: value` pair for summaries
pub fn format_count(label: &str, value: usize) -> String {
    format!("{}: {}", label.bright_white(), value.to_string().bright_yellow())
}
