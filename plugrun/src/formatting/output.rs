//! General output helpers.

use std::time::Duration;

use owo_colors::OwoColorize;

/// Prints a horizontal rule surrounded by blank lines.
pub fn print_separator_with_spacing() {
    println!();
    println!("{}", "─".repeat(60).bright_black());
    println!();
}

/// Prints `items` as key/value lines inside a titled box.
pub fn print_summary_box(title: &str, items: &[(&str, &str)]) {
    println!(
        "┌─ {} {}",
        title.cyan().bold(),
        "─".repeat(50).bright_black()
    );
    for (key, value) in items {
        println!("│ {} {}", key.bright_black().bold(), value.bold().white());
    }
    println!("└{}", "─".repeat(60).bright_black());
}

/// Prints an indented `key value` line, with the key dimmed.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", key.bright_black().bold(), value.bold().white());
}

/// Prints one line of a workspace command's output, prefixed by the workspace name.
pub fn print_task_line(workspace: &str, line: &str, is_stderr: bool) {
    let prefix = format!("[{}]", workspace);
    if is_stderr {
        eprintln!("{} {}", prefix.bright_black(), line.red());
    } else {
        println!("{} {}", prefix.bright_black(), line);
    }
}

/// Formats a duration as `850ms`, `2.41s` or `3m 12.0s`.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs_f64();
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.2}s", seconds)
    } else {
        let mins = (seconds / 60.0) as u64;
        let secs = seconds % 60.0;
        format!("{}m {:.1}s", mins, secs)
    }
}
