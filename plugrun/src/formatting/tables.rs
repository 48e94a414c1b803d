//! Tables and lists built with comfy-table.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use owo_colors::OwoColorize;
use plugrun_core::{Outcome, Verdict, Workspace};

use super::format_duration;
use super::status::Status;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(*h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        )
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Prints one row per workspace with its outcome.
pub fn print_verdict_table(verdict: &Verdict<()>) {
    let mut table = new_table(&["", "Workspace", "Result"]);

    for item in verdict.iter() {
        let (status, detail, color) = match &item.outcome {
            Outcome::Succeeded(()) => (Status::Success, "ok".to_string(), Color::Green),
            Outcome::Failed(message) => (Status::Error, message.clone(), Color::Red),
            Outcome::TimedOut(deadline) => (
                Status::Warning,
                format!("timed out after {}", format_duration(*deadline)),
                Color::Yellow,
            ),
        };
        table.add_row(vec![
            Cell::new(status.symbol()).fg(color),
            Cell::new(&item.id).fg(Color::White),
            Cell::new(detail).fg(color),
        ]);
    }

    println!("{}", table);
}

pub fn print_workspace_list(workspaces: &[Workspace]) {
    if workspaces.is_empty() {
        println!("  {} {}", "→".cyan(), "(none)".bright_black());
        return;
    }

    for workspace in workspaces {
        println!(
            "  {} {} {}",
            "→".cyan(),
            workspace.name.bold().white(),
            workspace.path.display().bright_black()
        );
    }
}
