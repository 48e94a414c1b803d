//! Progress display while workspace tasks run.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar over `total` workspaces.
///
/// `action` is shown as the bar's prefix. The message slot is meant for the
/// workspace currently being waited on.
pub fn create_progress_bar(total: u64, action: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} {prefix:.bold} [{elapsed_precise}] [{wide_bar:.cyan/.blue}] {pos}/{len} waiting on {msg:.cyan}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    pb.set_prefix(action.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}
