//! Terminal output for the CLI: headers, statuses, tables and progress.

mod headers;
mod output;
mod progress;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{
    format_duration, print_key_value, print_separator_with_spacing, print_summary_box,
    print_task_line,
};
pub use progress::create_progress_bar;
pub use status::{print_error, print_success, print_warning};
pub use tables::{print_verdict_table, print_workspace_list};
