//! Per-workspace commands run concurrently across all plugins.

use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use plugrun_core::{collect_with, dispatch, Config, TaskConfig, WorkItem};
use tracing::info;

use crate::formatting::{
    create_progress_bar, format_duration, print_error, print_section_header,
    print_separator_with_spacing, print_success, print_summary_box, print_task_line,
    print_verdict_table, print_warning, SectionStyle,
};

use super::discover_workspaces;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutTask {
    Lint,
    Build,
    GolangciLint,
}

impl FanOutTask {
    fn config<'a>(&self, config: &'a Config) -> &'a TaskConfig {
        match self {
            FanOutTask::Lint => &config.lint,
            FanOutTask::Build => &config.build,
            FanOutTask::GolangciLint => &config.golangci_lint,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            FanOutTask::Lint => "Linting plugins",
            FanOutTask::Build => "Building plugins",
            FanOutTask::GolangciLint => "Running golangci-lint",
        }
    }

    fn gerund(&self) -> &'static str {
        match self {
            FanOutTask::Lint => "Linting",
            FanOutTask::Build => "Building",
            FanOutTask::GolangciLint => "Checking",
        }
    }

    fn results_title(&self) -> &'static str {
        match self {
            FanOutTask::Lint => "Lint Results",
            FanOutTask::Build => "Build Results",
            FanOutTask::GolangciLint => "golangci-lint Results",
        }
    }

    fn success_message(&self, count: usize) -> String {
        match self {
            FanOutTask::Lint => format!("All {} plugins linted successfully", count),
            FanOutTask::Build => format!("All {} plugins built successfully", count),
            FanOutTask::GolangciLint => {
                format!("All {} plugins passed the golangci-lint check", count)
            }
        }
    }
}

pub async fn cmd_fan_out(
    root: &Path,
    config: &Config,
    task: FanOutTask,
    timeout: Option<u64>,
    no_stream: bool,
) -> Result<ExitCode> {
    let start = Instant::now();
    let task_config = task.config(config);
    let deadline = timeout
        .map(Duration::from_secs)
        .unwrap_or(task_config.timeout);

    let mut workspaces = discover_workspaces(root)?;
    if task == FanOutTask::GolangciLint {
        workspaces.retain(|workspace| {
            let has_schemas = workspace.has_schemas();
            if !has_schemas {
                info!("skipping golangci-lint for {} (no schemas)", workspace.name);
            }
            has_schemas
        });
    }

    print_section_header(task.title(), SectionStyle::Primary);
    if workspaces.is_empty() {
        print_warning("No workspaces to process");
        return Ok(ExitCode::SUCCESS);
    }

    let pb = create_progress_bar(workspaces.len() as u64, task.gerund());
    pb.set_message(workspaces[0].name.clone());

    let items: Vec<WorkItem<()>> = workspaces
        .iter()
        .map(|workspace| {
            info!("{} plugin {}", task.gerund(), workspace.name);
            let spec = task_config.command_for(workspace);
            let name = workspace.name.clone();
            let pb = pb.clone();
            WorkItem::new(workspace.name.clone(), move || async move {
                if no_stream {
                    spec.run_captured().await.map(|_| ())
                } else {
                    spec.run_streaming(|line, is_stderr| {
                        pb.suspend(|| print_task_line(&name, line, is_stderr))
                    })
                    .await
                }
            })
        })
        .collect();

    // Handles resolve in order, so the next one is the workspace being waited on.
    let mut resolved = 0;
    let verdict = collect_with(dispatch(items), deadline, |_| {
        resolved += 1;
        pb.inc(1);
        if let Some(next) = workspaces.get(resolved) {
            pb.set_message(next.name.clone());
        }
    })
    .await;
    pb.finish_and_clear();

    println!();
    let results_style = if verdict.has_failures() {
        SectionStyle::Error
    } else {
        SectionStyle::Success
    };
    print_section_header(task.results_title(), results_style);
    print_verdict_table(&verdict);
    println!();

    for line in verdict.failure_lines() {
        print_error(&line);
    }
    if verdict.has_failures() {
        print_warning(&format!(
            "{} succeeded, {} failed",
            verdict.success_count(),
            verdict.failure_count()
        ));
    } else {
        print_success(&task.success_message(verdict.len()));
    }

    print_separator_with_spacing();
    let succeeded = verdict.success_count().to_string();
    let failed = verdict.failure_count().to_string();
    print_summary_box(
        "Summary",
        &[
            ("Workspaces", &verdict.len().to_string()),
            ("Succeeded", &succeeded),
            ("Failed", &failed),
            ("Duration", &format_duration(start.elapsed())),
        ],
    );
    println!();

    if verdict.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
