//! Workspace listing.

use std::path::Path;

use anyhow::Result;

use crate::formatting::{print_section_header, print_workspace_list, SectionStyle};

use super::discover_workspaces;

pub fn cmd_list(root: &Path, json: bool) -> Result<()> {
    let workspaces = discover_workspaces(root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workspaces)?);
        return Ok(());
    }

    print_section_header(
        &format!("Workspaces ({})", workspaces.len()),
        SectionStyle::Primary,
    );
    print_workspace_list(&workspaces);
    println!();
    Ok(())
}
