//! Dependency bumps across every plugin workspace.

use std::path::Path;

use anyhow::{bail, Context, Result};
use plugrun_core::bump::{
    bump_package_json, cue_module_depends_on, CORE_CUE_MODULE, CORE_GO_MODULE,
    CORE_NPM_PACKAGE, SHARED_CUE_MODULE, SHARED_NPM_PACKAGES,
};
use plugrun_core::{CommandSpec, Workspace};
use tracing::info;

use crate::formatting::{print_section_header, print_success, SectionStyle};

use super::discover_workspaces;

async fn bump_cue_module(workspace: &Workspace, module: &str, version: &str) -> Result<()> {
    if !cue_module_depends_on(&workspace.path, module)? {
        return Ok(());
    }
    CommandSpec::new("cue")
        .args(["mod", "get"])
        .arg(format!("{}@v{}", module, version))
        .current_dir(&workspace.path)
        .run()
        .await
        .with_context(|| format!("unable to bump cue dependency for {}", workspace.name))?;
    CommandSpec::new("cue")
        .args(["mod", "tidy"])
        .current_dir(&workspace.path)
        .run()
        .await
        .with_context(|| format!("unable to tidy cue module for {}", workspace.name))?;
    info!(
        "successfully bumped cue dependency {} for {} to version {}",
        module, workspace.name, version
    );
    Ok(())
}

async fn bump_core(root: &Path, workspaces: &[Workspace], version: &str) -> Result<()> {
    bump_package_json(root, version, &[CORE_NPM_PACKAGE])
        .context("unable to bump npm dependencies of the root package")?;

    for workspace in workspaces {
        CommandSpec::new("go")
            .arg("get")
            .arg(format!("{}@v{}", CORE_GO_MODULE, version))
            .current_dir(&workspace.path)
            .run()
            .await
            .with_context(|| format!("unable to bump go dependency for {}", workspace.name))?;
        CommandSpec::new("go")
            .args(["mod", "tidy"])
            .current_dir(&workspace.path)
            .run()
            .await
            .with_context(|| format!("unable to tidy go module for {}", workspace.name))?;

        bump_package_json(&workspace.path, version, &[CORE_NPM_PACKAGE])
            .with_context(|| format!("unable to bump npm dependencies for {}", workspace.name))?;
        bump_cue_module(workspace, CORE_CUE_MODULE, version).await?;
    }
    Ok(())
}

async fn bump_shared(root: &Path, workspaces: &[Workspace], version: &str) -> Result<()> {
    bump_package_json(root, version, &SHARED_NPM_PACKAGES)
        .context("unable to bump npm dependencies of the root package")?;

    for workspace in workspaces {
        bump_package_json(&workspace.path, version, &SHARED_NPM_PACKAGES)
            .with_context(|| format!("unable to bump npm dependencies for {}", workspace.name))?;
        bump_cue_module(workspace, SHARED_CUE_MODULE, version).await?;
    }
    Ok(())
}

pub async fn cmd_bump_deps(
    root: &Path,
    version: Option<String>,
    shared_version: Option<String>,
) -> Result<()> {
    if version.is_none() && shared_version.is_none() {
        bail!("at least one of --version or --shared-version is required");
    }

    let workspaces = discover_workspaces(root)?;
    print_section_header("Bumping dependencies", SectionStyle::Primary);

    if let Some(version) = version.as_deref() {
        bump_core(root, &workspaces, version).await?;
        print_success(&format!("Core dependencies bumped to {}", version));
    }
    if let Some(version) = shared_version.as_deref() {
        bump_shared(root, &workspaces, version).await?;
        print_success(&format!("Shared dependencies bumped to {}", version));
    }

    CommandSpec::new("npm")
        .arg("install")
        .current_dir(root)
        .run()
        .await
        .context("unable to update package-lock.json")?;

    print_success("Dependencies installed");
    Ok(())
}
