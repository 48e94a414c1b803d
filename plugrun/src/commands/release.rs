//! Release steps: CUE module publication and archive upload.

use std::path::Path;

use anyhow::{bail, Context, Result};
use plugrun_core::{manifest, CommandSpec, Config, ReleaseTag, Retrier};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::formatting::{print_key_value, print_section_header, print_success, SectionStyle};

fn parse_tag(tag: &str) -> Result<ReleaseTag> {
    tag.parse::<ReleaseTag>()
        .with_context(|| format!("invalid release tag {}", tag))
}

pub async fn cmd_publish(root: &Path, config: &Config, tag: &str, token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("the --token flag is required");
    }
    let tag = parse_tag(tag)?;
    let version = tag.module_version();
    let module = format!(
        "{}/{}@{}",
        config.publish.module_prefix,
        tag.plugin(),
        version
    );

    print_section_header("Publishing CUE module", SectionStyle::Primary);
    print_key_value("Module", &module);
    println!();
    info!("Module to be released: {}", module);

    let plugin_dir = root.join(tag.plugin());
    if !plugin_dir.is_dir() {
        bail!(
            "Error moving to the plugin directory: {} does not exist",
            plugin_dir.display()
        );
    }

    // Login is still required to push new modules.
    info!("Logging into the CUE Central Registry...");
    CommandSpec::new("cue")
        .arg("login")
        .arg(format!("--token={}", token))
        .sensitive()
        .current_dir(&plugin_dir)
        .run()
        .await
        .context("Error logging into CUE Central Registry")?;

    info!("Ensuring the module is tidy...");
    CommandSpec::new("cue")
        .args(["mod", "tidy"])
        .current_dir(&plugin_dir)
        .run()
        .await
        .context("Error ensuring the module is tidy")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no further publish attempt will be made");
            on_interrupt.cancel();
        }
    });

    info!("Publishing module...");
    let publish = CommandSpec::new("cue")
        .args(["mod", "publish", version.as_str()])
        .current_dir(&plugin_dir);
    let mut retrier = Retrier::new(config.publish.retry.clone())?
        .with_cancellation(cancel)
        .with_label("publishing the module");
    retrier
        .run(|| publish.run())
        .await
        .context("publish process failed")?;

    info!("CUE module {} published successfully", module);
    print_success(&format!("CUE module {} published successfully", module));
    Ok(())
}

pub async fn cmd_upload(root: &Path, tag: &str) -> Result<()> {
    let tag = parse_tag(tag)?;
    let plugin_dir = root.join(tag.plugin());

    // The manifest comes from an earlier CI job that built the plugin.
    let manifest = manifest::read(&plugin_dir)?;
    let archive = plugin_dir.join(manifest.archive_name(tag.version()));

    print_section_header("Uploading release archive", SectionStyle::Primary);
    print_key_value("Tag", tag.as_str());
    print_key_value("Archive", &archive.display().to_string());
    println!();

    CommandSpec::new("gh")
        .args(["release", "upload", tag.as_str()])
        .arg(archive.display().to_string())
        .run_captured()
        .await
        .with_context(|| format!("unable to upload archive {}", manifest.name))?;

    print_success(&format!("Uploaded {}", manifest.archive_name(tag.version())));
    Ok(())
}
