//! Command handlers; each returns the process exit code

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use super::commands::{BuildArgs, ConfigArgs, InspectArgs};
use super::output::OutputFormatter;
use crate::config::GeneratorConfig;
use crate::extractors::{DeploymentIntent, Extractor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::overrides::{CloudToml, CLOUD_TOML};
use crate::pipeline::{BuildContext, BuildOrchestrator, Instructions};
use crate::progress::LoggingHandler;
use crate::syntax::ModulePart;

pub fn handle_build(args: &BuildArgs, quiet: bool) -> i32 {
    if !quiet {
        println!("Generating artifacts...");
    }
    match run_build(args) {
        Ok(instructions) => {
            print!("{}", instructions);
            0
        }
        Err(e) => {
            error!("Build failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

pub fn handle_inspect(args: &InspectArgs) -> i32 {
    let result = extract_intent(&RealFileSystem::new(), &args.syntax_tree).and_then(|intent| {
        OutputFormatter::new(args.format.into()).format(&intent)
    });
    match result {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = GeneratorConfig::default();
    match OutputFormatter::new(args.format.into()).format_config(&config) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_build(args: &BuildArgs) -> Result<Instructions> {
    let config = resolve_config(args);
    config.validate().context("Invalid configuration")?;
    let mode = config.mode()?;
    debug!("Effective configuration:\n{}", config);

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let intent = extract_intent(fs.as_ref(), &args.syntax_tree)?;
    let overrides = load_overrides(fs.as_ref(), args)?;

    let mut context = BuildContext::new(
        Arc::clone(&fs),
        args.artifact.clone(),
        config.output_dir.clone(),
        overrides,
    );
    let orchestrator = BuildOrchestrator::new(mode)
        .with_base_image(config.base_image.clone())
        .with_progress(Arc::new(LoggingHandler));

    let instructions = orchestrator
        .execute(&intent, &mut context)
        .with_context(|| format!("Failed to generate artifacts for {}", args.artifact.display()))?;
    info!(
        output = %config.output_dir.display(),
        "Artifacts generated"
    );
    Ok(instructions)
}

/// Environment configuration with command-line flags applied on top
fn resolve_config(args: &BuildArgs) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(cloud) = &args.cloud {
        config.cloud = cloud.to_lowercase();
    }
    if let Some(base_image) = &args.base_image {
        config.base_image = base_image.clone();
    }
    config
}

fn extract_intent(fs: &dyn FileSystem, syntax_tree: &Path) -> Result<DeploymentIntent> {
    let module = ModulePart::load(fs, syntax_tree)?;
    Ok(Extractor::new().extract(&module))
}

/// An explicit path must exist; the implicit one is optional
fn load_overrides(fs: &dyn FileSystem, args: &BuildArgs) -> Result<Option<CloudToml>> {
    let path = match &args.cloud_toml {
        Some(path) => path.clone(),
        None => {
            let implicit = default_cloud_toml(&args.syntax_tree);
            if !fs.is_file(&implicit) {
                debug!(path = %implicit.display(), "No Cloud.toml found");
                return Ok(None);
            }
            implicit
        }
    };
    info!(path = %path.display(), "Loading overrides");
    Ok(Some(CloudToml::load(fs, &path)?))
}

fn default_cloud_toml(syntax_tree: &Path) -> PathBuf {
    syntax_tree
        .parent()
        .map(|dir| dir.join(CLOUD_TOML))
        .unwrap_or_else(|| PathBuf::from(CLOUD_TOML))
}
