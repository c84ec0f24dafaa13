//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// File written by `edge config init`.
const DEFAULT_CONFIG_FILE: &str = "edge-bench.toml";

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("source", &path.display().to_string()),
        None => ctx.output.kv("source", "(defaults)"),
    }

    let responder = &ctx.config.responder;
    ctx.output.info("");
    ctx.output.kv("runtime", &responder.runtime);
    ctx.output.kv("message", &responder.message);
    ctx.output.kv("temp_dir", &responder.temp_dir().display().to_string());

    ctx.output.info("");
    ctx.output.info("[defaults]");
    ctx.output.kv("iterations", &responder.defaults.iterations.to_string());
    ctx.output.kv("size_kb", &responder.defaults.size_kb.to_string());
    ctx.output.kv("delay_ms", &responder.defaults.delay_ms.to_string());

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", &responder.logging.level);
    ctx.output.kv("format", &responder.logging.format);

    ctx.output.info("");
    ctx.output.info("[serve]");
    ctx.output.kv("addr", &ctx.config.serve.addr);
    ctx.output.kv("route", &ctx.config.serve.route);

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", config_path.display()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !overwrite {
            ctx.output.info("Keeping existing configuration");
            return Ok(());
        }
    }

    let content = generate_default_config(&ctx.config.responder.runtime);
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let errors = ctx.config.problems();
    let mut warnings: Vec<String> = Vec::new();

    if ctx.config_path.is_none() {
        warnings.push("No config file found, using defaults".to_string());
    }
    let defaults = &ctx.config.responder.defaults;
    if defaults.iterations < 0 || defaults.size_kb < 0 || defaults.delay_ms < 0 {
        warnings.push("Negative defaults are treated as zero by the workloads".to_string());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }

    Ok(())
}
