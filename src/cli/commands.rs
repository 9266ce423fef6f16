//! Command implementations

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::adapters::FfmpegBackend;
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::domain::model::{TrimEnd, TrimRequest, TrimResult};
use crate::engine::TrimEngine;
use crate::planner::{ExtractionPlan, SegmentMode};
use crate::utils::{logging, time};

/// Execute a trim (or a dry run) as described by `cli`
pub fn run(cli: Cli) -> Result<()> {
    let (config, env_overrides) = load_config(&cli)?;

    logging::init(&config.logging.level, config.logging.format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    if let Some(source) = &config.source {
        info!("Loaded configuration from {}", source.display());
    }
    for var in env_overrides {
        debug!("Environment override: {}", var);
    }

    let args = &cli.trim;
    let backend = Arc::new(FfmpegBackend::new(config.ffmpeg_settings()));
    let engine = TrimEngine::new(backend, config.engine_settings());
    let request = TrimRequest::new(
        args.input.clone(),
        args.output.clone(),
        args.start,
        args.end.unwrap_or(TrimEnd::ToEnd),
    );

    if args.dry_run {
        let plan = engine.plan(&request)?;
        return print_plan(&plan, args.json);
    }

    let result = engine.trim(&request)?;
    if result.actual_start.as_seconds() < request.start().as_seconds() {
        warn!(
            "Start moved back to keyframe at {}",
            time::precise(result.actual_start.as_seconds())
        );
    }
    print_result(&result, args.json)
}

/// Defaults, then file, then environment, then command line
fn load_config(cli: &Cli) -> Result<(AppConfig, Vec<&'static str>)> {
    let mut config =
        AppConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    let applied = config
        .apply_env_overrides(|key| std::env::var(key).ok())
        .context("Invalid environment override")?;

    let args = &cli.trim;
    if let Some(policy) = args.accuracy {
        config.trim.accuracy = policy;
    }
    if args.overwrite {
        config.trim.overwrite = true;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate().context("Invalid command line option")?;

    Ok((config, applied))
}

fn print_result(result: &TrimResult, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(result)
            .context("Failed to serialize trim result to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    println!(
        "Wrote {} ({} - {}, {}) using {}",
        result.output_path.display(),
        time::precise(result.actual_start.as_seconds()),
        time::precise(result.actual_end.as_seconds()),
        time::short(result.duration()),
        result.strategy
    );
    Ok(())
}

fn print_plan(plan: &ExtractionPlan, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(plan)
            .context("Failed to serialize extraction plan to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    println!("Input:    {}", plan.input.display());
    println!(
        "Range:    {} - {} ({})",
        time::precise(plan.actual_start),
        time::precise(plan.actual_end),
        time::short(plan.duration())
    );
    println!("Strategy: {}", plan.strategy);
    for segment in &plan.segments {
        let mode = match segment.mode {
            SegmentMode::Copy => "copy",
            SegmentMode::Reencode => "reencode",
        };
        println!(
            "  {:<8} {} - {}",
            mode,
            time::precise(segment.start),
            time::precise(segment.end)
        );
    }
    Ok(())
}
