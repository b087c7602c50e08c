//! Subtrans - windowed subtitle translation
//!
//! Entry point: parses the command line, sets up logging, loads the
//! configuration and dispatches to the workflow.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subtrans::cli::{parse_languages, Args, Commands, TuningArgs};
use subtrans::config::Config;
use subtrans::error::SubtransError;
use subtrans::translate::FileOutcome;
use subtrans::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new("config.toml").exists() {
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let _guard = setup_logging(args.verbose, &config.paths.log_dir)?;
    info!("Starting subtrans");

    match args.command {
        Commands::Translate { input_dir, output_dir, target_langs, tuning } => {
            apply_tuning(&mut config, &tuning);
            let languages = match target_langs {
                Some(value) => parse_languages(&value),
                None => vec![config.translate.target_language.clone()],
            };
            if languages.is_empty() {
                return Err(SubtransError::Config("No target language given".to_string()).into());
            }

            let workflow = Workflow::new(config)?;
            let summary = workflow.translate_directory(&input_dir, &output_dir, &languages).await?;

            println!(
                "Translated {} files, skipped {} existing, {} failed ({} rejected answers)",
                summary.translated,
                summary.skipped,
                summary.failed.len(),
                summary.rejected_attempts
            );
            for file in &summary.failed {
                warn!("Not translated: {}", file.display());
            }
        }
        Commands::File { input, output, target_lang, tuning } => {
            apply_tuning(&mut config, &tuning);
            if let Some(language) = target_lang {
                config.translate.target_language = language;
            }
            let language = config.translate.target_language.clone();

            let workflow = Workflow::new(config)?;
            match workflow.translate_single_file(&input, output, &language).await? {
                FileOutcome::Skipped => println!("Output already exists, skipped"),
                FileOutcome::Translated(report) => println!(
                    "Translated in {} windows ({} requests, {} rejected answers)",
                    report.windows,
                    report.requests,
                    report.failures.len()
                ),
            }
        }
        Commands::Split { dir, target_lang, max_width } => {
            if let Some(width) = max_width {
                config.split.max_width = width;
            }
            let language = target_lang.unwrap_or_else(|| config.translate.target_language.clone());

            let workflow = Workflow::new(config)?;
            let changed = workflow.split_directory(&dir, &language).await?;
            println!("Split lines in {} files", changed);
        }
        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                return Err(SubtransError::Config(format!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                ))
                .into());
            }
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    info!("subtrans completed successfully");
    Ok(())
}

fn apply_tuning(config: &mut Config, tuning: &TuningArgs) {
    let translate = &mut config.translate;
    if let Some(model) = &tuning.model {
        translate.model = model.clone();
    }
    if let Some(endpoint) = &tuning.endpoint {
        translate.endpoint = endpoint.clone();
    }
    if let Some(step_size) = tuning.step_size {
        translate.step_size = step_size;
    }
    if let Some(backtrack) = tuning.backtrack {
        translate.backtrack = backtrack;
    }
    if let Some(max_retries) = tuning.max_retries {
        translate.max_retries = max_retries;
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool, log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(log_dir, "subtrans.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subtrans.log").display());

    Ok(guard)
}
