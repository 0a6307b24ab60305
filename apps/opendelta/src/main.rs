//! opendelta - OTA update client configuration
//!
//! Command line front end over the configuration core: shows what the
//! update engine would resolve on this device and edits the user's
//! preferences in place.

mod cli;
mod display;
mod error;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::{CommandOutput, Overview, OutputRenderer};
use crate::error::CliError;
use clap::Parser;
use opendelta_config::{keys, parse_flag, BuildConfig, Config, SecuritySummary};
use opendelta_types::Toggle;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli) {
        error!("Application error: {}", e);
        if json_mode {
            println!("{}", e.to_json());
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting opendelta v{}", env!("CARGO_PKG_VERSION"));

    // 1. File config (or defaults)
    let mut build = BuildConfig::load_or_default(cli.global.config.as_deref())?;

    // 2. Environment variables
    build.merge_env()?;

    // 3. CLI flags (highest precedence)
    apply_cli_config(&mut build, &cli.global);

    let config = Config::open(build)?;
    let renderer = OutputRenderer::new(cli.global.json);

    let result = execute_command(cli.command, &config)?;
    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

fn apply_cli_config(build: &mut BuildConfig, global: &GlobalArgs) {
    if let Some(prefs) = &global.prefs {
        build.paths.preferences = Some(prefs.clone());
    }
    if !global.props.is_empty() {
        build.paths.props_files.clone_from(&global.props);
    }
}

fn execute_command(command: Commands, config: &Config) -> Result<CommandOutput, CliError> {
    let output = match command {
        Commands::Show => CommandOutput::Overview(Box::new(Overview {
            identity: config.identity().clone(),
            official: config.is_official_version(),
            keep_screen_on: config.keep_screen_on(),
            locators: config.locators().clone(),
            security: SecuritySummary::from(config.security()),
        })),

        Commands::Prefs => CommandOutput::Preferences(config.preferences().snapshot()),

        Commands::Controls => CommandOutput::Controls(config.controls()),

        // Same path as `secure-mode` so the recovery warnings are recorded
        Commands::Set { key, value } if key == keys::SECURE_MODE => {
            secure_mode(config, Toggle::from(parse_flag(&key, &value)?))?
        }

        Commands::Set { key, value } => {
            config.set_preference(&key, &value)?;
            let mut message = format!("{key} updated");
            if key == keys::FILE_FLASH
                && config.preferences().file_flash()
                && config.preferences().acknowledge_file_flash_hint()?
            {
                message.push_str(&format!(
                    "\nZips placed in {} are flashed after every update.",
                    config.locators().path_flash_after_update
                ));
            }
            CommandOutput::Success(message)
        }

        Commands::SecureMode { state } => secure_mode(config, state)?,

        Commands::FlashZips => CommandOutput::FlashZips(config.flash_after_update_zips()),

        Commands::Clean => CommandOutput::Cleaned {
            deleted: config.clean_files()?,
        },
    };
    Ok(output)
}

fn secure_mode(config: &Config, state: Toggle) -> Result<CommandOutput, CliError> {
    let security = config.security();
    let prefs = config.preferences();
    let effective = security.set_policy(state.is_on())?;

    if state.is_on() && !effective {
        return Ok(CommandOutput::Success(
            "Secure mode is not available on this build, it stays off.".to_string(),
        ));
    }

    let mut message = format!("Secure mode {}", Toggle::from(effective));
    if effective && !prefs.shown_recovery_warning_secure() {
        message.push_str(
            "\nRecovery must trust the injected signature keys, otherwise updates will fail to install.",
        );
        prefs.set_shown_recovery_warning_secure()?;
    } else if !effective && !prefs.shown_recovery_warning_not_secure() {
        message.push_str("\nRecovery will install updates without verifying their signature.");
        prefs.set_shown_recovery_warning_not_secure()?;
    }
    Ok(CommandOutput::Success(message))
}

fn log_dir() -> Option<std::path::PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("opendelta").join("logs"))
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let debug_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("info,opendelta=debug,opendelta_config=debug")
        })
    };

    let log_file = if debug_enabled {
        log_dir().and_then(|dir| {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                if !json_mode {
                    eprintln!("Warning: Failed to create log directory: {e}");
                }
                return None;
            }
            let path = dir.join(format!(
                "opendelta-{}.log",
                chrono::Utc::now().format("%Y%m%d-%H%M%S")
            ));
            std::fs::File::create(&path).ok().map(|file| (path, file))
        })
    } else {
        None
    };

    if let Some((path, file)) = log_file {
        // Debug mode: structured JSON logs to file
        tracing_subscriber::fmt()
            .json()
            .with_writer(file)
            .with_env_filter(debug_filter())
            .init();
        if !json_mode {
            eprintln!("Debug logging enabled: {}", path.display());
        }
    } else if json_mode {
        // Keep stdout clean for the JSON document
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        // Log file unavailable, fall back to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(debug_filter())
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,opendelta=warn,opendelta_config=warn")
                }),
            )
            .init();
    }
}
