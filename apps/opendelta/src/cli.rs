//! Command line interface definition

use clap::{Parser, Subcommand};
use opendelta_types::Toggle;
use std::path::PathBuf;

/// opendelta - OTA update client configuration
#[derive(Parser)]
#[command(name = "opendelta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and adjust the OpenDelta update client configuration")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to the log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate build config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use alternate preferences file
    #[arg(long, global = true, value_name = "PATH")]
    pub prefs: Option<PathBuf>,

    /// Read device properties from build.prop files instead of getprop
    #[arg(long, global = true, value_name = "PATH")]
    pub props: Vec<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show device identity, resolved locators and security policy
    #[command(alias = "info")]
    Show,

    /// Show all user preferences
    Prefs,

    /// Show which settings controls are enabled
    Controls,

    /// Change a preference
    Set {
        /// Preference key, e.g. scheduler_mode
        key: String,

        /// New value in its stored form, e.g. 2 or 04:30 or true
        value: String,
    },

    /// Turn signature verification on or off
    SecureMode {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// List zips queued for flashing after the next update
    #[command(name = "flash-zips")]
    FlashZips,

    /// Delete downloaded files of the installed Android release
    Clean,
}
