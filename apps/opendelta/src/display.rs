//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use opendelta_config::{Controls, PreferenceSnapshot, ResolvedLocators, SecuritySummary};
use opendelta_types::DeviceIdentity;
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Identity, locators and policy of the running device
#[derive(Debug, Serialize)]
pub struct Overview {
    pub identity: DeviceIdentity,
    pub official: bool,
    pub keep_screen_on: bool,
    pub locators: ResolvedLocators,
    pub security: SecuritySummary,
}

/// Result of a command
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CommandOutput {
    Overview(Box<Overview>),
    Preferences(PreferenceSnapshot),
    Controls(Controls),
    FlashZips(Vec<PathBuf>),
    Cleaned { deleted: usize },
    Success(String),
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    term: Term,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self {
            json_output,
            term: Term::stdout(),
        }
    }

    pub fn render_result(&self, result: &CommandOutput) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandOutput::Overview(overview) => self.render_overview(overview),
            CommandOutput::Preferences(prefs) => self.render_preferences(prefs),
            CommandOutput::Controls(controls) => self.render_controls(controls),
            CommandOutput::FlashZips(zips) => self.render_flash_zips(zips),
            CommandOutput::Cleaned { deleted } => {
                println!("Deleted {deleted} file(s), download state cleared.");
                Ok(())
            }
            CommandOutput::Success(message) => {
                println!("{message}");
                Ok(())
            }
        }
    }

    fn render_overview(&self, overview: &Overview) -> io::Result<()> {
        let identity = &overview.identity;
        let locators = &overview.locators;
        let security = &overview.security;

        let rows: Vec<(&str, String)> = vec![
            ("Version", or_dash(&identity.property_version)),
            ("Device", or_dash(&identity.property_device)),
            ("Android", or_dash(&identity.android_version)),
            ("A/B device", yes_no(identity.ab_update)),
            ("Official build", yes_no(overview.official)),
            ("Keep screen on", yes_no(overview.keep_screen_on)),
            ("File name", locators.filename_base.clone()),
            ("File prefix", locators.filename_base_prefix.clone()),
            ("Storage", locators.path_base.clone()),
            ("Flash after update", locators.path_flash_after_update.clone()),
            ("Delta URL", locators.url_base_delta.clone()),
            ("Update URL", locators.url_base_update.clone()),
            ("Full URL", locators.url_base_full.clone()),
            ("Full sum URL", locators.url_base_full_sum.clone()),
            ("JSON URL", locators.url_base_json.clone()),
            ("URL suffix", or_dash(&locators.url_suffix)),
            ("Apply signature", yes_no(security.apply_signature)),
            ("Secure mode available", yes_no(security.secure_mode_available)),
            ("Secure mode", on_off(security.secure_mode_current)),
            ("Inject signature", yes_no(security.inject_signature)),
        ];

        let mut table = self.new_table(["Setting", "Value"]);
        for (name, value) in rows {
            table.add_row(vec![Cell::new(name), Cell::new(value)]);
        }
        println!("{table}");
        Ok(())
    }

    fn render_preferences(&self, prefs: &PreferenceSnapshot) -> io::Result<()> {
        let rows: Vec<(&str, String)> = vec![
            (
                "auto_download_actions",
                format!("{} ({})", prefs.auto_download, prefs.auto_download.label()),
            ),
            (
                "scheduler_mode",
                format!("{} ({})", prefs.scheduler_mode, prefs.scheduler_mode.label()),
            ),
            ("scheduler_daily_time", prefs.scheduler_daily_time.to_string()),
            (
                "scheduler_week_day",
                format!(
                    "{} ({})",
                    prefs.scheduler_week_day,
                    prefs.scheduler_week_day.weekday()
                ),
            ),
            ("battery_level_string", format!("{}%", prefs.battery_level)),
            ("charge_only", prefs.charge_only.to_string()),
            ("auto_update_metered_networks", prefs.metered_networks.to_string()),
            ("ab_perf_mode", prefs.ab_perf_mode.to_string()),
            ("file_flash", prefs.file_flash.to_string()),
            ("show_info", prefs.show_info.to_string()),
        ];

        let mut table = self.new_table(["Preference", "Value"]);
        for (name, value) in rows {
            table.add_row(vec![Cell::new(name), Cell::new(value)]);
        }
        println!("{table}");
        Ok(())
    }

    fn render_controls(&self, controls: &Controls) -> io::Result<()> {
        let mut table = self.new_table(["Control", "State"]);
        for state in controls.iter() {
            let cell = if state.enabled {
                Cell::new("enabled").fg(Color::Green)
            } else {
                Cell::new("disabled").fg(Color::DarkGrey)
            };
            table.add_row(vec![Cell::new(state.control), cell]);
        }
        println!("{table}");
        Ok(())
    }

    fn render_flash_zips(&self, zips: &[PathBuf]) -> io::Result<()> {
        if zips.is_empty() {
            println!("No zips queued for flashing.");
            return Ok(());
        }
        let style = if self.supports_color() {
            Style::new().cyan()
        } else {
            Style::new()
        };
        for zip in zips {
            println!("{}", style.apply_to(zip.display()));
        }
        Ok(())
    }

    fn new_table<const N: usize>(&self, headers: [&str; N]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                headers
                    .into_iter()
                    .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
            );
        if !self.supports_color() {
            table.force_no_tty();
        }
        table
    }

    fn supports_color(&self) -> bool {
        self.term.features().colors_supported()
    }
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

fn on_off(value: bool) -> String {
    if value { "on" } else { "off" }.to_string()
}
