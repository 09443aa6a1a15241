use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

use crate::config::{Config, Theme};
use crate::i18n::SUPPORTED_LANGUAGES;

#[derive(Args)]
pub struct SettingsCommands {
    #[command(subcommand)]
    pub command: SettingsSubcommands,
}

#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show current settings
    Show,
    /// Set the color theme (light or dark)
    Theme {
        /// Theme name
        value: Theme,
    },
    /// Set the display language
    Language {
        /// One of de, en, fr, id, ja, ko, ru, zh-CHT, zh
        value: String,
    },
}

pub fn settings_command(settings: SettingsCommands, mut config: Config) -> Result<()> {
    match settings.command {
        SettingsSubcommands::Show => {
            println!();
            println!("  {}", "Settings".bright_blue().bold());
            println!("    {}: {}", "Server".dimmed(), config.server.base_url.cyan());
            println!(
                "    {}: {}",
                "Token".dimmed(),
                if config.server.token.is_some() { "set" } else { "not set" }
            );
            println!("    {}: {}s", "Poll interval".dimmed(), config.poll.interval_secs);
            println!("    {}: {}", "Theme".dimmed(), config.preferences.theme.to_string().bright_yellow());
            println!("    {}: {}", "Language".dimmed(), config.preferences.language.bright_yellow());
            println!(
                "    {}: {}",
                "Available languages".dimmed(),
                SUPPORTED_LANGUAGES.join(", ").dimmed()
            );
        }
        SettingsSubcommands::Theme { value } => {
            config.set_theme(value)?;
            println!("{} {}", "✓ Theme set to".bright_green(), value.to_string().bold());
        }
        SettingsSubcommands::Language { value } => {
            config.set_language(&value)?;
            println!("{} {}", "✓ Language set to".bright_green(), value.bold());
        }
    }
    Ok(())
}
