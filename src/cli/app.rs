use super::commands::catalog::ListArgs;
use super::commands::install::{InstallArgs, UninstallArgs};
use super::commands::settings::SettingsCommands;
use super::commands::watch::WatchArgs;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "appstore-cli")]
#[command(about = "Browse, install, upgrade and uninstall apps from an app store server")]
#[command(version)]
pub struct Cli {
    /// Server URL, overrides the configured one
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Bearer token, overrides the configured one
    #[arg(long, global = true, env = "APPSTORE_TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List apps in the catalog
    List(ListArgs),
    /// Show details of one app
    Show {
        /// App id
        id: String,
    },
    /// Install, reinstall or upgrade an app
    Install(InstallArgs),
    /// Uninstall an app
    Uninstall(UninstallArgs),
    /// Print the install or uninstall log of an app
    Log {
        /// App id
        id: String,
    },
    /// Refresh the server's catalog from upstream
    UpdateCatalog,
    /// Register an app from a package URL
    Download {
        /// Package URL
        url: String,
    },
    /// Follow running installs and uninstalls
    Watch(WatchArgs),
    /// Presentation preferences
    Settings(SettingsCommands),
}
