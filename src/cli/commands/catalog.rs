//! Catalog browsing commands

use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};
use colored::*;

use super::Session;
use crate::cli::render::{print_app_detail, print_app_row};
use crate::cli::ui::with_spinner;
use crate::store::{AppFilter, Scope};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum FilterArg {
    #[default]
    All,
    Installed,
    Upgradeable,
}

impl From<FilterArg> for Scope {
    fn from(filter: FilterArg) -> Self {
        match filter {
            FilterArg::All => Scope::All,
            FilterArg::Installed => Scope::Installed,
            FilterArg::Upgradeable => Scope::Upgradeable,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Which apps to show
    #[arg(short, long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,
    /// Only apps tagged with this category
    #[arg(short, long)]
    pub category: Option<String>,
    /// Keyword matched against name, description and tags
    #[arg(short, long)]
    pub search: Option<String>,
}

pub async fn list_command(session: &Session, args: ListArgs) -> Result<()> {
    let store = &session.store;
    with_spinner("Loading apps...", store.fetch_snapshot(false, None)).await?;

    let filter = AppFilter {
        scope: args.filter.into(),
        category: args.category,
        search: args.search,
    };
    let apps = store.filtered(&filter);

    println!();
    println!(
        "  {} {}",
        "Categories:".dimmed(),
        store.categories().join(" · ").bright_yellow()
    );
    println!();

    if apps.is_empty() {
        let key = if store.apps().is_empty() {
            "app.no_apps"
        } else {
            "app.no_apps_found"
        };
        println!("  {}", store.catalog().t(key, &[]).bright_yellow());
        return Ok(());
    }

    for app in &apps {
        print_app_row(app);
    }
    println!();
    println!("  {} {}", apps.len().to_string().bold(), "app(s)".dimmed());
    Ok(())
}

pub async fn show_command(session: &Session, id: &str) -> Result<()> {
    with_spinner("Loading apps...", session.store.fetch_snapshot(false, None)).await?;
    let app = session
        .store
        .app(id)
        .ok_or_else(|| anyhow!("App '{}' not found", id))?;
    print_app_detail(&app, session.store.catalog());
    Ok(())
}

pub async fn log_command(session: &Session, id: &str) -> Result<()> {
    let log = with_spinner("Fetching log...", session.store.fetch_log(id)).await?;
    if log.trim().is_empty() {
        println!("{}", session.store.catalog().t("app.no_log", &[]).dimmed());
    } else {
        println!("{}", log);
    }
    Ok(())
}

pub async fn update_catalog_command(session: &Session) -> Result<()> {
    session.store.update_catalog().await
}

pub async fn download_command(session: &Session, url: &str) -> Result<()> {
    let app = session.store.install_from_url(url).await?;
    print_app_detail(&app, session.store.catalog());
    println!();
    println!(
        "  {} {}",
        "Install it with:".dimmed(),
        format!("appstore-cli install {}", app.id).cyan()
    );
    Ok(())
}
