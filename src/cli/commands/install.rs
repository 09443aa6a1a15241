//! Install and uninstall commands

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Session;
use super::watch::follow_until_idle;
use crate::api::models::Resources;
use crate::cli::ui::with_spinner;
use crate::store::{InstallForm, InstallOutcome, VersionChoice};

#[derive(Args)]
pub struct InstallArgs {
    /// App id
    pub id: String,
    /// Version to install, or "latest"
    #[arg(short, long, default_value = "latest")]
    pub version: String,
    /// Install parameter as key=value, repeatable
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,
    /// CPU limit in cores, 0 for unlimited
    #[arg(long)]
    pub cpu: Option<String>,
    /// Memory limit such as 512m or 2g, 0 for unlimited
    #[arg(long)]
    pub memory: Option<String>,
    /// Keep running until the install finishes
    #[arg(short, long)]
    pub wait: bool,
}

#[derive(Args)]
pub struct UninstallArgs {
    /// App id
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
    /// Keep running until the uninstall finishes
    #[arg(short, long)]
    pub wait: bool,
}

/// Parse `key=value`; values that are valid JSON keep their type
fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid parameter '{}', expected key=value", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid parameter '{}', key is empty", raw);
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub async fn install_command(session: &Session, args: InstallArgs) -> Result<()> {
    let store = &session.store;
    with_spinner("Loading apps...", store.fetch_snapshot(false, None)).await?;

    let app = store
        .app(&args.id)
        .with_context(|| format!("App '{}' not found", args.id))?;

    // unspecified params fall back to the app's declared defaults
    let mut params: HashMap<String, Value> = app
        .fields
        .iter()
        .filter(|field| !field.default.is_null())
        .map(|field| (field.name.clone(), field.default.clone()))
        .collect();
    params.extend(args.params);

    let resources = match (args.cpu, args.memory) {
        (None, None) => None,
        (cpu, memory) => Some(Resources {
            cpu_limit: cpu.unwrap_or_else(|| app.config.resources.cpu_limit.clone()),
            memory_limit: memory.unwrap_or_else(|| app.config.resources.memory_limit.clone()),
        }),
    };

    let form = InstallForm {
        version: VersionChoice::parse(&args.version),
        params,
        resources,
    };

    match store.install(&args.id, form).await? {
        InstallOutcome::Submitted => {
            println!(
                "{} {}",
                "✓ Install request accepted for".bright_green(),
                app.name.bright_white().bold()
            );
            if args.wait {
                follow_until_idle(session).await?;
            }
            Ok(())
        }
        InstallOutcome::Rejected(rejection) => {
            debug!("install rejected locally: {:?}", rejection);
            bail!("Install of '{}' was not submitted", args.id)
        }
    }
}

pub async fn uninstall_command(session: &Session, args: UninstallArgs) -> Result<()> {
    let store = &session.store;
    with_spinner("Loading apps...", store.fetch_snapshot(false, None)).await?;

    let handle = store.confirm_uninstall(&args.id)?;
    let confirmed = args.yes || ask_yes_no("Uninstall? [y/N] ").await?;
    if !confirmed {
        session.host.alerts.cancel(handle.id());
        println!("{}", "Uninstall cancelled".dimmed());
        return Ok(());
    }

    session.host.alerts.confirm(handle.id(), None).await?;
    println!("{}", "✓ Uninstall request accepted".bright_green());
    if args.wait {
        follow_until_idle(session).await?;
    }
    Ok(())
}

async fn ask_yes_no(question: &str) -> Result<bool> {
    print!("{}", question.bright_white().bold());
    std::io::Write::flush(&mut std::io::stdout()).context("Failed to flush stdout")?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read answer")?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param_keeps_json_types() {
        assert_eq!(parse_param("port=8080").unwrap(), ("port".to_string(), json!(8080)));
        assert_eq!(parse_param("debug=true").unwrap(), ("debug".to_string(), json!(true)));
        assert_eq!(parse_param("name=web").unwrap(), ("name".to_string(), json!("web")));
        assert_eq!(parse_param("dsn=a=b").unwrap(), ("dsn".to_string(), json!("a=b")));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
    }
}
