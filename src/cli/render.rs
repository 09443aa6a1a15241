//! Terminal rendering of overlays and catalog listings

use colored::*;

use crate::api::models::App;
use crate::prompt::{AlertKind, AlertProps, EventBus, NoticeProps, PromptEvent, Subscription, ToastProps, Tone};
use crate::i18n::Catalog;
use crate::store::AppStatus;
use crate::store::status::available_actions;

/// Prints every overlay raised on the bus while alive
pub struct OverlayPrinter {
    _subscriptions: Vec<Subscription>,
}

impl OverlayPrinter {
    pub fn attach(bus: &EventBus<PromptEvent>) -> Self {
        let subscriptions = ["alert", "notice", "toast"]
            .into_iter()
            .map(|topic| {
                bus.subscribe(topic, |event: &PromptEvent| {
                    if !event.is_closing() {
                        print_event(event);
                    }
                })
            })
            .collect();
        Self {
            _subscriptions: subscriptions,
        }
    }
}

fn print_event(event: &PromptEvent) {
    match event {
        PromptEvent::Alert(props) => print_alert(props),
        PromptEvent::Notice(props) => print_notice(props),
        PromptEvent::Toast(props) => print_toast(props),
    }
}

fn tone_marker(tone: Tone) -> ColoredString {
    match tone {
        Tone::Success => "✓".bright_green().bold(),
        Tone::Warning => "⚠".bright_yellow().bold(),
        Tone::Error => "✗".bright_red().bold(),
        Tone::Info => "ℹ".bright_blue().bold(),
        Tone::Text => "•".dimmed(),
    }
}

fn print_alert(props: &AlertProps) {
    let title = match props.kind {
        AlertKind::Success => props.title.bright_green().bold(),
        AlertKind::Warning => props.title.bright_yellow().bold(),
        AlertKind::Error => props.title.bright_red().bold(),
        AlertKind::Prompt | AlertKind::Close => props.title.bright_white().bold(),
    };
    println!();
    println!("  {}", title);
    if let Some(description) = &props.description {
        println!("  {}", description);
    }
}

fn print_notice(props: &NoticeProps) {
    match &props.description {
        Some(description) => println!(
            "{} {} {}",
            tone_marker(props.tone),
            props.title.bold(),
            description.dimmed()
        ),
        None => println!("{} {}", tone_marker(props.tone), props.title.bold()),
    }
}

fn print_toast(props: &ToastProps) {
    println!("{} {}", tone_marker(props.tone.unwrap_or_default()), props.content);
}

pub fn status_label(status: AppStatus) -> ColoredString {
    match status {
        AppStatus::Installed => "installed".bright_green(),
        AppStatus::Installing => "installing".bright_blue(),
        AppStatus::Uninstalling => "uninstalling".bright_yellow(),
        AppStatus::Error => "error".bright_red(),
        AppStatus::NotInstalled => "not installed".dimmed(),
    }
}

pub fn print_app_row(app: &App) {
    let version = if app.installed_version().is_empty() {
        app.latest_version().unwrap_or("-").to_string()
    } else {
        app.installed_version().to_string()
    };
    let upgrade = if app.upgradeable {
        format!(" → {}", app.latest_version().unwrap_or_default()).bright_cyan().to_string()
    } else {
        String::new()
    };

    println!(
        "  {:<24} {:<16} {:<14}{}",
        app.name.bright_white().bold(),
        app.id.dimmed(),
        status_label(app.status()),
        format!("{}{}", version, upgrade)
    );
}

pub fn print_app_detail(app: &App, catalog: &Catalog) {
    println!();
    println!("  {} {}", app.name.bright_white().bold(), format!("({})", app.id).dimmed());
    if !app.description.is_empty() {
        println!("  {}", app.description);
    }
    println!("    {}: {}", "Status".dimmed(), status_label(app.status()));
    if !app.installed_version().is_empty() {
        let installed = app.installed_version().cyan();
        if app.upgradeable {
            println!(
                "    {}: {} {}",
                catalog.t("app.installed", &[]).dimmed(),
                installed,
                format!("({})", catalog.t("app.upgradeable", &[])).yellow()
            );
        } else {
            println!("    {}: {}", catalog.t("app.installed", &[]).dimmed(), installed);
        }
    }
    if !app.versions.is_empty() {
        println!("    {}: {}", "Versions".dimmed(), app.versions.join(", "));
    }
    if !app.tags.is_empty() {
        println!("    {}: {}", "Tags".dimmed(), app.tags.join(", ").bright_yellow());
    }
    let actions = available_actions(app)
        .into_iter()
        .map(|action| catalog.t(action.label_key(), &[]))
        .collect::<Vec<_>>()
        .join(", ");
    println!("    {}: {}", "Actions".dimmed(), actions.green());
}
