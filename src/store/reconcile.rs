//! Turns status changes between two catalog snapshots into notices.
//!
//! A start notice is remembered per app id together with its verb, so the
//! matching success or failure notice uses the same wording even when the
//! `upgradeable` flag changed in between. The start notice is dismissed
//! before its outcome notice is raised.

use log::{debug, info};
use std::collections::HashMap;

use super::status::AppStatus;
use crate::api::models::App;
use crate::i18n::Catalog;
use crate::prompt::{CloseHandle, NoticeProps, Prompts, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Install,
    Upgrade,
    Uninstall,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Install => "install",
            Verb::Upgrade => "upgrade",
            Verb::Uninstall => "uninstall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started(Verb),
    Succeeded(Verb),
    Failed(Verb),
    Silent,
}

/// Classify a status change.
///
/// `pending` is the verb recorded when the app's current operation started;
/// it decides between install and upgrade wording for outcomes.
pub fn classify(prev: &App, next: &App, pending: Option<Verb>) -> Transition {
    let install_verb = match pending {
        Some(verb @ (Verb::Install | Verb::Upgrade)) => verb,
        _ => Verb::Install,
    };

    match (prev.status(), next.status()) {
        (before, after) if before == after => Transition::Silent,
        (_, AppStatus::Installing) => Transition::Started(if prev.upgradeable {
            Verb::Upgrade
        } else {
            Verb::Install
        }),
        (_, AppStatus::Uninstalling) => Transition::Started(Verb::Uninstall),
        (AppStatus::Installing, AppStatus::Installed) => Transition::Succeeded(install_verb),
        (AppStatus::Installing, AppStatus::Error) => Transition::Failed(install_verb),
        (AppStatus::Uninstalling, AppStatus::NotInstalled) => Transition::Succeeded(Verb::Uninstall),
        (AppStatus::Uninstalling, AppStatus::Error) => Transition::Failed(Verb::Uninstall),
        _ => Transition::Silent,
    }
}

struct Pending {
    handle: CloseHandle,
    verb: Verb,
}

/// Start-notice correlation, keyed by app id
#[derive(Default)]
pub struct Reconciler {
    pending: HashMap<String, Pending>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_verb(&self, id: &str) -> Option<Verb> {
        self.pending.get(id).map(|pending| pending.verb)
    }

    /// Compare two snapshots and raise one notice per classified status change.
    ///
    /// Apps missing from either side are skipped. Returns the non-silent
    /// transitions that were raised.
    pub fn reconcile(&mut self, prev: &[App], next: &[App], prompts: &Prompts, catalog: &Catalog) -> Vec<(String, Transition)> {
        let mut raised = Vec::new();

        for app in next {
            let Some(before) = prev.iter().find(|candidate| candidate.id == app.id) else {
                continue;
            };
            if before.status() == app.status() {
                continue;
            }

            let transition = classify(before, app, self.pending_verb(&app.id));
            debug!(
                "app '{}' {} -> {}: {:?}",
                app.id,
                before.status(),
                app.status(),
                transition
            );

            match transition {
                Transition::Started(verb) => {
                    if let Some(stale) = self.pending.remove(&app.id) {
                        stale.handle.close();
                    }
                    let handle = prompts.notice(start_notice(verb, app, catalog));
                    self.pending.insert(app.id.clone(), Pending { handle, verb });
                }
                Transition::Succeeded(verb) | Transition::Failed(verb) => {
                    let pending = self.pending.get(&app.id).map(|pending| pending.handle.clone());
                    if let Some(handle) = pending {
                        handle.close();
                    }
                    let succeeded = matches!(transition, Transition::Succeeded(_));
                    prompts.notice(outcome_notice(verb, succeeded, app, catalog));
                    self.pending.remove(&app.id);
                    info!(
                        "{} of '{}' {}",
                        verb.as_str(),
                        app.id,
                        if succeeded { "succeeded" } else { "failed" }
                    );
                }
                Transition::Silent => {
                    // a busy app left its busy state some other way
                    if !app.status().is_busy() {
                        if let Some(stale) = self.pending.remove(&app.id) {
                            stale.handle.close();
                        }
                    }
                    continue;
                }
            }
            raised.push((app.id.clone(), transition));
        }

        raised
    }
}

fn start_notice(verb: Verb, app: &App, catalog: &Catalog) -> NoticeProps {
    let args = [("app", app.name.as_str())];
    match verb {
        Verb::Install | Verb::Upgrade => NoticeProps::new(
            Tone::Info,
            catalog.t(&format!("install.{}_title", verb.as_str()), &[]),
        )
        .description(catalog.t(&format!("install.{}_starting", verb.as_str()), &args)),
        Verb::Uninstall => NoticeProps::new(Tone::Warning, catalog.t("uninstall.title", &[]))
            .description(catalog.t("uninstall.uninstall_starting", &args)),
    }
}

fn outcome_notice(verb: Verb, succeeded: bool, app: &App, catalog: &Catalog) -> NoticeProps {
    let args = [("app", app.name.as_str())];
    match (verb, succeeded) {
        (Verb::Install | Verb::Upgrade, true) => NoticeProps::new(
            Tone::Success,
            catalog.t(&format!("install.{}_title", verb.as_str()), &[]),
        )
        .description(catalog.t(&format!("install.{}_success", verb.as_str()), &args)),
        (Verb::Install | Verb::Upgrade, false) => NoticeProps::new(
            Tone::Error,
            catalog.t(&format!("install.{}_title", verb.as_str()), &[]),
        )
        .description(catalog.t(&format!("install.{}_failed", verb.as_str()), &args)),
        (Verb::Uninstall, true) => NoticeProps::new(Tone::Success, catalog.t("uninstall.success", &[]))
            .description(catalog.t("uninstall.success_description", &args)),
        (Verb::Uninstall, false) => NoticeProps::new(Tone::Error, catalog.t("uninstall.title", &[]))
            .description(catalog.t("uninstall.failed", &args)),
    }
}
