//! Installation state machine.
//!
//! Statuses are only ever reported by the backend. The client decides which
//! user actions an app offers and rejects requests that would be refused
//! anyway, before any network call is made.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::version::{VersionOp, compare_versions, parse_requirement};
use crate::api::models::{App, Resources, localized};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    #[default]
    NotInstalled,
    Installing,
    Uninstalling,
    Installed,
    Error,
}

impl AppStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppStatus::NotInstalled => "not_installed",
            AppStatus::Installing => "installing",
            AppStatus::Uninstalling => "uninstalling",
            AppStatus::Installed => "installed",
            AppStatus::Error => "error",
        }
    }

    /// An operation is running on the server; only progress can be viewed
    pub fn is_busy(self) -> bool {
        matches!(self, AppStatus::Installing | AppStatus::Uninstalling)
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the user can ask for on an app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Install,
    Upgrade,
    Reinstall,
    Uninstall,
    ViewProgress,
}

impl UserAction {
    /// Catalog key of the action's label
    pub fn label_key(self) -> &'static str {
        match self {
            UserAction::Install => "app.install",
            UserAction::Upgrade => "app.upgrade",
            UserAction::Reinstall => "app.reinstall",
            UserAction::Uninstall => "app.uninstall",
            UserAction::ViewProgress => "app.view_progress",
        }
    }
}

/// Actions offered for an app in its current status
pub fn available_actions(app: &App) -> Vec<UserAction> {
    match app.status() {
        AppStatus::Installing | AppStatus::Uninstalling => vec![UserAction::ViewProgress],
        AppStatus::NotInstalled => vec![UserAction::Install],
        AppStatus::Error => vec![UserAction::Install],
        AppStatus::Installed if app.upgradeable => vec![UserAction::Upgrade, UserAction::Uninstall],
        AppStatus::Installed => vec![UserAction::Reinstall, UserAction::Uninstall],
    }
}

/// True iff installed and some available version is newer than the installed one
pub fn is_upgradeable(status: AppStatus, installed: &str, versions: &[String]) -> bool {
    status == AppStatus::Installed
        && versions
            .iter()
            .any(|version| compare_versions(version, installed).is_gt())
}

/// Version picked in the install form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionChoice {
    #[default]
    Latest,
    Exact(String),
}

impl VersionChoice {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "latest" => VersionChoice::Latest,
            version => VersionChoice::Exact(version.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VersionChoice::Latest => "latest",
            VersionChoice::Exact(version) => version,
        }
    }
}

/// Values submitted with an install or upgrade
#[derive(Debug, Clone, Default)]
pub struct InstallForm {
    pub version: VersionChoice,
    pub params: HashMap<String, Value>,
    pub resources: Option<Resources>,
}

/// Reasons an install is refused locally, before anything is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRejection {
    Busy { status: AppStatus },
    VersionTooLow { version: String, installed: String },
    UnknownVersion { version: String },
    UninstallRequired { installed: String, reason: String },
    MissingField { field: String },
    InvalidCpu { value: String },
    InvalidMemory { value: String },
}

impl InstallRejection {
    /// Translation key and arguments describing the rejection
    pub fn message(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            InstallRejection::Busy { status } => ("install.errors.busy", vec![("status", status.to_string())]),
            InstallRejection::VersionTooLow { version, installed } => (
                "install.version_too_low",
                vec![("version", version.clone()), ("installed_version", installed.clone())],
            ),
            InstallRejection::UnknownVersion { version } => {
                ("install.errors.unknown_version", vec![("version", version.clone())])
            }
            InstallRejection::UninstallRequired { installed, reason } if reason.is_empty() => {
                ("install.errors.uninstall_required", vec![("version", installed.clone())])
            }
            InstallRejection::UninstallRequired { installed, reason } => (
                "install.errors.uninstall_required_reason",
                vec![("version", installed.clone()), ("reason", reason.clone())],
            ),
            InstallRejection::MissingField { field } => {
                ("install.errors.field_required", vec![("field", field.clone())])
            }
            InstallRejection::InvalidCpu { value } => ("install.errors.cpu_invalid", vec![("value", value.clone())]),
            InstallRejection::InvalidMemory { value } => {
                ("install.errors.memory_invalid", vec![("value", value.clone())])
            }
        }
    }
}

impl fmt::Display for InstallRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (key, args) = self.message();
        let args = args
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} ({})", key, args)
    }
}

impl std::error::Error for InstallRejection {}

/// Check an install request against the app's current state.
///
/// `language` picks the display text of field labels and rule reasons.
pub fn validate_install(app: &App, form: &InstallForm, language: &str) -> Result<(), InstallRejection> {
    let status = app.status();
    if status.is_busy() {
        return Err(InstallRejection::Busy { status });
    }

    if let VersionChoice::Exact(version) = &form.version {
        if !app.versions.is_empty() && !app.versions.iter().any(|v| compare_versions(v, version).is_eq()) {
            return Err(InstallRejection::UnknownVersion {
                version: version.clone(),
            });
        }
        let installed = app.installed_version();
        if app.upgradeable && !installed.is_empty() && compare_versions(version, installed).is_lt() {
            return Err(InstallRejection::VersionTooLow {
                version: version.clone(),
                installed: installed.to_string(),
            });
        }
    }

    if let Some(reason) = required_uninstall(app, language) {
        return Err(InstallRejection::UninstallRequired {
            installed: app.installed_version().to_string(),
            reason,
        });
    }

    for field in app.fields.iter().filter(|field| field.required) {
        let present = form
            .params
            .get(&field.name)
            .is_some_and(|value| !is_blank(value));
        if !present {
            let label = localized(&field.label, language);
            return Err(InstallRejection::MissingField {
                field: if label.is_empty() { field.name.clone() } else { label },
            });
        }
    }

    if let Some(resources) = &form.resources {
        if !valid_cpu(&resources.cpu_limit) {
            return Err(InstallRejection::InvalidCpu {
                value: resources.cpu_limit.clone(),
            });
        }
        if !valid_memory(&resources.memory_limit) {
            return Err(InstallRejection::InvalidMemory {
                value: resources.memory_limit.clone(),
            });
        }
    }

    Ok(())
}

/// Reason of the first require-uninstall rule matched by the installed version
pub fn required_uninstall(app: &App, language: &str) -> Option<String> {
    let installed = app.installed_version();
    if app.status() != AppStatus::Installed || installed.is_empty() {
        return None;
    }

    app.require_uninstalls
        .iter()
        .find(|rule| {
            let (op, version) = match VersionOp::parse(&rule.operator) {
                Some(op) if !rule.operator.trim().is_empty() => (Some(op), rule.version.as_str()),
                _ => match parse_requirement(&rule.version) {
                    Some((op, version)) => (Some(op), version),
                    None => (None, rule.version.as_str()),
                },
            };
            op.is_some_and(|op| op.matches(compare_versions(installed, version)))
        })
        .map(|rule| localized(&rule.reason, language))
}

/// Only installed apps can be uninstalled
pub fn can_uninstall(app: &App) -> bool {
    app.status() == AppStatus::Installed
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn valid_cpu(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.parse::<f64>().is_ok_and(|cpu| cpu >= 0.0)
}

fn valid_memory(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    if value.is_empty() {
        return true;
    }
    let digits = value.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let unit = &value[digits.len()..];
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && matches!(unit, "" | "m" | "mb" | "g" | "gb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{FieldConfig, RequireUninstall};
    use serde_json::json;

    fn installed(version: &str, versions: &[&str]) -> App {
        let mut app = App {
            id: "nginx".into(),
            versions: versions.iter().map(|v| v.to_string()).collect(),
            ..App::default()
        };
        app.config.status = AppStatus::Installed;
        app.config.install_version = version.into();
        app.refresh_upgradeable();
        app
    }

    fn exact(version: &str) -> InstallForm {
        InstallForm {
            version: VersionChoice::Exact(version.into()),
            ..InstallForm::default()
        }
    }

    #[test]
    fn test_upgradeable_requires_newer_version() {
        assert!(installed("1.0.0", &["1.0.0", "1.2.0"]).upgradeable);
        assert!(!installed("1.0.0", &["1.0.0"]).upgradeable);
        assert!(!is_upgradeable(AppStatus::NotInstalled, "", &["1.0.0".into()]));
        assert!(!is_upgradeable(AppStatus::Error, "1.0.0", &["2.0.0".into()]));
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        let status: AppStatus = serde_json::from_value(json!("not_installed")).unwrap();
        assert_eq!(status, AppStatus::NotInstalled);
        assert_eq!(serde_json::to_value(AppStatus::Uninstalling).unwrap(), json!("uninstalling"));
    }

    #[test]
    fn test_busy_app_only_offers_progress() {
        let mut app = installed("1.0.0", &["1.0.0"]);
        app.config.status = AppStatus::Installing;
        assert_eq!(available_actions(&app), vec![UserAction::ViewProgress]);
        assert_eq!(
            validate_install(&app, &InstallForm::default(), "en"),
            Err(InstallRejection::Busy {
                status: AppStatus::Installing
            })
        );
    }

    #[test]
    fn test_actions_by_status() {
        assert_eq!(
            available_actions(&installed("1.0.0", &["1.0.0", "1.2.0"])),
            vec![UserAction::Upgrade, UserAction::Uninstall]
        );
        assert_eq!(available_actions(&App::default()), vec![UserAction::Install]);
    }

    #[test]
    fn test_action_labels_resolve() {
        let catalog = crate::i18n::Catalog::default();
        let actions = [
            UserAction::Install,
            UserAction::Upgrade,
            UserAction::Reinstall,
            UserAction::Uninstall,
            UserAction::ViewProgress,
        ];
        for action in actions {
            assert_ne!(catalog.t(action.label_key(), &[]), action.label_key());
        }
        assert_eq!(catalog.t(UserAction::ViewProgress.label_key(), &[]), "View progress");
    }

    #[test]
    fn test_version_too_low_rejected() {
        let app = installed("1.2.0", &["1.0.0", "1.2.0", "1.3.0"]);
        assert_eq!(
            validate_install(&app, &exact("1.0.0"), "en"),
            Err(InstallRejection::VersionTooLow {
                version: "1.0.0".into(),
                installed: "1.2.0".into()
            })
        );
        assert!(validate_install(&app, &exact("1.3.0"), "en").is_ok());
        assert!(validate_install(&app, &InstallForm::default(), "en").is_ok());
    }

    #[test]
    fn test_downgrade_allowed_when_not_upgradeable() {
        let app = installed("1.2.0", &["1.0.0", "1.2.0"]);
        assert!(validate_install(&app, &exact("1.0.0"), "en").is_ok());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let app = installed("1.0.0", &["1.0.0", "1.2.0"]);
        assert_eq!(
            validate_install(&app, &exact("9.9.9"), "en"),
            Err(InstallRejection::UnknownVersion {
                version: "9.9.9".into()
            })
        );
    }

    #[test]
    fn test_require_uninstall_rule() {
        let mut app = installed("1.0.0", &["1.0.0", "2.0.0"]);
        app.require_uninstalls = vec![RequireUninstall {
            version: "< 2.0.0".into(),
            operator: String::new(),
            reason: json!({ "en": "storage layout changed" }),
        }];
        assert_eq!(
            validate_install(&app, &InstallForm::default(), "en"),
            Err(InstallRejection::UninstallRequired {
                installed: "1.0.0".into(),
                reason: "storage layout changed".into()
            })
        );

        app.require_uninstalls[0].operator = "ge".into();
        app.require_uninstalls[0].version = "2.0.0".into();
        assert!(validate_install(&app, &InstallForm::default(), "en").is_ok());
    }

    #[test]
    fn test_required_field_must_be_filled() {
        let mut app = App::default();
        app.fields = vec![FieldConfig {
            name: "port".into(),
            label: json!("Port"),
            required: true,
            ..FieldConfig::default()
        }];

        let mut form = InstallForm::default();
        assert_eq!(
            validate_install(&app, &form, "en"),
            Err(InstallRejection::MissingField { field: "Port".into() })
        );

        form.params.insert("port".into(), json!("  "));
        assert!(validate_install(&app, &form, "en").is_err());

        form.params.insert("port".into(), json!(8080));
        assert!(validate_install(&app, &form, "en").is_ok());
    }

    #[test]
    fn test_resource_limits() {
        assert!(valid_cpu("0.5"));
        assert!(valid_cpu(""));
        assert!(!valid_cpu("-1"));
        assert!(!valid_cpu("two"));
        assert!(valid_memory("512"));
        assert!(valid_memory("512MB"));
        assert!(valid_memory("2g"));
        assert!(!valid_memory("2tb"));
        assert!(!valid_memory("mb"));
    }

    #[test]
    fn test_version_choice_parse() {
        assert_eq!(VersionChoice::parse("latest"), VersionChoice::Latest);
        assert_eq!(VersionChoice::parse(""), VersionChoice::Latest);
        assert_eq!(VersionChoice::parse("1.2.0"), VersionChoice::Exact("1.2.0".into()));
    }
}
