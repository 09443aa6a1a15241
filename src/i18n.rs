//! Message catalog for user-facing text.
//!
//! Templates use `{name}` placeholders. Lookups of unknown keys return the
//! key itself so a missing entry is visible instead of fatal.

use std::collections::HashMap;

pub const SUPPORTED_LANGUAGES: [&str; 9] = ["de", "en", "fr", "id", "ja", "ko", "ru", "zh-CHT", "zh"];
pub const DEFAULT_LANGUAGE: &str = "en";

const EN: &[(&str, &str)] = &[
    ("common.title", "Notice"),
    ("common.unknown_error", "Unknown error"),
    ("app.err_list", "Failed to load the app list"),
    ("app.no_apps", "No apps available"),
    ("app.no_apps_found", "No apps match your search"),
    ("app.no_log", "No log output yet"),
    ("app.install", "Install"),
    ("app.upgrade", "Upgrade"),
    ("app.reinstall", "Reinstall"),
    ("app.uninstall", "Uninstall"),
    ("app.view_progress", "View progress"),
    ("app.installed", "Installed"),
    ("app.upgradeable", "Upgradeable"),
    ("install.install_title", "Install"),
    ("install.upgrade_title", "Upgrade"),
    ("install.install_starting", "Installing {app}..."),
    ("install.upgrade_starting", "Upgrading {app}..."),
    ("install.install_success", "{app} was installed"),
    ("install.upgrade_success", "{app} was upgraded"),
    ("install.install_failed", "Failed to install {app}"),
    ("install.upgrade_failed", "Failed to upgrade {app}"),
    ("install.failure", "Install failed"),
    ("install.failure_description", "Install request failed: {error}"),
    ("install.version_too_low", "Version {version} is older than the installed version {installed_version}"),
    ("install.errors.busy", "Another operation is in progress ({status})"),
    ("install.errors.unknown_version", "Version {version} is not available"),
    ("install.errors.uninstall_required", "Installed version {version} must be uninstalled before upgrading"),
    (
        "install.errors.uninstall_required_reason",
        "Installed version {version} must be uninstalled before upgrading: {reason}",
    ),
    ("install.errors.field_required", "{field} is required"),
    ("install.errors.cpu_invalid", "Invalid CPU limit: {value}"),
    ("install.errors.memory_invalid", "Invalid memory limit: {value}"),
    ("install.install_from_url", "Install from URL"),
    ("install.install_from_url_failed", "Failed to download the app: {error}"),
    ("install.updating_app_list", "Updating the app list..."),
    ("install.update_app_list_success", "The app list is up to date"),
    ("install.update_app_list_failure", "Failed to update the app list"),
    ("install.update_app_list_failure_description", "Update failed: {error}"),
    ("uninstall.title", "Uninstall"),
    ("uninstall.description", "Uninstall {app}? Its containers and data will be removed."),
    ("uninstall.uninstall_starting", "Uninstalling {app}..."),
    ("uninstall.success", "Uninstalled"),
    ("uninstall.success_description", "{app} was uninstalled"),
    ("uninstall.failed", "Failed to uninstall {app}"),
    ("uninstall.error", "Uninstall failed"),
    ("uninstall.error_description", "Uninstall request failed: {error}"),
    ("uninstall.not_installed", "{app} is not installed"),
];

/// Lookup table for one language
#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    entries: HashMap<&'static str, &'static str>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl Catalog {
    /// Only English text is bundled; other supported languages use it too
    /// while the server localizes its own messages from the `Language` header.
    pub fn new(language: &str) -> Self {
        Self {
            language: normalize_language(language).to_string(),
            entries: EN.iter().copied().collect(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn t(&self, key: &str, args: &[(&str, &str)]) -> String {
        let template = self.entries.get(key).copied().unwrap_or(key);
        interpolate(template, args)
    }

    /// Same as [`Catalog::t`] for owned argument values
    pub fn t_owned(&self, key: &str, args: &[(&'static str, String)]) -> String {
        let args: Vec<(&str, &str)> = args.iter().map(|(name, value)| (*name, value.as_str())).collect();
        self.t(key, &args)
    }
}

pub fn is_supported(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

/// Unsupported languages fall back to English
pub fn normalize_language(language: &str) -> &str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|supported| **supported == language)
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}

fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}
