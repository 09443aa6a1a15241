//! User-initiated operations on the catalog.
//!
//! Each flow validates locally first, then calls the backend and reports
//! failures with an alert or notice. Status changes caused by a flow are
//! never applied optimistically; they arrive through the next fetch.

use anyhow::{Result, anyhow, bail};
use log::{info, warn};
use std::sync::Arc;

use super::app_store::AppStore;
use super::status::{InstallForm, InstallRejection, can_uninstall, validate_install};
use crate::api::models::{App, InstallRequest};
use crate::prompt::{AlertKind, AlertProps, CloseHandle, NoticeProps, Tone};

/// Result of an install submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Accepted by the server; progress is reported by reconciliation
    Submitted,
    /// Refused locally, nothing was sent
    Rejected(InstallRejection),
}

impl AppStore {
    fn find(&self, id: &str) -> Result<App> {
        self.app(id).ok_or_else(|| anyhow!("App '{}' not found", id))
    }

    fn unknown_error(&self, error: &anyhow::Error) -> String {
        let message = error.to_string();
        if message.is_empty() {
            self.catalog.t("common.unknown_error", &[])
        } else {
            message
        }
    }

    fn warn_alert(&self, title: String, description: String) {
        self.prompts.alert(
            AlertProps::new(AlertKind::Warning, title)
                .description(description)
                .show_cancel(false),
        );
    }

    /// Install, reinstall or upgrade an app
    pub async fn install(&self, id: &str, form: InstallForm) -> Result<InstallOutcome> {
        let app = self.find(id)?;
        let title_key = if app.upgradeable {
            "install.upgrade_title"
        } else {
            "install.install_title"
        };

        if let Err(rejection) = validate_install(&app, &form, self.catalog.language()) {
            warn!("Install of '{}' rejected: {}", id, rejection);
            let (key, args) = rejection.message();
            self.warn_alert(self.catalog.t(title_key, &[]), self.catalog.t_owned(key, &args));
            return Ok(InstallOutcome::Rejected(rejection));
        }

        let request = InstallRequest {
            appid: app.id.clone(),
            version: Some(form.version.as_str().to_string()),
            params: form.params,
            resources: form.resources,
        };

        info!("Installing '{}' version {}", id, form.version.as_str());
        if let Err(e) = self.api.install_app(&request).await {
            warn!("Install of '{}' failed: {}", id, e);
            self.warn_alert(
                self.catalog.t("install.failure", &[]),
                self.catalog
                    .t("install.failure_description", &[("app", app.name.as_str()), ("error", self.unknown_error(&e).as_str())]),
            );
            return Err(e);
        }

        if let Err(e) = self.refresh_app(id).await {
            warn!("Failed to refresh '{}' after install: {}", id, e);
        }
        Ok(InstallOutcome::Submitted)
    }

    /// Uninstall an installed app; the catalog is refetched either way
    pub async fn uninstall(&self, id: &str) -> Result<()> {
        let app = self.find(id)?;
        if !can_uninstall(&app) {
            self.warn_alert(
                self.catalog.t("uninstall.title", &[]),
                self.catalog.t("uninstall.not_installed", &[("app", app.name.as_str())]),
            );
            bail!("App '{}' is {}, not installed", id, app.status());
        }

        info!("Uninstalling '{}'", id);
        let result = self.api.uninstall_app(id).await;
        if let Err(e) = &result {
            warn!("Uninstall of '{}' failed: {}", id, e);
            self.warn_alert(
                self.catalog.t("uninstall.error", &[]),
                self.catalog
                    .t("uninstall.error_description", &[("app", app.name.as_str()), ("error", self.unknown_error(e).as_str())]),
            );
        }

        if let Err(e) = self.fetch_snapshot(false, None).await {
            warn!("Failed to refresh catalog after uninstall: {}", e);
        }
        result
    }

    /// Ask for confirmation, then uninstall from the alert's confirm action.
    ///
    /// A failed uninstall keeps the alert open.
    pub fn confirm_uninstall(self: &Arc<Self>, id: &str) -> Result<CloseHandle> {
        let app = self.find(id)?;
        let store = self.clone();
        let id = id.to_string();

        Ok(self.prompts.alert(
            AlertProps::new(AlertKind::Warning, self.catalog.t("uninstall.title", &[]))
                .description(self.catalog.t("uninstall.description", &[("app", app.name.as_str())]))
                .on_confirm(move |_| {
                    let store = store.clone();
                    let id = id.clone();
                    async move { store.uninstall(&id).await }
                }),
        ))
    }

    /// Refresh the server's catalog from upstream, then reload it
    pub async fn update_catalog(&self) -> Result<()> {
        let progress = self.prompts.notice(
            NoticeProps::new(Tone::Text, self.catalog.t("install.updating_app_list", &[])).persistent(),
        );

        let result = self.api.update_catalog().await;
        match &result {
            Ok(()) => {
                info!("Catalog updated");
                self.prompts.notice(NoticeProps::new(
                    Tone::Success,
                    self.catalog.t("install.update_app_list_success", &[]),
                ));
                if let Err(e) = self.fetch_snapshot(false, None).await {
                    warn!("Failed to reload catalog after update: {}", e);
                }
            }
            Err(e) => {
                warn!("Catalog update failed: {}", e);
                self.prompts.notice(
                    NoticeProps::new(Tone::Error, self.catalog.t("install.update_app_list_failure", &[])).description(
                        self.catalog
                            .t("install.update_app_list_failure_description", &[("error", self.unknown_error(e).as_str())]),
                    ),
                );
            }
        }

        progress.close();
        result
    }

    /// Register an app from a package URL and return it from the reloaded catalog
    pub async fn install_from_url(&self, url: &str) -> Result<App> {
        let url = url.trim();
        if url.is_empty() {
            bail!("URL must not be empty");
        }

        info!("Downloading app from {}", url);
        let downloaded = match self.api.download_from_url(url).await {
            Ok(app) => app,
            Err(e) => {
                warn!("Download from {} failed: {}", url, e);
                self.warn_alert(
                    self.catalog.t("install.install_from_url", &[]),
                    self.catalog
                        .t("install.install_from_url_failed", &[("error", self.unknown_error(&e).as_str())]),
                );
                if let Err(fetch_error) = self.fetch_snapshot(true, None).await {
                    warn!("Failed to reload catalog: {}", fetch_error);
                }
                return Err(e);
            }
        };

        if let Err(e) = self.fetch_snapshot(false, None).await {
            warn!("Failed to reload catalog after download: {}", e);
        }
        match self.app(&downloaded.id) {
            Some(app) => Ok(app),
            None => {
                self.upsert_app(downloaded.clone());
                Ok(self.app(&downloaded.id).unwrap_or(downloaded))
            }
        }
    }

    /// Install or uninstall output of an app
    pub async fn fetch_log(&self, id: &str) -> Result<String> {
        self.api.get_log(id).await
    }
}
