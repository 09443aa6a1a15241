//! Backend contract and its HTTP implementation.
//!
//! Everything that talks to the server goes through [`AppApi`] so stores and
//! flows can be driven by a stub in tests.

pub mod client;
pub mod constants;
pub mod models;

pub use client::AppStoreClient;
pub use models::{App, AppConfig, FieldConfig, FieldOption, InstallRequest, RequireUninstall, Resources};

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AppApi: Send + Sync {
    /// Full catalog, or only the apps in `ids`
    async fn list_apps(&self, ids: Option<&[String]>) -> Result<Vec<App>>;

    async fn get_app(&self, id: &str) -> Result<App>;

    async fn install_app(&self, request: &InstallRequest) -> Result<()>;

    async fn uninstall_app(&self, id: &str) -> Result<()>;

    /// Install or uninstall output of an app
    async fn get_log(&self, id: &str) -> Result<String>;

    /// Ask the server to refresh its catalog from upstream
    async fn update_catalog(&self) -> Result<()>;

    /// Register an app from a package URL and return it
    async fn download_from_url(&self, url: &str) -> Result<App>;
}
