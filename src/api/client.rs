use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use super::constants::{self, API_BASE_PATH, CODE_OK, headers, paths};
use super::models::{ApiResponse, App, InstallRequest};
use super::AppApi;

/// HTTP client for the marketplace backend with connection pooling
#[derive(Clone)]
pub struct AppStoreClient {
    base_url: String,
    http_client: reqwest::Client,
    token: Option<String>,
    language: String,
}

impl AppStoreClient {
    pub fn new(base_url: &str, token: Option<String>, language: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)                  // Max idle connections per host
            .pool_idle_timeout(Duration::from_secs(90))  // Keep connections alive for 90s
            .timeout(timeout)                            // Request timeout
            .connect_timeout(Duration::from_secs(10))    // Connection timeout
            .user_agent(concat!("appstore-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_custom_client(base_url, token, language, http_client))
    }

    /// Create a new client with custom HTTP client configuration
    pub fn with_custom_client(base_url: &str, token: Option<String>, language: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: format!("{}{}", base_url.trim_end_matches('/'), API_BASE_PATH),
            http_client,
            token: token.filter(|token| !token.is_empty()),
            language: language.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, self.url(path))
            .header(headers::LANGUAGE, &self.language);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and unwrap the `{code, message, data}` envelope
    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<Option<T>> {
        let response = builder.send().await.context("Request to app store failed")?;
        let status = response.status();
        let body = response.text().await.context("Failed to read response body")?;
        debug!("app store responded {} ({} bytes)", status, body.len());

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(anyhow!(e).context("Failed to parse app store response"));
            }
            Err(_) => bail!("Request failed with status {}: {}", status, body),
        };

        if envelope.code != CODE_OK {
            warn!("app store returned code {}: {}", envelope.code, envelope.message);
            if envelope.message.is_empty() {
                bail!("Request failed with code {}", envelope.code)
            }
            bail!("{}", envelope.message)
        }
        Ok(envelope.data)
    }
}

#[async_trait]
impl AppApi for AppStoreClient {
    async fn list_apps(&self, ids: Option<&[String]>) -> Result<Vec<App>> {
        let mut builder = self.request(reqwest::Method::GET, paths::LIST);
        if let Some(ids) = ids {
            builder = builder.query(&[(constants::LIST_IDS_PARAM, ids.join(","))]);
        }
        Ok(self.send(builder).await?.unwrap_or_default())
    }

    async fn get_app(&self, id: &str) -> Result<App> {
        let builder = self.request(reqwest::Method::GET, &format!("{}/{}", paths::ONE, id));
        self.send(builder)
            .await?
            .ok_or_else(|| anyhow!("App '{}' not found", id))
    }

    async fn install_app(&self, request: &InstallRequest) -> Result<()> {
        let builder = self.request(reqwest::Method::POST, paths::INSTALL).json(request);
        self.send::<Value>(builder).await?;
        Ok(())
    }

    async fn uninstall_app(&self, id: &str) -> Result<()> {
        let builder = self.request(reqwest::Method::GET, &format!("{}/{}", paths::UNINSTALL, id));
        self.send::<Value>(builder).await?;
        Ok(())
    }

    async fn get_log(&self, id: &str) -> Result<String> {
        let builder = self.request(reqwest::Method::GET, &format!("{}/{}", paths::LOG, id));
        let data: Option<Value> = self.send(builder).await?;
        Ok(data
            .as_ref()
            .and_then(|data| data.get("log"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn update_catalog(&self) -> Result<()> {
        let builder = self.request(reqwest::Method::GET, paths::UPDATE_CATALOG);
        self.send::<Value>(builder).await?;
        Ok(())
    }

    async fn download_from_url(&self, url: &str) -> Result<App> {
        let builder = self
            .request(reqwest::Method::POST, paths::DOWNLOAD)
            .json(&json!({ "url": url }));
        self.send(builder)
            .await?
            .ok_or_else(|| anyhow!("Server did not return the downloaded app"))
    }
}
