use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::store::status::{AppStatus, is_upgradeable};

/// Response envelope used by every backend endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Catalog entry as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub author: String,
    pub website: String,
    pub github: String,
    pub document: String,
    pub download_url: String,
    pub versions: Vec<String>,
    pub tags: Vec<String>,
    pub fields: Vec<FieldConfig>,
    pub config: AppConfig,
    pub require_uninstalls: Vec<RequireUninstall>,
    /// Derived locally, see [`App::refresh_upgradeable`]
    pub upgradeable: bool,
}

impl App {
    pub fn status(&self) -> AppStatus {
        self.config.status
    }

    pub fn installed_version(&self) -> &str {
        &self.config.install_version
    }

    /// Recompute `upgradeable` from status, installed version and versions
    pub fn refresh_upgradeable(&mut self) {
        self.upgradeable = is_upgradeable(self.config.status, &self.config.install_version, &self.versions);
    }

    /// Newest entry of `versions`
    pub fn latest_version(&self) -> Option<&str> {
        self.versions
            .iter()
            .max_by(|a, b| crate::store::version::compare_versions(a, b))
            .map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Installation record of an app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub install_at: String,
    pub install_num: u32,
    pub install_version: String,
    pub status: AppStatus,
    pub params: HashMap<String, Value>,
    pub resources: Resources,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub cpu_limit: String,
    pub memory_limit: String,
}

/// Install parameter declared by an app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub default: Value,
    pub label: Value,
    pub placeholder: Value,
    pub required: bool,
    pub options: Vec<FieldOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOption {
    pub label: Value,
    pub value: String,
}

/// Installed versions matching this rule must be uninstalled before upgrading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequireUninstall {
    pub version: String,
    pub operator: String,
    pub reason: Value,
}

/// Body of `POST /internal/install`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstallRequest {
    pub appid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub params: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
}

/// Pick a display string from a value that is either plain text or a
/// language-keyed map
pub fn localized(value: &Value, language: &str) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => map
            .get(language)
            .or_else(|| map.get("en"))
            .or_else(|| map.values().next())
            .map(|value| localized(value, language))
            .unwrap_or_default(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
