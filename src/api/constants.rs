//! Backend endpoint paths and header names

/// Prefix appended to the configured server URL
pub const API_BASE_PATH: &str = "/api/v1";

/// Envelope code of a successful response
pub const CODE_OK: i64 = 200;

/// Comma-separated app ids scoping `GET /list`
pub const LIST_IDS_PARAM: &str = "appIds";

pub mod paths {
    pub const LIST: &str = "/list";
    pub const ONE: &str = "/one";
    pub const DOWNLOAD: &str = "/internal/apps/download";
    pub const UPDATE_CATALOG: &str = "/internal/apps/update";
    pub const INSTALL: &str = "/internal/install";
    pub const LOG: &str = "/internal/log";
    pub const UNINSTALL: &str = "/internal/uninstall";
}

pub mod headers {
    pub const LANGUAGE: &str = "Language";
}
