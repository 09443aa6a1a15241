//! Shared fixtures: an in-memory `AppApi` and a fully wired store
#![allow(dead_code)]

use anyhow::{Result, anyhow, bail};
use appstore_cli::api::models::{App, InstallRequest};
use appstore_cli::api::AppApi;
use appstore_cli::i18n::Catalog;
use appstore_cli::prompt::{EventBus, NoticeProps, OverlayHost, PromptEvent, Prompts, Subscription, ZOrder};
use appstore_cli::store::{AppStatus, AppStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn app(id: &str, status: AppStatus, installed: &str, versions: &[&str]) -> App {
    let mut app = App {
        id: id.to_string(),
        name: id.to_uppercase(),
        versions: versions.iter().map(|v| v.to_string()).collect(),
        ..App::default()
    };
    app.config.status = status;
    app.config.install_version = installed.to_string();
    app
}

/// Backend stub that serves a mutable app list and counts calls
#[derive(Default)]
pub struct MockApi {
    pub apps: Mutex<Vec<App>>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub install_calls: AtomicUsize,
    pub uninstall_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_uninstall: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_download: AtomicBool,
    pub last_ids: Mutex<Option<Vec<String>>>,
    pub last_install: Mutex<Option<InstallRequest>>,
    /// When set, `list_apps` waits for a permit before answering
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub fn with_apps(apps: Vec<App>) -> Arc<Self> {
        let api = Self::default();
        *api.apps.lock().unwrap() = apps;
        Arc::new(api)
    }

    pub fn set_status(&self, id: &str, status: AppStatus) {
        if let Some(app) = self.apps.lock().unwrap().iter_mut().find(|app| app.id == id) {
            app.config.status = status;
        }
    }

    pub fn set_installed_version(&self, id: &str, version: &str) {
        if let Some(app) = self.apps.lock().unwrap().iter_mut().find(|app| app.id == id) {
            app.config.install_version = version.to_string();
        }
    }

    pub fn close_gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppApi for MockApi {
    async fn list_apps(&self, ids: Option<&[String]>) -> Result<Vec<App>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_ids.lock().unwrap() = ids.map(<[String]>::to_vec);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            bail!("list unavailable");
        }
        let apps = self.apps.lock().unwrap().clone();
        Ok(match ids {
            Some(ids) => apps.into_iter().filter(|app| ids.contains(&app.id)).collect(),
            None => apps,
        })
    }

    async fn get_app(&self, id: &str) -> Result<App> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.apps
            .lock()
            .unwrap()
            .iter()
            .find(|app| app.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("no app {}", id))
    }

    async fn install_app(&self, request: &InstallRequest) -> Result<()> {
        self.install_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_install.lock().unwrap() = Some(request.clone());
        self.set_status(&request.appid, AppStatus::Installing);
        Ok(())
    }

    async fn uninstall_app(&self, id: &str) -> Result<()> {
        self.uninstall_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uninstall.load(Ordering::SeqCst) {
            bail!("container busy");
        }
        self.set_status(id, AppStatus::Uninstalling);
        Ok(())
    }

    async fn get_log(&self, id: &str) -> Result<String> {
        Ok(format!("log of {}", id))
    }

    async fn update_catalog(&self) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            bail!("upstream unreachable");
        }
        Ok(())
    }

    async fn download_from_url(&self, url: &str) -> Result<App> {
        if self.fail_download.load(Ordering::SeqCst) {
            bail!("package not found");
        }
        let id = url.rsplit('/').next().unwrap_or(url).trim_end_matches(".zip");
        let downloaded = app(id, AppStatus::NotInstalled, "", &["1.0.0"]);
        self.apps.lock().unwrap().push(downloaded.clone());
        Ok(downloaded)
    }
}

/// Store, overlay registries and a notice recorder sharing one bus
pub struct Harness {
    pub api: Arc<MockApi>,
    pub bus: EventBus<PromptEvent>,
    pub host: OverlayHost,
    pub store: Arc<AppStore>,
    pub notices: Arc<Mutex<Vec<NoticeProps>>>,
    _recorder: Subscription,
}

impl Harness {
    /// Must be called inside a tokio runtime
    pub fn new(api: Arc<MockApi>) -> Self {
        let bus = EventBus::new();
        let host = OverlayHost::new(&bus, Arc::new(ZOrder::new()));
        let store = AppStore::new(api.clone(), Prompts::new(bus.clone()), Catalog::default());

        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = notices.clone();
        let recorder = bus.subscribe("notice", move |event: &PromptEvent| {
            if let PromptEvent::Notice(props) = event {
                if !props.closing {
                    sink.lock().unwrap().push(props.clone());
                }
            }
        });

        Self {
            api,
            bus,
            host,
            store: Arc::new(store),
            notices,
            _recorder: recorder,
        }
    }

    /// Descriptions of every notice raised so far
    pub fn notice_texts(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|notice| notice.description.clone().unwrap_or_else(|| notice.title.clone()))
            .collect()
    }
}
