//! In-memory catalog of apps and their server-reported status.
//!
//! The store is the only owner of the app collection. Readers get clones;
//! every mutation goes through a store operation so derived state
//! (`upgradeable`, categories) is recomputed and status changes are fed to
//! the [`Reconciler`].

use anyhow::Result;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::reconcile::{Reconciler, Transition};
use super::status::AppStatus;
use crate::api::AppApi;
use crate::api::models::App;
use crate::i18n::Catalog;
use crate::prompt::{AlertKind, AlertProps, Prompts};

pub const ALL_CATEGORY: &str = "all";
pub const DEFAULT_CATEGORY_LIMIT: usize = 4;

/// Which apps a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    Installed,
    Upgradeable,
}

#[derive(Debug, Clone, Default)]
pub struct AppFilter {
    pub scope: Scope,
    /// Tag to match, case-insensitive; `None` or `"all"` matches everything
    pub category: Option<String>,
    /// Keyword matched against name, description and tags
    pub search: Option<String>,
}

impl AppFilter {
    pub fn matches(&self, app: &App) -> bool {
        let in_scope = match self.scope {
            Scope::All => true,
            Scope::Installed => app.status() == AppStatus::Installed,
            Scope::Upgradeable => app.upgradeable,
        };
        if !in_scope {
            return false;
        }

        if let Some(category) = self.category.as_deref() {
            if !category.eq_ignore_ascii_case(ALL_CATEGORY) && !app.has_tag(category) {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => {
                let keyword = keyword.to_lowercase();
                app.name.to_lowercase().contains(&keyword)
                    || app.description.to_lowercase().contains(&keyword)
                    || app.tags.iter().any(|tag| tag.to_lowercase().contains(&keyword))
            }
            _ => true,
        }
    }
}

/// `"all"` followed by the first `limit` distinct non-empty tags in catalog order
pub fn derive_categories(apps: &[App], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let tags = apps
        .iter()
        .flat_map(|app| app.tags.iter())
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_string()))
        .take(limit)
        .map(str::to_string);

    std::iter::once(ALL_CATEGORY.to_string()).chain(tags).collect()
}

struct StoreState {
    apps: Vec<App>,
    categories: Vec<String>,
    loading: bool,
}

pub struct AppStore {
    pub(super) api: Arc<dyn AppApi>,
    pub(super) prompts: Prompts,
    pub(super) catalog: Catalog,
    category_limit: usize,
    state: Mutex<StoreState>,
    reconciler: Mutex<Reconciler>,
}

impl AppStore {
    pub fn new(api: Arc<dyn AppApi>, prompts: Prompts, catalog: Catalog) -> Self {
        Self {
            api,
            prompts,
            catalog,
            category_limit: DEFAULT_CATEGORY_LIMIT,
            state: Mutex::new(StoreState {
                apps: Vec::new(),
                categories: vec![ALL_CATEGORY.to_string()],
                loading: false,
            }),
            reconciler: Mutex::new(Reconciler::new()),
        }
    }

    pub fn with_category_limit(mut self, limit: usize) -> Self {
        self.category_limit = limit;
        self
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn apps(&self) -> Vec<App> {
        self.lock().apps.clone()
    }

    pub fn app(&self, id: &str) -> Option<App> {
        self.lock().apps.iter().find(|app| app.id == id).cloned()
    }

    pub fn categories(&self) -> Vec<String> {
        self.lock().categories.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn filtered(&self, filter: &AppFilter) -> Vec<App> {
        self.lock()
            .apps
            .iter()
            .filter(|app| filter.matches(app))
            .cloned()
            .collect()
    }

    /// Ids of apps with an install or uninstall running on the server
    pub fn pending_ids(&self) -> Vec<String> {
        self.lock()
            .apps
            .iter()
            .filter(|app| app.status().is_busy())
            .map(|app| app.id.clone())
            .collect()
    }

    /// Fetch the catalog from the server.
    ///
    /// Without `ids` the whole collection is replaced and categories are
    /// recomputed; with `ids` only matching apps are updated in place.
    /// Unless `silent`, the loading flag is raised for the duration and a
    /// failure is reported with an alert.
    pub async fn fetch_snapshot(&self, silent: bool, ids: Option<&[String]>) -> Result<()> {
        if !silent {
            self.lock().loading = true;
        }
        let result = self.api.list_apps(ids).await;
        if !silent {
            self.lock().loading = false;
        }

        let mut apps = match result {
            Ok(apps) => apps,
            Err(e) => {
                warn!("Failed to fetch app list: {}", e);
                if !silent {
                    self.prompts.alert(
                        AlertProps::new(AlertKind::Error, self.catalog.t("common.title", &[]))
                            .description(self.catalog.t("app.err_list", &[]))
                            .show_cancel(false),
                    );
                }
                return Err(e);
            }
        };
        apps.iter_mut().for_each(App::refresh_upgradeable);

        let (prev, next) = {
            let mut state = self.lock();
            let prev = state.apps.clone();
            match ids {
                None => {
                    debug!("Replacing catalog with {} apps", apps.len());
                    state.apps = apps;
                    state.categories = derive_categories(&state.apps, self.category_limit);
                }
                Some(_) => {
                    debug!("Merging {} scoped apps", apps.len());
                    for app in apps {
                        if let Some(slot) = state.apps.iter_mut().find(|slot| slot.id == app.id) {
                            *slot = app;
                        }
                    }
                }
            }
            (prev, state.apps.clone())
        };

        self.reconcile(&prev, &next);
        Ok(())
    }

    /// Reload a single app, keeping its position in the collection
    pub async fn refresh_app(&self, id: &str) -> Result<()> {
        let mut app = self.api.get_app(id).await?;
        app.refresh_upgradeable();

        let prev = {
            let mut state = self.lock();
            match state.apps.iter_mut().find(|slot| slot.id == app.id) {
                Some(slot) => std::mem::replace(slot, app.clone()),
                None => {
                    debug!("App '{}' not in catalog, refresh ignored", id);
                    return Ok(());
                }
            }
        };

        self.reconcile(&[prev], &[app]);
        Ok(())
    }

    /// Update an app in place or append it, then recompute categories
    pub fn upsert_app(&self, mut app: App) {
        app.refresh_upgradeable();
        let mut state = self.lock();
        match state.apps.iter_mut().find(|slot| slot.id == app.id) {
            Some(slot) => *slot = app,
            None => {
                info!("Adding app '{}' to catalog", app.id);
                state.apps.push(app);
            }
        }
        state.categories = derive_categories(&state.apps, self.category_limit);
    }

    fn reconcile(&self, prev: &[App], next: &[App]) -> Vec<(String, Transition)> {
        self.reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reconcile(prev, next, &self.prompts, &self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: &str, tags: &[&str]) -> App {
        App {
            id: id.into(),
            name: id.into(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            ..App::default()
        }
    }

    #[test]
    fn test_categories_are_unique_and_capped() {
        let apps = vec![
            tagged("a", &["web", "db"]),
            tagged("b", &["db", " ", "cache"]),
            tagged("c", &["queue", "search", "ai"]),
        ];
        assert_eq!(
            derive_categories(&apps, 4),
            vec!["all", "web", "db", "cache", "queue"]
        );
        assert_eq!(derive_categories(&[], 4), vec!["all"]);
    }

    #[test]
    fn test_filter_scope_category_and_search() {
        let mut installed = tagged("redis", &["Cache"]);
        installed.description = "In-memory data store".into();
        installed.config.status = AppStatus::Installed;
        let other = tagged("nginx", &["web"]);

        let filter = AppFilter {
            scope: Scope::Installed,
            ..AppFilter::default()
        };
        assert!(filter.matches(&installed));
        assert!(!filter.matches(&other));

        let filter = AppFilter {
            category: Some("cache".into()),
            ..AppFilter::default()
        };
        assert!(filter.matches(&installed));
        assert!(!filter.matches(&other));

        let filter = AppFilter {
            search: Some("  MEMORY ".into()),
            ..AppFilter::default()
        };
        assert!(filter.matches(&installed));
        assert!(!filter.matches(&other));

        let filter = AppFilter {
            scope: Scope::Upgradeable,
            category: Some("all".into()),
            ..AppFilter::default()
        };
        assert!(!filter.matches(&installed));
    }
}
