pub mod catalog;
pub mod install;
pub mod settings;
pub mod watch;

use anyhow::Result;
use log::debug;
use std::sync::Arc;

use super::app::{Cli, Commands};
use super::render::OverlayPrinter;
use crate::api::AppStoreClient;
use crate::config::Config;
use crate::i18n::Catalog;
use crate::prompt::{EventBus, OverlayHost, Prompts, ZOrder};
use crate::store::AppStore;

/// Everything a command needs, built once per invocation
pub struct Session {
    pub config: Config,
    pub host: OverlayHost,
    pub store: Arc<AppStore>,
    _printer: OverlayPrinter,
}

impl Session {
    pub fn new(config: Config, server: Option<String>, token: Option<String>) -> Result<Self> {
        let bus = EventBus::new();
        // registered first so overlays print before registries react to them
        let printer = OverlayPrinter::attach(&bus);
        let host = OverlayHost::new(&bus, Arc::new(ZOrder::new()));
        let prompts = Prompts::new(bus);

        let base_url = server.unwrap_or_else(|| config.server.base_url.clone());
        let token = token.or_else(|| config.server.token.clone());
        let language = config.preferences.language.clone();
        debug!("Using server {} (language {})", base_url, language);

        let client = AppStoreClient::new(&base_url, token, &language, config.request_timeout())?;
        let store = AppStore::new(Arc::new(client), prompts, Catalog::new(&language))
            .with_category_limit(config.poll.category_limit);

        Ok(Self {
            config,
            host,
            store: Arc::new(store),
            _printer: printer,
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.host.dispose();
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if let Commands::Settings(settings) = cli.command {
        return settings::settings_command(settings, config);
    }

    let session = Session::new(config, cli.server, cli.token)?;
    match cli.command {
        Commands::List(args) => catalog::list_command(&session, args).await,
        Commands::Show { id } => catalog::show_command(&session, &id).await,
        Commands::Install(args) => install::install_command(&session, args).await,
        Commands::Uninstall(args) => install::uninstall_command(&session, args).await,
        Commands::Log { id } => catalog::log_command(&session, &id).await,
        Commands::UpdateCatalog => catalog::update_catalog_command(&session).await,
        Commands::Download { url } => catalog::download_command(&session, &url).await,
        Commands::Watch(args) => watch::watch_command(&session, args).await,
        Commands::Settings(_) => Ok(()),
    }
}
