use anyhow::Context;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::api_client::BackendClient;
use crate::store::JsonFileStore;
use crate::workspace::Workspace;

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub client: BackendClient,
    pub workspace: Workspace<JsonFileStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let client = BackendClient::new(&config.api)?;
        let store = JsonFileStore::open(&config.storage.path)
            .context("Failed to open state store")?;
        let workspace = Workspace::load(store).context("Failed to load workspace")?;

        Ok(Self {
            config: Arc::new(config),
            client,
            workspace,
        })
    }
}
