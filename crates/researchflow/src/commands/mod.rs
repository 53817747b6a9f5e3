pub mod auth;
pub mod doc;
pub mod explore;
pub mod format;
pub mod render;
pub mod saved;
pub mod version;

use anyhow::{anyhow, bail, Context};
use researchflow_client::ApiClient;
use researchflow_core::{Completion, Config};
use researchflow_storage::{FileStore, KeyValueStore, Paths};
use std::sync::Arc;

/// Everything a command needs: resolved paths, config, the local store
/// and a client bound to both
pub struct App {
    pub paths: Paths,
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub client: ApiClient,
}

impl App {
    pub fn open() -> anyhow::Result<Self> {
        let paths = Paths::new().context("could not resolve the researchflow home directory")?;
        Self::at(paths)
    }

    pub fn at(paths: Paths) -> anyhow::Result<Self> {
        let config = Config::load(&paths.config_file());
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(paths.store_file()));
        let client = ApiClient::new(&config.api_base_url, Arc::clone(&store))
            .with_context(|| format!("invalid API base URL `{}`", config.api_base_url))?;
        Ok(Self {
            paths,
            config,
            store,
            client,
        })
    }
}

/// Turn a surface completion into a command outcome
pub fn settle(completion: Completion) -> anyhow::Result<()> {
    match completion {
        Completion::Committed => Ok(()),
        Completion::Failed(err) => Err(anyhow!(err.user_message())),
        Completion::Stale => bail!("the response arrived after the conversation changed"),
    }
}
