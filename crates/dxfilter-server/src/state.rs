//! 共享状态

use crate::config::ServerConfig;
use crate::fetch::{FetchError, HttpSource, RemoteSource};
use crate::store::FileStore;
use std::sync::Arc;

pub struct AppState {
    pub config: ServerConfig,
    pub store: FileStore,
    pub remote: Arc<dyn RemoteSource>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: ServerConfig, remote: Arc<dyn RemoteSource>) -> Self {
        let store = FileStore::new(config.max_stored_files, config.file_ttl());
        Self {
            config,
            store,
            remote,
        }
    }

    /// 使用 HTTP 远程来源
    pub fn from_config(config: ServerConfig) -> Result<Self, FetchError> {
        let remote = HttpSource::new(config.fetch_timeout(), config.max_upload_bytes)?;
        Ok(Self::new(config, Arc::new(remote)))
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
