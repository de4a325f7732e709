use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{Auth, Session};
use crate::config::AppConfig;
use crate::images::MealImageCache;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::stores::{FavoritesStore, HistoryStore, MealsStore};

/// Process-scoped client state: built once, handed to every consumer.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn KeyValueStore>,
    pub session: Arc<Session>,
    pub api: ApiClient,
    pub images: Arc<MealImageCache>,
}

impl AppState {
    /// Reads config from the environment and restores the stored session.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(FileStore::new(config.storage_path())) as Arc<dyn KeyValueStore>;
        let state = Self::from_parts(config, store)?;
        state.session.load().await;
        Ok(state)
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let session = Arc::new(Session::new(store.clone()));
        let api = ApiClient::new(&config, session.clone())?;
        let images = Arc::new(MealImageCache::new(store.clone()));
        Ok(Self {
            config,
            store,
            session,
            api,
            images,
        })
    }

    /// In-memory state against `api_base_url`, for tests.
    pub fn fake(api_base_url: &str) -> Self {
        let config = Arc::new(AppConfig::for_base_url(api_base_url, "unused"));
        let store = Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>;
        Self::from_parts(config, store).expect("http client builds")
    }

    pub fn auth(&self) -> Auth {
        Auth::new(self.api.clone(), self.session.clone())
    }

    pub fn meals_store(&self, date: impl Into<String>) -> MealsStore {
        MealsStore::new(self.api.clone(), self.images.clone(), date)
    }

    pub fn favorites_store(&self) -> FavoritesStore {
        FavoritesStore::new(self.api.clone())
    }

    pub fn history_store(&self, year: i32, month0: i32, selected_date: impl Into<String>) -> HistoryStore {
        HistoryStore::new(self.api.clone(), self.images.clone(), year, month0, selected_date)
    }

    /// Tears down the session. The image cache outlives it.
    pub async fn logout(&self) {
        self.session.clear().await;
    }
}
