use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::favorites::{self, Favorite, NewFavorite};
use crate::images::ImageSource;
use crate::nutrition::NutritionData;
use crate::stores::Generation;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesState {
    pub favorites: Vec<Favorite>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct FavoritesStore {
    api: ApiClient,
    state: Mutex<FavoritesState>,
    generation: Generation,
}

impl FavoritesStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Mutex::new(FavoritesState::default()),
            generation: Generation::default(),
        }
    }

    pub async fn snapshot(&self) -> FavoritesState {
        self.state.lock().await.clone()
    }

    pub async fn refresh(&self) -> bool {
        let ticket = self.generation.begin();
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
        }

        let result = favorites::get_favorites(&self.api).await;

        let mut state = self.state.lock().await;
        if !self.generation.is_current(ticket) {
            debug!("dropping superseded favorites refresh");
            return false;
        }
        state.loading = false;
        match result {
            Ok(list) => {
                state.favorites = list;
                true
            }
            Err(e) => {
                warn!(error = %e, "favorites refresh failed; keeping previous list");
                state.error = Some(e.user_message());
                false
            }
        }
    }

    pub async fn add(
        &self,
        foods: &str,
        nutrition: NutritionData,
        image: Option<&ImageSource>,
    ) -> Option<Favorite> {
        let body = NewFavorite::new(foods, nutrition, image);
        match favorites::create_favorite(&self.api, &body).await {
            Ok(fav) => {
                self.refresh().await;
                Some(fav)
            }
            Err(e) => {
                self.fail("add", e).await;
                None
            }
        }
    }

    pub async fn remove(&self, id: &str) -> bool {
        match favorites::delete_favorite(&self.api, id).await {
            Ok(_) => {
                self.refresh().await;
                true
            }
            Err(e) => {
                self.fail("remove", e).await;
                false
            }
        }
    }

    async fn fail(&self, op: &str, e: ClientError) {
        warn!(op, error = %e, "favorite mutation failed");
        self.state.lock().await.error = Some(e.user_message());
    }
}
