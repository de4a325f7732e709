use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::calendar::now_time_str;
use crate::error::ClientError;
use crate::images::MealImageCache;
use crate::meals::{self, Meal, MealUpdate, NewMeal};
use crate::nutrition::{MacroTotals, NutritionData};
use crate::stores::Generation;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealsState {
    pub date: String,
    pub meals: Vec<Meal>,
    pub totals: Option<NutritionData>,
    pub loading: bool,
    pub error: Option<String>,
}

impl MealsState {
    pub fn macro_totals(&self) -> MacroTotals {
        MacroTotals::from_optional(self.totals.as_ref())
    }
}

/// Meals of the selected day with backend totals.
pub struct MealsStore {
    api: ApiClient,
    images: Arc<MealImageCache>,
    state: Mutex<MealsState>,
    generation: Generation,
}

impl MealsStore {
    pub fn new(api: ApiClient, images: Arc<MealImageCache>, date: impl Into<String>) -> Self {
        Self {
            api,
            images,
            state: Mutex::new(MealsState {
                date: date.into(),
                ..MealsState::default()
            }),
            generation: Generation::default(),
        }
    }

    pub async fn snapshot(&self) -> MealsState {
        self.state.lock().await.clone()
    }

    pub async fn date(&self) -> String {
        self.state.lock().await.date.clone()
    }

    pub async fn set_date(&self, date: impl Into<String>) {
        self.state.lock().await.date = date.into();
        self.refresh().await;
    }

    /// Reloads the selected day. Returns false when the result was dropped
    /// because a newer refresh started, or when it failed.
    pub async fn refresh(&self) -> bool {
        let ticket = self.generation.begin();
        let date = {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
            state.date.clone()
        };

        let result = match meals::get_day_summary(&self.api, &date).await {
            Ok(mut summary) => {
                self.images.inject_cached_images(&mut summary.meals).await;
                Ok(summary)
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        if !self.generation.is_current(ticket) {
            debug!(%date, "dropping superseded day refresh");
            return false;
        }
        state.loading = false;
        match result {
            Ok(summary) => {
                state.meals = summary.meals;
                state.totals = summary.totals;
                true
            }
            Err(e) => {
                warn!(%date, error = %e, "day refresh failed; keeping previous meals");
                state.error = Some(e.user_message());
                false
            }
        }
    }

    /// Creates a meal on the selected day (now, when no time is given).
    /// `local_image` is a device URI remembered for the new meal.
    pub async fn add(&self, mut meal: NewMeal, local_image: Option<&str>) -> Option<Meal> {
        if meal.date.is_none() {
            meal.date = Some(self.date().await);
        }
        if meal.time.as_deref().map_or(true, str::is_empty) {
            meal.time = Some(now_time_str());
        }
        match meals::create_meal(&self.api, &meal).await {
            Ok(created) => {
                if let Some(uri) = local_image {
                    self.images.cache_meal_image(&created.id, uri).await;
                }
                self.refresh().await;
                Some(created)
            }
            Err(e) => {
                self.fail("add", e).await;
                None
            }
        }
    }

    pub async fn edit(&self, id: &str, params: &MealUpdate, local_image: Option<&str>) -> Option<Meal> {
        match meals::update_meal(&self.api, id, params).await {
            Ok(updated) => {
                if let Some(uri) = local_image {
                    self.images.cache_meal_image(id, uri).await;
                }
                self.refresh().await;
                Some(updated)
            }
            Err(e) => {
                self.fail("edit", e).await;
                None
            }
        }
    }

    pub async fn remove(&self, id: &str) -> bool {
        match meals::delete_meal(&self.api, id).await {
            Ok(_) => {
                self.images.remove_cached_meal_image(id).await;
                self.refresh().await;
                true
            }
            Err(e) => {
                self.fail("remove", e).await;
                false
            }
        }
    }

    /// Copies a meal and moves the copy to the current time.
    pub async fn duplicate(&self, id: &str) -> Option<Meal> {
        let result = async {
            let copy = meals::duplicate_meal(&self.api, id).await?;
            meals::update_meal(&self.api, &copy.id, &MealUpdate::time(now_time_str())).await
        }
        .await;
        match result {
            Ok(copy) => {
                self.refresh().await;
                Some(copy)
            }
            Err(e) => {
                self.fail("duplicate", e).await;
                None
            }
        }
    }

    async fn fail(&self, op: &str, e: ClientError) {
        warn!(op, error = %e, "meal mutation failed");
        self.state.lock().await.error = Some(e.user_message());
    }
}
