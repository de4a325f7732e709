use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::calendar::{self, CalendarRow};
use crate::error::ClientError;
use crate::images::MealImageCache;
use crate::meals::{self, Meal, MealUpdate};
use crate::nutrition::{MacroTotals, NutritionData};
use crate::stores::Generation;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryState {
    pub view_year: i32,
    /// Zero-based.
    pub view_month: u8,
    pub selected_date: String,
    /// Days of the viewed month that have at least one meal.
    pub dates_with_data: BTreeSet<String>,
    pub meals: Vec<Meal>,
    pub totals: Option<NutritionData>,
    pub loading: bool,
    pub error: Option<String>,
}

impl HistoryState {
    pub fn macro_totals(&self) -> MacroTotals {
        MacroTotals::from_optional(self.totals.as_ref())
    }

    /// Selected day's meals, latest first.
    pub fn meals_latest_first(&self) -> Vec<&Meal> {
        let mut sorted: Vec<&Meal> = self.meals.iter().collect();
        sorted.sort_by(|a, b| b.time.cmp(&a.time));
        sorted
    }

    pub fn has_data(&self, day: u8) -> bool {
        self.dates_with_data
            .contains(&calendar::date_key(self.view_year, self.view_month as i32, day))
    }
}

/// Month calendar with marked days plus the meals of one selected day.
pub struct HistoryStore {
    api: ApiClient,
    images: Arc<MealImageCache>,
    state: Mutex<HistoryState>,
    day_generation: Generation,
    month_generation: Generation,
}

impl HistoryStore {
    pub fn new(
        api: ApiClient,
        images: Arc<MealImageCache>,
        year: i32,
        month0: i32,
        selected_date: impl Into<String>,
    ) -> Self {
        let (view_year, view_month) = calendar::shift_month(year, month0);
        Self {
            api,
            images,
            state: Mutex::new(HistoryState {
                view_year,
                view_month,
                selected_date: selected_date.into(),
                ..HistoryState::default()
            }),
            day_generation: Generation::default(),
            month_generation: Generation::default(),
        }
    }

    pub async fn snapshot(&self) -> HistoryState {
        self.state.lock().await.clone()
    }

    pub async fn calendar_rows(&self) -> Vec<CalendarRow> {
        let state = self.state.lock().await;
        calendar::calendar_rows(state.view_year, state.view_month as i32)
    }

    pub async fn dates_with_data(&self) -> BTreeSet<String> {
        self.state.lock().await.dates_with_data.clone()
    }

    /// Marks the days of the viewed month that have meals.
    pub async fn load_month(&self) -> bool {
        let ticket = self.month_generation.begin();
        let (year, month0) = {
            let state = self.state.lock().await;
            (state.view_year, state.view_month as i32)
        };
        let range = calendar::month_range(year, month0);

        let result = meals::get_meals_by_range(&self.api, &range.start_date, &range.end_date).await;

        let mut state = self.state.lock().await;
        if !self.month_generation.is_current(ticket) {
            debug!(start = %range.start_date, "dropping superseded month load");
            return false;
        }
        match result {
            Ok(list) => {
                state.dates_with_data = list.into_iter().map(|m| m.date).collect();
                true
            }
            Err(e) => {
                warn!(start = %range.start_date, error = %e, "month load failed; keeping previous marks");
                state.error = Some(e.user_message());
                false
            }
        }
    }

    /// Selects `date` and loads its meals.
    pub async fn load_day(&self, date: &str) -> bool {
        let ticket = self.day_generation.begin();
        {
            let mut state = self.state.lock().await;
            state.selected_date = date.to_string();
            state.loading = true;
            state.error = None;
        }

        let result = match meals::get_day_summary(&self.api, date).await {
            Ok(mut summary) => {
                self.images.inject_cached_images(&mut summary.meals).await;
                Ok(summary)
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        if !self.day_generation.is_current(ticket) {
            debug!(%date, "dropping superseded day load");
            return false;
        }
        state.loading = false;
        match result {
            Ok(summary) => {
                if summary.meals.is_empty() {
                    state.dates_with_data.remove(date);
                } else {
                    state.dates_with_data.insert(date.to_string());
                }
                state.meals = summary.meals;
                state.totals = summary.totals;
                true
            }
            Err(e) => {
                warn!(%date, error = %e, "day load failed; keeping previous meals");
                state.error = Some(e.user_message());
                false
            }
        }
    }

    pub async fn prev_month(&self) -> bool {
        self.shift_view(-1).await;
        self.load_month().await
    }

    pub async fn next_month(&self) -> bool {
        self.shift_view(1).await;
        self.load_month().await
    }

    async fn shift_view(&self, delta: i32) {
        let mut state = self.state.lock().await;
        let (year, month0) =
            calendar::shift_month(state.view_year, state.view_month as i32 + delta);
        state.view_year = year;
        state.view_month = month0;
    }

    /// Moves a meal to another day, then reloads the day and the marks.
    pub async fn move_meal(&self, id: &str, new_date: &str) -> bool {
        match meals::update_meal(&self.api, id, &MealUpdate::date(new_date)).await {
            Ok(_) => {
                self.reload().await;
                true
            }
            Err(e) => {
                self.fail("move", e).await;
                false
            }
        }
    }

    pub async fn edit_meal(&self, id: &str, params: &MealUpdate, local_image: Option<&str>) -> bool {
        match meals::update_meal(&self.api, id, params).await {
            Ok(_) => {
                if let Some(uri) = local_image {
                    self.images.cache_meal_image(id, uri).await;
                }
                self.reload().await;
                true
            }
            Err(e) => {
                self.fail("edit", e).await;
                false
            }
        }
    }

    pub async fn delete_meal(&self, id: &str) -> bool {
        match meals::delete_meal(&self.api, id).await {
            Ok(_) => {
                self.images.remove_cached_meal_image(id).await;
                self.reload().await;
                true
            }
            Err(e) => {
                self.fail("delete", e).await;
                false
            }
        }
    }

    async fn reload(&self) {
        let date = self.state.lock().await.selected_date.clone();
        self.load_day(&date).await;
        self.load_month().await;
    }

    async fn fail(&self, op: &str, e: ClientError) {
        warn!(op, error = %e, "history mutation failed");
        self.state.lock().await.error = Some(e.user_message());
    }
}
