use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::foods::codec::{Dish, FoodsError};
use crate::foods::ingredients::{join_ingredients, Ingredient, WeightUnit};
use crate::images::ImageSource;
use crate::meals::{Meal, MealType, MealUpdate, NewMeal};
use crate::nutrition::{get_nutrition, NutritionData};
use crate::stores::AsyncSlot;

/// A dish being registered or edited. Changing the ingredient list makes
/// any computed nutrition stale, so it is dropped.
#[derive(Debug, Default)]
pub struct MealDraft {
    pub dish_name: String,
    pub ingredients: Vec<Ingredient>,
    pub meal_type: Option<MealType>,
    /// HH:mm; `None` means "now" when saving.
    pub time: Option<String>,
    /// YYYY-MM-DD; `None` lets the backend use today.
    pub date: Option<String>,
    pub image: Option<ImageSource>,
    pub nutrition: AsyncSlot<NutritionData>,
}

impl MealDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills the draft from a stored meal, nutrition included, so it
    /// can be saved again without recomputing.
    pub async fn from_meal(meal: &Meal) -> Self {
        let dish = Dish::decode(&meal.foods);
        let draft = Self {
            dish_name: dish.name.unwrap_or_default(),
            ingredients: dish.ingredients,
            meal_type: Some(meal.meal_type),
            time: Some(meal.time.clone()).filter(|t| !t.is_empty()),
            date: None,
            // a locally cached file:// image is not re-sent
            image: meal
                .image_url
                .clone()
                .map(ImageSource::from_value)
                .filter(|img| img.existing_url().is_some()),
            nutrition: AsyncSlot::new(),
        };
        draft.nutrition.set_data(meal.nutrition.clone()).await;
        draft
    }

    /// Blank names are ignored. An ingredient whose text would come back
    /// different from the wire string is refused and the draft is untouched.
    pub async fn add_ingredient(
        &mut self,
        name: &str,
        weight: &str,
        unit: WeightUnit,
    ) -> Result<bool, FoodsError> {
        if name.trim().is_empty() {
            return Ok(false);
        }
        let ingredient = Ingredient::new(name, weight, unit);
        Dish::new(None, vec![ingredient.clone()]).encode()?;
        self.ingredients.push(ingredient);
        self.nutrition.reset().await;
        Ok(true)
    }

    pub async fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        if index >= self.ingredients.len() {
            return None;
        }
        let removed = self.ingredients.remove(index);
        self.nutrition.reset().await;
        Some(removed)
    }

    pub async fn set_ingredients(&mut self, ingredients: Vec<Ingredient>) {
        self.ingredients = ingredients;
        self.nutrition.reset().await;
    }

    /// Estimates macros for the current ingredients. The dish name is not
    /// sent, only the ingredient list.
    pub async fn calculate(&self, api: &ApiClient) -> Option<NutritionData> {
        if self.ingredients.is_empty() {
            return None;
        }
        let foods = join_ingredients(&self.ingredients);
        self.nutrition.execute(get_nutrition(api, &foods)).await
    }

    pub fn to_dish(&self) -> Dish {
        Dish::new(Some(&self.dish_name), self.ingredients.clone())
    }

    pub fn foods_string(&self) -> Result<String, FoodsError> {
        self.to_dish().encode()
    }

    async fn ready(&self) -> ClientResult<(String, MealType, NutritionData)> {
        let meal_type = self
            .meal_type
            .ok_or_else(|| ClientError::Validation("Escolha o tipo de refeição".into()))?;
        let nutrition = self
            .nutrition
            .data()
            .await
            .ok_or_else(|| ClientError::Validation("Calcule os macros antes de salvar".into()))?;
        Ok((self.foods_string()?, meal_type, nutrition))
    }

    /// Body for a new meal. Needs a meal type and computed nutrition.
    pub async fn to_new_meal(&self) -> ClientResult<NewMeal> {
        let (foods, meal_type, nutrition) = self.ready().await?;
        let mut meal = NewMeal::new(foods, meal_type).with_image(self.image.as_ref());
        meal.date = self.date.clone();
        meal.time = self.time.clone();
        meal.nutrition = Some(nutrition);
        Ok(meal)
    }

    pub async fn to_update(&self) -> ClientResult<MealUpdate> {
        let (foods, meal_type, nutrition) = self.ready().await?;
        Ok(MealUpdate {
            foods: Some(foods),
            meal_type: Some(meal_type),
            date: self.date.clone(),
            time: self.time.clone(),
            nutrition: Some(nutrition),
            ..MealUpdate::default()
        }
        .with_image(self.image.as_ref()))
    }
}
