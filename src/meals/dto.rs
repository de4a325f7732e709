use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::images::{HasImage, ImageSource};
use crate::nutrition::NutritionData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
    Supper,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Snack,
        MealType::Dinner,
        MealType::Supper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Snack => "snack",
            MealType::Dinner => "dinner",
            MealType::Supper => "supper",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Café da manhã",
            MealType::Lunch => "Almoço",
            MealType::Snack => "Lanche",
            MealType::Dinner => "Jantar",
            MealType::Supper => "Ceia",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        MealType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown meal type: {} (expected one of breakfast, lunch, snack, dinner, supper)", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    pub foods: String,
    pub meal_type: MealType,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub nutrition: NutritionData,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HasImage for Meal {
    fn id(&self) -> &str {
        &self.id
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn set_image_url(&mut self, url: String) {
        self.image_url = Some(url);
    }
}

/// `GET /meals/summary?date=`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub total_meals: u32,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub totals: Option<NutritionData>,
}

/// `GET /meals/range`
#[derive(Debug, Default, Deserialize)]
pub struct MealsListResponse {
    #[serde(default)]
    pub meals: Vec<Meal>,
}

#[derive(Debug, Deserialize)]
pub struct MealResponse {
    pub meal: Meal,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
}

/// Body of `POST /meals`. A missing date lets the backend use today.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeal {
    pub foods: String,
    pub meal_type: MealType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewMeal {
    pub fn new(foods: impl Into<String>, meal_type: MealType) -> Self {
        Self {
            foods: foods.into(),
            meal_type,
            date: None,
            time: None,
            nutrition: None,
            image: None,
            image_url: None,
        }
    }

    pub fn with_image(mut self, image: Option<&ImageSource>) -> Self {
        self.image = image.and_then(ImageSource::upload).map(str::to_string);
        self.image_url = image.and_then(ImageSource::existing_url).map(str::to_string);
        self
    }
}

/// Body of `PUT /meals/:id`; only present fields change.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foods: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MealUpdate {
    pub fn time(time: impl Into<String>) -> Self {
        Self {
            time: Some(time.into()),
            ..Self::default()
        }
    }

    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: Option<&ImageSource>) -> Self {
        self.image = image.and_then(ImageSource::upload).map(str::to_string);
        self.image_url = image.and_then(ImageSource::existing_url).map(str::to_string);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_none()
            && self.meal_type.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.nutrition.is_none()
            && self.image.is_none()
            && self.image_url.is_none()
    }
}
