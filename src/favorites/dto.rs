use serde::{Deserialize, Serialize};

use crate::images::{HasImage, ImageSource};
use crate::nutrition::NutritionData;

/// Saved dish template. The meal type is chosen when it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub foods: String,
    #[serde(default)]
    pub nutrition: NutritionData,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl HasImage for Favorite {
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

#[derive(Debug, Default, Deserialize)]
pub struct FavoritesListResponse {
    #[serde(default)]
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteResponse {
    pub favorite: Favorite,
}

/// Body of `POST /favorites`: `imageUrl` for a hosted image, else `image`
/// (a data URI, or null for no photo).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub foods: String,
    pub nutrition: NutritionData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
}

impl NewFavorite {
    pub fn new(foods: impl Into<String>, nutrition: NutritionData, image: Option<&ImageSource>) -> Self {
        let (image_url, image) = match image {
            Some(ImageSource::Existing(url)) => (Some(url.clone()), None),
            Some(ImageSource::Upload(data)) => (None, Some(Some(data.clone()))),
            None => (None, Some(None)),
        };
        Self {
            foods: foods.into(),
            nutrition,
            image_url,
            image,
        }
    }
}
