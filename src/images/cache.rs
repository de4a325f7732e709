//! Local meal-id -> image URI map.
//!
//! Some meal endpoints come back without `imageUrl`; the client remembers the
//! image it attached and fills the gap on read. A URL sent by the server always
//! wins over the cached one. Storage failures never surface: a failed read is an
//! empty cache and a failed write leaves the in-memory mirror authoritative.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

pub const MEAL_IMAGES_KEY: &str = "@vidasync:mealImages";

type ImageMap = HashMap<String, String>;

/// Anything with an id and an optional image, i.e. meals and favorites.
pub trait HasImage {
    fn id(&self) -> &str;
    fn image_url(&self) -> Option<&str>;
    fn set_image_url(&mut self, url: String);
}

pub struct MealImageCache {
    store: Arc<dyn KeyValueStore>,
    mirror: Mutex<Option<ImageMap>>,
}

impl MealImageCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            mirror: Mutex::new(None),
        }
    }

    async fn load(&self, slot: &mut Option<ImageMap>) {
        if slot.is_some() {
            return;
        }
        let map = match self.store.get_item(MEAL_IMAGES_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "meal image cache is corrupt; starting empty");
                ImageMap::new()
            }),
            Ok(None) => ImageMap::new(),
            Err(e) => {
                warn!(error = %e, "meal image cache read failed; starting empty");
                ImageMap::new()
            }
        };
        debug!(entries = map.len(), "meal image cache loaded");
        *slot = Some(map);
    }

    async fn save(&self, map: &ImageMap) {
        let raw = match serde_json::to_string(map) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "meal image cache serialize failed");
                return;
            }
        };
        if let Err(e) = self.store.set_item(MEAL_IMAGES_KEY, &raw).await {
            warn!(error = %e, "meal image cache write failed; keeping in memory");
        }
    }

    pub async fn cache_meal_image(&self, meal_id: &str, image_uri: &str) {
        let mut guard = self.mirror.lock().await;
        self.load(&mut guard).await;
        if let Some(map) = guard.as_mut() {
            map.insert(meal_id.to_string(), image_uri.to_string());
            self.save(map).await;
        }
    }

    pub async fn get_cached_meal_image(&self, meal_id: &str) -> Option<String> {
        let mut guard = self.mirror.lock().await;
        self.load(&mut guard).await;
        guard.as_ref().and_then(|m| m.get(meal_id).cloned())
    }

    pub async fn remove_cached_meal_image(&self, meal_id: &str) {
        let mut guard = self.mirror.lock().await;
        self.load(&mut guard).await;
        if let Some(map) = guard.as_mut() {
            if map.remove(meal_id).is_some() {
                self.save(map).await;
            }
        }
    }

    /// Fills missing or empty image URLs from the cache, in place.
    pub async fn inject_cached_images<T: HasImage>(&self, items: &mut [T]) {
        let mut guard = self.mirror.lock().await;
        self.load(&mut guard).await;
        let Some(map) = guard.as_ref() else {
            return;
        };
        for item in items.iter_mut() {
            let has_server_image = item.image_url().is_some_and(|u| !u.is_empty());
            if has_server_image {
                continue;
            }
            if let Some(uri) = map.get(item.id()) {
                item.set_image_url(uri.clone());
            }
        }
    }

    /// Drops every entry whose id is not in `active_ids`.
    ///
    /// `active_ids` must be every meal id whose photo should survive. Passing
    /// the ids of a single day or month evicts photos of all other dates.
    pub async fn cleanup_cache<S: AsRef<str>>(&self, active_ids: &[S]) -> usize {
        let active: HashSet<&str> = active_ids.iter().map(|s| s.as_ref()).collect();
        let mut guard = self.mirror.lock().await;
        self.load(&mut guard).await;
        let Some(map) = guard.as_mut() else {
            return 0;
        };
        let before = map.len();
        map.retain(|id, _| active.contains(id.as_str()));
        let removed = before - map.len();
        if removed > 0 {
            self.save(map).await;
        }
        removed
    }

    pub async fn len(&self) -> usize {
        let mut guard = self.mirror.lock().await;
        self.load(&mut guard).await;
        guard.as_ref().map_or(0, HashMap::len)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
