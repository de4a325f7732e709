pub mod cache;
pub mod source;

pub use cache::{HasImage, MealImageCache, MEAL_IMAGES_KEY};
pub use source::{load_image_file, ImageSource, ImageUpload};
