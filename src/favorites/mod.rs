pub mod dto;
pub mod services;

pub use dto::{Favorite, NewFavorite};
pub use services::{create_favorite, delete_favorite, get_favorites};
