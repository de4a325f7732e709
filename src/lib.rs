//! Client core of VidaSync: talks to the BFF, keeps the session and the
//! local image cache, and exposes stateful stores for meals, favorites and
//! the history calendar.

pub mod api;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod favorites;
pub mod foods;
pub mod images;
pub mod meals;
pub mod nutrition;
pub mod state;
pub mod storage;
pub mod stores;

pub use error::{ClientError, ClientResult};
pub use state::AppState;
