//! Stateful views over the backend. Every mutation is followed by a full
//! refresh, and refreshes are fenced so a late response never overwrites a
//! newer one. A failed refresh keeps the previous list and records `error`.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod async_slot;
pub mod favorites;
pub mod history;
pub mod meals;

pub use async_slot::{AsyncSlot, SlotState};
pub use favorites::{FavoritesState, FavoritesStore};
pub use history::{HistoryState, HistoryStore};
pub use meals::{MealsState, MealsStore};

/// Monotonic refresh counter of one store.
#[derive(Debug, Default)]
pub(crate) struct Generation(AtomicU64);

impl Generation {
    /// Starts a refresh and returns its ticket.
    pub(crate) fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}
