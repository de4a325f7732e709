use std::future::Future;

use tokio::sync::Mutex;

use crate::error::ClientResult;

/// Observable state of an [`AsyncSlot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotState<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub loading: bool,
}

impl<T> Default for SlotState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
        }
    }
}

/// Single-slot cache for the result of an async operation.
///
/// Concurrent `execute` calls are neither coalesced nor fenced: each one
/// re-enters pending and the last to resolve owns the slot.
#[derive(Debug, Default)]
pub struct AsyncSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T: Clone> AsyncSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::default()),
        }
    }

    pub async fn snapshot(&self) -> SlotState<T> {
        self.state.lock().await.clone()
    }

    pub async fn data(&self) -> Option<T> {
        self.state.lock().await.data.clone()
    }

    /// Runs `fut`, storing either its value or its user-facing message.
    pub async fn execute<F>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        {
            let mut state = self.state.lock().await;
            *state = SlotState {
                data: None,
                error: None,
                loading: true,
            };
        }

        let result = fut.await;

        let mut state = self.state.lock().await;
        state.loading = false;
        match result {
            Ok(value) => {
                state.data = Some(value.clone());
                state.error = None;
                Some(value)
            }
            Err(e) => {
                state.data = None;
                state.error = Some(e.user_message());
                None
            }
        }
    }

    pub async fn reset(&self) {
        *self.state.lock().await = SlotState::default();
    }

    /// Jumps straight to success, e.g. when editing a record whose result is known.
    pub async fn set_data(&self, value: T) {
        *self.state.lock().await = SlotState {
            data: Some(value),
            error: None,
            loading: false,
        };
    }
}
