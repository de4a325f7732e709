use thiserror::Error;

use crate::foods::codec::FoodsError;

pub const SESSION_EXPIRED_MESSAGE: &str = "Sessao expirada. Faca login novamente.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Erro inesperado";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response. `message` is the body text or `Erro <status>`.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    /// 2xx response whose payload reported an error.
    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Foods(#[from] FoodsError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn http(status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("Erro {}", status)
        } else {
            body.to_string()
        };
        ClientError::Http { status, message }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }

    /// Message stored in a store's `error` slot.
    pub fn user_message(&self) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            msg
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
