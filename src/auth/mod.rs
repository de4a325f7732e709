pub mod dto;
pub mod services;
pub mod session;

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::error::ClientResult;

pub use dto::{AuthResponse, AuthUser, ProfileUpdate};
pub use services::translate_error;
pub use session::Session;

/// Login, signup and profile flows bound to the process session.
///
/// Errors are returned to the caller so it can show them inline.
#[derive(Clone)]
pub struct Auth {
    api: ApiClient,
    session: Arc<Session>,
}

impl Auth {
    pub fn new(api: ApiClient, session: Arc<Session>) -> Self {
        Self { api, session }
    }

    pub async fn current_user(&self) -> Option<AuthUser> {
        self.session.user().await
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<AuthUser> {
        let res = services::login(&self.api, username, password).await?;
        let user = self.session.persist(&res).await;
        info!(user_id = %user.user_id, "user logged in");
        Ok(user)
    }

    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        profile_image: Option<String>,
    ) -> ClientResult<AuthUser> {
        let res = services::signup(&self.api, username, password, profile_image).await?;
        let user = self.session.persist(&res).await;
        info!(user_id = %user.user_id, "user signed up");
        Ok(user)
    }

    /// An expired session is cleared locally before the error is returned.
    pub async fn update_profile(&self, params: &ProfileUpdate) -> ClientResult<AuthUser> {
        match services::update_profile(&self.api, params).await {
            Ok(res) => Ok(self.session.persist(&res).await),
            Err(e) => {
                if e.is_session_expired() {
                    self.session.clear().await;
                }
                Err(e)
            }
        }
    }

    pub async fn logout(&self) {
        self.session.clear().await;
        info!("user logged out");
    }
}
