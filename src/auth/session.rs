use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::dto::{AuthResponse, AuthUser};
use crate::storage::KeyValueStore;

pub const USER_ID_KEY: &str = "@vidasync:userId";
pub const USERNAME_KEY: &str = "@vidasync:username";
pub const PROFILE_IMAGE_KEY: &str = "@vidasync:profileImageUrl";
pub const ACCESS_TOKEN_KEY: &str = "@vidasync:accessToken";

const ALL_KEYS: [&str; 4] = [USER_ID_KEY, USERNAME_KEY, PROFILE_IMAGE_KEY, ACCESS_TOKEN_KEY];

#[derive(Debug, Clone, Default)]
struct SessionData {
    user: Option<AuthUser>,
    access_token: Option<String>,
}

/// Process-scoped login state.
///
/// `load` restores it from storage once at startup, `persist` records a fresh
/// auth response and `clear` tears it down on logout or expiry. Storage
/// failures are logged; the in-memory copy stays the source of truth.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    data: RwLock<SessionData>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            data: RwLock::new(SessionData::default()),
        }
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get_item(key).await {
            Ok(v) => v.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(error = %e, key, "session read failed");
                None
            }
        }
    }

    pub async fn load(&self) -> Option<AuthUser> {
        let user_id = self.read_key(USER_ID_KEY).await;
        let username = self.read_key(USERNAME_KEY).await;
        let mut data = SessionData::default();
        if let (Some(user_id), Some(username)) = (user_id, username) {
            data.user = Some(AuthUser {
                user_id,
                username,
                profile_image_url: self.read_key(PROFILE_IMAGE_KEY).await,
            });
            data.access_token = self.read_key(ACCESS_TOKEN_KEY).await;
        }
        debug!(logged_in = data.user.is_some(), "session restored");
        let user = data.user.clone();
        *self.data.write().await = data;
        user
    }

    /// Keeps the previous token when the response carries none.
    pub async fn persist(&self, res: &AuthResponse) -> AuthUser {
        let user = res.user();
        let mut writes = vec![
            self.store.set_item(USER_ID_KEY, &res.user_id).await,
            self.store.set_item(USERNAME_KEY, &res.username).await,
        ];
        writes.push(match &res.profile_image_url {
            Some(url) => self.store.set_item(PROFILE_IMAGE_KEY, url).await,
            None => self.store.remove_item(PROFILE_IMAGE_KEY).await,
        });
        if let Some(token) = &res.access_token {
            writes.push(self.store.set_item(ACCESS_TOKEN_KEY, token).await);
        }
        for e in writes.into_iter().filter_map(Result::err) {
            warn!(error = %e, "session write failed");
        }

        let mut data = self.data.write().await;
        data.user = Some(user.clone());
        if res.access_token.is_some() {
            data.access_token = res.access_token.clone();
        }
        user
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.multi_remove(&ALL_KEYS).await {
            warn!(error = %e, "session clear failed");
        }
        *self.data.write().await = SessionData::default();
    }

    pub async fn user(&self) -> Option<AuthUser> {
        self.data.read().await.user.clone()
    }

    pub async fn user_id(&self) -> Option<String> {
        self.data.read().await.user.as_ref().map(|u| u.user_id.clone())
    }

    pub async fn access_token(&self) -> Option<String> {
        self.data.read().await.access_token.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.data.read().await.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn response(token: Option<&str>, image: Option<&str>) -> AuthResponse {
        AuthResponse {
            user_id: "u-1".into(),
            username: "ana".into(),
            profile_image_url: image.map(Into::into),
            access_token: token.map(Into::into),
        }
    }

    #[tokio::test]
    async fn persist_then_reload() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        session
            .persist(&response(Some("tok"), Some("https://x/p.jpg")))
            .await;

        let restored = Session::new(store);
        let user = restored.load().await.expect("user restored");
        assert_eq!(user.username, "ana");
        assert_eq!(user.profile_image_url.as_deref(), Some("https://x/p.jpg"));
        assert_eq!(restored.access_token().await.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn persist_without_token_keeps_previous() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        session.persist(&response(Some("tok"), Some("https://x/p.jpg"))).await;
        session.persist(&response(None, None)).await;

        assert_eq!(session.access_token().await.as_deref(), Some("tok"));
        assert!(store.raw(PROFILE_IMAGE_KEY).await.is_none());
    }

    #[tokio::test]
    async fn load_requires_id_and_username() {
        let store = Arc::new(MemoryStore::with_items([(USER_ID_KEY, "u-1")]));
        let session = Session::new(store);
        assert!(session.load().await.is_none());
        assert!(!session.is_logged_in().await);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        session.persist(&response(Some("tok"), None)).await;
        session.clear().await;

        assert!(session.user().await.is_none());
        assert!(session.access_token().await.is_none());
        for key in ALL_KEYS {
            assert!(store.raw(key).await.is_none());
        }
    }

    #[tokio::test]
    async fn write_failure_keeps_memory_state() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let session = Session::new(store);
        session.persist(&response(Some("tok"), None)).await;
        assert_eq!(session.user_id().await.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn read_failure_is_logged_out() {
        let store = Arc::new(MemoryStore::with_items([
            (USER_ID_KEY, "u-1"),
            (USERNAME_KEY, "ana"),
        ]));
        store.set_fail_reads(true);
        let session = Session::new(store);
        assert!(session.load().await.is_none());
    }
}
