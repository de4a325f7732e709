use std::borrow::Cow;
use std::sync::Arc;

use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::session::Session;
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Percent-encodes an id for use as one path segment.
pub fn path_segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// HTTP client for the BFF. User headers come from the injected session.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &AppConfig, session: Arc<Session>) -> ClientResult<Self> {
        let mut builder = Client::builder().user_agent(concat!("vidasync/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absent session fields simply leave the header out.
    pub async fn user_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(user_id) = self.session.user_id().await {
            match user_id.parse::<HeaderValue>() {
                Ok(v) => {
                    headers.insert(USER_ID_HEADER, v);
                }
                Err(_) => warn!("stored user id is not a valid header value"),
            }
        }
        if let Some(token) = self.session.access_token().await {
            match token.parse::<HeaderValue>() {
                Ok(v) => {
                    headers.insert(ACCESS_TOKEN_HEADER, v);
                }
                Err(_) => warn!("stored access token is not a valid header value"),
            }
        }
        headers
    }

    /// Request without user headers (signup/login).
    pub fn public_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    pub async fn user_request(&self, method: Method, path: &str) -> RequestBuilder {
        let headers = self.user_headers().await;
        self.http.request(method, self.url(path)).headers(headers)
    }

    /// Sends and returns the status with the raw body, whatever the status.
    pub async fn send_raw(&self, req: RequestBuilder) -> ClientResult<(u16, String)> {
        let res = req.send().await?;
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        Ok((status, text))
    }

    async fn send_text(&self, method: Method, req: RequestBuilder, path: &str) -> ClientResult<String> {
        debug!(%method, path, "api request");
        let (status, text) = self.send_raw(req).await?;
        if !(200..300).contains(&status) {
            warn!(%method, path, status, "api error response");
            return Err(ClientError::http(status, &text));
        }
        Ok(text)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.user_request(Method::GET, path).await;
        let text = self.send_text(Method::GET, req, path).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// GET with `query` serialized into the query string.
    pub async fn get_json_query<Q, T>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.user_request(Method::GET, path).await.query(query);
        let text = self.send_text(Method::GET, req, path).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.user_request(Method::POST, path).await.json(body);
        let text = self.send_text(Method::POST, req, path).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.user_request(Method::PUT, path).await.json(body);
        let text = self.send_text(Method::PUT, req, path).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// An empty or unparseable success body yields `T::default()`.
    pub async fn delete_json<T>(&self, path: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let req = self.user_request(Method::DELETE, path).await;
        let text = self.send_text(Method::DELETE, req, path).await?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_escapes_reserved_characters() {
        assert_eq!(path_segment("m1"), "m1");
        assert_eq!(path_segment("a/b?c#d"), "a%2Fb%3Fc%23d");
        assert_eq!(path_segment("x y&z"), "x%20y%26z");
    }
}
