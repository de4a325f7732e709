use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ACCESS_TOKEN_HEADER, USER_ID_HEADER};
use crate::auth::dto::{AuthResponse, ErrorBody, LoginRequest, ProfileUpdate, SignupRequest};
use crate::error::{ClientError, ClientResult};

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap();
    static ref BARE_STATUS_RE: Regex = Regex::new(r"^erro \d+$").unwrap();
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// Maps common backend messages to what the app shows the user.
pub fn translate_error(msg: &str) -> String {
    let lower = msg.to_lowercase();
    if lower.contains("email") && lower.contains("invalid") {
        return "Nome de usuario invalido. Use apenas letras e numeros, comecando com uma letra."
            .into();
    }
    if lower.contains("already registered") || lower.contains("already exists") {
        return "Esse nome de usuario ja esta em uso.".into();
    }
    if lower.contains("rate limit") {
        return "Muitas tentativas. Aguarde um momento e tente novamente.".into();
    }
    if lower.contains("invalid login") || lower.contains("invalid credentials") {
        return "Usuario ou senha incorretos.".into();
    }
    if lower.contains("user not found") {
        return "Usuario nao encontrado.".into();
    }
    if lower.contains("not allowed") || lower.contains("not permitted") || lower.contains("forbidden")
    {
        return "Operacao nao permitida. Tente novamente mais tarde.".into();
    }
    if BARE_STATUS_RE.is_match(&lower) {
        return "Erro no servidor. Tente novamente mais tarde.".into();
    }
    msg.to_string()
}

/// `error` or `message` from a JSON body, else the raw text, else `Erro <status>`.
fn error_message(status: u16, text: &str) -> String {
    let fallback = format!("Erro {}", status);
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => body
            .error
            .filter(|m| !m.is_empty())
            .or(body.message.filter(|m| !m.is_empty()))
            .unwrap_or(fallback),
        Err(_) if !text.is_empty() => text.to_string(),
        Err(_) => fallback,
    }
}

fn auth_failure(status: u16, text: &str) -> ClientError {
    let message = translate_error(&error_message(status, text));
    warn!(status, %message, "auth request failed");
    ClientError::Http { status, message }
}

async fn post_public<B: Serialize>(api: &ApiClient, path: &str, body: &B) -> ClientResult<AuthResponse> {
    let req = api.public_request(Method::POST, path).json(body);
    let (status, text) = api.send_raw(req).await?;
    if !(200..300).contains(&status) {
        return Err(auth_failure(status, &text));
    }
    Ok(serde_json::from_str(&text)?)
}

#[instrument(skip(api, password, profile_image))]
pub async fn signup(
    api: &ApiClient,
    username: &str,
    password: &str,
    profile_image: Option<String>,
) -> ClientResult<AuthResponse> {
    let username = username.trim();
    if !is_valid_username(username) {
        return Err(ClientError::Validation(translate_error("invalid email")));
    }
    let body = SignupRequest {
        username: username.to_string(),
        password: password.to_string(),
        profile_image,
    };
    post_public(api, "/auth/signup", &body).await
}

#[instrument(skip(api, password))]
pub async fn login(api: &ApiClient, username: &str, password: &str) -> ClientResult<AuthResponse> {
    let body = LoginRequest {
        username: username.trim().to_string(),
        password: password.to_string(),
    };
    post_public(api, "/auth/login", &body).await
}

/// `PUT /auth/profile`. 401/403 mean the stored session is no longer valid.
#[instrument(skip(api, params))]
pub async fn update_profile(api: &ApiClient, params: &ProfileUpdate) -> ClientResult<AuthResponse> {
    let session = api.session();
    let user_id = session.user_id().await;
    let access_token = session.access_token().await;
    debug!(
        has_user = user_id.is_some(),
        has_token = access_token.is_some(),
        "updating profile"
    );

    let mut req = api.public_request(Method::PUT, "/auth/profile").json(params);
    if let Some(id) = user_id {
        req = req.header(USER_ID_HEADER, id);
    }
    if let Some(token) = access_token {
        req = req.header(ACCESS_TOKEN_HEADER, token);
    }

    let (status, text) = api.send_raw(req).await?;
    if status == 401 || status == 403 {
        warn!(status, "profile update rejected; session expired");
        return Err(ClientError::SessionExpired);
    }
    if !(200..300).contains(&status) {
        return Err(auth_failure(status, &text));
    }
    Ok(serde_json::from_str(&text)?)
}
