use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use vidasync::auth::session::{ACCESS_TOKEN_KEY, USER_ID_KEY};
use vidasync::auth::ProfileUpdate;
use vidasync::config::AppConfig;
use vidasync::favorites::get_favorites;
use vidasync::meals::get_day_summary;
use vidasync::nutrition::get_nutrition;
use vidasync::storage::{FileStore, KeyValueStore, MemoryStore};
use vidasync::{AppState, ClientError};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_with_memory(server: &MockServer) -> (AppState, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let config = Arc::new(AppConfig::for_base_url(server.uri(), "unused"));
    let state = AppState::from_parts(config, memory.clone() as Arc<dyn KeyValueStore>)
        .expect("state builds");
    (state, memory)
}

async fn mount_login(server: &MockServer, token: Option<&str>) {
    let mut body = json!({"userId": "u1", "username": "ana", "profileImageUrl": null});
    if let Some(token) = token {
        body["accessToken"] = json!(token);
    }
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": "ana", "password": "segredo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn user_headers_follow_the_session() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, Some("tok-1")).await;
    Mock::given(method("GET"))
        .and(path("/meals/summary"))
        .and(query_param("date", "2026-02-01"))
        .and(header("x-user-id", "u1"))
        .and(header("x-access-token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meals": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (state, _) = state_with_memory(&server);
    state.auth().login("ana", "segredo").await?;
    let summary = get_day_summary(&state.api, "2026-02-01").await?;
    assert!(summary.meals.is_empty());
    assert!(summary.totals.is_none());

    let requests = server.received_requests().await.unwrap();
    let login = &requests[0];
    assert!(login.headers.get("x-user-id").is_none());
    Ok(())
}

#[tokio::test]
async fn headers_are_omitted_without_a_session() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"favorites": []})))
        .mount(&server)
        .await;

    let (state, _) = state_with_memory(&server);
    assert!(get_favorites(&state.api).await?.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-user-id").is_none());
    assert!(requests[0].headers.get("x-access-token").is_none());
    Ok(())
}

#[tokio::test]
async fn error_status_with_empty_body_becomes_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (state, _) = state_with_memory(&server);
    match get_favorites(&state.api).await {
        Err(ClientError::Http { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Erro 502");
        }
        other => panic!("unexpected result: {:?}", other.map(|f| f.len())),
    }
}

#[tokio::test]
async fn login_failure_is_translated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid login credentials"})),
        )
        .mount(&server)
        .await;

    let (state, _) = state_with_memory(&server);
    let err = state.auth().login("ana", "errada").await.unwrap_err();
    assert_eq!(err.user_message(), "Usuario ou senha incorretos.");
    assert!(state.session.user().await.is_none());
}

#[tokio::test]
async fn signup_rejects_bad_username_before_any_request() {
    let server = MockServer::start().await;
    let (state, _) = state_with_memory(&server);

    let err = state.auth().signup("1ana", "segredo", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn expired_session_on_profile_update_clears_storage() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, Some("tok-1")).await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .and(header("x-user-id", "u1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("jwt expired"))
        .mount(&server)
        .await;

    let (state, memory) = state_with_memory(&server);
    let auth = state.auth();
    auth.login("ana", "segredo").await?;
    assert_eq!(memory.raw(USER_ID_KEY).await.as_deref(), Some("u1"));

    let params = ProfileUpdate {
        username: Some("anab".into()),
        ..ProfileUpdate::default()
    };
    let err = auth.update_profile(&params).await.unwrap_err();
    assert!(err.is_session_expired());
    assert_eq!(err.user_message(), "Sessao expirada. Faca login novamente.");
    assert!(auth.current_user().await.is_none());
    assert_eq!(memory.raw(USER_ID_KEY).await, None);
    assert_eq!(memory.raw(ACCESS_TOKEN_KEY).await, None);
    Ok(())
}

#[tokio::test]
async fn profile_update_keeps_token_when_response_has_none() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, Some("tok-1")).await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .and(body_json(json!({"username": "anab"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"userId": "u1", "username": "anab"})),
        )
        .mount(&server)
        .await;

    let (state, memory) = state_with_memory(&server);
    let auth = state.auth();
    auth.login("ana", "segredo").await?;
    let user = auth
        .update_profile(&ProfileUpdate {
            username: Some("anab".into()),
            ..ProfileUpdate::default()
        })
        .await?;
    assert_eq!(user.username, "anab");
    assert_eq!(state.session.access_token().await.as_deref(), Some("tok-1"));
    assert_eq!(memory.raw(ACCESS_TOKEN_KEY).await.as_deref(), Some("tok-1"));
    Ok(())
}

#[tokio::test]
async fn nutrition_payload_error_and_missing_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nutrition/calories"))
        .and(body_json(json!({"foods": "pedra"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"nutrition": null, "error": "Alimento não reconhecido"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/nutrition/calories"))
        .and(body_json(json!({"foods": "ar"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": null})))
        .mount(&server)
        .await;

    let (state, _) = state_with_memory(&server);
    let err = get_nutrition(&state.api, "pedra").await.unwrap_err();
    assert!(matches!(err, ClientError::Backend(ref m) if m == "Alimento não reconhecido"));

    let err = get_nutrition(&state.api, "ar").await.unwrap_err();
    assert_eq!(err.user_message(), "Resposta inválida do servidor");
}

#[tokio::test]
async fn session_survives_restart_through_file_store() -> Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, Some("tok-9")).await;
    let dir = tempfile::tempdir()?;
    let config = Arc::new(AppConfig::for_base_url(server.uri(), dir.path()));

    let first = AppState::from_parts(
        config.clone(),
        Arc::new(FileStore::new(config.storage_path())) as Arc<dyn KeyValueStore>,
    )?;
    first.auth().login("ana", "segredo").await?;

    let second = AppState::from_parts(
        config.clone(),
        Arc::new(FileStore::new(config.storage_path())) as Arc<dyn KeyValueStore>,
    )?;
    assert!(second.session.user().await.is_none());
    let user = second.session.load().await.expect("restored user");
    assert_eq!(user.user_id, "u1");
    assert_eq!(second.session.access_token().await.as_deref(), Some("tok-9"));

    second.logout().await;
    let third = AppState::from_parts(
        config.clone(),
        Arc::new(FileStore::new(config.storage_path())) as Arc<dyn KeyValueStore>,
    )?;
    assert!(third.session.load().await.is_none());
    Ok(())
}
