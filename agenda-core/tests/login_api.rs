use std::time::Duration;

use agenda_core::auth::{Credentials, login, logout};
use agenda_core::session::{EMPLOYEE_ROLE, MemoryStorage, SessionStore, UserId};
use agenda_core::{AgendaError, ApiClient, SessionState};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
}

fn credentials() -> Credentials {
    Credentials {
        email: "ana@example.com".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn login_persists_token_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok",
            "user": {"id": 7, "name": "Ana", "roles": ["empleado"]}
        })))
        .mount(&server)
        .await;
    let session = SessionStore::new(MemoryStorage::new());

    let state = login(&api(&server), &session, &credentials()).await.unwrap();

    assert_eq!(state, SessionState::AuthenticatedEmployee);
    assert_eq!(session.token().as_deref(), Some("tok"));
    assert_eq!(session.user_id(), Some(UserId::Number(7)));
    assert!(session.has_role(EMPLOYEE_ROLE));
}

#[tokio::test]
async fn login_with_bare_roles_has_no_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "tok", "roles": ["empleado"]})),
        )
        .mount(&server)
        .await;
    let session = SessionStore::new(MemoryStorage::new());

    let state = login(&api(&server), &session, &credentials()).await.unwrap();

    assert_eq!(state, SessionState::AuthenticatedEmployee);
    assert_eq!(session.user_id(), None);
}

#[tokio::test]
async fn login_without_roles_grants_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
        .mount(&server)
        .await;
    let session = SessionStore::new(MemoryStorage::new());

    let state = login(&api(&server), &session, &credentials()).await.unwrap();

    assert_eq!(state, SessionState::AuthenticatedNonEmployee);
    assert!(!session.has_role(EMPLOYEE_ROLE));
}

#[tokio::test]
async fn missing_token_is_rejected_and_session_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;
    let session = SessionStore::new(MemoryStorage::new());

    let err = login(&api(&server), &session, &credentials()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let session = SessionStore::new(MemoryStorage::new());

    let err = login(&api(&server), &session, &credentials()).await.unwrap_err();

    assert_eq!(err, AgendaError::Unauthorized("Incorrect credentials".to_string()));
}

#[tokio::test]
async fn empty_password_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let session = SessionStore::new(MemoryStorage::new());
    let credentials = Credentials {
        password: String::new(),
        ..credentials()
    };

    let err = login(&api(&server), &session, &credentials).await.unwrap_err();

    assert!(matches!(err, AgendaError::Validation(_)));
}

#[tokio::test]
async fn logout_after_login_is_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok",
            "user": {"id": 7, "roles": ["empleado"]}
        })))
        .mount(&server)
        .await;
    let session = SessionStore::new(MemoryStorage::new());
    login(&api(&server), &session, &credentials()).await.unwrap();

    logout(&session).unwrap();

    assert!(!session.is_authenticated());
    assert!(!session.has_role(EMPLOYEE_ROLE));
    assert!(!session.has_role("admin"));
}
