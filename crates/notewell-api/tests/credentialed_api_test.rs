//! End-to-end tests for a credentialed deployment: register/login/logout
//! with server-side sessions, and per-user note isolation over HTTP.

use std::sync::Arc;

use notewell_api::auth::SessionResolver;
use notewell_api::config::{ApiConfig, AuthMode, StorageBackend};
use notewell_api::{build_router, AppState};
use notewell_db::Storage;

/// Start the real router on an ephemeral port with in-memory storage and
/// session authentication.
async fn spawn_session_app() -> String {
    let storage = Storage::memory();
    let config = ApiConfig {
        storage_backend: StorageBackend::Memory,
        auth_mode: AuthMode::Session,
        rate_limit_enabled: false,
        ..ApiConfig::default()
    };

    let state = AppState {
        resolver: Arc::new(SessionResolver::new(storage.sessions.clone())),
        storage,
        config: Arc::new(config),
        rate_limiter: None,
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn register(
    client: &reqwest::Client,
    base: &str,
    name: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{base}/api/auth/register"))
        .json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "confirmPassword": password,
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_returns_profile_and_session() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    let response = register(&client, &base, "Ada", "ada@example.com", "lovelace1").await;
    assert_eq!(response.status(), 201);

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("register should set a session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("notewell_session="));
    assert!(cookie.contains("HttpOnly"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["name"], "Ada");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_register_validation_reports_fields() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/auth/register"))
        .json(&serde_json::json!({
            "name": "",
            "email": "no-at-sign",
            "password": "short",
            "confirmPassword": "other",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"confirmPassword"));
}

#[tokio::test]
async fn test_duplicate_email_conflicts_and_first_account_survives() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    let first = register(&client, &base, "First", "dup@example.com", "password1").await;
    assert_eq!(first.status(), 201);

    let second = register(&client, &base, "Second", "dup@example.com", "password2").await;
    assert_eq!(second.status(), 409);

    // The original credentials still log in; the impostor's never worked.
    let login = client
        .post(format!("{base}/api/auth/login"))
        .json(&serde_json::json!({ "email": "dup@example.com", "password": "password1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), 200);
    let body: serde_json::Value = login.json().await.unwrap();
    assert_eq!(body["user"]["name"], "First");

    let bad_login = client
        .post(format!("{base}/api/auth/login"))
        .json(&serde_json::json!({ "email": "dup@example.com", "password": "password2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_login.status(), 401);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    register(&client, &base, "Ada", "ada@example.com", "lovelace1").await;

    let wrong_password = client
        .post(format!("{base}/api/auth/login"))
        .json(&serde_json::json!({ "email": "ada@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    let unknown_email = client
        .post(format!("{base}/api/auth/login"))
        .json(&serde_json::json!({ "email": "nobody@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);

    let a: serde_json::Value = wrong_password.json().await.unwrap();
    let b: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(a["error"], b["error"]);
}

#[tokio::test]
async fn test_notes_require_authentication() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/api/notes")).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{base}/api/notes"))
        .bearer_auth("made-up-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_notes_are_invisible_across_users() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    let alice: serde_json::Value = register(&client, &base, "Alice", "alice@example.com", "password1")
        .await
        .json()
        .await
        .unwrap();
    let bob: serde_json::Value = register(&client, &base, "Bob", "bob@example.com", "password2")
        .await
        .json()
        .await
        .unwrap();
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    let note: serde_json::Value = client
        .post(format!("{base}/api/notes"))
        .bearer_auth(alice_token)
        .json(&serde_json::json!({ "title": "Private", "content": "secret" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = note["id"].as_i64().unwrap();

    // Bob sees not-found on every owner-scoped operation.
    for request in [
        client.get(format!("{base}/api/notes/{id}")),
        client
            .patch(format!("{base}/api/notes/{id}"))
            .json(&serde_json::json!({ "title": "stolen" })),
        client.delete(format!("{base}/api/notes/{id}")),
        client.patch(format!("{base}/api/notes/{id}/favorite")),
    ] {
        let response = request.bearer_auth(bob_token).send().await.unwrap();
        assert_eq!(response.status(), 404);
    }

    // Bob's listing is empty; Alice's note is untouched.
    let bobs_notes: Vec<serde_json::Value> = client
        .get(format!("{base}/api/notes"))
        .bearer_auth(bob_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(bobs_notes.is_empty());

    let alices_note: serde_json::Value = client
        .get(format!("{base}/api/notes/{id}"))
        .bearer_auth(alice_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alices_note["title"], "Private");
}

#[tokio::test]
async fn test_cookie_authentication() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = register(&client, &base, "Ada", "ada@example.com", "lovelace1")
        .await
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap();

    let profile: serde_json::Value = client
        .get(format!("{base}/api/auth/me"))
        .header("cookie", format!("notewell_session={token}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["email"], "ada@example.com");
}

#[tokio::test]
async fn test_logout_revokes_only_presented_session() {
    let base = spawn_session_app().await;
    let client = reqwest::Client::new();

    let registered: serde_json::Value =
        register(&client, &base, "Ada", "ada@example.com", "lovelace1")
            .await
            .json()
            .await
            .unwrap();
    let first_token = registered["token"].as_str().unwrap().to_string();

    // A second login establishes an independent session.
    let logged_in: serde_json::Value = client
        .post(format!("{base}/api/auth/login"))
        .json(&serde_json::json!({ "email": "ada@example.com", "password": "lovelace1" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second_token = logged_in["token"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{base}/api/auth/logout"))
        .bearer_auth(&first_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let cleared = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let revoked = client
        .get(format!("{base}/api/user"))
        .bearer_auth(&first_token)
        .send()
        .await
        .unwrap();
    assert_eq!(revoked.status(), 401);

    let still_valid = client
        .get(format!("{base}/api/user"))
        .bearer_auth(&second_token)
        .send()
        .await
        .unwrap();
    assert_eq!(still_valid.status(), 200);
}
