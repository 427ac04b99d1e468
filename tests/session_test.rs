//! Session lifecycle against the in-memory store.

mod common;

use std::sync::Arc;

use mediahub_auth::{LoginRequest, PasswordHasher, RefreshCredential, SessionManager};
use mediahub_core::error::ErrorKind;
use mediahub_database::AccountStore;
use mediahub_entity::NewAccount;

use common::{FlakyAccountStore, PASSWORD, TestApp, login_by_username, test_config};

#[tokio::test]
async fn test_login_stores_the_returned_refresh_token() {
    let app = TestApp::new();
    let alice = app.account("alice").await;

    let result = app.sessions.login(login_by_username("alice")).await.unwrap();
    let tokens = result.tokens.expect("login returns tokens");

    let stored = app.reload(alice.id).await;
    assert_eq!(stored.refresh_token.as_deref(), Some(tokens.refresh_token.as_str()));

    let by_email = app
        .sessions
        .login(LoginRequest {
            username: None,
            email: Some("ALICE@example.com".into()),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();
    let second = by_email.tokens.unwrap();
    assert_ne!(second.refresh_token, tokens.refresh_token);
    assert_eq!(
        app.reload(alice.id).await.refresh_token.as_deref(),
        Some(second.refresh_token.as_str())
    );

    // The first session's refresh token was displaced by the second login.
    let err = app
        .sessions
        .refresh(&RefreshCredential::from_body(tokens.refresh_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_unknown_identity_and_wrong_password_look_the_same() {
    let app = TestApp::new();
    app.account("alice").await;

    let unknown = app
        .sessions
        .login(login_by_username("mallory"))
        .await
        .unwrap_err();
    let wrong = app
        .sessions
        .login(LoginRequest {
            password: "not the password".into(),
            ..login_by_username("alice")
        })
        .await
        .unwrap_err();

    assert_eq!(unknown.kind, ErrorKind::Unauthorized);
    assert_eq!(wrong.kind, ErrorKind::Unauthorized);
    assert_eq!(unknown.message, wrong.message);
}

#[tokio::test]
async fn test_rotated_refresh_token_cannot_be_replayed() {
    let app = TestApp::new();
    let alice = app.account("alice").await;
    let first = app
        .sessions
        .login(login_by_username("alice"))
        .await
        .unwrap()
        .tokens
        .unwrap();

    let rotated = app
        .sessions
        .refresh(&RefreshCredential::from_cookie(first.refresh_token.clone()))
        .await
        .unwrap()
        .tokens
        .unwrap();
    assert_ne!(rotated.refresh_token, first.refresh_token);

    let err = app
        .sessions
        .refresh(&RefreshCredential::from_cookie(first.refresh_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    // The replay attempt does not disturb the live session.
    assert_eq!(
        app.reload(alice.id).await.refresh_token.as_deref(),
        Some(rotated.refresh_token.as_str())
    );
    app.sessions
        .refresh(&RefreshCredential::from_body(rotated.refresh_token))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_exactly_one_winner() {
    let app = TestApp::new();
    let alice = app.account("alice").await;
    let token = app
        .sessions
        .login(login_by_username("alice"))
        .await
        .unwrap()
        .tokens
        .unwrap()
        .refresh_token;

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let sessions = Arc::clone(&app.sessions);
            let credential = RefreshCredential::from_body(token.clone());
            tokio::spawn(async move { sessions.refresh(&credential).await })
        })
        .collect();

    let mut winners = Vec::new();
    for attempt in futures::future::join_all(attempts).await {
        match attempt.expect("task should not panic") {
            Ok(result) => winners.push(result.tokens.unwrap()),
            Err(err) => assert_eq!(err.kind, ErrorKind::Unauthorized),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(
        app.reload(alice.id).await.refresh_token.as_deref(),
        Some(winners[0].refresh_token.as_str())
    );
}

#[tokio::test]
async fn test_logout_twice_is_a_no_op() {
    let app = TestApp::new();
    let alice = app.account("alice").await;
    let tokens = app
        .sessions
        .login(login_by_username("alice"))
        .await
        .unwrap()
        .tokens
        .unwrap();

    let first = app.sessions.logout(alice.id).await.unwrap();
    let second = app.sessions.logout(alice.id).await.unwrap();
    assert!(first.cookies.iter().all(|cookie| cookie.is_clear()));
    assert_eq!(first.cookies, second.cookies);
    assert!(app.reload(alice.id).await.refresh_token.is_none());

    let err = app
        .sessions
        .refresh(&RefreshCredential::from_body(tokens.refresh_token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_password_change_keeps_or_revokes_sessions() {
    let app = TestApp::new();
    let alice = app.account("alice").await;
    let tokens = app
        .sessions
        .login(login_by_username("alice"))
        .await
        .unwrap()
        .tokens
        .unwrap();

    let err = app
        .sessions
        .change_password(alice.id, "wrong old password", "a brand new secret")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    app.sessions
        .change_password(alice.id, PASSWORD, "a brand new secret")
        .await
        .unwrap();
    assert_eq!(
        app.reload(alice.id).await.refresh_token.as_deref(),
        Some(tokens.refresh_token.as_str())
    );

    let mut config = test_config();
    config.auth.revoke_sessions_on_password_change = true;
    let strict = TestApp::with_config(config);
    let bob = strict.account("bob").await;
    strict.sessions.login(login_by_username("bob")).await.unwrap();
    strict
        .sessions
        .change_password(bob.id, PASSWORD, "a brand new secret")
        .await
        .unwrap();
    assert!(strict.reload(bob.id).await.refresh_token.is_none());
}

#[tokio::test]
async fn test_failed_persistence_returns_no_tokens() {
    let config = test_config();
    let flaky = Arc::new(FlakyAccountStore::default());
    let hasher = PasswordHasher::new(&config.auth).unwrap();
    let alice = flaky
        .inner
        .create(NewAccount {
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: "Alice".into(),
            password_hash: hasher.hash_password(PASSWORD).unwrap(),
            avatar: None,
            cover_image: None,
        })
        .await
        .unwrap();

    let accounts: Arc<dyn AccountStore> = flaky.clone();
    let sessions = SessionManager::from_config(accounts, &config).unwrap();
    let token = sessions
        .login(login_by_username("alice"))
        .await
        .unwrap()
        .tokens
        .unwrap()
        .refresh_token;

    flaky.fail();

    let err = sessions.login(login_by_username("alice")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Upstream);
    assert!(err.is_retryable());

    let err = sessions
        .refresh(&RefreshCredential::from_body(token.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Upstream);

    // Nothing was rotated, so the session is still usable once the store recovers.
    let stored = flaky.inner.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.refresh_token.as_deref(), Some(token.as_str()));
}

#[tokio::test]
async fn test_login_response_never_leaks_secrets() {
    let app = TestApp::new();
    let alice = app.account("alice").await;
    let result = app.sessions.login(login_by_username("alice")).await.unwrap();

    let view = serde_json::to_string(&result.account).unwrap();
    let stored = app.reload(alice.id).await;
    assert!(!view.contains(stored.password_hash.as_phc()));
    assert!(!view.contains(stored.refresh_token.as_deref().unwrap()));
    assert!(!view.contains(PASSWORD));

    let authenticated = app
        .sessions
        .authenticate(&result.tokens.unwrap().access_token)
        .await
        .unwrap();
    assert_eq!(authenticated.id, alice.id);
}
