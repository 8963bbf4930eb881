//! Session lifecycle across restarts: sign in, restore, expiry, logout.

mod common;

use std::sync::Arc;

use codesage_core::auth::SessionData;
use codesage_core::guard::{self, GuardDecision, Route};
use codesage_core::models::User;
use codesage_core::storage::{keys, LocalStorage};
use codesage_core::store::SessionStatus;

use common::{credentials, expired_token, live_token, reopen, stores, RecordingBackend};

fn persist_session(dir: &tempfile::TempDir, token: String) {
    let storage = LocalStorage::new(dir.path().to_path_buf()).unwrap();
    let data = SessionData::new(
        token,
        User {
            id: "65f1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
        },
    );
    storage.set_json(keys::SESSION, &data).unwrap();
}

#[tokio::test]
async fn test_login_persists_across_restart() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, dir) = stores(backend.clone());

    stores.session.login(credentials()).await.unwrap();
    assert!(stores.session.is_authenticated());
    assert_eq!(backend.logins(), 1);

    let restarted = reopen(backend.clone(), &dir);
    assert_eq!(restarted.session.status(), SessionStatus::Authenticated);
    assert_eq!(restarted.session.user().unwrap().username, "ada");
    assert_eq!(backend.logins(), 1);
}

#[test]
fn test_expired_session_is_cleared_on_restore() {
    let backend = Arc::new(RecordingBackend::default());
    let (_stores, dir) = stores(backend.clone());
    persist_session(&dir, expired_token());

    let restarted = reopen(backend, &dir);
    assert_eq!(restarted.session.status(), SessionStatus::Anonymous);
    assert_eq!(restarted.session.error(), Some("Token expired"));
    assert!(!dir.path().join(keys::SESSION).exists());
}

#[test]
fn test_corrupt_session_blob_is_treated_as_absent() {
    let backend = Arc::new(RecordingBackend::default());
    let (_stores, dir) = stores(backend.clone());
    std::fs::write(dir.path().join(keys::SESSION), "{not json").unwrap();

    let restarted = reopen(backend, &dir);
    assert_eq!(restarted.session.status(), SessionStatus::Anonymous);
    assert!(!dir.path().join(keys::SESSION).exists());
}

#[tokio::test]
async fn test_guard_follows_session() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, _dir) = stores(backend);

    let decide = |stores: &codesage_core::store::Stores, route| {
        guard::decide(route, stores.session.status(), stores.session.loading())
    };

    assert_eq!(decide(&stores, Route::CodeReviewer), GuardDecision::Redirect(Route::Auth));

    let job = stores.session.begin_login(credentials()).unwrap();
    assert_eq!(decide(&stores, Route::Auth), GuardDecision::Wait);

    let outcome = job.run().await;
    stores.session.finish_auth(outcome).unwrap();
    assert_eq!(decide(&stores, Route::Auth), GuardDecision::Redirect(Route::CodeReviewer));
    assert_eq!(decide(&stores, Route::History), GuardDecision::Allow);

    stores.session.logout();
    assert_eq!(decide(&stores, Route::History), GuardDecision::Redirect(Route::Auth));
}
