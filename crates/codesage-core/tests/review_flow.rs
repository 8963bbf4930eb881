//! Review submission and history against a recording backend.

mod common;

use std::sync::Arc;

use codesage_core::models::Language;
use codesage_core::store::HISTORY_LIMIT;
use codesage_core::StoreError;

use common::{credentials, live_token, reopen, stores, RecordingBackend};

#[tokio::test]
async fn test_submit_issues_one_call_and_records_history() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, _dir) = stores(backend.clone());
    stores.session.login(credentials()).await.unwrap();

    let result = stores.submit("print('x')", Language::Python).await.unwrap();

    assert_eq!(result, "Looks fine");
    assert_eq!(backend.submits(), 1);
    assert_eq!(stores.review.reviewed_result(), "Looks fine");
    let history = stores.review.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].language, Language::Python);
    assert_eq!(history[0].input_code, "print('x')");
    assert_eq!(history[0].reviewed_result, "Looks fine");
}

#[tokio::test]
async fn test_empty_submit_never_reaches_backend() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, _dir) = stores(backend.clone());
    stores.session.login(credentials()).await.unwrap();

    let err = stores.submit("", Language::JavaScript).await.unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(stores.review.error(), Some("Please provide code to review."));
    assert!(!stores.review.loading());
    assert_eq!(backend.submits(), 0);
    assert!(stores.session.is_authenticated());
}

#[tokio::test]
async fn test_submit_without_session_requires_auth() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, _dir) = stores(backend.clone());

    let err = stores.submit("x = 1", Language::Python).await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(backend.submits(), 0);
}

#[tokio::test]
async fn test_history_holds_latest_ten() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, dir) = stores(backend.clone());
    stores.session.login(credentials()).await.unwrap();

    for i in 0..13 {
        stores
            .submit(&format!("let n = {i};"), Language::JavaScript)
            .await
            .unwrap();
    }

    let codes: Vec<&str> = stores
        .review
        .history()
        .iter()
        .map(|e| e.input_code.as_str())
        .collect();
    assert_eq!(codes.len(), HISTORY_LIMIT);
    assert_eq!(codes[0], "let n = 12;");
    assert_eq!(codes[HISTORY_LIMIT - 1], "let n = 3;");

    let restarted = reopen(backend, &dir);
    let restored: Vec<&str> = restarted
        .review
        .history()
        .iter()
        .map(|e| e.input_code.as_str())
        .collect();
    assert_eq!(restored, codes);
    assert_eq!(restarted.review.input_code(), "let n = 12;");
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let backend = Arc::new(RecordingBackend {
        reject_reviews: true,
        ..RecordingBackend::issuing(live_token())
    });
    let (mut stores, _dir) = stores(backend.clone());
    stores.session.login(credentials()).await.unwrap();

    let err = stores.submit("x", Language::Java).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(backend.submits(), 1);
    assert!(!stores.session.is_authenticated());
    assert!(stores.session.data().is_none());
}

#[tokio::test]
async fn test_fetch_then_delete_history() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, _dir) = stores(backend.clone());
    stores.session.login(credentials()).await.unwrap();
    stores.submit("a", Language::Python).await.unwrap();
    stores.submit("b", Language::Python).await.unwrap();

    stores.fetch_history().await.unwrap();
    let history = stores.review.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].reviewed_result, "archived");
    assert_eq!(history[0].input_code, "b");

    stores.delete_history().await.unwrap();
    assert!(stores.review.history().is_empty());
}

#[tokio::test]
async fn test_logout_and_clear_wipes_state() {
    let backend = Arc::new(RecordingBackend::issuing(live_token()));
    let (mut stores, dir) = stores(backend.clone());
    stores.session.login(credentials()).await.unwrap();
    stores.submit("a", Language::CSharp).await.unwrap();

    stores.logout_and_clear().unwrap();

    let restarted = reopen(backend, &dir);
    assert!(!restarted.session.is_authenticated());
    assert_eq!(restarted.review.input_code(), "");
    assert_eq!(restarted.review.language(), &Language::JavaScript);
    assert!(restarted.review.history().is_empty());
}
