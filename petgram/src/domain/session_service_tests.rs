//! Tests for the session service.

use std::sync::Arc;

use rstest::rstest;
use serde_json::{Value, json};
use tokio::sync::watch;

use super::*;
use crate::domain::ports::{DocumentStoreError, MockAuthProvider, MockDocumentStore};
use crate::test_support::{identity, user_id};

fn make_service(
    auth: MockAuthProvider,
    store: MockDocumentStore,
) -> SessionService<MockAuthProvider, MockDocumentStore> {
    SessionService::new(Arc::new(auth), Arc::new(store))
}

fn credentials() -> Credentials {
    Credentials::try_from_parts("rex@example.test", "hunter22").expect("credentials shape")
}

fn stored_profile(username: &str, avatar: &str) -> Value {
    json!({ "username": username, "avatar": avatar })
}

#[tokio::test]
async fn sign_up_writes_seeded_profile_and_hydrates() {
    let mut auth = MockAuthProvider::new();
    auth.expect_create_identity()
        .times(1)
        .return_once(|_| Ok(identity("u1")));
    auth.expect_update_display_name()
        .withf(|uid, name| uid.as_ref() == "u1" && name == "Rex")
        .times(1)
        .return_once(|_, name| {
            let mut updated = identity("u1");
            updated.display_name = Some(name.to_owned());
            Ok(updated)
        });

    let expected = stored_profile("Rex", "https://picsum.photos/seed/Rex/48/48");
    let written = expected.clone();
    let mut store = MockDocumentStore::new();
    store
        .expect_write()
        .withf(move |path, value| path.as_str() == "users/u1" && value == &written)
        .times(1)
        .return_once(|_, _| Ok(()));
    store
        .expect_read()
        .times(1)
        .return_once(move |_| Ok(Some(expected)));

    let service = make_service(auth, store);
    let request = SignUpRequest::try_from_parts("rex@example.test", "hunter22", "Rex")
        .expect("request shape");
    let user = service.sign_up(&request).await.expect("sign up succeeds");

    assert_eq!(user.id().as_ref(), "u1");
    assert_eq!(user.username(), "Rex");
    assert_eq!(user.email(), "u1@example.test");
    assert_eq!(user.avatar(), "https://picsum.photos/seed/Rex/48/48");
}

#[rstest]
#[case(
    AuthProviderError::email_already_in_use("taken"),
    ErrorCode::DuplicateAccount,
    "User with this email already exists."
)]
#[case(
    AuthProviderError::from_provider_code("auth/weak-password", "Password too weak"),
    ErrorCode::AuthFailed,
    "Password too weak"
)]
#[case(
    AuthProviderError::from_provider_code("auth/internal-error", ""),
    ErrorCode::AuthFailed,
    "Failed to sign up."
)]
#[tokio::test]
async fn sign_up_maps_provider_failures(
    #[case] failure: AuthProviderError,
    #[case] code: ErrorCode,
    #[case] message: &str,
) {
    let mut auth = MockAuthProvider::new();
    auth.expect_create_identity()
        .times(1)
        .return_once(move |_| Err(failure));
    let service = make_service(auth, MockDocumentStore::new());
    let request = SignUpRequest::try_from_parts("rex@example.test", "hunter22", "Rex")
        .expect("request shape");

    let err = service.sign_up(&request).await.expect_err("sign up fails");
    assert_eq!(err.code(), code);
    assert_eq!(err.message(), message);
}

#[rstest]
#[case("auth/invalid-credential", ErrorCode::InvalidCredentials, "Invalid email or password.")]
#[case("auth/user-not-found", ErrorCode::InvalidCredentials, "Invalid email or password.")]
#[case("auth/wrong-password", ErrorCode::InvalidCredentials, "Invalid email or password.")]
#[case("auth/too-many-requests", ErrorCode::AuthFailed, "slow down")]
#[tokio::test]
async fn log_in_folds_credential_mismatches(
    #[case] code_text: &str,
    #[case] code: ErrorCode,
    #[case] message: &str,
) {
    let failure = AuthProviderError::from_provider_code(code_text, "slow down");
    let mut auth = MockAuthProvider::new();
    auth.expect_authenticate()
        .times(1)
        .return_once(move |_| Err(failure));
    let service = make_service(auth, MockDocumentStore::new());

    let err = service.log_in(&credentials()).await.expect_err("log in fails");
    assert_eq!(err.code(), code);
    assert_eq!(err.message(), message);
}

#[tokio::test]
async fn log_in_prefers_stored_profile_over_provider_fields() {
    let mut auth = MockAuthProvider::new();
    auth.expect_authenticate().times(1).return_once(|_| {
        let mut id = identity("u1");
        id.display_name = Some("Provider Name".to_owned());
        id.photo_url = Some("https://example.test/provider.png".to_owned());
        Ok(id)
    });
    let mut store = MockDocumentStore::new();
    store
        .expect_read()
        .times(1)
        .return_once(|_| Ok(Some(stored_profile("Stored", "https://example.test/stored.png"))));

    let service = make_service(auth, store);
    let user = service.log_in(&credentials()).await.expect("log in succeeds");
    assert_eq!(user.username(), "Stored");
    assert_eq!(user.avatar(), "https://example.test/stored.png");
}

#[tokio::test]
async fn hydrate_falls_back_to_provider_fields_for_blank_profile_values() {
    let mut store = MockDocumentStore::new();
    store
        .expect_read()
        .times(1)
        .return_once(|_| Ok(Some(json!({ "username": "", "avatar": null }))));
    let service = make_service(MockAuthProvider::new(), store);

    let mut id = identity("u1");
    id.display_name = Some("Provider Name".to_owned());
    let user = service.hydrate(&id).await.expect("hydrates");
    assert_eq!(user.username(), "Provider Name");
    assert_eq!(user.avatar(), "https://picsum.photos/seed/u1/48/48");
}

#[tokio::test]
async fn hydrate_creates_default_profile_when_missing() {
    let mut store = MockDocumentStore::new();
    store.expect_read().times(1).return_once(|_| Ok(None));
    store
        .expect_write()
        .withf(|path, value| {
            path.as_str() == "users/u9"
                && value == &stored_profile("User", "https://picsum.photos/seed/u9/48/48")
        })
        .times(1)
        .return_once(|_, _| Ok(()));
    let service = make_service(MockAuthProvider::new(), store);

    let mut id = identity("u9");
    id.email = None;
    let user = service.hydrate(&id).await.expect("hydrates");
    assert_eq!(user.username(), "User");
    assert_eq!(user.email(), "");
}

#[rstest]
#[case(DocumentStoreError::connection("offline"), true, ErrorCode::TransportFailure)]
#[case(DocumentStoreError::rejected("denied"), false, ErrorCode::WriteFailed)]
#[tokio::test]
async fn hydrate_reports_store_failures(
    #[case] failure: DocumentStoreError,
    #[case] on_read: bool,
    #[case] code: ErrorCode,
) {
    let mut store = MockDocumentStore::new();
    if on_read {
        store
            .expect_read()
            .times(1)
            .return_once(move |_| Err(failure));
    } else {
        store.expect_read().times(1).return_once(|_| Ok(None));
        store
            .expect_write()
            .times(1)
            .return_once(move |_, _| Err(failure));
    }
    let service = make_service(MockAuthProvider::new(), store);

    let err = service.hydrate(&identity("u1")).await.expect_err("hydration fails");
    assert_eq!(err.code(), code);
}

#[tokio::test]
async fn current_user_requires_a_session() {
    let mut auth = MockAuthProvider::new();
    auth.expect_current_identity().times(1).returning(|| None);
    let service = make_service(auth, MockDocumentStore::new());

    let err = service.current_user().await.expect_err("no session");
    assert_eq!(err.code(), ErrorCode::Unauthenticated);
}

#[rstest]
#[case(AuthProviderError::from_provider_code("auth/network-request-failed", "offline"), "offline")]
#[case(AuthProviderError::from_provider_code("auth/network-request-failed", " "), "Failed to log out.")]
#[tokio::test]
async fn log_out_reports_auth_failures(#[case] failure: AuthProviderError, #[case] message: &str) {
    let mut auth = MockAuthProvider::new();
    auth.expect_terminate_session()
        .times(1)
        .return_once(move || Err(failure));
    let service = make_service(auth, MockDocumentStore::new());

    let err = service.log_out().await.expect_err("log out fails");
    assert_eq!(err.code(), ErrorCode::AuthFailed);
    assert_eq!(err.message(), message);
}

#[tokio::test]
async fn session_events_follow_provider_changes_in_order() {
    let (tx, rx) = watch::channel(None);
    let mut auth = MockAuthProvider::new();
    auth.expect_session_changes().times(1).return_once(move || rx);
    let mut store = MockDocumentStore::new();
    store
        .expect_read()
        .returning(|_| Ok(Some(stored_profile("Zed", "https://example.test/z.png"))));
    let service = make_service(auth, store);

    let (subscription, mut events) = service.session_events();
    assert_eq!(events.recv().await, Some(None));

    tx.send_replace(Some(identity("uz")));
    let signed_in = events.recv().await.expect("event delivered");
    assert_eq!(signed_in.map(|u| u.id().clone()), Some(user_id("uz")));

    tx.send_replace(None);
    assert_eq!(events.recv().await, Some(None));

    subscription.unsubscribe();
    subscription.unsubscribe();
    assert_eq!(events.recv().await, None);
    assert!(!subscription.is_active());
}

#[tokio::test]
async fn subscription_skips_identities_that_fail_to_hydrate() {
    let (tx, rx) = watch::channel(Some(identity("broken")));
    let mut auth = MockAuthProvider::new();
    auth.expect_session_changes().times(1).return_once(move || rx);
    let mut store = MockDocumentStore::new();
    store
        .expect_read()
        .returning(|_| Err(DocumentStoreError::connection("offline")));
    let service = make_service(auth, store);

    let (_subscription, mut events) = service.session_events();
    tx.send_replace(None);
    assert_eq!(events.recv().await, Some(None));
}
