//! Behavioural tests for the token store over the in-memory datastore.

use std::sync::Arc;

use oauth_store::error::{AUTHORIZATION_NOT_FOUND, CLIENT_NOT_FOUND};
use oauth_store::record::{AccessRecord, AuthorizeRecord};
use oauth_store::{AccessData, AuthorizeData, Client, Datastore, OAuthStorage, StoreError, TokenStore};
use oauth_store_memory::InMemoryDatastore;
use time::OffsetDateTime;
use time::macros::datetime;

// =============================================================================
// Fixtures
// =============================================================================

fn client() -> Client {
    Client::new("c1", "s", "https://app/cb")
}

fn authorize(code: &str) -> AuthorizeData {
    AuthorizeData {
        client: client(),
        code: code.to_string(),
        expires_in: 600,
        scope: "read".to_string(),
        redirect_uri: "https://app/cb".to_string(),
        state: "xyz".to_string(),
        created_at: datetime!(2024-05-01 12:00:00 UTC),
    }
}

fn access(access_token: &str, refresh_token: &str) -> AccessData {
    AccessData {
        client: client(),
        authorize_data: None,
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        expires_in: 3600,
        scope: "read".to_string(),
        redirect_uri: "https://app/cb".to_string(),
        created_at: datetime!(2024-05-01 12:01:00 UTC),
    }
}

fn store() -> TokenStore<InMemoryDatastore> {
    TokenStore::new(InMemoryDatastore::with_clients([client()]))
}

fn assert_validation(err: &StoreError, message: &str) {
    match err {
        StoreError::Validation { message: actual } => assert_eq!(actual, message),
        other => panic!("expected validation error, got {other:?}"),
    }
}

// =============================================================================
// Client Registry
// =============================================================================

#[tokio::test]
async fn get_client_returns_registered_client() {
    let store = store();
    let found = store.get_client("c1").await.unwrap();
    assert_eq!(found, client());
}

#[tokio::test]
async fn get_client_unknown_is_not_found() {
    let store = store();
    let err = store.get_client("nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn set_client_replaces_existing_client() {
    let store = store();
    let rotated = Client::new("c1", "s2", "https://app/new-cb");
    store.set_client("c1", &rotated).await.unwrap();

    assert_eq!(store.get_client("c1").await.unwrap(), rotated);
}

#[tokio::test]
async fn set_client_uses_id_argument_as_key() {
    let store = store();
    let mismatched = Client::new("other", "s2", "https://app/cb");
    store.set_client("c1", &mismatched).await.unwrap();

    let found = store.get_client("c1").await.unwrap();
    assert_eq!(found.id, "c1");
    assert_eq!(found.secret, "s2");
    assert!(store.get_client("other").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn set_client_unknown_id_is_not_found_and_creates_nothing() {
    let store = store();
    let err = store
        .set_client("c9", &Client::new("c9", "s", "https://x/cb"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(store.get_client("c9").await.unwrap_err().is_not_found());
    assert_eq!(store.datastore().client_count(), 1);
}

#[tokio::test]
async fn register_client_then_get() {
    let store = TokenStore::new(InMemoryDatastore::new());
    store.register_client(&client()).await.unwrap();
    assert_eq!(store.get_client("c1").await.unwrap(), client());

    let err = store.register_client(&client()).await.unwrap_err();
    assert!(err.is_storage());
}

// =============================================================================
// Authorization Code Store
// =============================================================================

#[tokio::test]
async fn authorize_round_trip_resolves_client() {
    let store = store();
    let data = authorize("code-1");
    store.save_authorize(&data).await.unwrap();

    let loaded = store.load_authorize("code-1").await.unwrap();
    assert_eq!(loaded, data);
    assert_eq!(loaded.client.secret, "s");
}

#[tokio::test]
async fn load_authorize_unknown_is_not_found() {
    let store = store();
    assert!(store.load_authorize("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn load_authorize_with_dangling_client_is_validation() {
    let store = store();
    let mut data = authorize("code-2");
    data.client = Client::new("ghost", "s", "https://app/cb");
    store.save_authorize(&data).await.unwrap();

    let err = store.load_authorize("code-2").await.unwrap_err();
    assert_validation(&err, CLIENT_NOT_FOUND);
}

#[tokio::test]
async fn remove_authorize_is_idempotent() {
    let store = store();
    store.save_authorize(&authorize("code-1")).await.unwrap();

    store.remove_authorize("code-1").await.unwrap();
    assert!(store.load_authorize("code-1").await.unwrap_err().is_not_found());

    store.remove_authorize("code-1").await.unwrap();
    store.remove_authorize("never-existed").await.unwrap();
}

#[tokio::test]
async fn authorize_expiry_is_derived() {
    let store = store();
    store.save_authorize(&authorize("code-1")).await.unwrap();
    let loaded = store.load_authorize("code-1").await.unwrap();

    assert_eq!(loaded.expire_at(), datetime!(2024-05-01 12:10:00 UTC));
    assert!(loaded.is_expired_at(OffsetDateTime::now_utc()));
    assert!(!loaded.is_expired_at(datetime!(2024-05-01 12:05:00 UTC)));
}

// =============================================================================
// Access / Refresh Token Store
// =============================================================================

#[tokio::test]
async fn access_round_trip_without_authorization() {
    let store = store();
    let data = access("tok-1", "ref-1");
    store.save_access(&data).await.unwrap();

    let loaded = store.load_access("tok-1").await.unwrap();
    assert_eq!(loaded, data);
    assert!(loaded.authorize_data.is_none());
}

#[tokio::test]
async fn access_round_trip_with_authorization_back_reference() {
    let store = store();
    let auth = authorize("code-1");
    store.save_authorize(&auth).await.unwrap();

    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(auth.clone()));
    store.save_access(&data).await.unwrap();

    let loaded = store.load_access("tok-1").await.unwrap();
    let back_ref = loaded
        .authorize_data
        .as_deref()
        .expect("authorization is hydrated");
    assert_eq!(back_ref, &auth);
    assert_eq!(loaded.authorization_code(), Some("code-1"));
}

#[tokio::test]
async fn save_access_with_unknown_client_writes_nothing() {
    let store = store();
    let mut data = access("tok-1", "ref-1");
    data.client = Client::new("ghost", "s", "https://app/cb");

    let err = store.save_access(&data).await.unwrap_err();
    assert_validation(&err, CLIENT_NOT_FOUND);
    assert!(store.load_access("tok-1").await.unwrap_err().is_not_found());
    assert!(store.load_refresh("ref-1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn save_access_with_unknown_authorization_writes_nothing() {
    let store = store();
    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(authorize("code-404")));

    let err = store.save_access(&data).await.unwrap_err();
    assert_validation(&err, AUTHORIZATION_NOT_FOUND);
    assert_eq!(store.datastore().access_count(), 0);
}

#[tokio::test]
async fn load_access_after_authorization_removed_is_validation() {
    let store = store();
    store.save_authorize(&authorize("code-1")).await.unwrap();

    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(authorize("code-1")));
    store.save_access(&data).await.unwrap();

    store.remove_authorize("code-1").await.unwrap();

    let err = store.load_access("tok-1").await.unwrap_err();
    assert_validation(&err, AUTHORIZATION_NOT_FOUND);
}

#[tokio::test]
async fn load_access_with_authorization_whose_client_vanished_is_validation() {
    let datastore = InMemoryDatastore::with_clients([client()]);
    let mut auth = authorize("code-1");
    auth.client = Client::new("ghost", "s", "https://app/cb");
    datastore
        .insert_authorize(&AuthorizeRecord::from_authorize(&auth))
        .await
        .unwrap();

    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(auth));
    datastore
        .insert_access(&AccessRecord::from_access(&data))
        .await
        .unwrap();

    let store = TokenStore::new(datastore);
    let err = store.load_access("tok-1").await.unwrap_err();
    assert_validation(&err, AUTHORIZATION_NOT_FOUND);
}

#[tokio::test]
async fn save_access_validation_is_transitive() {
    let store = store();
    let mut auth = authorize("code-1");
    auth.client = Client::new("ghost", "s", "https://app/cb");
    store.save_authorize(&auth).await.unwrap();

    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(auth));

    let err = store.save_access(&data).await.unwrap_err();
    assert_validation(&err, AUTHORIZATION_NOT_FOUND);
    assert!(store.load_access("tok-1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn load_access_with_dangling_client_is_validation() {
    let datastore = InMemoryDatastore::new();
    let record = AccessRecord::from_access(&access("tok-1", "ref-1"));
    datastore.insert_access(&record).await.unwrap();
    let store = TokenStore::new(datastore);

    let err = store.load_access("tok-1").await.unwrap_err();
    assert_validation(&err, CLIENT_NOT_FOUND);
    let err = store.load_refresh("ref-1").await.unwrap_err();
    assert_validation(&err, CLIENT_NOT_FOUND);
}

#[tokio::test]
async fn load_refresh_matches_load_access() {
    let store = store();
    store.save_authorize(&authorize("code-1")).await.unwrap();
    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(authorize("code-1")));
    store.save_access(&data).await.unwrap();

    let by_access = store.load_access("tok-1").await.unwrap();
    let by_refresh = store.load_refresh("ref-1").await.unwrap();
    assert_eq!(by_access, by_refresh);
}

#[tokio::test]
async fn remove_access_also_invalidates_refresh() {
    let store = store();
    store.save_access(&access("tok-1", "ref-1")).await.unwrap();

    store.remove_access("tok-1").await.unwrap();
    assert!(store.load_access("tok-1").await.unwrap_err().is_not_found());
    assert!(store.load_refresh("ref-1").await.unwrap_err().is_not_found());

    store.remove_access("tok-1").await.unwrap();
}

#[tokio::test]
async fn remove_refresh_also_invalidates_access() {
    let store = store();
    store.save_access(&access("tok-1", "ref-1")).await.unwrap();

    store.remove_refresh("ref-1").await.unwrap();
    assert!(store.load_refresh("ref-1").await.unwrap_err().is_not_found());
    assert!(store.load_access("tok-1").await.unwrap_err().is_not_found());

    store.remove_refresh("ref-1").await.unwrap();
}

#[tokio::test]
async fn empty_refresh_token_is_never_indexed() {
    let store = store();
    store.save_access(&access("tok-1", "")).await.unwrap();
    store.save_access(&access("tok-2", "")).await.unwrap();

    let err = store.load_refresh("").await.unwrap_err();
    assert!(err.is_not_found());

    store.remove_refresh("").await.unwrap();
    assert!(store.load_access("tok-1").await.is_ok());
    assert!(store.load_access("tok-2").await.is_ok());

    let loaded = store.load_access("tok-1").await.unwrap();
    assert!(!loaded.has_refresh_token());
}

#[tokio::test]
async fn load_unknown_tokens_are_not_found() {
    let store = store();
    assert!(store.load_access("missing").await.unwrap_err().is_not_found());
    assert!(store.load_refresh("missing").await.unwrap_err().is_not_found());
    store.remove_refresh("missing").await.unwrap();
}

#[tokio::test]
async fn removing_authorization_keeps_issued_tokens_until_loaded() {
    let store = store();
    store.save_authorize(&authorize("code-1")).await.unwrap();
    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(authorize("code-1")));
    store.save_access(&data).await.unwrap();

    store.remove_authorize("code-1").await.unwrap();

    // No cascade: the record is still there, it just no longer validates.
    assert!(store.datastore().get_access("tok-1").await.unwrap().is_some());
    assert!(store.load_refresh("ref-1").await.unwrap_err().is_validation());
}

#[tokio::test]
async fn code_exchange_scenario() {
    let store = store();

    store.save_authorize(&authorize("code-1")).await.unwrap();
    let auth = store.load_authorize("code-1").await.unwrap();
    assert_eq!(auth.scope, "read");
    assert_eq!(auth.client.id, "c1");

    let mut data = access("tok-1", "ref-1");
    data.authorize_data = Some(Box::new(auth));
    store.save_access(&data).await.unwrap();

    let loaded = store.load_access("tok-1").await.unwrap();
    assert_eq!(loaded.authorization_code(), Some("code-1"));
    assert_eq!(loaded.client.id, "c1");

    let refreshed = store.load_refresh("ref-1").await.unwrap();
    assert_eq!(refreshed.access_token, "tok-1");
}

#[tokio::test]
async fn refresh_token_carried_by_another_access_token_is_rejected() {
    let store = store();
    store.save_access(&access("tok-1", "ref-x")).await.unwrap();

    let err = store.save_access(&access("tok-2", "ref-x")).await.unwrap_err();
    assert!(err.is_storage());
    assert!(err.to_string().contains("already exists"));
    assert!(store.load_access("tok-2").await.unwrap_err().is_not_found());

    store.remove_access("tok-2").await.unwrap();
    assert_eq!(store.load_refresh("ref-x").await.unwrap().access_token, "tok-1");

    store.remove_refresh("ref-x").await.unwrap();
    assert!(store.load_access("tok-1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn duplicate_codes_and_access_tokens_are_rejected() {
    let store = store();
    store.save_authorize(&authorize("code-1")).await.unwrap();

    let mut other = authorize("code-1");
    other.scope = "write".to_string();
    assert!(store.save_authorize(&other).await.unwrap_err().is_storage());
    assert_eq!(store.load_authorize("code-1").await.unwrap().scope, "read");

    store.save_access(&access("tok-1", "ref-1")).await.unwrap();
    assert!(store.save_access(&access("tok-1", "ref-2")).await.unwrap_err().is_storage());
    assert!(store.load_refresh("ref-2").await.unwrap_err().is_not_found());
    assert_eq!(store.load_refresh("ref-1").await.unwrap().access_token, "tok-1");
}

#[tokio::test]
async fn clock_timestamps_round_trip_exactly() {
    let store = store();
    let mut auth = authorize("code-1");
    auth.created_at = OffsetDateTime::now_utc();
    store.save_authorize(&auth).await.unwrap();
    assert_eq!(store.load_authorize("code-1").await.unwrap(), auth);

    let mut data = access("tok-1", "ref-1");
    data.created_at = OffsetDateTime::now_utc();
    store.save_access(&data).await.unwrap();
    assert_eq!(store.load_refresh("ref-1").await.unwrap(), data);
}

// =============================================================================
// Lifecycle and concurrency
// =============================================================================

#[tokio::test]
async fn closed_store_reports_connection_errors() {
    let store = store();
    store.ping().await.unwrap();
    store.close().await;

    let err = store.get_client("c1").await.unwrap_err();
    assert!(err.is_connection());
    assert!(err.is_transient());
}

#[tokio::test]
async fn concurrent_saves_and_loads() {
    let store = store();

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let token = format!("tok-{i}");
            let refresh = format!("ref-{i}");
            store.save_access(&access(&token, &refresh)).await?;
            let loaded = store.load_refresh(&refresh).await?;
            assert_eq!(loaded.access_token, token);
            store.remove_access(&token).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(store.datastore().access_count(), 0);
}

#[tokio::test]
async fn usable_as_trait_object() {
    let storage: oauth_store::DynOAuthStorage = Arc::new(store());
    storage.save_access(&access("tok-1", "ref-1")).await.unwrap();
    assert_eq!(storage.load_refresh("ref-1").await.unwrap().access_token, "tok-1");
}
