#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Drives the public client over an in-memory cache and a mocked OA service.

use std::sync::Arc;

use httpmock::prelude::*;
use oa_auth::test_support::InMemoryCacheStore;
use oa_auth::{OaAuthConfig, build_client_with_store};
use oa_auth_sdk::{LoginRequest, OaAuthClient, OaAuthError, OutcomeKind};
use serde_json::json;

const OPEN_ID: &str = "ou_5f2a";

fn config(backend_url: String) -> OaAuthConfig {
    let mut cfg = OaAuthConfig {
        app_key: "crm".to_owned(),
        backend_url,
        frontend_url: "https://oa.example.com/#/authorize".to_owned(),
        ..OaAuthConfig::default()
    };
    cfg.redis.prefix = "oa_session_".to_owned();
    cfg
}

fn client(store: &Arc<InMemoryCacheStore>) -> Arc<dyn OaAuthClient> {
    build_client_with_store(&config(String::new()), store.clone()).unwrap()
}

#[tokio::test]
async fn permission_lifecycle_follows_cache() {
    let store = Arc::new(InMemoryCacheStore::new());
    let client = client(&store);
    let app_key = client.app_key().to_owned();
    let key = format!("zlj_oa_database_{OPEN_ID}-{app_key}");

    let outcome = client.check_access(OPEN_ID, &app_key, "/orders").await.unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Unauthenticated);

    store.insert(
        key.clone(),
        json!({"user": {"is_super_admin": 0}, "permissions": ["/orders"]}).to_string(),
    );
    let outcome = client.check_access(OPEN_ID, &app_key, "/orders").await.unwrap();
    assert!(outcome.is_allowed());
    let outcome = client.check_access(OPEN_ID, &app_key, "/invoices").await.unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Forbidden);

    store.insert(key.clone(), json!({"user": {"is_super_admin": 1}}).to_string());
    let outcome = client.check_access(OPEN_ID, &app_key, "/invoices").await.unwrap();
    assert!(outcome.is_allowed());

    store.remove(&key);
    let outcome = client.check_access(OPEN_ID, &app_key, "/invoices").await.unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Unauthenticated);
}

#[tokio::test]
async fn session_and_cached_user_share_the_session_key() {
    let store = Arc::new(InMemoryCacheStore::new());
    let client = client(&store);

    let live = client.check_session_live("t-1").await.unwrap();
    let user = client.get_cached_user("t-1").await.unwrap();
    assert_eq!(live.kind(), OutcomeKind::Unauthenticated);
    assert_eq!(user.kind(), OutcomeKind::Unauthenticated);

    store.insert("oa_session_t-1", r#"{"id":12,"nickname":"ann"}"#);
    let live = client.check_session_live("t-1").await.unwrap();
    let user = client.get_cached_user("t-1").await.unwrap();
    assert!(live.is_allowed());
    assert_eq!(user.data(), Some(&json!({"id": 12, "nickname": "ann"})));

    let wire = serde_json::to_value(&user).unwrap();
    assert_eq!(wire["code"], 1);
    assert_eq!(wire["state"], "000001");
}

#[tokio::test]
async fn cache_outage_is_an_error_not_a_denial() {
    let store = Arc::new(InMemoryCacheStore::new());
    store.set_unavailable(true);
    let client = client(&store);

    let err = client
        .check_access(OPEN_ID, "crm", "/orders")
        .await
        .unwrap_err();
    assert!(matches!(err, OaAuthError::CacheStore(_)), "got {err:?}");
}

#[tokio::test]
async fn remote_operations_forward_to_the_oa_service() {
    let server = MockServer::start_async().await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/authorization/login")
                .form_urlencoded_tuple("username", "ann");
            then.status(200)
                .json_body(json!({"code": 1, "data": {"token": "t-9"}}));
        })
        .await;
    let code = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/authorization/client_code");
            then.status(200).json_body(json!({"code": 1, "data": "c-77"}));
        })
        .await;

    let store = Arc::new(InMemoryCacheStore::new());
    let client = build_client_with_store(&config(server.base_url()), store).unwrap();

    let body = client
        .login(LoginRequest::new("ann", "pw".to_owned()))
        .await
        .unwrap();
    assert_eq!(body["data"]["token"], "t-9");

    let body = client.get_code().await.unwrap();
    let redirect = client
        .frontend_url_for_code(body["data"].as_str().unwrap())
        .unwrap();
    assert_eq!(redirect, "https://oa.example.com/#/authorize?code=c-77");

    login.assert_async().await;
    code.assert_async().await;
}
