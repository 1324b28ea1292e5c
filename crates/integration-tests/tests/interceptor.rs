//! Integration tests for bearer token attachment.

#![allow(clippy::unwrap_used)]

use stockroom_integration_tests::{ADMIN, Endpoint, StubApi, product};

#[tokio::test]
async fn test_no_authorization_header_without_session() {
    let stub = StubApi::start(vec![product(1, "Lamp", "10")]).await;
    let app = stub.client();

    let products = app.products().list().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(stub.auth_headers(), vec![None]);
}

#[tokio::test]
async fn test_bearer_token_attached_after_login() {
    let stub = StubApi::start(vec![product(1, "Lamp", "10")]).await;
    let app = stub.logged_in(ADMIN).await;

    app.products().list().await.unwrap();

    let headers = stub.auth_headers();
    // login itself goes out before a token exists
    assert_eq!(headers.first(), Some(&None));
    assert_eq!(
        headers.last(),
        Some(&Some(format!("Bearer token-{}", ADMIN.0)))
    );
    assert_eq!(stub.hits(Endpoint::List), 1);
}

#[tokio::test]
async fn test_logout_stops_attaching_token() {
    let stub = StubApi::start(vec![product(1, "Lamp", "10")]).await;
    let app = stub.logged_in(ADMIN).await;

    app.nav_menu().on_logout().await.unwrap();
    app.products().list().await.unwrap();

    assert_eq!(stub.auth_headers().last(), Some(&None));
}

#[tokio::test]
async fn test_mutation_without_token_is_rejected_by_server() {
    let stub = StubApi::start(Vec::new()).await;
    let app = stub.client();

    let err = app
        .products()
        .delete(stockroom_core::ProductId::new(1))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
}
