//! Integration tests for the shared product list fetch.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use stockroom_client::ClientError;
use stockroom_core::ProductId;
use stockroom_integration_tests::{Endpoint, StubApi, product};

fn catalog() -> Vec<stockroom_core::Product> {
    vec![
        product(1, "Lamp", "10"),
        product(2, "Desk", "120.50"),
        product(3, "Chair", "45"),
    ]
}

#[tokio::test]
async fn test_list_is_fetched_once_and_reused() {
    let stub = StubApi::start(catalog()).await;
    let app = stub.client();

    let first = app.products().list().await.unwrap();
    let second = app.products().list().await.unwrap();

    assert_eq!(first.len(), 3);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(stub.hits(Endpoint::List), 1);
}

#[tokio::test]
async fn test_concurrent_lists_share_one_request() {
    let stub = StubApi::start(catalog()).await;
    stub.set_list_delay(Duration::from_millis(200));
    let app = stub.client();

    let (a, b) = tokio::join!(app.products().list(), app.products().list());

    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(stub.hits(Endpoint::List), 1);
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let stub = StubApi::start(catalog()).await;
    let app = stub.client();

    app.products().list().await.unwrap();
    app.products().invalidate().await;
    app.products().list().await.unwrap();

    assert_eq!(stub.hits(Endpoint::List), 2);
}

#[tokio::test]
async fn test_invalidate_does_not_cancel_pending_fetch() {
    let stub = StubApi::start(catalog()).await;
    stub.set_list_delay(Duration::from_millis(200));
    let app = stub.client();

    let products = app.products().clone();
    let pending = tokio::spawn(async move { products.list().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.products().invalidate().await;

    assert_eq!(pending.await.unwrap().unwrap().len(), 3);
    assert_eq!(stub.hits(Endpoint::List), 1);
}

#[tokio::test]
async fn test_dropped_caller_does_not_abort_fetch() {
    let stub = StubApi::start(catalog()).await;
    stub.set_list_delay(Duration::from_millis(200));
    let app = stub.client();

    let products = app.products().clone();
    let abandoned = tokio::spawn(async move { products.list().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    abandoned.abort();

    // joins the fetch that is still on the wire
    let list = app.products().list().await.unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(stub.hits(Endpoint::List), 1);
}

#[tokio::test]
async fn test_failed_fetch_is_not_memoized() {
    let stub = StubApi::start(catalog()).await;
    stub.fail_next_lists(1);
    let app = stub.client();

    let err = app.products().list().await.unwrap_err();
    assert!(matches!(err, ClientError::Fetch(_)));
    assert!(err.to_string().contains("500"));

    let list = app.products().list().await.unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(stub.hits(Endpoint::List), 2);
}

#[tokio::test]
async fn test_concurrent_callers_share_a_failure() {
    let stub = StubApi::start(catalog()).await;
    stub.set_list_delay(Duration::from_millis(100));
    stub.fail_next_lists(1);
    let app = stub.client();

    let (a, b) = tokio::join!(app.products().list(), app.products().list());

    assert!(a.is_err());
    assert!(b.is_err());
    assert_eq!(stub.hits(Endpoint::List), 1);
}

#[tokio::test]
async fn test_failure_after_abandoned_fetch_is_refetched() {
    let stub = StubApi::start(catalog()).await;
    stub.set_list_delay(Duration::from_millis(100));
    stub.fail_next_lists(1);
    let app = stub.client();

    let products = app.products().clone();
    let abandoned = tokio::spawn(async move { products.list().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    abandoned.abort();
    // the failing fetch finishes with nobody awaiting it
    tokio::time::sleep(Duration::from_millis(300)).await;

    let list = app.products().list().await.unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(stub.hits(Endpoint::List), 2);
}

#[tokio::test]
async fn test_get_by_id_uses_cached_list() {
    let stub = StubApi::start(catalog()).await;
    let app = stub.client();

    let desk = app.products().get_by_id(ProductId::new(2)).await.unwrap();
    let missing = app.products().get_by_id(ProductId::new(99)).await.unwrap();

    assert_eq!(desk.unwrap().name, "Desk");
    assert!(missing.is_none());
    assert_eq!(stub.hits(Endpoint::List), 1);
}

#[tokio::test]
async fn test_mutations_leave_cache_alone() {
    let stub = StubApi::start(catalog()).await;
    let app = stub.logged_in(stockroom_integration_tests::ADMIN).await;

    app.products().list().await.unwrap();
    app.products().delete(ProductId::new(1)).await.unwrap();
    let cached = app.products().list().await.unwrap();

    // stale until someone invalidates
    assert_eq!(cached.len(), 3);
    assert_eq!(stub.products().len(), 2);
    assert_eq!(stub.hits(Endpoint::List), 1);
}
