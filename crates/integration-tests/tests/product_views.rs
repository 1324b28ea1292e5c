//! Integration tests for the product list and details views.

#![allow(clippy::unwrap_used)]

use stockroom_client::ClientError;
use stockroom_client::views::PAGE_SIZE;
use stockroom_core::{ProductForm, ProductId};
use stockroom_integration_tests::{ADMIN, CUSTOMER, Endpoint, ErrorEvents, StubApi, product};

fn lamp_form() -> ProductForm {
    ProductForm {
        name: "Desk Lamp".to_string(),
        price: "24.50".to_string(),
        description: "Warm white".to_string(),
        image_url: "https://img.example.com/lamp.png".to_string(),
        out_of_stock: false,
    }
}

#[tokio::test]
async fn test_rows_are_newest_first() {
    let stub = StubApi::start(vec![
        product(2, "Desk", "120"),
        product(7, "Shelf", "60"),
        product(4, "Chair", "45"),
    ])
    .await;
    let app = stub.logged_in(CUSTOMER).await;

    let mut view = app.product_list();
    view.load().await.unwrap();

    let ids: Vec<i32> = view.rows().iter().map(|p| p.product_id.as_i32()).collect();
    assert_eq!(ids, vec![7, 4, 2]);
}

#[tokio::test]
async fn test_render_pages_and_hides_actions_from_customers() {
    let products = (1..=10).map(|i| product(i, &format!("Item {i}"), "1")).collect();
    let stub = StubApi::start(products).await;
    let app = stub.logged_in(CUSTOMER).await;

    let mut view = app.product_list();
    view.load().await.unwrap();

    assert_eq!(view.page_count(), 2);
    let first = view.render(1);
    assert!(first.contains("Page 1 of 2 (10 products)"));
    assert!(first.contains("Item 10"));
    assert!(!first.contains("Item 1 "));
    assert!(!first.contains("Actions:"));

    let second = view.render(5);
    assert!(second.contains("Page 2 of 2"));
    assert_eq!(second.matches("Item ").count(), 10 - PAGE_SIZE);
}

#[tokio::test]
async fn test_add_refreshes_the_list() {
    let stub = StubApi::start(vec![product(1, "Desk", "120")]).await;
    let app = stub.logged_in(ADMIN).await;

    let mut view = app.product_list();
    view.load().await.unwrap();
    assert!(view.render(1).contains("Actions:"));

    let created = view.on_add(&lamp_form()).await.unwrap();

    assert_eq!(created.product_id, ProductId::new(2));
    assert_eq!(stub.hits(Endpoint::Insert), 1);
    assert_eq!(stub.hits(Endpoint::List), 2);
    assert_eq!(view.rows().first().unwrap().name, "Desk Lamp");
    assert_eq!(view.rows().len(), 2);
}

#[tokio::test]
async fn test_invalid_form_is_never_submitted() {
    let stub = StubApi::start(Vec::new()).await;
    let app = stub.logged_in(ADMIN).await;
    let mut view = app.product_list();

    for form in [
        ProductForm {
            price: "-1".to_string(),
            ..lamp_form()
        },
        ProductForm {
            price: "10001".to_string(),
            ..lamp_form()
        },
        ProductForm {
            name: "x".repeat(51),
            ..lamp_form()
        },
        ProductForm {
            image_url: "https://img.example.com/lamp.gif".to_string(),
            ..lamp_form()
        },
        ProductForm::default(),
    ] {
        let err = view.on_add(&form).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)), "{form:?}");
    }

    assert_eq!(stub.hits(Endpoint::Insert), 0);
    assert_eq!(stub.hits(Endpoint::List), 0);
}

#[tokio::test]
async fn test_update_sends_edited_product() {
    let stub = StubApi::start(vec![product(3, "Chair", "45")]).await;
    let app = stub.logged_in(ADMIN).await;

    let mut view = app.product_list();
    view.load().await.unwrap();
    let mut form = view.edit_form(ProductId::new(3)).unwrap();
    form.price = "39.99".to_string();
    form.out_of_stock = true;

    let updated = view.on_update(ProductId::new(3), &form).await.unwrap();

    assert_eq!(updated.product_id, ProductId::new(3));
    assert_eq!(stub.hits(Endpoint::Update), 1);
    let stored = stub.products();
    let chair = stored.first().unwrap();
    assert_eq!(chair.price.to_string(), "39.99");
    assert!(chair.out_of_stock);
    assert!(view.rows().first().unwrap().out_of_stock);
}

#[tokio::test]
async fn test_delete_refreshes_the_list() {
    let stub = StubApi::start(vec![product(1, "Desk", "120"), product(2, "Lamp", "10")]).await;
    let app = stub.logged_in(ADMIN).await;

    let mut view = app.product_list();
    view.load().await.unwrap();
    view.on_delete(ProductId::new(2)).await.unwrap();

    assert_eq!(stub.hits(Endpoint::Delete), 1);
    assert_eq!(stub.hits(Endpoint::List), 2);
    assert_eq!(view.rows().len(), 1);
}

#[tokio::test]
async fn test_customer_cannot_mutate() {
    let stub = StubApi::start(vec![product(1, "Desk", "120")]).await;
    let app = stub.logged_in(CUSTOMER).await;
    let mut view = app.product_list();

    let add = view.on_add(&lamp_form()).await.unwrap_err();
    let delete = view.on_delete(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(add, ClientError::AccessDenied(_)));
    assert!(matches!(delete, ClientError::AccessDenied(_)));
    assert_eq!(stub.hits(Endpoint::Insert), 0);
    assert_eq!(stub.hits(Endpoint::Delete), 0);
}

#[tokio::test]
async fn test_rejected_mutation_keeps_cache() {
    let stub = StubApi::start(vec![product(1, "Desk", "120")]).await;
    let app = stub.logged_in(ADMIN).await;

    let mut view = app.product_list();
    view.load().await.unwrap();
    let err = view.on_delete(ProductId::new(99)).await.unwrap_err();

    assert!(matches!(err, ClientError::Status { .. }));
    assert_eq!(stub.hits(Endpoint::List), 1);
    assert_eq!(view.rows().len(), 1);
}

#[tokio::test]
async fn test_failed_mutation_logs_one_error() {
    let stub = StubApi::start(vec![product(1, "Desk", "120")]).await;
    let app = stub.logged_in(ADMIN).await;
    let mut view = app.product_list();

    let errors = ErrorEvents::default();
    let _guard = errors.capture();
    view.on_delete(ProductId::new(99)).await.unwrap_err();

    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn test_details_view() {
    let stub = StubApi::start(vec![product(5, "Lamp", "10")]).await;
    let app = stub.logged_in(CUSTOMER).await;

    let mut details = app.product_details();
    assert!(details.load(ProductId::new(5)).await.unwrap().is_some());
    assert!(details.render().contains("Lamp (#5)"));
    assert!(details.render().contains("10.00"));

    assert!(details.load(ProductId::new(6)).await.unwrap().is_none());
    assert_eq!(details.render(), "No product to show.\n");
    assert_eq!(stub.hits(Endpoint::List), 1);
}
