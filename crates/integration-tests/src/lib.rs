//! Integration tests for Stockroom.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stockroom-integration-tests
//! ```
//!
//! No external services are needed: [`StubApi`] serves the catalog and
//! account endpoints from memory on a random local port. It counts requests
//! per endpoint and records the `Authorization` header of every request so
//! tests can assert on what the client actually sent.
//!
//! # Test Categories
//!
//! - `interceptor` - bearer token attachment
//! - `product_cache` - shared list fetch and invalidation
//! - `product_views` - list view actions, validation, role checks
//! - `account` - login, logout, registration, guarded routes

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use stockroom_client::session::{MemorySessionStore, SessionStore};
use stockroom_client::{ClientConfig, Stockroom};
use stockroom_core::{Price, Product, ProductDraft, ProductId, UserRole};
use tokio::task::JoinHandle;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Seeded admin account.
pub const ADMIN: (&str, &str) = ("admin", "admin-pass");

/// Seeded customer account.
pub const CUSTOMER: (&str, &str) = ("carol", "carol-pass");

/// Endpoints the stub counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    List,
    Insert,
    Update,
    Delete,
    Login,
    Register,
}

struct User {
    username: String,
    password: String,
    role: UserRole,
}

struct Catalog {
    products: Vec<Product>,
    next_id: i32,
}

struct StubState {
    catalog: Mutex<Catalog>,
    users: Mutex<Vec<User>>,
    hits: Mutex<HashMap<Endpoint, usize>>,
    auth_headers: Mutex<Vec<Option<String>>>,
    list_delay: Mutex<Duration>,
    list_failures: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StubState {
    fn hit(&self, endpoint: Endpoint) {
        *lock(&self.hits).entry(endpoint).or_default() += 1;
    }

    /// Resolve the bearer token to a role; 401 without a known token,
    /// 403 for anyone but an admin.
    fn require_admin(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let username = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer token-"))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let users = lock(&self.users);
        let user = users
            .iter()
            .find(|u| u.username == username)
            .ok_or(StatusCode::UNAUTHORIZED)?;
        if user.role == UserRole::Admin {
            Ok(())
        } else {
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// In-memory catalog API on `127.0.0.1`, stopped when dropped.
pub struct StubApi {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubApi {
    /// Start a stub seeded with two users and `products`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(products: Vec<Product>) -> Self {
        let next_id = products
            .iter()
            .map(|p| p.product_id.as_i32())
            .max()
            .unwrap_or(0)
            + 1;
        let state = Arc::new(StubState {
            catalog: Mutex::new(Catalog { products, next_id }),
            users: Mutex::new(vec![
                User {
                    username: ADMIN.0.to_string(),
                    password: ADMIN.1.to_string(),
                    role: UserRole::Admin,
                },
                User {
                    username: CUSTOMER.0.to_string(),
                    password: CUSTOMER.1.to_string(),
                    role: UserRole::Customer,
                },
            ]),
            hits: Mutex::new(HashMap::new()),
            auth_headers: Mutex::new(Vec::new()),
            list_delay: Mutex::new(Duration::ZERO),
            list_failures: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/product/getproducts", get(list_products))
            .route("/api/product/addproduct", post(add_product))
            .route("/api/product/updateproduct/{id}", put(update_product))
            .route("/api/product/deleteproduct/{id}", delete(delete_product))
            .route("/api/account/login", post(login))
            .route("/api/account/register", post(register))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                record_authorization,
            ))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub API");
        let addr = listener.local_addr().expect("stub API address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// A client with an empty in-memory session.
    #[must_use]
    pub fn client(&self) -> Stockroom {
        self.client_with_store(Arc::new(MemorySessionStore::new()))
    }

    /// A client on top of `store`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_with_store(&self, store: Arc<dyn SessionStore>) -> Stockroom {
        let config = ClientConfig::for_api_url(&self.url()).expect("stub URL is valid");
        Stockroom::with_store(&config, store).expect("build client")
    }

    /// A client logged in as `(username, password)`.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn logged_in(&self, (username, password): (&str, &str)) -> Stockroom {
        let app = self.client();
        app.account()
            .login(username, &SecretString::from(password.to_string()))
            .await
            .expect("login");
        app
    }

    /// Requests served so far by `endpoint`.
    #[must_use]
    pub fn hits(&self, endpoint: Endpoint) -> usize {
        lock(&self.state.hits).get(&endpoint).copied().unwrap_or(0)
    }

    /// The `Authorization` header of every request, in arrival order.
    #[must_use]
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        lock(&self.state.auth_headers).clone()
    }

    /// Hold every list response for `delay`.
    pub fn set_list_delay(&self, delay: Duration) {
        *lock(&self.state.list_delay) = delay;
    }

    /// Answer the next `count` list requests with a 500.
    pub fn fail_next_lists(&self, count: usize) {
        self.state.list_failures.store(count, Ordering::SeqCst);
    }

    /// Current server-side catalog.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.state.catalog).products.clone()
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Counts `ERROR` level events, which the CLI reports to Sentry as events.
#[derive(Debug, Clone, Default)]
pub struct ErrorEvents(Arc<AtomicUsize>);

impl ErrorEvents {
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Count events on this thread until the guard is dropped.
    #[must_use]
    pub fn capture(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }
}

impl<S: tracing::Subscriber> Layer<S> for ErrorEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A product for seeding the stub.
///
/// # Panics
///
/// Panics if `price` is not a valid price.
#[must_use]
pub fn product(id: i32, name: &str, price: &str) -> Product {
    Product {
        product_id: ProductId::new(id),
        name: name.to_string(),
        price: Price::parse(price).expect("valid price"),
        description: format!("{name} description"),
        image_url: None,
        out_of_stock: false,
    }
}

async fn record_authorization(
    State(state): State<Arc<StubState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    lock(&state.auth_headers).push(authorization);

    next.run(request).await
}

async fn list_products(State(state): State<Arc<StubState>>) -> Response {
    state.hit(Endpoint::List);

    let delay = *lock(&state.list_delay);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let failing = state
        .list_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "catalog unavailable").into_response();
    }

    Json(lock(&state.catalog).products.clone()).into_response()
}

async fn add_product(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(draft): Json<ProductDraft>,
) -> Response {
    state.hit(Endpoint::Insert);
    if let Err(status) = state.require_admin(&headers) {
        return status.into_response();
    }

    let mut catalog = lock(&state.catalog);
    let created = draft.with_id(ProductId::new(catalog.next_id));
    catalog.next_id += 1;
    catalog.products.push(created.clone());
    Json(created).into_response()
}

async fn update_product(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(product): Json<Product>,
) -> Response {
    state.hit(Endpoint::Update);
    if let Err(status) = state.require_admin(&headers) {
        return status.into_response();
    }

    let mut catalog = lock(&state.catalog);
    let Some(slot) = catalog
        .products
        .iter_mut()
        .find(|p| p.product_id == ProductId::new(id))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    *slot = product.clone();
    Json(product).into_response()
}

async fn delete_product(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.hit(Endpoint::Delete);
    if let Err(status) = state.require_admin(&headers) {
        return status.into_response();
    }

    let mut catalog = lock(&state.catalog);
    let before = catalog.products.len();
    catalog.products.retain(|p| p.product_id != ProductId::new(id));
    if catalog.products.len() == before {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::OK.into_response()
    }
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(State(state): State<Arc<StubState>>, Json(body): Json<Credentials>) -> Response {
    state.hit(Endpoint::Login);

    let users = lock(&state.users);
    let Some(user) = users
        .iter()
        .find(|u| u.username == body.username && u.password == body.password)
    else {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    };

    Json(json!({
        "token": format!("token-{}", user.username),
        "expiration": "2030-01-01T00:00:00",
        "username": user.username,
        "userRole": user.role.as_str(),
    }))
    .into_response()
}

#[derive(Deserialize)]
struct Registration {
    username: String,
    password: String,
    email: String,
}

async fn register(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Registration>,
) -> Response {
    state.hit(Endpoint::Register);

    if body.email.is_empty() {
        return (StatusCode::BAD_REQUEST, "Email is required").into_response();
    }
    let mut users = lock(&state.users);
    if users.iter().any(|u| u.username == body.username) {
        return (StatusCode::CONFLICT, "User already exists").into_response();
    }
    users.push(User {
        username: body.username,
        password: body.password,
        role: UserRole::Customer,
    });
    StatusCode::OK.into_response()
}
