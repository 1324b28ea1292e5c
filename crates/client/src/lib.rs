//! Stockroom Client - data access for the product catalog API.
//!
//! # Architecture
//!
//! ```text
//! views ──> ProductService ──> ApiClient ──> JwtInterceptor ──> server
//!   │             (memoized list)               │
//!   └── RouteGuard ──> SessionState <───────────┘
//!                         │
//!                    SessionStore (file / memory)
//! ```
//!
//! - [`session`] - persisted login, observable status, account endpoints
//! - [`middleware`] - request interceptors (bearer token)
//! - [`products`] - product endpoints with a shared, invalidatable list fetch
//! - [`guard`] - routing table and login guard
//! - [`views`] - text views driving the services
//!
//! [`Stockroom`] wires all of these together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod middleware;
pub mod products;
pub mod session;
pub mod views;

use std::sync::Arc;

pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use guard::{Navigation, Route, RouteGuard};
pub use http::ApiClient;
pub use middleware::{JwtInterceptor, RequestInterceptor};
pub use products::ProductService;
pub use session::{AccountService, FileSessionStore, SessionState, SessionStore};

use views::{AccessDeniedView, NavMenu, ProductDetailsView, ProductListView};

/// A fully wired client: one session, one transport, one product cache.
#[derive(Debug, Clone)]
pub struct Stockroom {
    session: SessionState,
    account: AccountService,
    products: ProductService,
    guard: RouteGuard,
}

impl Stockroom {
    /// Wire a client using the session file named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let store = Arc::new(FileSessionStore::new(&config.session_file));
        Self::with_store(config, store)
    }

    /// Wire a client on top of an existing session store.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn with_store(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ClientError> {
        let session = SessionState::restore(store);
        let interceptors: Vec<Arc<dyn RequestInterceptor>> =
            vec![Arc::new(JwtInterceptor::new(session.clone()))];
        let api = ApiClient::new(config, interceptors)?;

        Ok(Self {
            account: AccountService::new(api.clone(), session.clone()),
            products: ProductService::new(api),
            guard: RouteGuard::new(session.clone()),
            session,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub const fn account(&self) -> &AccountService {
        &self.account
    }

    #[must_use]
    pub const fn products(&self) -> &ProductService {
        &self.products
    }

    #[must_use]
    pub const fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    #[must_use]
    pub fn product_list(&self) -> ProductListView {
        ProductListView::new(self.products.clone(), self.session.clone())
    }

    #[must_use]
    pub fn product_details(&self) -> ProductDetailsView {
        ProductDetailsView::new(self.products.clone())
    }

    #[must_use]
    pub fn nav_menu(&self) -> NavMenu {
        NavMenu::new(self.account.clone(), self.products.clone())
    }

    #[must_use]
    pub const fn access_denied(&self) -> AccessDeniedView {
        AccessDeniedView
    }
}
