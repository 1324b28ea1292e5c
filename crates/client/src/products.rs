//! Product resource access with a memoized list.
//!
//! # Caching
//!
//! The full product list is fetched once and shared by every caller until
//! [`ProductService::invalidate`] is called. There is no TTL and no
//! per-product invalidation: mutations are expected to be followed by an
//! `invalidate()` and a fresh `list()`.
//!
//! Concurrent `list()` calls made while the fetch is pending all await the
//! same request. The fetch runs on its own task, so invalidating or dropping
//! every caller never aborts a request that is already on the wire.
//!
//! A failed fetch is handed to everyone awaiting it and then forgotten, so
//! the next `list()` goes back to the server. This holds even when every
//! caller was dropped before the failure arrived.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use stockroom_core::{Product, ProductDraft, ProductId};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, instrument};

use crate::error::ClientError;
use crate::http::ApiClient;

const LIST_PATH: &str = "api/product/getproducts";
const INSERT_PATH: &str = "api/product/addproduct";
const UPDATE_PATH: &str = "api/product/updateproduct";
const DELETE_PATH: &str = "api/product/deleteproduct";

type ListResult = Result<Arc<Vec<Product>>, Arc<ClientError>>;
type SharedList = Shared<BoxFuture<'static, ListResult>>;

/// The memoized fetch and the generation it belongs to.
#[derive(Default)]
struct ListMemo {
    generation: u64,
    fetch: Option<SharedList>,
}

/// Client for the `/api/product` endpoints.
#[derive(Clone)]
pub struct ProductService {
    inner: Arc<ProductServiceInner>,
}

struct ProductServiceInner {
    api: ApiClient,
    memo: Mutex<ListMemo>,
}

impl ProductService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(ProductServiceInner {
                api,
                memo: Mutex::new(ListMemo::default()),
            }),
        }
    }

    /// All products, from the memo if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` wrapping the failure of the shared
    /// request. Every caller awaiting the same fetch gets the same error.
    pub async fn list(&self) -> Result<Arc<Vec<Product>>, ClientError> {
        let (generation, fetch) = {
            let mut memo = self.inner.memo.lock().await;
            if let Some(fetch) = &memo.fetch {
                (memo.generation, fetch.clone())
            } else {
                memo.generation += 1;
                let fetch = self.spawn_fetch(memo.generation);
                memo.fetch = Some(fetch.clone());
                (memo.generation, fetch)
            }
        };

        match fetch.await {
            Ok(products) => Ok(products),
            Err(e) => {
                self.inner.forget_failed(generation).await;
                Err(ClientError::Fetch(e))
            }
        }
    }

    /// The first product with `id`, or `None` if the list has no such entry.
    ///
    /// # Errors
    ///
    /// Same as [`ProductService::list`].
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, ClientError> {
        let products = self.list().await?;
        Ok(products.iter().find(|p| p.product_id == id).cloned())
    }

    /// Create a product. Does not touch the memoized list.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn insert(&self, draft: &ProductDraft) -> Result<Product, ClientError> {
        self.inner.api.post_json(INSERT_PATH, draft).await
    }

    /// Replace product `id`. Does not touch the memoized list.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    #[instrument(skip(self, product))]
    pub async fn update(&self, id: ProductId, product: &Product) -> Result<Product, ClientError> {
        self.inner
            .api
            .put_json(&format!("{UPDATE_PATH}/{id}"), product)
            .await
    }

    /// Delete product `id`. Does not touch the memoized list.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ClientError> {
        self.inner.api.delete(&format!("{DELETE_PATH}/{id}")).await
    }

    /// Drop the memoized list so the next `list()` refetches.
    ///
    /// A fetch already in flight keeps running for whoever awaits it.
    pub async fn invalidate(&self) {
        let mut memo = self.inner.memo.lock().await;
        if memo.fetch.take().is_some() {
            debug!(generation = memo.generation, "Product list cache cleared");
        }
    }

    /// Start fetch `generation` on its own task.
    ///
    /// The task drops its own memo entry on failure, so a failure that
    /// completes after every caller went away is not replayed.
    fn spawn_fetch(&self, generation: u64) -> SharedList {
        let api = self.inner.api.clone();
        let service = Arc::downgrade(&self.inner);
        let span = tracing::info_span!("product_list_fetch", generation);
        let task = tokio::spawn(
            async move {
                debug!("Fetching product list");
                let result = api
                    .get_json::<Vec<Product>>(LIST_PATH)
                    .await
                    .map(Arc::new)
                    .map_err(Arc::new);
                if result.is_err()
                    && let Some(service) = service.upgrade()
                {
                    service.forget_failed(generation).await;
                }
                result
            }
            .instrument(span),
        );

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Arc::new(ClientError::Task(e.to_string()))),
            }
        }
        .boxed()
        .shared()
    }
}

impl ProductServiceInner {
    /// Clear the memo if it still holds fetch `generation`.
    async fn forget_failed(&self, generation: u64) {
        let mut memo = self.memo.lock().await;
        if memo.generation == generation && memo.fetch.take().is_some() {
            debug!(generation, "Dropped failed product list fetch");
        }
    }
}

impl std::fmt::Debug for ProductService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductService")
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}
