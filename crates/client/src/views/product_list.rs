//! Product table with add, edit and delete.

use std::fmt::Write as _;

use stockroom_core::{Product, ProductForm, ProductId};
use tracing::{error, info, instrument};

use crate::error::ClientError;
use crate::products::ProductService;
use crate::session::SessionState;

/// Prompt shown above the add/edit forms.
pub const FORM_MESSAGE: &str = "All Fields Are Mandatory";

/// Rows per page.
pub const PAGE_SIZE: usize = 9;

/// The product list view.
///
/// Rows are ordered by product id, newest first. Every successful mutation
/// clears the product cache and reloads the rows, so the table always shows
/// what the server holds after the change.
#[derive(Debug)]
pub struct ProductListView {
    products: ProductService,
    session: SessionState,
    rows: Vec<Product>,
}

impl ProductListView {
    #[must_use]
    pub const fn new(products: ProductService, session: SessionState) -> Self {
        Self {
            products,
            session,
            rows: Vec::new(),
        }
    }

    /// Fetch the rows (from the cache when possible).
    ///
    /// # Errors
    ///
    /// Returns the list fetch error; the previous rows are kept.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let products = self.products.list().await.inspect_err(|e| {
            error!(error = %e, "Failed to load products");
        })?;

        let mut rows = products.as_ref().clone();
        rows.sort_by(|a, b| b.product_id.cmp(&a.product_id));
        self.rows = rows;
        Ok(())
    }

    #[must_use]
    pub fn rows(&self) -> &[Product] {
        &self.rows
    }

    /// Number of pages; an empty table still has one.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Whether the add/edit/delete actions are offered.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        self.session.can_manage_catalog()
    }

    /// Render page `page` (1-based, clamped) as a text table.
    #[must_use]
    pub fn render(&self, page: usize) -> String {
        let pages = self.page_count();
        let page = page.clamp(1, pages);
        let rows = self
            .rows
            .iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect::<Vec<_>>();

        let name_width = rows
            .iter()
            .map(|p| p.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>6}  {:<name_width$}  {:>10}  {:<12}  Image",
            "ID", "Name", "Price", "Stock"
        );
        for product in &rows {
            let stock = if product.out_of_stock {
                "out of stock"
            } else {
                "in stock"
            };
            let _ = writeln!(
                out,
                "{:>6}  {:<name_width$}  {:>10}  {:<12}  {}",
                product.product_id,
                product.name,
                product.price.to_string(),
                stock,
                product.image_url.as_deref().unwrap_or("-"),
            );
        }
        if rows.is_empty() {
            let _ = writeln!(out, "No products.");
        }
        let _ = writeln!(
            out,
            "Page {page} of {pages} ({} products)",
            self.rows.len()
        );
        if self.can_manage() {
            let _ = writeln!(out, "Actions: add, update <id>, delete <id>");
        }
        out
    }

    /// A form prefilled with product `id`, for editing.
    #[must_use]
    pub fn edit_form(&self, id: ProductId) -> Option<ProductForm> {
        self.rows
            .iter()
            .find(|p| p.product_id == id)
            .map(|p| ProductForm {
                name: p.name.clone(),
                price: p.price.amount().to_string(),
                description: p.description.clone(),
                image_url: p.image_url.clone().unwrap_or_default(),
                out_of_stock: p.out_of_stock,
            })
    }

    /// Validate and submit a new product, then reload.
    ///
    /// # Errors
    ///
    /// `ClientError::AccessDenied` without the admin role,
    /// `ClientError::Validation` when the form is invalid (nothing is sent),
    /// or the request error.
    #[instrument(skip(self, form))]
    pub async fn on_add(&mut self, form: &ProductForm) -> Result<Product, ClientError> {
        self.require_manage()?;
        let draft = form.validate()?;

        let created = self.products.insert(&draft).await.inspect_err(|e| {
            error!(error = %e, "Failed to add product");
        })?;
        info!(id = %created.product_id, "New product added");

        self.refresh().await?;
        Ok(created)
    }

    /// Validate and submit changes to product `id`, then reload.
    ///
    /// # Errors
    ///
    /// Same as [`ProductListView::on_add`].
    #[instrument(skip(self, form))]
    pub async fn on_update(
        &mut self,
        id: ProductId,
        form: &ProductForm,
    ) -> Result<Product, ClientError> {
        self.require_manage()?;
        let product = form.validate()?.with_id(id);

        let updated = self.products.update(id, &product).await.inspect_err(|e| {
            error!(error = %e, "Failed to update product");
        })?;
        info!("Product updated");

        self.refresh().await?;
        Ok(updated)
    }

    /// Delete product `id`, then reload.
    ///
    /// # Errors
    ///
    /// `ClientError::AccessDenied` without the admin role, or the request
    /// error.
    #[instrument(skip(self))]
    pub async fn on_delete(&mut self, id: ProductId) -> Result<(), ClientError> {
        self.require_manage()?;

        self.products.delete(id).await.inspect_err(|e| {
            error!(error = %e, "Failed to delete product");
        })?;
        info!("Product deleted");

        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<(), ClientError> {
        self.products.invalidate().await;
        self.load().await
    }

    fn require_manage(&self) -> Result<(), ClientError> {
        if self.can_manage() {
            Ok(())
        } else {
            Err(ClientError::AccessDenied(
                "managing products requires the Admin role".to_string(),
            ))
        }
    }
}
