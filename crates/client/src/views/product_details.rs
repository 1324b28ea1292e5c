//! Single product view.

use std::fmt::Write as _;

use stockroom_core::{Product, ProductId};

use crate::error::ClientError;
use crate::products::ProductService;

/// Shows one product, looked up in the cached list.
#[derive(Debug)]
pub struct ProductDetailsView {
    products: ProductService,
    product: Option<Product>,
}

impl ProductDetailsView {
    #[must_use]
    pub const fn new(products: ProductService) -> Self {
        Self {
            products,
            product: None,
        }
    }

    /// Look up product `id`. An unknown id leaves the view empty.
    ///
    /// # Errors
    ///
    /// Returns the list fetch error.
    pub async fn load(&mut self, id: ProductId) -> Result<Option<&Product>, ClientError> {
        self.product = self.products.get_by_id(id).await?;
        Ok(self.product.as_ref())
    }

    #[must_use]
    pub const fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    #[must_use]
    pub fn render(&self) -> String {
        let Some(product) = &self.product else {
            return "No product to show.\n".to_string();
        };

        let mut out = String::new();
        let _ = writeln!(out, "{} (#{})", product.name, product.product_id);
        let _ = writeln!(out, "Price:       {}", product.price);
        let _ = writeln!(
            out,
            "Stock:       {}",
            if product.out_of_stock { "out of stock" } else { "in stock" }
        );
        if let Some(url) = &product.image_url {
            let _ = writeln!(out, "Image:       {url}");
        }
        let _ = writeln!(out, "Description: {}", product.description);
        out
    }
}
