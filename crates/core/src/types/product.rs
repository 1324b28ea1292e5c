//! Product catalog entries.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as returned by the catalog API.
///
/// The remote service is the source of truth; clients only hold transient
/// copies of these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server-assigned identifier.
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub out_of_stock: bool,
}

/// A product that has not been assigned an identifier yet.
///
/// This is the body of an insert call and the output of
/// [`ProductForm::validate`](super::form::ProductForm::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub price: Price,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub out_of_stock: bool,
}

impl ProductDraft {
    /// Attach an identifier, producing the body of an update call.
    #[must_use]
    pub fn with_id(self, product_id: ProductId) -> Product {
        Product {
            product_id,
            name: self.name,
            price: self.price,
            description: self.description,
            image_url: self.image_url,
            out_of_stock: self.out_of_stock,
        }
    }
}

impl From<Product> for ProductDraft {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            price: product.price,
            description: product.description,
            image_url: product.image_url,
            out_of_stock: product.out_of_stock,
        }
    }
}
