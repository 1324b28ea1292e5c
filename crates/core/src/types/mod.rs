//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for the catalog domain.

pub mod form;
pub mod id;
pub mod price;
pub mod product;
pub mod role;

pub use form::{FieldError, FormErrors, ProductForm, RegistrationForm};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, ProductDraft};
pub use role::UserRole;
