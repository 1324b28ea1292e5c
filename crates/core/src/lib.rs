//! Stockroom Core - Shared types library.
//!
//! This crate provides the types used across all Stockroom components:
//! - `client` - REST data-access layer, session handling, views
//! - `cli` - The `stockroom` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product model, price and ID newtypes, roles, form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
