//! Client-side validation of user input.
//!
//! Forms collect raw text and are validated as a whole before anything is
//! submitted, so every failing field is reported at once.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::price::{Price, PriceError};
use super::product::ProductDraft;

/// Accepted image links: http or https, ending in png or jpg.
static IMAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://.*.(?:png|jpg))$").expect("valid image URL pattern"));

/// A single failed field constraint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{0}")]
    Price(PriceError),
    #[error("{field} must be an http(s) link to a .png or .jpg image")]
    ImageUrl { field: &'static str },
    #[error("{field} must be a valid email address")]
    Email { field: &'static str },
}

impl FieldError {
    /// Name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::ImageUrl { field }
            | Self::Email { field } => field,
            Self::Price(_) => "price",
        }
    }
}

/// All constraint failures of one form submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether any error refers to `field`.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FormErrors {}

/// Raw input of the add/edit product form.
///
/// ## Constraints
///
/// - `name`: required, at most 50 characters
/// - `price`: required, a number in `[0, 10000]`
/// - `description`: required, at most 150 characters
/// - `image_url`: optional, `http(s)://...png` or `...jpg`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub description: String,
    pub image_url: String,
    pub out_of_stock: bool,
}

impl ProductForm {
    pub const NAME_MAX_LENGTH: usize = 50;
    pub const DESCRIPTION_MAX_LENGTH: usize = 150;

    /// Validate every field and build the draft to submit.
    ///
    /// # Errors
    ///
    /// Returns `FormErrors` listing each failed constraint.
    pub fn validate(&self) -> Result<ProductDraft, FormErrors> {
        let mut errors = FormErrors::default();

        let name = required_text(&mut errors, "name", &self.name, Self::NAME_MAX_LENGTH);
        let description = required_text(
            &mut errors,
            "description",
            &self.description,
            Self::DESCRIPTION_MAX_LENGTH,
        );

        let price = if self.price.trim().is_empty() {
            errors.push(FieldError::Required { field: "price" });
            None
        } else {
            Price::parse(&self.price)
                .map_err(|e| errors.push(FieldError::Price(e)))
                .ok()
        };

        let image_url = self.image_url.trim();
        let image_url = if image_url.is_empty() {
            None
        } else if IMAGE_URL.is_match(image_url) {
            Some(image_url.to_owned())
        } else {
            errors.push(FieldError::ImageUrl { field: "image_url" });
            None
        };

        match (name, price, description) {
            (Some(name), Some(price), Some(description)) if errors.is_empty() => {
                Ok(ProductDraft {
                    name,
                    price,
                    description,
                    image_url,
                    out_of_stock: self.out_of_stock,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Raw input of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl RegistrationForm {
    /// Check required fields and the email shape.
    ///
    /// # Errors
    ///
    /// Returns `FormErrors` listing each failed constraint.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.username.trim().is_empty() {
            errors.push(FieldError::Required { field: "username" });
        }
        if self.password.is_empty() {
            errors.push(FieldError::Required { field: "password" });
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::Required { field: "email" });
        } else {
            let well_formed = email
                .split_once('@')
                .is_some_and(|(local, domain)| {
                    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                });
            if !well_formed {
                errors.push(FieldError::Email { field: "email" });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn required_text(
    errors: &mut FormErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::Required { field });
        return None;
    }
    if value.chars().count() > max {
        errors.push(FieldError::TooLong { field, max });
        return None;
    }
    Some(value.to_owned())
}
