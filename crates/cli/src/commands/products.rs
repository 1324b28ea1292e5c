//! Product commands. Each goes through the route guard first.

use stockroom_client::views::FORM_MESSAGE;
use stockroom_client::{ClientError, Navigation, Route, Stockroom};
use stockroom_core::{ProductForm, ProductId};

use super::{CommandError, emit};

/// Field overrides for `products update`.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub out_of_stock: Option<bool>,
}

impl ProductChanges {
    fn apply(self, form: &mut ProductForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(image_url) = self.image_url {
            form.image_url = image_url;
        }
        if let Some(out_of_stock) = self.out_of_stock {
            form.out_of_stock = out_of_stock;
        }
    }
}

/// Show the access denied page unless `route` may be activated.
fn enter(app: &Stockroom, route: Route) -> Result<(), CommandError> {
    match app.guard().check(route) {
        Navigation::Proceed(_) => Ok(()),
        Navigation::Redirect(to) => {
            emit(&app.access_denied().render())?;
            Err(CommandError::Redirected(to))
        }
    }
}

/// Explain a refused mutation: the form prompt with each field error, or
/// the access denied page.
fn report(app: &Stockroom, result: Result<(), ClientError>) -> Result<(), CommandError> {
    match &result {
        Err(ClientError::Validation(errors)) => {
            let mut out = format!("{FORM_MESSAGE}\n");
            for error in errors.errors() {
                out.push_str("  - ");
                out.push_str(&error.to_string());
                out.push('\n');
            }
            emit(&out)?;
        }
        Err(ClientError::AccessDenied(_)) => emit(&app.access_denied().render())?,
        _ => {}
    }
    Ok(result?)
}

/// Print one page of the product table.
///
/// # Errors
///
/// `CommandError::Redirected` when not logged in, or the fetch error.
pub async fn list(app: &Stockroom, page: usize) -> Result<(), CommandError> {
    enter(app, Route::Products)?;

    let mut view = app.product_list();
    view.load().await?;
    emit(&view.render(page))
}

/// Print one product.
///
/// # Errors
///
/// `CommandError::Redirected` when not logged in, or the fetch error.
pub async fn show(app: &Stockroom, id: ProductId) -> Result<(), CommandError> {
    enter(app, Route::ProductDetail(id))?;

    let mut view = app.product_details();
    view.load(id).await?;
    emit(&view.render())
}

/// Add a product and print the refreshed first page.
///
/// # Errors
///
/// `CommandError::Redirected` when not logged in, or the client error
/// (access denied, validation, request failure).
pub async fn add(app: &Stockroom, form: &ProductForm) -> Result<(), CommandError> {
    enter(app, Route::Products)?;

    let mut view = app.product_list();
    report(app, view.on_add(form).await.map(|_| ()))?;
    emit(&format!("New product added.\n\n{}", view.render(1)))
}

/// Apply `changes` to product `id` and print the refreshed first page.
///
/// # Errors
///
/// `CommandError::NotFound` for an unknown id, otherwise as [`add`].
pub async fn update(
    app: &Stockroom,
    id: ProductId,
    changes: ProductChanges,
) -> Result<(), CommandError> {
    enter(app, Route::Products)?;

    let mut view = app.product_list();
    view.load().await?;
    let mut form = view.edit_form(id).ok_or(CommandError::NotFound(id))?;
    changes.apply(&mut form);

    report(app, view.on_update(id, &form).await.map(|_| ()))?;
    emit(&format!("Product updated.\n\n{}", view.render(1)))
}

/// Delete product `id` and print the refreshed first page.
///
/// # Errors
///
/// `CommandError::Redirected` when not logged in, or the client error.
pub async fn delete(app: &Stockroom, id: ProductId) -> Result<(), CommandError> {
    enter(app, Route::Products)?;

    let mut view = app.product_list();
    report(app, view.on_delete(id).await)?;
    emit(&format!("Product deleted.\n\n{}", view.render(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_only_touch_given_fields() {
        let mut form = ProductForm {
            name: "Lamp".to_string(),
            price: "10".to_string(),
            description: "Bright".to_string(),
            image_url: String::new(),
            out_of_stock: false,
        };
        ProductChanges {
            price: Some("12.5".to_string()),
            out_of_stock: Some(true),
            ..ProductChanges::default()
        }
        .apply(&mut form);

        assert_eq!(form.name, "Lamp");
        assert_eq!(form.price, "12.5");
        assert_eq!(form.description, "Bright");
        assert!(form.out_of_stock);
    }
}
