//! Login, logout, registration and session status.

use secrecy::SecretString;
use stockroom_client::Stockroom;
use stockroom_core::RegistrationForm;

use super::{CommandError, emit};

/// Log in and show the resulting session.
///
/// # Errors
///
/// Returns `CommandError::Client` if the credentials are rejected.
pub async fn login(
    app: &Stockroom,
    username: &str,
    password: &SecretString,
) -> Result<(), CommandError> {
    app.account().login(username, password).await?;
    emit(&app.nav_menu().render())
}

/// Log out, dropping cached products too.
///
/// # Errors
///
/// Returns `CommandError::Client` if the session file cannot be removed.
pub async fn logout(app: &Stockroom) -> Result<(), CommandError> {
    app.nav_menu().on_logout().await?;
    emit("Logged out.")
}

/// Create an account.
///
/// # Errors
///
/// Returns `CommandError::Client` if the form is invalid or the server
/// refuses it.
pub async fn register(
    app: &Stockroom,
    username: String,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    let form = RegistrationForm {
        username,
        password,
        email,
    };
    app.account().register(&form).await?;
    emit(&format!(
        "Registered {}. Log in to continue.",
        form.username.trim()
    ))
}

/// Show who is logged in.
///
/// # Errors
///
/// Returns `CommandError::Output` if stdout is closed.
pub fn status(app: &Stockroom) -> Result<(), CommandError> {
    emit(&app.nav_menu().render())
}
