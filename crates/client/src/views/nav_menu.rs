//! Login status line and logout.

use tracing::instrument;

use crate::error::ClientError;
use crate::products::ProductService;
use crate::session::AccountService;

/// Navigation menu: who is logged in, and the logout action.
#[derive(Debug, Clone)]
pub struct NavMenu {
    account: AccountService,
    products: ProductService,
}

impl NavMenu {
    #[must_use]
    pub const fn new(account: AccountService, products: ProductService) -> Self {
        Self { account, products }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let session = self.account.session();
        match (session.is_logged_in(), session.current_user_name()) {
            (true, Some(name)) => {
                let role = session
                    .current_user_role()
                    .map(|r| format!(" ({r})"))
                    .unwrap_or_default();
                format!("Logged in as {name}{role}\n")
            }
            (true, None) => "Logged in\n".to_string(),
            (false, _) => "Not logged in\n".to_string(),
        }
    }

    /// Drop cached products, then end the session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the session file cannot be removed.
    #[instrument(skip(self))]
    pub async fn on_logout(&self) -> Result<(), ClientError> {
        self.products.invalidate().await;
        self.account.logout()
    }
}
