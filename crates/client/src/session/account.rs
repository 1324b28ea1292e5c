//! Account endpoints: login, registration, logout.

use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use stockroom_core::{RegistrationForm, UserRole};
use tracing::{debug, info, instrument};

use super::state::SessionState;
use super::store::StoredSession;
use crate::error::ClientError;
use crate::http::ApiClient;

const LOGIN_PATH: &str = "api/account/login";
const REGISTER_PATH: &str = "api/account/register";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    #[serde(default)]
    expiration: Option<String>,
    username: String,
    user_role: UserRole,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
}

/// Login and logout against the account API.
#[derive(Debug, Clone)]
pub struct AccountService {
    api: ApiClient,
    session: SessionState,
}

impl AccountService {
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionState) -> Self {
        Self { api, session }
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// Log in and persist the issued token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` if the server rejects the credentials,
    /// or `ClientError::Storage` if the session cannot be saved.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<UserRole, ClientError> {
        let response: LoginResponse = self
            .api
            .post_json(
                LOGIN_PATH,
                &LoginRequest {
                    username,
                    password: password.expose_secret(),
                },
            )
            .await?;

        let session = StoredSession {
            login_status: true,
            token: SecretString::from(response.token),
            username: response.username,
            user_role: response.user_role,
            expiration: response.expiration.as_deref().and_then(parse_expiration),
        };
        self.session.begin(&session)?;

        info!(role = %session.user_role, "Logged in");
        Ok(session.user_role)
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` before any request if the form is
    /// incomplete, or `ClientError::Status` if the server refuses it.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), ClientError> {
        form.validate()?;

        self.api
            .post_ack(
                REGISTER_PATH,
                &RegisterRequest {
                    username: form.username.trim(),
                    password: &form.password,
                    email: form.email.trim(),
                },
            )
            .await?;

        info!("Registered");
        Ok(())
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the session file cannot be removed.
    /// The in-memory state is logged out regardless.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.end()?;
        info!("Logged out");
        Ok(())
    }
}

/// Accept RFC 3339 timestamps and offset-less ones, which are taken as UTC.
fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            debug!(error = %e, raw, "Ignoring unparseable token expiration");
            None
        }
    }
}
