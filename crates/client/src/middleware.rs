//! Request interceptors.
//!
//! An interceptor sees every request [`ApiClient`](crate::ApiClient) sends,
//! after it is built and before it goes on the wire.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use tracing::warn;

use crate::session::SessionState;

/// Hook run on each outbound request.
pub trait RequestInterceptor: Send + Sync {
    /// Adjust `request` in place.
    fn intercept(&self, request: &mut reqwest::Request);
}

/// Adds `Authorization: Bearer <token>` while a session is active.
///
/// Login status and token are read fresh for every request, so a login or
/// logout takes effect on the very next call. Requests made without an
/// active session pass through untouched.
#[derive(Debug, Clone)]
pub struct JwtInterceptor {
    session: SessionState,
}

impl JwtInterceptor {
    #[must_use]
    pub const fn new(session: SessionState) -> Self {
        Self { session }
    }
}

impl RequestInterceptor for JwtInterceptor {
    fn intercept(&self, request: &mut reqwest::Request) {
        let Some(token) = self.session.bearer_token() else {
            return;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => warn!(error = %e, "Stored token is not a valid header value; sending without it"),
        }
    }
}
