//! Routes and the login guard.
//!
//! | Path               | Route                       | Protected |
//! |--------------------|-----------------------------|-----------|
//! | `""`, `home`       | [`Route::Home`]             | no        |
//! | `products`         | [`Route::Products`]         | yes       |
//! | `products/{id}`    | [`Route::ProductDetail`]    | yes       |
//! | `login`            | [`Route::Login`]            | no        |
//! | `register`         | [`Route::Register`]         | no        |
//! | `access-denied`    | [`Route::AccessDenied`]     | no        |
//! | anything else      | redirect to [`Route::Home`] |           |

use std::fmt;

use stockroom_core::ProductId;
use tracing::info;

use crate::session::SessionState;

/// A navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Products,
    ProductDetail(ProductId),
    Login,
    Register,
    AccessDenied,
}

impl Route {
    /// Resolve a path against the routing table.
    ///
    /// Unknown paths resolve to [`Route::Home`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_matches('/');
        match path.split('/').collect::<Vec<_>>().as_slice() {
            [""] | ["home"] => Self::Home,
            ["products"] => Self::Products,
            ["products", id] => id.parse().map_or(Self::Home, Self::ProductDetail),
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["access-denied"] => Self::AccessDenied,
            _ => Self::Home,
        }
    }

    /// Whether activating this route requires a login.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Products | Self::ProductDetail(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/home"),
            Self::Products => f.write_str("/products"),
            Self::ProductDetail(id) => write!(f, "/products/{id}"),
            Self::Login => f.write_str("/login"),
            Self::Register => f.write_str("/register"),
            Self::AccessDenied => f.write_str("/access-denied"),
        }
    }
}

/// Outcome of asking the guard about a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Activate the requested route.
    Proceed(Route),
    /// Show this route instead.
    Redirect(Route),
}

impl Navigation {
    /// The route that ends up active.
    #[must_use]
    pub const fn route(&self) -> Route {
        match self {
            Self::Proceed(route) | Self::Redirect(route) => *route,
        }
    }
}

/// Lets protected routes through only while someone is logged in.
///
/// No token refresh or expiry check happens here.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionState,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(session: SessionState) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn can_activate(&self, route: &Route) -> bool {
        !route.is_protected() || self.session.is_logged_in()
    }

    /// Resolve `path` and apply the guard.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Navigation {
        self.check(Route::parse(path))
    }

    /// Apply the guard to an already resolved route.
    #[must_use]
    pub fn check(&self, route: Route) -> Navigation {
        if self.can_activate(&route) {
            Navigation::Proceed(route)
        } else {
            info!(%route, "Not logged in; redirecting to access denied");
            Navigation::Redirect(Route::AccessDenied)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;
    use stockroom_core::UserRole;

    use super::*;
    use crate::session::{MemorySessionStore, StoredSession};

    fn guard(logged_in: bool) -> RouteGuard {
        let store = if logged_in {
            MemorySessionStore::with_session(StoredSession {
                login_status: true,
                token: SecretString::from("t"),
                username: "ada".to_string(),
                user_role: UserRole::Customer,
                expiration: None,
            })
        } else {
            MemorySessionStore::new()
        };
        RouteGuard::new(SessionState::restore(Arc::new(store)))
    }

    #[test]
    fn test_routing_table() {
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/home"), Route::Home);
        assert_eq!(Route::parse("products"), Route::Products);
        assert_eq!(
            Route::parse("/products/12/"),
            Route::ProductDetail(ProductId::new(12))
        );
        assert_eq!(Route::parse("access-denied"), Route::AccessDenied);
        assert_eq!(Route::parse("no/such/page"), Route::Home);
        assert_eq!(Route::parse("products/abc"), Route::Home);
    }

    #[test]
    fn test_display_matches_parse() {
        for route in [
            Route::Home,
            Route::Products,
            Route::ProductDetail(ProductId::new(3)),
            Route::Login,
            Route::Register,
            Route::AccessDenied,
        ] {
            assert_eq!(Route::parse(&route.to_string()), route);
        }
    }

    #[test]
    fn test_unauthenticated_is_redirected() {
        let guard = guard(false);
        assert_eq!(
            guard.navigate("products"),
            Navigation::Redirect(Route::AccessDenied)
        );
        assert_eq!(
            guard.navigate("products/1").route(),
            Route::AccessDenied
        );
        assert_eq!(guard.navigate("login"), Navigation::Proceed(Route::Login));
    }

    #[test]
    fn test_authenticated_proceeds() {
        let guard = guard(true);
        assert_eq!(
            guard.navigate("products"),
            Navigation::Proceed(Route::Products)
        );
    }
}
