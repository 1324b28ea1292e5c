//! Authentication state.
//!
//! - [`store`] persists the session between runs
//! - [`state`] publishes login status, user name and role
//! - [`account`] talks to the login/registration endpoints

pub mod account;
pub mod state;
pub mod store;

pub use account::AccountService;
pub use state::SessionState;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StorageError, StoredSession};
