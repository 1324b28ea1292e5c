//! Text views over the catalog.
//!
//! Each view owns the state it renders and exposes the actions a user can
//! take on it. Rendering returns a `String`; printing is up to the caller.

pub mod access_denied;
pub mod nav_menu;
pub mod product_details;
pub mod product_list;

pub use access_denied::AccessDeniedView;
pub use nav_menu::NavMenu;
pub use product_details::ProductDetailsView;
pub use product_list::{FORM_MESSAGE, PAGE_SIZE, ProductListView};
