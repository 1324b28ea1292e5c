//! Page shown when the guard refuses a route.

/// The access denied page.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessDeniedView;

impl AccessDeniedView {
    pub const HEADING: &'static str = "403";
    pub const MESSAGE: &'static str = "Access Denied";

    #[must_use]
    pub fn render(&self) -> String {
        format!("{}\n{}\n", Self::HEADING, Self::MESSAGE)
    }
}
