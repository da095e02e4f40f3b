//! Type definitions for the application state.

/// Which presenter is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Charts,
    Tree,
}

impl View {
    /// The other view
    pub fn toggle(self) -> Self {
        match self {
            View::Charts => View::Tree,
            View::Tree => View::Charts,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Charts => "charts",
            View::Tree => "tree",
        }
    }
}
