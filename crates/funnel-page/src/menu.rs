//! Mobile menu toggle.

/// Classes flipped together when the menu toggles: (selector, class).
pub const TOGGLED_CLASSES: [(&str, &str); 3] = [
    (".menu-toggle", "active"),
    (".mobile-menu", "open"),
    ("body", "menu-open"),
];

/// Open/closed state of the mobile menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the menu and return whether it is now open.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
