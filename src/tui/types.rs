//! TUI type definitions for screens, focus, actions and sidebar rows.

use crate::filters::{FilterCategory, FilterKey};

/// The current screen/view of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Waiting for the schedule feed
    Loading,
    /// Browsing the episode list
    Browse,
}

/// Focus state for split-panel views.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Sidebar,
    Main,
}

/// Actions the event loop has to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Fetch the schedule again and rebuild the filters
    Reload,
}

/// One line of the filter sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarRow {
    /// Heading that toggles the whole category
    Category(FilterCategory),
    /// A single filter entry
    Entry(FilterKey),
}
