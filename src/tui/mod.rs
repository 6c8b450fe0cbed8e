//! Terminal User Interface for schedule-watcher using ratatui.
//!
//! This module provides a full-screen TUI with a filter sidebar, the current
//! page of episode cards and a pagination bar.

mod render;
mod state;
mod types;

pub use render::{draw, plain_text};
pub use state::App;
pub use types::{Action, Focus, Screen, SidebarRow};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
