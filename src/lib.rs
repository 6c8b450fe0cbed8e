//! A terminal browser for upcoming TV episodes written in Rust.
//!
//! schedule-watcher fetches the full TVmaze schedule, keeps the episodes that
//! have not aired yet and lets you narrow them down by show type, language,
//! network and streaming service before paging through the result.
//!
//! # Features
//!
//! - Filter by any combination of type, language, network and streaming service
//! - Sort by air time, episode name or show name, either direction
//! - Fixed-size pages with a five-button pagination window
//! - Plain-text output of a single page for scripting
//!
//! # Usage
//!
//! ```bash
//! # Start the TUI
//! cargo run
//!
//! # Print the second page sorted by show name
//! cargo run -- --print 2 --sort showName
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod tui;
pub mod types;
