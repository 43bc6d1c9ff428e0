//! Chatbox
//!
//! A small chat client for a threaded chat backend: pick or create a named
//! user, pick or start a conversation thread, and exchange messages over the
//! backend's REST API.
//!
//! # Architecture
//!
//! - **Backend client**: `reqwest`-based client for users, threads and messages
//! - **Controller**: owns the conversation state and orchestrates fetches
//! - **UI**: server-rendered page driven by plain HTML forms
//! - **Server**: Axum routes that map form posts onto controller operations
//!
//! # Modules
//!
//! - [`api`]: REST client and wire types
//! - [`session`]: conversation state and controller
//! - [`storage`]: client-local key-value storage
//! - [`ui`]: page view models and templates

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod storage;
pub mod ui;

pub use error::{Error, Result};

use crate::config::AppConfig;
use session::Controller;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Conversation controller for this session.
    pub controller: Arc<Controller>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
