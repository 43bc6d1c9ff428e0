//! REST client for the chat backend.
//!
//! - [`Client`]: base URL + shared `reqwest` client
//! - [`UsersApi`], [`ThreadsApi`], [`MessagesApi`]: one accessor per resource
//! - [`types`]: wire types shared with the rest of the crate

pub mod client;
pub mod types;

pub use client::{Client, MessagesApi, ThreadsApi, UsersApi};
pub use types::{Message, Sender, Thread, ThreadId, User, UserId};
