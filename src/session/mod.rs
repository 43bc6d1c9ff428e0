//! Conversation state and its controller.
//!
//! # Architecture
//!
//! - [`ConversationState`]: users, threads and cached messages of one session
//! - [`Controller`]: the only writer of that state; talks to the backend
//!
//! # Example
//!
//! ```rust
//! use chatbox::api::{Message, User};
//! use chatbox::session::{ConversationState, ThreadSelection};
//!
//! let mut state = ConversationState::new();
//! let generation = state.select_user(User { id: 1, name: "Ana".into() });
//! state.apply_threads(generation, 1, [5, 7]);
//! assert_eq!(state.threads(), &[7, 5]);
//!
//! state.start_new_thread();
//! state.apply_sent(generation, 1, 9, "hi", Message::system("hello"));
//! assert_eq!(state.selection(), ThreadSelection::Active(9));
//! ```

mod controller;
mod state;

pub use controller::{Controller, SELECTED_USER_KEY};
pub use state::{ConversationState, Generation, ThreadSelection};
