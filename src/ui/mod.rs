//! Server-rendered chat page.
//!
//! The page is a pure function of [`ConversationState`](crate::session::ConversationState):
//! [`PageView::from_state`] projects the state, [`render_page`] turns the
//! projection into HTML. Interaction happens through plain form posts, so the
//! page works without any client-side script.

mod templates;
mod view;

pub use templates::render_page;
pub use view::{MessageView, PageView, PaneStatus, ThreadItem, UserOption};
