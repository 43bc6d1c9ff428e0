//! View models: what the page shows, derived from conversation state.

use serde::Serialize;

use crate::api::types::{Sender, ThreadId, User, UserId};
use crate::session::{ConversationState, ThreadSelection};

/// Shown in place of an empty message body.
const EMPTY_MESSAGE_TEXT: &str = "No message content";

/// One entry of the user dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOption {
    pub id: UserId,
    pub name: String,
    pub selected: bool,
}

/// One entry of the thread sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadItem {
    pub id: ThreadId,
    pub name: String,
    pub selected: bool,
}

/// One rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub label: &'static str,
    pub text: String,
    pub from_user: bool,
}

/// What the message pane displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneStatus {
    /// No thread selected.
    NoSelection,
    /// Selected thread has no messages (or none loaded yet).
    Empty,
    /// Messages to show.
    Messages,
}

/// Everything the page template needs.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub users: Vec<UserOption>,
    pub has_users: bool,
    pub selected_user: Option<User>,
    pub threads: Vec<ThreadItem>,
    pub pane: PaneStatus,
    pub messages: Vec<MessageView>,
    /// The selected thread, `None` for no selection or a pending thread.
    pub thread_id: Option<ThreadId>,
    pub pending_thread: bool,
    pub draft: String,
    pub show_user_modal: bool,
}

impl PageView {
    /// Project the state into a view. `show_user_modal` is transient page
    /// state and not part of the conversation.
    pub fn from_state(state: &ConversationState, show_user_modal: bool) -> Self {
        let selected_id = state.selected_user().map(|u| u.id);
        let selection = state.selection();

        let users: Vec<UserOption> = state
            .users()
            .iter()
            .map(|u| UserOption {
                id: u.id,
                name: u.name.clone(),
                selected: Some(u.id) == selected_id,
            })
            .collect();

        let threads = state
            .threads()
            .iter()
            .map(|&id| ThreadItem {
                id,
                name: state
                    .thread_name(id)
                    .map_or_else(|| crate::api::types::thread_display_name(id), str::to_string),
                selected: selection == ThreadSelection::Active(id),
            })
            .collect();

        let messages: Vec<MessageView> = state
            .selected_messages()
            .unwrap_or_default()
            .iter()
            .map(|m| {
                let from_user = m.sender == Sender::User;
                MessageView {
                    label: if from_user { "You" } else { "System" },
                    text: if m.text.is_empty() {
                        EMPTY_MESSAGE_TEXT.to_string()
                    } else {
                        m.text.clone()
                    },
                    from_user,
                }
            })
            .collect();

        let pane = match selection {
            ThreadSelection::None => PaneStatus::NoSelection,
            _ if messages.is_empty() => PaneStatus::Empty,
            _ => PaneStatus::Messages,
        };

        Self {
            has_users: !users.is_empty(),
            users,
            selected_user: state.selected_user().cloned(),
            threads,
            pane,
            messages,
            thread_id: selection.thread_id(),
            pending_thread: selection == ThreadSelection::Pending,
            draft: state.draft().to_string(),
            show_user_modal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Message;

    fn state_with_threads() -> ConversationState {
        let mut state = ConversationState::new();
        state.set_users(vec![
            User {
                id: 1,
                name: "Ana".into(),
            },
            User {
                id: 2,
                name: "Bo".into(),
            },
        ]);
        let generation = state.select_user(User {
            id: 1,
            name: "Ana".into(),
        });
        state.apply_threads(generation, 1, [5, 7]);
        state
    }

    #[test]
    fn test_empty_state() {
        let view = PageView::from_state(&ConversationState::new(), false);
        assert!(!view.has_users);
        assert!(view.threads.is_empty());
        assert_eq!(view.pane, PaneStatus::NoSelection);
        assert!(view.selected_user.is_none());
    }

    #[test]
    fn test_selection_is_highlighted() {
        let mut state = state_with_threads();
        state.select_thread(5);
        let view = PageView::from_state(&state, false);

        assert_eq!(view.users.iter().filter(|u| u.selected).count(), 1);
        assert!(view.users[0].selected);
        assert_eq!(view.threads[0].name, "Chat 7");
        assert!(!view.threads[0].selected);
        assert!(view.threads[1].selected);
        assert_eq!(view.thread_id, Some(5));
        assert_eq!(view.pane, PaneStatus::Empty);
    }

    #[test]
    fn test_messages_are_labelled() {
        let mut state = state_with_threads();
        let generation = state.generation();
        state.select_thread(5);
        state.apply_messages(
            generation,
            1,
            5,
            vec![Message::user("hi"), Message::system("")],
        );
        let view = PageView::from_state(&state, false);

        assert_eq!(view.pane, PaneStatus::Messages);
        assert_eq!(view.messages[0].label, "You");
        assert!(view.messages[0].from_user);
        assert_eq!(view.messages[1].label, "System");
        assert_eq!(view.messages[1].text, "No message content");
    }

    #[test]
    fn test_pending_thread() {
        let mut state = state_with_threads();
        state.start_new_thread();
        let view = PageView::from_state(&state, true);
        assert!(view.pending_thread);
        assert_eq!(view.thread_id, None);
        assert_eq!(view.pane, PaneStatus::Empty);
        assert!(view.show_user_modal);
    }
}
