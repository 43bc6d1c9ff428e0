//! Conversation state: users, threads and per-thread message caches.
//!
//! Everything here is synchronous and free of I/O. The
//! [`Controller`](super::Controller) decides when to talk to the backend and
//! feeds the results back through the `apply_*` methods, which drop results
//! that belong to an older user selection.

use std::collections::HashMap;

use crate::api::types::{Message, ThreadId, User, UserId, thread_display_name};

/// Which thread the conversation pane shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThreadSelection {
    /// Nothing selected yet.
    #[default]
    None,
    /// A new thread the backend has not assigned an id to.
    Pending,
    /// An existing thread.
    Active(ThreadId),
}

impl ThreadSelection {
    /// The thread id to post with, `None` for the pending thread.
    pub fn thread_id(self) -> Option<ThreadId> {
        match self {
            Self::Active(id) => Some(id),
            Self::None | Self::Pending => None,
        }
    }
}

/// Counter bumped on every user selection.
///
/// A response is only applied when the generation it was requested under is
/// still current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// In-memory state of one chat session.
#[derive(Debug, Default)]
pub struct ConversationState {
    users: Vec<User>,
    selected_user: Option<User>,
    /// Newest first.
    threads: Vec<ThreadId>,
    thread_names: HashMap<ThreadId, String>,
    messages: HashMap<ThreadId, Vec<Message>>,
    pending: Option<Vec<Message>>,
    selection: ThreadSelection,
    draft: String,
    generation: Generation,
}

impl ConversationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.selected_user.as_ref()
    }

    /// Thread ids, newest first.
    pub fn threads(&self) -> &[ThreadId] {
        &self.threads
    }

    pub fn thread_name(&self, id: ThreadId) -> Option<&str> {
        self.thread_names.get(&id).map(String::as_str)
    }

    pub fn thread_names(&self) -> &HashMap<ThreadId, String> {
        &self.thread_names
    }

    pub fn selection(&self) -> ThreadSelection {
        self.selection
    }

    /// Cached messages of an existing thread.
    pub fn messages(&self, id: ThreadId) -> Option<&[Message]> {
        self.messages.get(&id).map(Vec::as_slice)
    }

    /// Messages of whatever thread is selected.
    pub fn selected_messages(&self) -> Option<&[Message]> {
        match self.selection {
            ThreadSelection::None => None,
            ThreadSelection::Pending => self.pending.as_deref(),
            ThreadSelection::Active(id) => self.messages(id),
        }
    }

    pub fn is_cached(&self, id: ThreadId) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a response requested under `generation` for `user_id` may
    /// still be applied.
    pub fn is_current(&self, generation: Generation, user_id: UserId) -> bool {
        self.generation == generation && self.selected_user.as_ref().map(|u| u.id) == Some(user_id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the user directory.
    pub fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Select a user and drop everything cached for the previous one.
    ///
    /// Returns the new generation; responses requested under an older one
    /// are discarded from now on.
    pub fn select_user(&mut self, user: User) -> Generation {
        self.selected_user = Some(user);
        self.threads.clear();
        self.thread_names.clear();
        self.messages.clear();
        self.pending = None;
        self.selection = ThreadSelection::None;
        self.generation = self.generation.next();
        self.generation
    }

    /// Overwrite the thread list with ids in backend order.
    ///
    /// Returns `false` when the result is stale and was ignored.
    pub fn apply_threads(
        &mut self,
        generation: Generation,
        user_id: UserId,
        ids: impl IntoIterator<Item = ThreadId>,
    ) -> bool {
        if !self.is_current(generation, user_id) {
            return false;
        }
        let mut ids: Vec<ThreadId> = ids.into_iter().collect();
        ids.reverse();
        self.thread_names = ids.iter().map(|&id| (id, thread_display_name(id))).collect();
        self.threads = ids;
        true
    }

    /// Switch to a fresh, not yet created thread.
    ///
    /// Returns `false` when no user is selected.
    pub fn start_new_thread(&mut self) -> bool {
        if self.selected_user.is_none() {
            return false;
        }
        self.selection = ThreadSelection::Pending;
        self.pending = Some(Vec::new());
        true
    }

    /// Whether `id` belongs to the selected user's thread list.
    pub fn has_thread(&self, id: ThreadId) -> bool {
        self.threads.contains(&id)
    }

    /// Select an existing thread of the selected user.
    ///
    /// Returns `Some(true)` when its messages still need to be fetched and
    /// `None` when the id is not in the thread list; the selection is then
    /// left alone.
    pub fn select_thread(&mut self, id: ThreadId) -> Option<bool> {
        if !self.has_thread(id) {
            return None;
        }
        self.selection = ThreadSelection::Active(id);
        Some(!self.is_cached(id))
    }

    /// Replace the cached sequence of one thread.
    pub fn apply_messages(
        &mut self,
        generation: Generation,
        user_id: UserId,
        id: ThreadId,
        messages: Vec<Message>,
    ) -> bool {
        if !self.is_current(generation, user_id) {
            return false;
        }
        self.messages.insert(id, messages);
        true
    }

    /// Record a successful send: the outbound text and the backend reply are
    /// appended together, and an unseen thread id is put at the front of the
    /// list and selected.
    ///
    /// Returns `false` when the result is stale and was ignored.
    pub fn apply_sent(
        &mut self,
        generation: Generation,
        user_id: UserId,
        thread_id: ThreadId,
        text: impl Into<String>,
        reply: Message,
    ) -> bool {
        if !self.is_current(generation, user_id) {
            return false;
        }
        if !self.threads.contains(&thread_id) {
            self.threads.insert(0, thread_id);
            self.thread_names
                .insert(thread_id, thread_display_name(thread_id));
            if self.selection == ThreadSelection::Pending {
                self.pending = None;
            }
            self.selection = ThreadSelection::Active(thread_id);
        }
        let sequence = self.messages.entry(thread_id).or_default();
        sequence.push(Message::user(text));
        sequence.push(reply);
        self.draft.clear();
        true
    }

    /// Drop all cached session data.
    pub fn reset(&mut self) {
        let generation = self.generation.next();
        *self = Self {
            generation,
            ..Self::default()
        };
    }
}
