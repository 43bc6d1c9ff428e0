//! Conversation controller: the only writer of [`ConversationState`].
//!
//! Every operation follows the same shape: snapshot what it needs under the
//! lock, release it, talk to the backend, then re-take the lock and apply the
//! result if the user selection has not moved on in the meantime.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::api::Client;
use crate::api::types::{ThreadId, User, UserId};
use crate::error::Error;
use crate::storage::KeyValueStore;

use super::state::{ConversationState, Generation};

/// Storage slot holding the last selected user as JSON.
pub const SELECTED_USER_KEY: &str = "selectedUser";

/// Owns the conversation state for one chat session.
#[derive(Debug)]
pub struct Controller {
    client: Client,
    store: Arc<dyn KeyValueStore>,
    state: RwLock<ConversationState>,
    /// Serializes user selection with its persistence so the stored slot
    /// always names the selected user.
    selecting: Mutex<()>,
}

impl Controller {
    /// Create a controller with empty state and no network activity.
    pub fn new(client: Client, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client,
            store,
            state: RwLock::new(ConversationState::new()),
            selecting: Mutex::new(()),
        }
    }

    /// Create a controller and bring the session up: fetch the user
    /// directory and reselect the persisted user, if any.
    pub async fn start(client: Client, store: Arc<dyn KeyValueStore>) -> Self {
        let controller = Self::new(client, store);
        let restored = controller.persisted_user().await;

        controller.refresh_users().await;

        if let Some(user) = restored {
            info!(
                name: "chat.session.restored",
                user_id = user.id,
                user_name = %user.name,
                "Restored last selected user"
            );
            controller.select_user(user).await;
        }

        info!(name: "chat.session.started", "Chat session started");
        controller
    }

    /// Drop every cached thread and message.
    pub async fn end_session(&self) {
        self.state.write().await.reset();
        info!(name: "chat.session.ended", "Chat session ended");
    }

    /// Read access for rendering.
    pub async fn state(&self) -> RwLockReadGuard<'_, ConversationState> {
        self.state.read().await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    /// Last selected user from storage. Missing or malformed data is `None`.
    pub async fn persisted_user(&self) -> Option<User> {
        let raw = match self.store.get(SELECTED_USER_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted user");
                return None;
            }
        };
        match serde_json::from_str::<Option<User>>(&raw) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed persisted user");
                None
            }
        }
    }

    /// Re-fetch the user directory. Failures leave an empty directory.
    pub async fn refresh_users(&self) {
        let users = match self.client.users().list().await {
            Ok(users) => users,
            Err(e) => {
                log_fetch_failure("users", &e);
                Vec::new()
            }
        };
        debug!(count = users.len(), "User directory loaded");
        self.state.write().await.set_users(users);
    }

    /// Create a user (or get the existing one with this name) and select it.
    ///
    /// Blank names are ignored. Returns the selected user.
    pub async fn create_user(&self, name: &str) -> Option<User> {
        if name.trim().is_empty() {
            return None;
        }
        match self.client.users().create(name).await {
            Ok(user) => {
                info!(
                    name: "chat.user.created",
                    user_id = user.id,
                    user_name = %user.name,
                    "User created"
                );
                self.select_user(user.clone()).await;
                self.refresh_users().await;
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create user");
                None
            }
        }
    }

    /// Switch to `user`: persist it, clear every cache and load its threads.
    pub async fn select_user(&self, user: User) {
        let user_id = user.id;
        let generation = {
            let _selecting = self.selecting.lock().await;
            let generation = self.state.write().await.select_user(user.clone());
            self.persist_user(&user).await;
            generation
        };
        info!(name: "chat.user.selected", user_id, "User selected");

        self.fetch_threads(user_id, generation).await;
    }

    async fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => {
                if let Err(e) = self.store.set(SELECTED_USER_KEY, &json).await {
                    warn!(error = %e, "Failed to persist selected user");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode selected user"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Threads
    // ─────────────────────────────────────────────────────────────────────

    /// Reload the thread list of `user_id`.
    ///
    /// The result is dropped if another user has been selected since.
    pub async fn load_threads(&self, user_id: UserId) {
        let generation = self.state.read().await.generation();
        self.fetch_threads(user_id, generation).await;
    }

    async fn fetch_threads(&self, user_id: UserId, generation: Generation) {
        let ids: Vec<ThreadId> = match self.client.threads().list(user_id).await {
            Ok(threads) => threads.into_iter().map(|t| t.id).collect(),
            Err(e) => {
                log_fetch_failure("threads", &e);
                Vec::new()
            }
        };
        let count = ids.len();

        if self
            .state
            .write()
            .await
            .apply_threads(generation, user_id, ids)
        {
            debug!(user_id, count, "Thread list loaded");
        } else {
            debug!(user_id, "Discarding stale thread list");
        }
    }

    /// Switch to a fresh thread that the backend will create on first send.
    pub async fn start_new_thread(&self) {
        if self.state.write().await.start_new_thread() {
            debug!("Started new pending thread");
        }
    }

    /// Select an existing thread, fetching its messages unless cached.
    ///
    /// Ids outside the selected user's thread list are ignored.
    pub async fn open_thread(&self, thread_id: ThreadId) {
        match self.state.write().await.select_thread(thread_id) {
            Some(true) => {}
            Some(false) => return,
            None => {
                warn!(thread_id, "Ignoring selection of unknown thread");
                return;
            }
        }
        self.load_messages(Some(thread_id)).await;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Messages
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch and replace the cached messages of a thread.
    ///
    /// An absent or zero id is a no-op, as is a thread the selected user
    /// does not own. On failure the cache is untouched.
    pub async fn load_messages(&self, thread_id: Option<ThreadId>) {
        let Some(thread_id) = thread_id.filter(|&id| id != 0) else {
            return;
        };
        let (generation, user_id) = {
            let state = self.state.read().await;
            let Some(user) = state.selected_user() else {
                return;
            };
            if !state.has_thread(thread_id) {
                warn!(thread_id, "Ignoring refresh of unknown thread");
                return;
            }
            (state.generation(), user.id)
        };

        match self.client.messages().list(thread_id).await {
            Ok(messages) => {
                let count = messages.len();
                if self
                    .state
                    .write()
                    .await
                    .apply_messages(generation, user_id, thread_id, messages)
                {
                    debug!(thread_id, count, "Messages loaded");
                } else {
                    debug!(thread_id, "Discarding stale messages");
                }
            }
            Err(e) => {
                warn!(thread_id, error = %e, "Failed to fetch messages");
            }
        }
    }

    /// Record the composer text.
    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.write().await.set_draft(text);
    }

    /// Post `text` to `thread_id` (`None` opens a new thread).
    ///
    /// Blank text, no selected user, or a thread outside the selected user's
    /// list is a no-op. On success the outbound message and the reply are
    /// appended and the draft is cleared; on failure nothing changes.
    /// Returns the thread the message landed in.
    pub async fn send_message(&self, text: &str, thread_id: Option<ThreadId>) -> Option<ThreadId> {
        if text.trim().is_empty() {
            return None;
        }
        let (generation, user_id) = {
            let state = self.state.read().await;
            let user = state.selected_user()?;
            if let Some(id) = thread_id
                && !state.has_thread(id)
            {
                warn!(thread_id = id, "Refusing to send to unknown thread");
                return None;
            }
            (state.generation(), user.id)
        };

        let response = match self.client.messages().send(user_id, text, thread_id).await {
            Ok(response) => response,
            Err(e) => {
                warn!(user_id, thread_id = ?thread_id, error = %e, "Failed to send message");
                return None;
            }
        };

        let assigned = response.thread_id;
        let created = thread_id != Some(assigned);
        let applied = self.state.write().await.apply_sent(
            generation,
            user_id,
            assigned,
            text,
            response.reply(),
        );
        if !applied {
            debug!(thread_id = assigned, "Discarding stale send result");
            return None;
        }

        if created {
            info!(name: "chat.thread.created", user_id, thread_id = assigned, "Thread created");
        }
        debug!(user_id, thread_id = assigned, "Message sent");
        Some(assigned)
    }
}

/// 404 is how the backend says "none yet"; anything else is worth a warning.
fn log_fetch_failure(what: &str, error: &Error) {
    if error.is_not_found() {
        debug!(resource = what, "Backend has no entries");
    } else {
        warn!(resource = what, error = %error, "Fetch failed");
    }
}
