//! Wire types for the chat backend's REST API.

use serde::{Deserialize, Serialize};

/// Backend-assigned user identifier.
pub type UserId = i64;

/// Backend-assigned thread identifier.
pub type ThreadId = i64;

// =============================================================================
// Users
// =============================================================================

/// A named user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub name: String,
}

// =============================================================================
// Threads
// =============================================================================

/// A conversation thread as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    /// Owning user; not every backend sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// Display name for a thread. The backend never supplies one.
pub fn thread_display_name(id: ThreadId) -> String {
    format!("Chat {id}")
}

// =============================================================================
// Messages
// =============================================================================

/// Who wrote a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Sender {
    User,
    #[default]
    System,
}

impl From<Option<String>> for Sender {
    fn from(tag: Option<String>) -> Self {
        match tag.as_deref() {
            Some("User") => Self::User,
            _ => Self::System,
        }
    }
}

/// A single chat message.
///
/// Accepts both the client shape (`text`, `sender`) and the backend's
/// stored shape (`content`, `sender_type`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default, alias = "sender_type")]
    pub sender: Sender,
}

impl Message {
    /// A message typed locally by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    /// A message produced by the backend.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::System,
        }
    }
}

/// Request body for `POST /api/v1/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub user_id: UserId,
    pub message: String,
    /// `None` asks the backend to open a new thread.
    pub thread_id: Option<ThreadId>,
}

/// Response from `POST /api/v1/messages`: the backend's reply message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    pub thread_id: ThreadId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender_type: Option<String>,
}

impl SendMessageResponse {
    /// The reply as a message, classified as System unless tagged `User`.
    pub fn reply(&self) -> Message {
        Message {
            text: self.content.clone(),
            sender: Sender::from(self.sender_type.clone()),
        }
    }
}
