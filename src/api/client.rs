//! HTTP client for the chat backend.

use crate::{
    api::types::{
        CreateUserRequest, Message, SendMessageRequest, SendMessageResponse, Thread, ThreadId,
        User, UserId,
    },
    error::{Error, Result},
};
use url::Url;

/// Fixed path prefix of every backend endpoint.
const API_PREFIX: &str = "/api/v1";

/// HTTP client for the backend API.
///
/// # Example
///
/// ```rust,no_run
/// use chatbox::api::Client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new("http://127.0.0.1:8000")?;
///
/// let users = client.users().list().await?;
/// let threads = client.threads().list(users[0].id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the backend (e.g., "http://127.0.0.1:8000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the user directory.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }

    /// Access the thread directory.
    pub fn threads(&self) -> ThreadsApi<'_> {
        ThreadsApi { client: self }
    }

    /// Access the Messages API.
    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi { client: self }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("{API_PREFIX}{path}"))?)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

// =============================================================================
// Users API
// =============================================================================

/// User directory client.
#[derive(Debug)]
pub struct UsersApi<'a> {
    client: &'a Client,
}

impl UsersApi<'_> {
    /// List all users.
    pub async fn list(&self) -> Result<Vec<User>> {
        let response = self
            .client
            .http
            .get(self.client.url("/users")?)
            .send()
            .await?;
        Client::handle_response(response).await
    }

    /// Create a user, or get the existing one with that name.
    pub async fn create(&self, name: impl Into<String>) -> Result<User> {
        let req = CreateUserRequest { name: name.into() };
        let response = self
            .client
            .http
            .post(self.client.url("/users")?)
            .json(&req)
            .send()
            .await?;
        Client::handle_response(response).await
    }
}

// =============================================================================
// Threads API
// =============================================================================

/// Thread directory client.
#[derive(Debug)]
pub struct ThreadsApi<'a> {
    client: &'a Client,
}

impl ThreadsApi<'_> {
    /// List the threads owned by a user, in backend order.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Thread>> {
        let response = self
            .client
            .http
            .get(self.client.url("/threads")?)
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        Client::handle_response(response).await
    }
}

// =============================================================================
// Messages API
// =============================================================================

/// Messages API client.
#[derive(Debug)]
pub struct MessagesApi<'a> {
    client: &'a Client,
}

impl MessagesApi<'_> {
    /// Get the messages of a thread in arrival order.
    pub async fn list(&self, thread_id: ThreadId) -> Result<Vec<Message>> {
        let response = self
            .client
            .http
            .get(self.client.url("/messages")?)
            .query(&[("thread_id", thread_id)])
            .send()
            .await?;
        Client::handle_response(response).await
    }

    /// Post a message. A `None` thread asks the backend to open a new one.
    pub async fn send(
        &self,
        user_id: UserId,
        message: impl Into<String>,
        thread_id: Option<ThreadId>,
    ) -> Result<SendMessageResponse> {
        let req = SendMessageRequest {
            user_id,
            message: message.into(),
            thread_id,
        };
        let response = self
            .client
            .http
            .post(self.client.url("/messages")?)
            .json(&req)
            .send()
            .await?;
        Client::handle_response(response).await
    }
}
