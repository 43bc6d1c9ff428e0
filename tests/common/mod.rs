//! In-process stand-in for the chat backend.
//!
//! Mirrors the real service closely enough for client tests: list endpoints
//! answer 404 when empty, posting a message without a thread opens one, and
//! every post gets a System reply.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Data {
    users: Vec<(i64, String)>,
    threads: HashMap<i64, Vec<i64>>,
    messages: HashMap<i64, Vec<(String, String)>>,
    next_user: i64,
    next_thread: i64,
    next_message: i64,
    reply: Option<String>,
    fail_posts: bool,
    fail_message_reads: bool,
    held_thread_list: Option<(i64, Arc<Notify>)>,
    hits: HashMap<String, usize>,
}

/// Shared handle to the fake backend's data.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    data: Arc<Mutex<Data>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut data = backend.data.lock().unwrap();
            data.next_user = 1;
            data.next_thread = 100;
            data.next_message = 1;
        }
        backend
    }

    pub fn with_user(self, id: i64, name: &str) -> Self {
        {
            let mut data = self.data.lock().unwrap();
            data.users.push((id, name.to_string()));
            data.next_user = data.next_user.max(id + 1);
        }
        self
    }

    pub fn with_threads(self, user_id: i64, ids: &[i64]) -> Self {
        self.data
            .lock()
            .unwrap()
            .threads
            .insert(user_id, ids.to_vec());
        self
    }

    /// Replace a user's threads on a running backend.
    pub fn set_threads(&self, user_id: i64, ids: &[i64]) {
        self.data
            .lock()
            .unwrap()
            .threads
            .insert(user_id, ids.to_vec());
    }

    pub fn with_messages(self, thread_id: i64, messages: &[(&str, &str)]) -> Self {
        self.data.lock().unwrap().messages.insert(
            thread_id,
            messages
                .iter()
                .map(|(content, sender)| ((*content).to_string(), (*sender).to_string()))
                .collect(),
        );
        self
    }

    pub fn with_next_thread(self, id: i64) -> Self {
        self.data.lock().unwrap().next_thread = id;
        self
    }

    /// Fixed reply content instead of the default echo.
    pub fn with_reply(self, reply: &str) -> Self {
        self.data.lock().unwrap().reply = Some(reply.to_string());
        self
    }

    pub fn fail_posts(&self, fail: bool) {
        self.data.lock().unwrap().fail_posts = fail;
    }

    pub fn fail_message_reads(&self, fail: bool) {
        self.data.lock().unwrap().fail_message_reads = fail;
    }

    /// Make the thread listing for `user_id` wait until the returned notify
    /// is triggered.
    pub fn hold_thread_list(&self, user_id: i64) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.data.lock().unwrap().held_thread_list = Some((user_id, Arc::clone(&notify)));
        notify
    }

    /// Number of requests received for e.g. `"GET /messages"`.
    pub fn hits(&self, route: &str) -> usize {
        self.data
            .lock()
            .unwrap()
            .hits
            .get(route)
            .copied()
            .unwrap_or(0)
    }

    fn hit(&self, route: &str) {
        *self
            .data
            .lock()
            .unwrap()
            .hits
            .entry(route.to_string())
            .or_default() += 1;
    }

    fn router(self) -> Router {
        Router::new()
            .route("/api/v1/users", get(list_users).post(create_user))
            .route("/api/v1/threads", get(list_threads))
            .route("/api/v1/messages", get(list_messages).post(create_message))
            .with_state(self)
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn spawn(self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}

async fn list_users(State(backend): State<FakeBackend>) -> Response {
    backend.hit("GET /users");
    let data = backend.data.lock().unwrap();
    if data.users.is_empty() {
        return not_found("No users found");
    }
    let users: Vec<_> = data
        .users
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    Json(users).into_response()
}

#[derive(Deserialize)]
struct CreateUser {
    name: String,
}

async fn create_user(State(backend): State<FakeBackend>, Json(body): Json<CreateUser>) -> Response {
    backend.hit("POST /users");
    let mut data = backend.data.lock().unwrap();
    if data.fail_posts {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
    }
    if let Some((id, name)) = data.users.iter().find(|(_, name)| *name == body.name) {
        return Json(json!({ "id": id, "name": name })).into_response();
    }
    let id = data.next_user;
    data.next_user += 1;
    data.users.push((id, body.name.clone()));
    (StatusCode::OK, Json(json!({ "id": id, "name": body.name }))).into_response()
}

#[derive(Deserialize)]
struct ThreadsQuery {
    user_id: i64,
}

async fn list_threads(
    State(backend): State<FakeBackend>,
    Query(query): Query<ThreadsQuery>,
) -> Response {
    backend.hit("GET /threads");
    let held = {
        let data = backend.data.lock().unwrap();
        data.held_thread_list
            .as_ref()
            .filter(|(user_id, _)| *user_id == query.user_id)
            .map(|(_, notify)| Arc::clone(notify))
    };
    if let Some(notify) = held {
        notify.notified().await;
    }

    let data = backend.data.lock().unwrap();
    match data.threads.get(&query.user_id) {
        Some(ids) if !ids.is_empty() => {
            let threads: Vec<_> = ids
                .iter()
                .map(|id| json!({ "id": id, "user_id": query.user_id }))
                .collect();
            Json(threads).into_response()
        }
        _ => not_found("No threads found for this user"),
    }
}

#[derive(Deserialize)]
struct MessagesQuery {
    thread_id: i64,
}

async fn list_messages(
    State(backend): State<FakeBackend>,
    Query(query): Query<MessagesQuery>,
) -> Response {
    backend.hit("GET /messages");
    let data = backend.data.lock().unwrap();
    if data.fail_message_reads {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    match data.messages.get(&query.thread_id) {
        Some(messages) if !messages.is_empty() => {
            let body: Vec<_> = messages
                .iter()
                .enumerate()
                .map(|(i, (content, sender))| {
                    json!({
                        "id": i + 1,
                        "thread_id": query.thread_id,
                        "content": content,
                        "sender_type": sender,
                    })
                })
                .collect();
            Json(body).into_response()
        }
        _ => not_found("No messages found for this thread"),
    }
}

#[derive(Deserialize)]
struct CreateMessage {
    thread_id: Option<i64>,
    user_id: i64,
    message: String,
}

async fn create_message(
    State(backend): State<FakeBackend>,
    Json(body): Json<CreateMessage>,
) -> Response {
    backend.hit("POST /messages");
    let mut data = backend.data.lock().unwrap();
    if data.fail_posts {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Unable to create message").into_response();
    }

    let thread_id = match body.thread_id {
        Some(id) => id,
        None => {
            let id = data.next_thread;
            data.next_thread += 1;
            data.threads.entry(body.user_id).or_default().push(id);
            id
        }
    };
    let reply = data
        .reply
        .clone()
        .unwrap_or_else(|| format!("echo: {}", body.message));

    let sequence = data.messages.entry(thread_id).or_default();
    sequence.push((body.message, "User".to_string()));
    sequence.push((reply.clone(), "System".to_string()));

    let id = data.next_message;
    data.next_message += 2;

    (
        StatusCode::CREATED,
        Json(json!({
            "id": id + 1,
            "thread_id": thread_id,
            "sender_type": "System",
            "content": reply,
        })),
    )
        .into_response()
}
