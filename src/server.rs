use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::AppState;
use crate::api::{Client, ThreadId, UserId};
use crate::config::AppConfig;
use crate::session::Controller;
use crate::storage::{FileStore, KeyValueStore};
use crate::ui::{PageView, render_page};

/// Where handlers send the browser after a state change; the fragment
/// scrolls the message pane to its newest entry.
const LATEST: &str = "/#latest";

/// Start the web server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let client = Client::new(&config.backend.base_url)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage.path));

    info!(
        name: "backend.config.loaded",
        base_url = %client.base_url(),
        state_file = %config.storage.path,
        "Backend configuration loaded"
    );

    let controller = Arc::new(Controller::start(client, store).await);
    let state = AppState {
        controller: Arc::clone(&controller),
        config: Arc::clone(&config),
    };

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    controller.end_session().await;
    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // HTML page
        .route("/", get(index_handler))
        // User directory
        .route("/users", post(create_user))
        .route("/users/cancel", post(close_user_modal))
        .route("/users/select", post(select_user))
        // Threads
        .route("/threads/new", post(new_thread))
        .route("/threads/{id}", post(open_thread))
        .route("/threads/{id}/refresh", post(refresh_thread))
        // Messages
        .route("/messages", post(send_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for the index page.
#[derive(Debug, Deserialize)]
struct IndexQuery {
    /// Any value other than `0` opens the add-user modal.
    #[serde(default)]
    add_user: Option<String>,
}

/// GET / - Render the chat page.
async fn index_handler(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Response {
    let show_modal = query.add_user.is_some_and(|v| v != "0");
    let view = PageView::from_state(&*state.controller.state().await, show_modal);

    match render_page(&view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render chat page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render page: {e}"),
            )
                .into_response()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Form Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form body for creating a user.
#[derive(Debug, Deserialize)]
struct CreateUserForm {
    #[serde(default)]
    name: String,
}

/// Form body for switching users.
#[derive(Debug, Deserialize)]
struct SelectUserForm {
    user_id: UserId,
}

/// Form body for the composer.
#[derive(Debug, Deserialize)]
struct SendMessageForm {
    #[serde(default)]
    text: String,
}

/// POST /users - Create (or reuse) a user by name and select it.
async fn create_user(State(state): State<AppState>, Form(form): Form<CreateUserForm>) -> Redirect {
    match state.controller.create_user(&form.name).await {
        Some(_) => Redirect::to("/"),
        // Keep the modal open so the name can be fixed or retried.
        None => Redirect::to("/?add_user=1"),
    }
}

/// POST /users/cancel - Close the modal and refresh the user directory.
async fn close_user_modal(State(state): State<AppState>) -> Redirect {
    state.controller.refresh_users().await;
    Redirect::to("/")
}

/// POST /users/select - Switch to a user from the directory.
async fn select_user(State(state): State<AppState>, Form(form): Form<SelectUserForm>) -> Redirect {
    let user = state
        .controller
        .state()
        .await
        .users()
        .iter()
        .find(|u| u.id == form.user_id)
        .cloned();

    match user {
        Some(user) => state.controller.select_user(user).await,
        None => warn!(user_id = form.user_id, "Ignoring selection of unknown user"),
    }
    Redirect::to("/")
}

/// POST /threads/new - Start a thread the backend will create on first send.
async fn new_thread(State(state): State<AppState>) -> Redirect {
    state.controller.start_new_thread().await;
    Redirect::to(LATEST)
}

/// POST /threads/{id} - Open an existing thread.
async fn open_thread(State(state): State<AppState>, Path(id): Path<ThreadId>) -> Redirect {
    state.controller.open_thread(id).await;
    Redirect::to(LATEST)
}

/// POST /threads/{id}/refresh - Re-fetch a thread's messages.
async fn refresh_thread(State(state): State<AppState>, Path(id): Path<ThreadId>) -> Redirect {
    state.controller.load_messages(Some(id)).await;
    Redirect::to(LATEST)
}

/// POST /messages - Send the composer text to the selected thread.
async fn send_message(
    State(state): State<AppState>,
    Form(form): Form<SendMessageForm>,
) -> Redirect {
    let controller = &state.controller;
    controller.set_draft(form.text.as_str()).await;

    let thread_id = controller.state().await.selection().thread_id();
    controller.send_message(&form.text, thread_id).await;
    Redirect::to(LATEST)
}
