//! Template rendering for the chat page.
//!
//! Templates are embedded at compile time; `.html` templates are
//! auto-escaped.

use std::sync::LazyLock;

use minijinja::{AutoEscape, Environment, Error};

use super::view::PageView;

const TEMPLATES: &[(&str, &str)] = &[
    ("page.html", include_str!("templates/page.html")),
    ("user_selector.html", include_str!("templates/user_selector.html")),
    ("thread_list.html", include_str!("templates/thread_list.html")),
    ("message_list.html", include_str!("templates/message_list.html")),
    ("composer.html", include_str!("templates/composer.html")),
    ("user_modal.html", include_str!("templates/user_modal.html")),
];

static ENV: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();

    env.set_auto_escape_callback(|name| {
        let is_html = std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        if is_html {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!(template = name, error = %e, "Invalid embedded template");
        }
    }

    env
});

fn render_template<T: serde::Serialize>(name: &str, ctx: T) -> Result<String, Error> {
    let tpl = ENV.get_template(name)?;
    tpl.render(ctx)
}

/// Render the whole chat page.
pub fn render_page(view: &PageView) -> crate::Result<String> {
    Ok(render_template("page.html", view)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Message, User};
    use crate::session::ConversationState;

    fn render(state: &ConversationState, modal: bool) -> String {
        render_page(&PageView::from_state(state, modal)).unwrap()
    }

    #[test]
    fn test_placeholder_without_users() {
        let html = render(&ConversationState::new(), false);
        assert!(html.contains("No users available"));
        assert!(html.contains("Select a chat to view messages."));
        assert!(!html.contains("id=\"user-modal\""));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut state = ConversationState::new();
        let user = User {
            id: 1,
            name: "<b>Ana</b>".into(),
        };
        state.set_users(vec![user.clone()]);
        let generation = state.select_user(user);
        state.apply_threads(generation, 1, [5]);
        state.select_thread(5);
        state.apply_messages(
            generation,
            1,
            5,
            vec![Message::user("<script>alert(1)</script>")],
        );

        let html = render(&state, false);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>Ana</b>"));
        assert!(html.contains("Chat 5"));
        assert!(html.contains("id=\"latest\""));
    }

    #[test]
    fn test_modal_and_draft() {
        let mut state = ConversationState::new();
        state.select_user(User {
            id: 1,
            name: "Ana".into(),
        });
        state.start_new_thread();
        state.set_draft("unsent words");

        let html = render(&state, true);
        assert!(html.contains("id=\"user-modal\""));
        assert!(html.contains("unsent words"));
        assert!(html.contains("No messages yet."));
    }
}
