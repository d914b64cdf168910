//! One transcript entry.

use leptos::prelude::*;

use crate::state::{Action, ConversationId, ConversationStore, Feedback, Message, MessageRole, MessageStatus};
use crate::util::icons;

/// CSS modifier for a message role.
pub const fn role_class(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "message--user",
        MessageRole::Assistant => "message--assistant",
        MessageRole::System => "message--system",
    }
}

/// CSS modifier for a message status.
pub const fn status_class(status: MessageStatus) -> &'static str {
    match status {
        MessageStatus::Pending => "message--pending",
        MessageStatus::Streaming => "message--streaming",
        MessageStatus::Complete => "message--complete",
        MessageStatus::Errored => "message--errored",
    }
}

/// Renders a message with its status, error and feedback controls.
#[component]
pub fn MessageView(message: Message, conversation_id: ConversationId) -> impl IntoView {
    let store = StoredValue::new(expect_context::<ConversationStore>());
    let class = format!("message {} {}", role_class(message.role), status_class(message.status));

    let rate = move |message_id: String, current: Option<Feedback>, pick: Feedback| {
        let feedback = if current == Some(pick) { None } else { Some(pick) };
        let action = Action::SetFeedback { id: conversation_id.clone(), message_id, feedback };
        if let Err(e) = store.with_value(|s| s.dispatch(action)) {
            log::warn!("feedback not recorded: {e}");
        }
    };

    let show_feedback = message.role == MessageRole::Assistant && message.status == MessageStatus::Complete;
    let placeholder = message.status == MessageStatus::Pending && message.content.is_empty();
    let current = message.feedback;
    let up_id = message.id.clone();
    let down_id = message.id.clone();

    view! {
        <div class=class>
            <div class="message__content">
                {if placeholder { "…".to_owned() } else { message.content.clone() }}
            </div>
            {message.error.clone().map(|error| {
                view! {
                    <div class="message__error">
                        <span class="icon" inner_html=icons::markup("warning")></span>
                        {error}
                    </div>
                }
            })}
            {show_feedback.then(|| {
                let rate_up = rate.clone();
                view! {
                    <div class="message__feedback">
                        <button
                            class="btn btn--icon"
                            class:btn--selected=current == Some(Feedback::Positive)
                            title="Helpful"
                            on:click=move |_| rate_up(up_id.clone(), current, Feedback::Positive)
                            inner_html=icons::markup("thumb-up")
                        ></button>
                        <button
                            class="btn btn--icon"
                            class:btn--selected=current == Some(Feedback::Negative)
                            title="Not helpful"
                            on:click=move |_| rate(down_id.clone(), current, Feedback::Negative)
                            inner_html=icons::markup("thumb-down")
                        ></button>
                    </div>
                }
            })}
        </div>
    }
}
