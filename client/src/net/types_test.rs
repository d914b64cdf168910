use super::*;
use crate::state::Message;

// =============================================================
// parse_stream_line
// =============================================================

#[test]
fn assistant_content_becomes_delta() {
    let line = r#"{"id":"1","model":"gpt","created":0,"object":"chat.completion.chunk","choices":[{"messages":[{"role":"assistant","content":"Hel"}]}],"history_metadata":{}}"#;
    assert_eq!(parse_stream_line(line).unwrap(), Some(StreamEvent::Delta("Hel".into())));
}

#[test]
fn tool_messages_are_skipped() {
    let line = r#"{"choices":[{"messages":[{"role":"tool","content":"{\"citations\":[]}"}]}]}"#;
    assert_eq!(parse_stream_line(line).unwrap(), None);
}

#[test]
fn assistant_context_without_content_is_skipped() {
    let line = r#"{"choices":[{"messages":[{"role":"assistant","context":{"intent":"x"}}]}]}"#;
    assert_eq!(parse_stream_line(line).unwrap(), None);
}

#[test]
fn empty_object_is_keep_alive() {
    assert_eq!(parse_stream_line("{}").unwrap(), None);
}

#[test]
fn error_line_becomes_error_event() {
    assert_eq!(
        parse_stream_line(r#"{"error":"rate limited"}"#).unwrap(),
        Some(StreamEvent::Error("rate limited".into()))
    );
}

#[test]
fn structured_error_is_stringified() {
    let event = parse_stream_line(r#"{"error":{"code":429}}"#).unwrap();
    assert_eq!(event, Some(StreamEvent::Error(r#"{"code":429}"#.into())));
}

#[test]
fn malformed_line_is_parse_error() {
    assert!(matches!(parse_stream_line("not json"), Err(ChatApiError::Parse(_))));
}

// =============================================================
// ChatRequest
// =============================================================

#[test]
fn request_keeps_only_finished_turns() {
    let mut conversation = Conversation::new("c".into(), None, 0);
    conversation.messages.push(Message::authored("1".into(), MessageRole::System, "be nice".into(), 0));
    conversation.messages.push(Message::authored("2".into(), MessageRole::User, "hi".into(), 1));
    let mut failed = Message::pending_reply("3".into(), 2);
    failed.status = MessageStatus::Errored;
    conversation.messages.push(failed);
    conversation.messages.push(Message::authored("4".into(), MessageRole::User, "again".into(), 3));
    conversation.messages.push(Message::pending_reply("5".into(), 4));

    let request = ChatRequest::from_conversation(&conversation);
    let roles: Vec<MessageRole> = request.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![MessageRole::System, MessageRole::User, MessageRole::User]);
    assert_eq!(request.messages[2].content, "again");
}

#[test]
fn request_serializes_lowercase_roles() {
    let request = ChatRequest { messages: vec![WireMessage { role: MessageRole::User, content: "q".into() }] };
    let json = serde_json::to_string(&request).unwrap();
    assert_eq!(json, r#"{"messages":[{"role":"user","content":"q"}]}"#);
}

#[test]
fn null_error_is_keep_alive() {
    assert_eq!(parse_stream_line(r#"{"error":null}"#).unwrap(), None);
}
