/// Deserialization tests for the wire types using representative payloads
/// from the chat-completions and Bot API protocols.
#[cfg(test)]
mod unit {
    use crate::types::{ApiResponse, ChatCompletionResponse, ChatId, Update, User};

    #[test]
    fn parse_completion_with_extra_fields() {
        let json = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "finish_reason": "stop",
                 "message": {"role": "assistant", "content": "\n🚑 Tver: headline\nbody\n"}}
            ],
            "usage": {"prompt_tokens": 120, "completion_tokens": 80}
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_text(), Some("🚑 Tver: headline\nbody"));
    }

    #[test]
    fn parse_completion_without_choices() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(resp.first_text(), None);
    }

    #[test]
    fn parse_get_me() {
        let json = r#"{"ok": true, "result": {"id": 99, "is_bot": true, "first_name": "Herald", "username": "herald_bot"}}"#;
        let resp: ApiResponse<User> = serde_json::from_str(json).unwrap();
        assert!(resp.ok);
        let user = resp.result.unwrap();
        assert_eq!(user.id, 99);
        assert_eq!(user.username.as_deref(), Some("herald_bot"));
    }

    #[test]
    fn parse_error_envelope() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let resp: ApiResponse<User> = serde_json::from_str(json).unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn parse_updates_ignores_non_message_kinds() {
        let json = r#"[
            {"update_id": 1, "message": {"message_id": 3, "chat": {"id": 10, "type": "private"},
                                          "from": {"id": 10, "is_bot": false, "first_name": "A"},
                                          "text": "/news"}},
            {"update_id": 2, "edited_message": {"message_id": 3}}
        ]"#;
        let updates: Vec<Update> = serde_json::from_str(json).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].message.as_ref().unwrap().chat.id, 10);
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn chat_id_parse_and_serialize() {
        assert_eq!(ChatId::parse("-1001234"), Some(ChatId::Id(-1001234)));
        assert_eq!(
            ChatId::parse(" @herald "),
            Some(ChatId::Username("@herald".into()))
        );
        assert_eq!(ChatId::parse(""), None);
        assert_eq!(serde_json::to_value(ChatId::Id(5)).unwrap(), serde_json::json!(5));
        assert_eq!(
            serde_json::to_value(ChatId::Username("@c".into())).unwrap(),
            serde_json::json!("@c")
        );
    }
}
