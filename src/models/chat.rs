use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";
const TITLE_MAX_CHARS: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: String, content: String, sender: Sender) -> Self {
        Self { id, content, sender, timestamp: Utc::now() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(id: String, title: Option<String>) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());
        Self { id, title, messages: Vec::new(), created_at: Utc::now() }
    }

    pub fn message_position(&self, message_id: &str, sender: Sender) -> Option<usize> {
        self.messages.iter().position(|m| m.id == message_id && m.sender == sender)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub chats: Vec<Chat>,
}

impl UserRecord {
    pub fn empty(username: &str) -> Self {
        Self { username: username.to_string(), chats: Vec::new() }
    }

    pub fn chat_position(&self, chat_id: &str) -> Option<usize> {
        self.chats.iter().position(|c| c.id == chat_id)
    }
}

/// Title shown for a chat whose first message is `content`: the first 30
/// characters, with "..." appended only when something was cut off.
pub fn derive_title(content: &str) -> String {
    let content = content.trim();
    if content.chars().count() <= TITLE_MAX_CHARS {
        return content.to_string();
    }
    let head: String = content.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_are_kept_whole() {
        assert_eq!(derive_title("Hello there"), "Hello there");
        let exactly_thirty = "a".repeat(30);
        assert_eq!(derive_title(&exactly_thirty), exactly_thirty);
    }

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let long = "What is the best way to learn Rust in 2024?";
        assert_eq!(derive_title(long), "What is the best way to learn ...");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "é".repeat(40);
        let title = derive_title(&long);
        assert_eq!(title.chars().count(), 33);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn new_chat_falls_back_to_default_title() {
        assert_eq!(Chat::new("1".into(), None).title, DEFAULT_CHAT_TITLE);
        assert_eq!(Chat::new("2".into(), Some("   ".into())).title, DEFAULT_CHAT_TITLE);
        assert_eq!(Chat::new("3".into(), Some("Trip plans".into())).title, "Trip plans");
    }

    #[test]
    fn message_lookup_respects_sender() {
        let mut chat = Chat::new("1".into(), None);
        chat.messages.push(Message::new("2".into(), "question".into(), Sender::User));
        chat.messages.push(Message::new("3".into(), "answer".into(), Sender::Ai));
        assert_eq!(chat.message_position("3", Sender::Ai), Some(1));
        assert_eq!(chat.message_position("2", Sender::Ai), None);
        assert_eq!(chat.message_position("9", Sender::Ai), None);
    }

    #[test]
    fn json_shape_uses_camel_case_and_lowercase_sender() {
        let mut chat = Chat::new("10".into(), None);
        chat.messages.push(Message::new("11".into(), "hi".into(), Sender::Ai));
        let value = serde_json::to_value(&chat).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["messages"][0]["sender"], "ai");
    }
}
