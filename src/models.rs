//! Typed view of the Telegram webhook payload.
//!
//! Only the fields this bot reads are declared; anything else Telegram sends
//! is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inbound event delivered by the Telegram webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Sequential identifier assigned by Telegram
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_chat_member: Option<ChatMemberUpdated>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl User {
    /// First and last name joined with a space
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// "private", "group", "supergroup" or "channel"
    #[serde(rename = "type")]
    pub kind: String,
}

/// A span of message text carrying special meaning (command, mention, url...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEntity {
    pub offset: i64,
    pub length: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_size: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_size: i64,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within the chat
    pub message_id: i64,
    #[serde(rename = "from")]
    pub sender: User,
    pub chat: Chat,
    /// Unix timestamp
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<MessageEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_group_id: Option<String>,
    /// Available sizes of the same photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
}

impl Message {
    /// True when the text is exactly `command`, e.g. `"/start"`
    pub fn is_command(&self, command: &str) -> bool {
        self.text.as_deref() == Some(command)
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }
}

/// A user's membership record within a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMemberStatus {
    pub user: User,
    /// "creator", "administrator", "member", "restricted", "left" or "kicked"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until_date: Option<i64>,
}

impl ChatMemberStatus {
    /// When a restriction or ban lifts; `None` means it is permanent or absent.
    /// Telegram sends `until_date: 0` for "forever".
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.until_date
            .filter(|&ts| ts > 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// The bot's own membership changed in a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    #[serde(rename = "from")]
    pub sender: User,
    pub date: i64,
    pub old_chat_member: ChatMemberStatus,
    pub new_chat_member: ChatMemberStatus,
}
