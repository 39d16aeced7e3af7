use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::models::Update;
use crate::telegram::{MessageSender, SendMessage};

pub const WELCOME_TEXT: &str = "Welcome to the bot! How can I assist you today?";
pub const FALLBACK_TEXT: &str = "I received your message.\nBut I don't know how to respond yet.";

/// Chooses a reply for each update and hands it to the sender
pub struct Dispatcher {
    sender: Arc<dyn MessageSender>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Reply to `update.message`, if any. Send failures are returned as-is.
    pub async fn dispatch(&self, update: &Update) -> Result<()> {
        let Some(message) = &update.message else {
            if let Some(member) = &update.my_chat_member {
                debug!(
                    "Ignoring membership change in chat {}: {} -> {} (until {:?})",
                    member.chat.id,
                    member.old_chat_member.status,
                    member.new_chat_member.status,
                    member.new_chat_member.expires_at()
                );
            } else {
                debug!("Ignoring update {} without a message", update.update_id);
            }
            return Ok(());
        };

        debug!(
            "Message {} in {} chat {} from {} sent at {:?}",
            message.message_id,
            message.chat.kind,
            message.chat.id,
            message.sender.display_name(),
            message.sent_at()
        );

        let text = if message.is_command("/start") {
            info!("Received /start command from user {}", message.sender.id);
            WELCOME_TEXT
        } else {
            info!(
                "Received message from user {}: {:?}",
                message.sender.id, message.text
            );
            FALLBACK_TEXT
        };

        let reply = SendMessage::new(message.chat.id, text).reply_to(message.message_id);
        self.sender.send_message(&reply).await
    }
}
