use crate::domain::model::{ChatId, ChatInfo, Message, Peer};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Gateway seam for everything that talks to the chat network.
///
/// The production implementation is the HTTP client in `crate::client`;
/// tests substitute in-memory fakes.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Identity of the authenticated account.
    async fn get_me(&self) -> Result<Peer>;

    async fn get_chat(&self, chat: ChatId) -> Result<ChatInfo>;

    /// Messages with id strictly greater than `min_id`, newest first,
    /// at most `limit` of them.
    async fn recent_messages(
        &self,
        chat: ChatId,
        min_id: i64,
        limit: usize,
    ) -> Result<Vec<Message>>;

    /// Native forward, preserving the original attribution.
    async fn forward_message(&self, dest: ChatId, source: ChatId, message_id: i64) -> Result<()>;

    async fn send_message(&self, dest: ChatId, text: &str, disable_preview: bool) -> Result<()>;

    /// Acknowledge a source chat as read up to its latest message.
    async fn mark_read(&self, chat: ChatId) -> Result<()>;
}
