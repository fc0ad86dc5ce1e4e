use crate::config::forward_config::ApiConfig;
use crate::domain::model::{ChatId, ChatInfo, Message, Peer};
use crate::domain::ports::ChatApi;
use crate::utils::error::{ForwardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// HTTP client for a Bot-API-shaped chat gateway.
///
/// Every call is `POST {base_url}/bot{token}/{method}` with a JSON body and
/// a `{ok, result, description, error_code}` response envelope. Rate-limit
/// responses (code 429) are retried a bounded number of times, honouring
/// the gateway's `retry_after` hint when present.
pub struct BotApiClient {
    http: Client,
    base_url: String,
    token: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    message_id: i64,
    chat: WireChat,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    outgoing: bool,
    #[serde(default)]
    from: Option<WireUser>,
    #[serde(default)]
    sender_chat: Option<WireChat>,
}

impl From<WireUser> for Peer {
    fn from(user: WireUser) -> Self {
        Peer::User {
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
        }
    }
}

impl WireChat {
    fn into_peer(self) -> Peer {
        match self.kind.as_str() {
            "private" => Peer::User {
                first_name: self.first_name,
                last_name: self.last_name,
                username: self.username,
            },
            "channel" => Peer::Channel {
                title: self.title,
                username: self.username,
            },
            // "group" and "supergroup"
            _ => Peer::Group { title: self.title },
        }
    }
}

impl WireMessage {
    fn into_message(self) -> Message {
        let chat_id = self.chat.id;
        let sender = match (self.from, self.sender_chat) {
            (Some(user), _) => Some(Peer::from(user)),
            (None, Some(chat)) => Some(chat.into_peer()),
            (None, None) => None,
        };

        Message {
            id: self.message_id,
            chat_id,
            text: self.text,
            caption: self.caption,
            outgoing: self.outgoing,
            sender,
        }
    }
}

impl BotApiClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(api.timeout_seconds.unwrap_or(30));
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token: api.token.clone(),
            retry_attempts: api.retry_attempts.unwrap_or(3),
            retry_delay: Duration::from_secs(api.retry_delay_seconds.unwrap_or(2)),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let url = self.method_url(method);
        let mut attempt: u32 = 0;

        loop {
            let response = match self.http.post(&url).json(&body).send().await {
                Ok(response) => response,
                Err(e) if attempt < self.retry_attempts && (e.is_timeout() || e.is_connect()) => {
                    attempt += 1;
                    tracing::warn!(
                        "⚠️ {} attempt {}/{} failed ({}), retrying",
                        method,
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            let envelope: Envelope<T> = response.json().await?;

            if envelope.ok {
                return envelope.result.ok_or_else(|| ForwardError::Gateway {
                    code: status.as_u16() as i64,
                    description: format!("{} returned an empty result", method),
                });
            }

            let code = envelope.error_code.unwrap_or(status.as_u16() as i64);
            let description = envelope
                .description
                .unwrap_or_else(|| "no description".to_string());

            if code == 429 && attempt < self.retry_attempts {
                attempt += 1;
                let wait = envelope
                    .parameters
                    .and_then(|p| p.retry_after)
                    .map(Duration::from_secs)
                    .unwrap_or(self.retry_delay);
                tracing::warn!(
                    "⚠️ Rate limited on {}, waiting {}s (attempt {}/{})",
                    method,
                    wait.as_secs(),
                    attempt,
                    self.retry_attempts
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            return Err(ForwardError::Gateway { code, description });
        }
    }
}

#[async_trait]
impl ChatApi for BotApiClient {
    async fn get_me(&self) -> Result<Peer> {
        let user: WireUser = self.call("getMe", json!({})).await?;
        Ok(user.into())
    }

    async fn get_chat(&self, chat: ChatId) -> Result<ChatInfo> {
        let wire: WireChat = self.call("getChat", json!({ "chat_id": chat })).await?;
        Ok(ChatInfo {
            id: wire.id,
            peer: wire.into_peer(),
        })
    }

    async fn recent_messages(
        &self,
        chat: ChatId,
        min_id: i64,
        limit: usize,
    ) -> Result<Vec<Message>> {
        let wire: Vec<WireMessage> = self
            .call(
                "getChatHistory",
                json!({ "chat_id": chat, "min_id": min_id, "limit": limit }),
            )
            .await?;
        Ok(wire.into_iter().map(WireMessage::into_message).collect())
    }

    async fn forward_message(&self, dest: ChatId, source: ChatId, message_id: i64) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "forwardMessage",
                json!({
                    "chat_id": dest,
                    "from_chat_id": source,
                    "message_id": message_id,
                }),
            )
            .await?;
        Ok(())
    }

    async fn send_message(&self, dest: ChatId, text: &str, disable_preview: bool) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": dest,
                    "text": text,
                    "parse_mode": "Markdown",
                    "disable_web_page_preview": disable_preview,
                }),
            )
            .await?;
        Ok(())
    }

    async fn mark_read(&self, chat: ChatId) -> Result<()> {
        let _: serde_json::Value = self
            .call("readChatHistory", json!({ "chat_id": chat }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_chat_kind_mapping() {
        let channel = WireChat {
            id: -100,
            kind: "channel".to_string(),
            title: Some("News".to_string()),
            username: Some("news".to_string()),
            first_name: None,
            last_name: None,
        };
        match channel.into_peer() {
            Peer::Channel { title, username } => {
                assert_eq!(title.as_deref(), Some("News"));
                assert_eq!(username.as_deref(), Some("news"));
            }
            other => panic!("expected channel, got {:?}", other),
        }

        let private = WireChat {
            id: 7,
            kind: "private".to_string(),
            title: None,
            username: Some("ada".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
        };
        assert!(matches!(private.into_peer(), Peer::User { .. }));

        let supergroup = WireChat {
            id: -100,
            kind: "supergroup".to_string(),
            title: Some("Chatter".to_string()),
            username: None,
            first_name: None,
            last_name: None,
        };
        assert!(matches!(supergroup.into_peer(), Peer::Group { .. }));
    }

    #[test]
    fn test_wire_message_sender_precedence() {
        let wire: WireMessage = serde_json::from_value(serde_json::json!({
            "message_id": 10,
            "chat": { "id": -100123, "type": "channel", "title": "News" },
            "text": "hello",
            "from": { "first_name": "Ada", "username": "ada" },
            "sender_chat": { "id": -100123, "type": "channel", "title": "News" }
        }))
        .unwrap();

        let message = wire.into_message();
        assert_eq!(message.id, 10);
        assert_eq!(message.chat_id, -100123);
        assert!(matches!(message.sender, Some(Peer::User { .. })));
    }
}
