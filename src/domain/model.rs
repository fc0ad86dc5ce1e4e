use serde::{Deserialize, Serialize};

/// Chat identifier. Channels and supergroups use the `-100...` range.
pub type ChatId = i64;

/// The counterparty behind a chat or a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Peer {
    User {
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
    },
    Channel {
        title: Option<String>,
        username: Option<String>,
    },
    Group {
        title: Option<String>,
    },
}

impl Peer {
    /// Human-readable name: full name, first name, @username, or a fallback.
    pub fn display_name(&self) -> String {
        match self {
            Peer::User {
                first_name,
                last_name,
                username,
            } => match (first_name, last_name) {
                (Some(first), Some(last)) => format!("{} {}", first, last),
                (Some(first), None) => first.clone(),
                (None, _) => username
                    .as_ref()
                    .map(|u| format!("@{}", u))
                    .unwrap_or_else(|| "Unknown User".to_string()),
            },
            Peer::Channel { title, .. } | Peer::Group { title } => title
                .clone()
                .unwrap_or_else(|| "Unknown Channel/Chat".to_string()),
        }
    }

    /// Username for @-mentions in copied-message headers. Users only.
    pub fn sender_username(&self) -> Option<&str> {
        match self {
            Peer::User { username, .. } => username.as_deref(),
            _ => None,
        }
    }

    /// Public username of any peer kind, used to build t.me links.
    pub fn public_username(&self) -> Option<&str> {
        match self {
            Peer::User { username, .. } | Peer::Channel { username, .. } => username.as_deref(),
            Peer::Group { .. } => None,
        }
    }
}

/// A chat as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: ChatId,
    pub peer: Peer,
}

/// A single message in a source chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: ChatId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Sent by our own account; such messages are never forwarded.
    #[serde(default)]
    pub outgoing: bool,
    #[serde(default)]
    pub sender: Option<Peer>,
}

impl Message {
    /// Matchable content: text, else media caption, else empty.
    pub fn content(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

/// Counters accumulated over one poll cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub sources_checked: usize,
    pub sources_failed: usize,
    pub messages_seen: usize,
    pub forwarded: usize,
    pub copied: usize,
    pub delivery_failures: usize,
}

impl CycleReport {
    pub fn delivered(&self) -> usize {
        self.forwarded + self.copied
    }

    /// Every source in the cycle failed; the poll loop shortens its wait.
    pub fn total_failure(&self) -> bool {
        self.sources_checked > 0 && self.sources_failed == self.sources_checked
    }
}
