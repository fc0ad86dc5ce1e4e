use crate::config::forward_config::ForwardConfig;
use crate::core::forwarder::Forwarder;
use crate::core::router::RoutingTable;
use crate::domain::model::{ChatId, CycleReport};
use crate::domain::ports::ChatApi;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::time::Duration;

/// Verified display details of one source chat, captured at startup.
#[derive(Debug, Clone)]
struct SourceMeta {
    display_name: String,
    link: String,
}

/// Owns the service lifecycle: startup verification, the startup notice,
/// and the periodic poll loop.
pub struct ForwarderEngine<A: ChatApi> {
    api: A,
    config: ForwardConfig,
    routes: RoutingTable,
    cursors: HashMap<ChatId, i64>,
    source_meta: HashMap<ChatId, SourceMeta>,
    reachable_destinations: Vec<ChatId>,
}

impl<A: ChatApi> ForwarderEngine<A> {
    pub fn new(api: A, config: ForwardConfig) -> Self {
        let routes = RoutingTable::from_config(&config);
        Self {
            api,
            config,
            routes,
            cursors: HashMap::new(),
            source_meta: HashMap::new(),
            reachable_destinations: Vec::new(),
        }
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// Highest message id already processed for a source.
    pub fn cursor(&self, source: ChatId) -> i64 {
        self.cursors.get(&source).copied().unwrap_or(0)
    }

    /// Verify the account, destinations and sources, snapshot per-source
    /// cursors so only messages newer than startup are ever delivered, and
    /// announce the service in each reachable destination.
    pub async fn start_up(&mut self) -> Result<()> {
        tracing::info!("🚀 Starting message forwarder...");
        tracing::info!(
            "🔍 Monitoring {} sources across {} destinations every {} minutes",
            self.routes.source_count(),
            self.routes.destination_count(),
            self.config.poll_interval_minutes()
        );

        let me = self.api.get_me().await?;
        tracing::info!("✅ Logged in as: {}", me.display_name());

        self.verify_destinations().await;
        self.verify_sources().await;
        self.send_startup_notices().await;

        tracing::info!("✅ Forwarder is running and ready to check for messages!");
        Ok(())
    }

    async fn verify_destinations(&mut self) {
        self.reachable_destinations.clear();

        for dest in &self.config.destinations {
            match self.api.get_chat(dest.chat_id).await {
                Ok(info) => {
                    tracing::info!(
                        "✅ Destination: {} ({})",
                        dest.name,
                        info.peer.display_name()
                    );
                    self.reachable_destinations.push(dest.chat_id);
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Cannot access destination {} ({}): {}",
                        dest.name,
                        dest.chat_id,
                        e
                    );
                }
            }
        }
    }

    async fn verify_sources(&mut self) {
        let source_ids = self.routes.source_ids();

        for source_id in source_ids {
            let source_name = self.routes.source_name(source_id);

            let info = match self.api.get_chat(source_id).await {
                Ok(info) => info,
                Err(e) => {
                    tracing::error!(
                        "❌ Cannot access source {} ({}): {}",
                        source_name,
                        source_id,
                        e
                    );
                    continue;
                }
            };

            self.source_meta.insert(
                source_id,
                SourceMeta {
                    display_name: info.peer.display_name(),
                    link: source_link(source_id, info.peer.public_username()),
                },
            );

            match self.api.recent_messages(source_id, 0, 1).await {
                Ok(messages) => match messages.first() {
                    Some(latest) => {
                        self.cursors.insert(source_id, latest.id);
                        tracing::info!(
                            "✅ Source: {} - Last message ID: {}",
                            source_name,
                            latest.id
                        );
                    }
                    None => {
                        tracing::info!("✅ Source: {} - No messages yet", source_name);
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "❌ Cannot read source {} ({}): {}",
                        source_name,
                        source_id,
                        e
                    );
                }
            }
        }
    }

    async fn send_startup_notices(&self) {
        for dest in &self.config.destinations {
            if !self.reachable_destinations.contains(&dest.chat_id) {
                continue;
            }

            let notice = self.startup_notice(dest.chat_id);
            match self.api.send_message(dest.chat_id, &notice, true).await {
                Ok(()) => tracing::info!("✅ Startup message sent to {}", dest.name),
                Err(e) => {
                    tracing::warn!("⚠️ Could not send startup message to {}: {}", dest.name, e)
                }
            }
        }
    }

    /// Markdown summary of what this destination will receive.
    fn startup_notice(&self, dest_id: ChatId) -> String {
        let dest_sources: Vec<_> = self
            .config
            .destinations
            .iter()
            .filter(|d| d.chat_id == dest_id)
            .flat_map(|d| d.sources.iter())
            .collect();

        let mut notice = format!(
            "🤖 Forwarder is now online!\n\nMonitoring **{} sources** every **{} minutes**\n\nMessages containing your keywords will be forwarded or copied here.\n\n",
            dest_sources.len(),
            self.config.poll_interval_minutes()
        );

        for source in &dest_sources {
            let (display_name, link) = match self.source_meta.get(&source.chat_id) {
                Some(meta) => (meta.display_name.as_str(), meta.link.as_str()),
                None => continue,
            };
            notice.push_str(&format!(
                "✅ **[{}]({}) Keywords:** {}\n**Total Keywords:** {}\n\n",
                display_name,
                link,
                source.keywords.join(", "),
                source.keywords.len()
            ));
        }

        notice
    }

    /// Run one poll cycle.
    pub async fn run_once(&mut self) -> CycleReport {
        let forwarder = Forwarder::new(&self.api, &self.routes, self.config.backlog_limit());
        forwarder.run_cycle(&mut self.cursors).await
    }

    /// Start up and poll forever. On a cycle where every source failed the
    /// wait shrinks to the error retry interval.
    pub async fn run(mut self) -> Result<()> {
        self.start_up().await?;

        let interval = Duration::from_secs(self.config.poll_interval_minutes() * 60);
        let error_retry = Duration::from_secs(self.config.error_retry_seconds());

        loop {
            let report = self.run_once().await;

            let wait = if report.total_failure() {
                tracing::warn!(
                    "⚠️ All {} sources failed this cycle, retrying in {}s",
                    report.sources_checked,
                    error_retry.as_secs()
                );
                error_retry
            } else {
                interval
            };

            tokio::time::sleep(wait).await;
        }
    }
}

/// Public link to a source chat: by username when it has one, by the
/// `t.me/c/` form for private channels, by raw id otherwise.
fn source_link(id: ChatId, username: Option<&str>) -> String {
    if let Some(username) = username {
        return format!("https://t.me/{}", username);
    }

    let id_str = id.to_string();
    match id_str.strip_prefix("-100") {
        Some(rest) => format!("https://t.me/c/{}", rest),
        None => format!("https://t.me/{}", id_str),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_link_prefers_username() {
        assert_eq!(
            source_link(-1001146915409, Some("binance_announcements")),
            "https://t.me/binance_announcements"
        );
    }

    #[test]
    fn test_source_link_private_channel_form() {
        assert_eq!(
            source_link(-1001146915409, None),
            "https://t.me/c/1146915409"
        );
    }

    #[test]
    fn test_source_link_plain_id() {
        assert_eq!(source_link(42, None), "https://t.me/42");
    }
}
