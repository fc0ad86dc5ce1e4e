use crate::core::router::{RouteTarget, RoutingTable};
use crate::domain::model::{ChatId, CycleReport, Message};
use crate::domain::ports::ChatApi;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Runs one poll cycle over every routed source.
///
/// Cursors map a source chat to the highest message id already processed;
/// they advance even when nothing matches, so a message id is never
/// examined twice for the same source.
pub struct Forwarder<'a, A: ChatApi> {
    api: &'a A,
    routes: &'a RoutingTable,
    backlog_limit: usize,
}

impl<'a, A: ChatApi> Forwarder<'a, A> {
    pub fn new(api: &'a A, routes: &'a RoutingTable, backlog_limit: usize) -> Self {
        Self {
            api,
            routes,
            backlog_limit,
        }
    }

    pub async fn run_cycle(&self, cursors: &mut HashMap<ChatId, i64>) -> CycleReport {
        tracing::info!(
            "🕒 Checking for new messages at {}...",
            chrono::Local::now().format("%H:%M:%S")
        );

        let mut report = CycleReport::default();

        for (source_id, route) in self.routes.sources() {
            report.sources_checked += 1;
            let cursor = cursors.entry(source_id).or_insert(0);

            if let Err(e) = self
                .process_source(source_id, &route.name, &route.targets, cursor, &mut report)
                .await
            {
                tracing::error!("   ❌ Error processing {}: {}", route.name, e);
                report.sources_failed += 1;
            }
        }

        if report.delivered() > 0 {
            tracing::info!("✅ Processed {} messages", report.delivered());
        } else {
            tracing::info!("✅ No new matching messages found");
        }

        report
    }

    async fn process_source(
        &self,
        source_id: ChatId,
        source_name: &str,
        targets: &[RouteTarget],
        cursor: &mut i64,
        report: &mut CycleReport,
    ) -> Result<()> {
        let messages = self
            .api
            .recent_messages(source_id, *cursor, self.backlog_limit)
            .await?;

        if messages.is_empty() {
            return Ok(());
        }

        tracing::info!(
            "   📨 Found {} new messages in {}",
            messages.len(),
            source_name
        );

        for message in &messages {
            if !message.outgoing {
                self.deliver(message, source_id, source_name, targets, report)
                    .await;
                report.messages_seen += 1;
            }

            *cursor = (*cursor).max(message.id);
        }

        self.api.mark_read(source_id).await?;
        tracing::debug!("   ✅ Marked {} as read", source_name);

        Ok(())
    }

    /// Try every destination whose keyword filter matches this message.
    async fn deliver(
        &self,
        message: &Message,
        source_id: ChatId,
        source_name: &str,
        targets: &[RouteTarget],
        report: &mut CycleReport,
    ) {
        let content = message.content();
        let mut matched_any = false;

        // Sender details are only needed for the copy fallback header;
        // resolve them once, on the first matching destination.
        let mut sender_name = String::new();
        let mut sender_username: Option<String> = None;

        for target in targets {
            let matched = target.keywords.matches(content);
            if matched.is_empty() {
                continue;
            }

            if !matched_any {
                tracing::info!("   ✅ Message in {} matched keywords", source_name);
                matched_any = true;

                match &message.sender {
                    Some(peer) => {
                        sender_name = peer.display_name();
                        sender_username = peer.sender_username().map(String::from);
                    }
                    None => sender_name = "Unknown Sender".to_string(),
                }
            }

            let dest_name = self.routes.dest_name(target.dest_id);

            match self
                .api
                .forward_message(target.dest_id, source_id, message.id)
                .await
            {
                Ok(()) => {
                    tracing::info!("   ✅ Forwarded to {} (matched: {:?})", dest_name, matched);
                    report.forwarded += 1;
                }
                Err(forward_error) => {
                    tracing::warn!("   ⚠️ Forward to {} failed: {}", dest_name, forward_error);

                    let body = copied_message_body(
                        &sender_name,
                        sender_username.as_deref(),
                        source_name,
                        content,
                    );
                    match self.api.send_message(target.dest_id, &body, true).await {
                        Ok(()) => {
                            tracing::info!(
                                "   ✅ Copied to {} (matched: {:?})",
                                dest_name,
                                matched
                            );
                            report.copied += 1;
                        }
                        Err(copy_error) => {
                            tracing::error!(
                                "   ❌ Both forwarding and copying to {} failed: {}",
                                dest_name,
                                copy_error
                            );
                            report.delivery_failures += 1;
                        }
                    }
                }
            }
        }
    }
}

/// Body of a copied message: an attribution header plus the original content.
fn copied_message_body(
    sender_name: &str,
    sender_username: Option<&str>,
    source_name: &str,
    content: &str,
) -> String {
    let header = match sender_username {
        Some(username) => format!(
            "**From {} (@{}) in {}:**\n\n",
            sender_name, username, source_name
        ),
        None => format!("**From {} in {}:**\n\n", sender_name, source_name),
    };
    header + content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copied_message_body_with_username() {
        let body = copied_message_body("Ada Lovelace", Some("ada"), "BN", "hello");
        assert_eq!(body, "**From Ada Lovelace (@ada) in BN:**\n\nhello");
    }

    #[test]
    fn test_copied_message_body_without_username() {
        let body = copied_message_body("Announcements", None, "BN", "hello");
        assert_eq!(body, "**From Announcements in BN:**\n\nhello");
    }
}
