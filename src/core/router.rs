use crate::config::forward_config::ForwardConfig;
use crate::core::matcher::KeywordSet;
use crate::domain::model::ChatId;
use std::collections::{BTreeMap, HashMap};

/// Where messages from one source go, with the keyword filter per destination.
#[derive(Debug, Clone)]
pub struct SourceRoute {
    pub name: String,
    pub targets: Vec<RouteTarget>,
}

#[derive(Debug, Clone)]
pub struct RouteTarget {
    pub dest_id: ChatId,
    pub keywords: KeywordSet,
}

/// Routing table derived from the configuration.
///
/// A source chat that feeds several destinations gets one entry with one
/// target per destination; configuring the same (source, destination) pair
/// twice keeps the later keyword list.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    sources: BTreeMap<ChatId, SourceRoute>,
    dest_names: HashMap<ChatId, String>,
}

impl RoutingTable {
    pub fn from_config(config: &ForwardConfig) -> Self {
        let mut sources: BTreeMap<ChatId, SourceRoute> = BTreeMap::new();
        let mut dest_names = HashMap::new();

        for dest in &config.destinations {
            dest_names.insert(dest.chat_id, dest.name.clone());

            for source in &dest.sources {
                let route = sources
                    .entry(source.chat_id)
                    .or_insert_with(|| SourceRoute {
                        name: source.name.clone(),
                        targets: Vec::new(),
                    });

                let keywords = KeywordSet::new(&source.keywords);
                match route.targets.iter_mut().find(|t| t.dest_id == dest.chat_id) {
                    Some(existing) => existing.keywords = keywords,
                    None => route.targets.push(RouteTarget {
                        dest_id: dest.chat_id,
                        keywords,
                    }),
                }
            }
        }

        Self {
            sources,
            dest_names,
        }
    }

    pub fn sources(&self) -> impl Iterator<Item = (ChatId, &SourceRoute)> {
        self.sources.iter().map(|(id, route)| (*id, route))
    }

    pub fn source_ids(&self) -> Vec<ChatId> {
        self.sources.keys().copied().collect()
    }

    pub fn source(&self, id: ChatId) -> Option<&SourceRoute> {
        self.sources.get(&id)
    }

    pub fn source_name(&self, id: ChatId) -> String {
        self.sources
            .get(&id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| format!("Chat {}", id))
    }

    pub fn dest_name(&self, id: ChatId) -> &str {
        self.dest_names.get(&id).map(String::as_str).unwrap_or("Unknown")
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn destination_count(&self) -> usize {
        self.dest_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::forward_config::{
        ApiConfig, DestinationConfig, ForwardConfig, ForwarderInfo, HealthConfig, PollConfig,
        SourceConfig,
    };

    fn config_with(destinations: Vec<DestinationConfig>) -> ForwardConfig {
        ForwardConfig {
            forwarder: ForwarderInfo {
                name: "test".to_string(),
                description: "test".to_string(),
                version: "1.0".to_string(),
            },
            api: ApiConfig {
                base_url: "https://gateway.example.com".to_string(),
                token: "t".to_string(),
                timeout_seconds: None,
                retry_attempts: None,
                retry_delay_seconds: None,
            },
            poll: PollConfig::default(),
            health: HealthConfig::default(),
            destinations,
        }
    }

    fn source(name: &str, chat_id: i64, keywords: &[&str]) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            chat_id,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_shared_source_is_merged_across_destinations() {
        let config = config_with(vec![
            DestinationConfig {
                name: "A".to_string(),
                chat_id: -100,
                sources: vec![source("BN", -200, &["alpha"])],
            },
            DestinationConfig {
                name: "B".to_string(),
                chat_id: -101,
                sources: vec![source("BN", -200, &["beta"])],
            },
        ]);

        let table = RoutingTable::from_config(&config);
        assert_eq!(table.source_count(), 1);
        assert_eq!(table.destination_count(), 2);

        let route = table.source(-200).unwrap();
        assert_eq!(route.targets.len(), 2);
        assert_eq!(route.targets[0].dest_id, -100);
        assert_eq!(route.targets[0].keywords.keywords(), ["alpha"]);
        assert_eq!(route.targets[1].dest_id, -101);
        assert_eq!(route.targets[1].keywords.keywords(), ["beta"]);
    }

    #[test]
    fn test_duplicate_pair_keeps_later_keywords() {
        let config = config_with(vec![DestinationConfig {
            name: "A".to_string(),
            chat_id: -100,
            sources: vec![
                source("BN", -200, &["old"]),
                source("BN", -200, &["new"]),
            ],
        }]);

        let table = RoutingTable::from_config(&config);
        let route = table.source(-200).unwrap();
        assert_eq!(route.targets.len(), 1);
        assert_eq!(route.targets[0].keywords.keywords(), ["new"]);
    }

    #[test]
    fn test_name_lookups_have_fallbacks() {
        let config = config_with(vec![DestinationConfig {
            name: "A".to_string(),
            chat_id: -100,
            sources: vec![source("BN", -200, &["x"])],
        }]);

        let table = RoutingTable::from_config(&config);
        assert_eq!(table.dest_name(-100), "A");
        assert_eq!(table.dest_name(-999), "Unknown");
        assert_eq!(table.source_name(-200), "BN");
        assert_eq!(table.source_name(-999), "Chat -999");
    }
}
