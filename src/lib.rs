pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod health;
pub mod utils;

pub use crate::client::BotApiClient;
pub use crate::config::ForwardConfig;
pub use crate::core::engine::ForwarderEngine;
pub use crate::core::matcher::KeywordSet;
pub use crate::core::router::RoutingTable;
pub use crate::utils::error::{ForwardError, Result};
