pub mod engine;
pub mod forwarder;
pub mod matcher;
pub mod router;

pub use crate::domain::model::{ChatId, ChatInfo, CycleReport, Message, Peer};
pub use crate::domain::ports::ChatApi;
pub use crate::utils::error::Result;
