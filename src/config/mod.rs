pub mod forward_config;

pub use forward_config::ForwardConfig;
