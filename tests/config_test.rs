use keyword_forwarder::utils::validation::Validate;
use keyword_forwarder::{ForwardConfig, RoutingTable};
use std::io::Write;
use tempfile::NamedTempFile;

fn full_toml() -> &'static str {
    r#"
[forwarder]
name = "listing-forwarder"
description = "Forwards exchange listing announcements"
version = "0.1.0"

[api]
base_url = "https://gateway.example.com"
token = "abc:123"
timeout_seconds = 15
retry_attempts = 5
retry_delay_seconds = 1

[poll]
interval_minutes = 3
backlog_limit = 50
error_retry_seconds = 30

[health]
enabled = false

[[destination]]
name = "NLA"
chat_id = -1002972933415

[[destination.source]]
name = "BN"
chat_id = -1001146915409
keywords = ["Will List", "Will Add"]

[[destination.source]]
name = "BB"
chat_id = -1001449478440
keywords = ["Coming Soon to"]

[[destination]]
name = "Circulation"
chat_id = -1002000000001

[[destination.source]]
name = "BNA"
chat_id = -1002450025950
keywords = ["Token Circulation"]
"#
}

#[test]
fn test_full_config_parses_with_overrides() {
    let config = ForwardConfig::from_toml_str(full_toml()).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.forwarder.name, "listing-forwarder");
    assert_eq!(config.poll_interval_minutes(), 3);
    assert_eq!(config.backlog_limit(), 50);
    assert_eq!(config.error_retry_seconds(), 30);
    assert_eq!(config.timeout_seconds(), 15);
    assert_eq!(config.retry_attempts(), 5);
    assert_eq!(config.retry_delay_seconds(), 1);
    assert!(!config.health_enabled());

    assert_eq!(config.destinations.len(), 2);
    assert_eq!(config.source_count(), 3);
}

#[test]
fn test_routing_table_from_full_config() {
    let config = ForwardConfig::from_toml_str(full_toml()).unwrap();
    let routes = RoutingTable::from_config(&config);

    assert_eq!(routes.source_count(), 3);
    assert_eq!(routes.destination_count(), 2);
    assert_eq!(routes.dest_name(-1002972933415), "NLA");
    assert_eq!(routes.source_name(-1001449478440), "BB");
}

#[test]
fn test_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(full_toml().as_bytes()).unwrap();

    let config = ForwardConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(config.forwarder.name, "listing-forwarder");
}

#[test]
fn test_env_var_substitution_from_file() {
    std::env::set_var("CONFIG_TEST_GATEWAY_TOKEN", "999:secret");

    let mut temp_file = NamedTempFile::new().unwrap();
    let content = full_toml().replace("abc:123", "${CONFIG_TEST_GATEWAY_TOKEN}");
    temp_file.write_all(content.as_bytes()).unwrap();

    let config = ForwardConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(config.api.token, "999:secret");
    assert!(config.validate().is_ok());

    std::env::remove_var("CONFIG_TEST_GATEWAY_TOKEN");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let result = ForwardConfig::from_file("/definitely/not/here.toml");
    assert!(result.is_err());
}

#[test]
fn test_config_without_destinations_fails_validation() {
    let config = ForwardConfig::from_toml_str(
        r#"
[forwarder]
name = "empty"
description = "no destinations"
version = "0.1.0"

[api]
base_url = "https://gateway.example.com"
token = "abc:123"
"#,
    )
    .unwrap();

    assert!(config.validate().is_err());
}

#[test]
fn test_zero_chat_id_fails_validation() {
    let content = full_toml().replace("chat_id = -1001146915409", "chat_id = 0");
    let config = ForwardConfig::from_toml_str(&content).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_interval_fails_validation() {
    let content = full_toml().replace("interval_minutes = 3", "interval_minutes = 0");
    let config = ForwardConfig::from_toml_str(&content).unwrap();
    assert!(config.validate().is_err());
}
