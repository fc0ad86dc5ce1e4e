use crate::utils::error::{ForwardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardConfig {
    pub forwarder: ForwarderInfo,
    pub api: ApiConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(rename = "destination", default)]
    pub destinations: Vec<DestinationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwarderInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Usually supplied as `${FORWARDER_API_TOKEN}` and resolved at load time.
    pub token: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_minutes: Option<u64>,
    /// How many previous messages to check per source and cycle.
    pub backlog_limit: Option<usize>,
    pub error_retry_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    pub enabled: bool,
    pub bind: Option<String>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub name: String,
    pub chat_id: i64,
    #[serde(rename = "source")]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub chat_id: i64,
    pub keywords: Vec<String>,
}

impl ForwardConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForwardError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForwardError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` references with environment values.
    /// Unknown variables are left verbatim and caught by validation.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_non_empty_string("api.token", &self.api.token)?;

        if self.api.token.contains("${") {
            return Err(ForwardError::InvalidConfigValue {
                field: "api.token".to_string(),
                value: self.api.token.clone(),
                reason: "Unresolved environment variable reference".to_string(),
            });
        }

        validation::validate_range("poll.interval_minutes", self.poll_interval_minutes(), 1, 1440)?;
        validation::validate_positive_number("poll.backlog_limit", self.backlog_limit(), 1)?;

        if self.destinations.is_empty() {
            return Err(ForwardError::MissingConfig {
                field: "destination".to_string(),
            });
        }

        for dest in &self.destinations {
            validation::validate_non_empty_string("destination.name", &dest.name)?;
            validation::validate_chat_id("destination.chat_id", dest.chat_id)?;

            if dest.sources.is_empty() {
                return Err(ForwardError::MissingConfig {
                    field: format!("destination.{}.source", dest.name),
                });
            }

            for source in &dest.sources {
                validation::validate_non_empty_string("source.name", &source.name)?;
                validation::validate_chat_id("source.chat_id", source.chat_id)?;

                if source.keywords.iter().all(|k| k.trim().is_empty()) {
                    return Err(ForwardError::InvalidConfigValue {
                        field: format!("destination.{}.source.{}.keywords", dest.name, source.name),
                        value: format!("{:?}", source.keywords),
                        reason: "At least one non-blank keyword is required".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn poll_interval_minutes(&self) -> u64 {
        self.poll.interval_minutes.unwrap_or(7)
    }

    pub fn backlog_limit(&self) -> usize {
        self.poll.backlog_limit.unwrap_or(20)
    }

    pub fn error_retry_seconds(&self) -> u64 {
        self.poll.error_retry_seconds.unwrap_or(60)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(30)
    }

    pub fn retry_attempts(&self) -> u32 {
        self.api.retry_attempts.unwrap_or(3)
    }

    pub fn retry_delay_seconds(&self) -> u64 {
        self.api.retry_delay_seconds.unwrap_or(2)
    }

    pub fn health_enabled(&self) -> bool {
        self.health.enabled
    }

    pub fn health_bind(&self) -> String {
        self.health
            .bind
            .clone()
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
    }

    /// Number of configured (destination, source) pairs, duplicates included.
    pub fn source_count(&self) -> usize {
        self.destinations.iter().map(|d| d.sources.len()).sum()
    }
}

impl Validate for ForwardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
