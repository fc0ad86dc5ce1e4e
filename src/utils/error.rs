use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Gateway error {code}: {description}")]
    Gateway { code: i64, description: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Startup failed: {message}")]
    Startup { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Gateway,
    Configuration,
    Io,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Transient; the caller should retry.
    Low,
    /// Transient but repeated; worth operator attention.
    Medium,
    /// A cycle or delivery was lost.
    High,
    /// The service cannot run at all.
    Critical,
}

impl ForwardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForwardError::Api(_) => ErrorCategory::Network,
            ForwardError::Gateway { .. } => ErrorCategory::Gateway,
            ForwardError::Config { .. }
            | ForwardError::InvalidConfigValue { .. }
            | ForwardError::MissingConfig { .. } => ErrorCategory::Configuration,
            ForwardError::Io(_) => ErrorCategory::Io,
            ForwardError::Serialization(_) => ErrorCategory::Internal,
            ForwardError::Startup { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ForwardError::Api(_) => ErrorSeverity::Medium,
            ForwardError::Gateway { code, .. } if *code == 429 => ErrorSeverity::Low,
            ForwardError::Gateway { code, .. } if *code >= 500 => ErrorSeverity::Medium,
            ForwardError::Gateway { .. } => ErrorSeverity::High,
            ForwardError::Io(_) | ForwardError::Serialization(_) => ErrorSeverity::High,
            ForwardError::Config { .. }
            | ForwardError::InvalidConfigValue { .. }
            | ForwardError::MissingConfig { .. }
            | ForwardError::Startup { .. } => ErrorSeverity::Critical,
        }
    }

    /// True when repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ForwardError::Api(e) => e.is_timeout() || e.is_connect(),
            ForwardError::Gateway { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity and the gateway base URL, then retry"
            }
            ErrorCategory::Gateway => {
                "Check the gateway response: the token may be invalid or the bot may lack access to the chat"
            }
            ErrorCategory::Configuration => {
                "Fix the configuration file and make sure referenced environment variables are set"
            }
            ErrorCategory::Io => "Check file permissions and paths",
            ErrorCategory::Internal => "Inspect the log output; this is likely a bug or a gateway contract change",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ForwardError::Api(_) => "Could not reach the chat gateway".to_string(),
            ForwardError::Gateway { description, .. } => {
                format!("The chat gateway rejected a request: {}", description)
            }
            ForwardError::Config { message } => format!("Configuration problem: {}", message),
            ForwardError::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            ForwardError::MissingConfig { field } => {
                format!("Configuration field '{}' is required", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForwardError>;
