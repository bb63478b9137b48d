use reqwest::StatusCode;
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum FcxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Figma API error (status: {status:?}): {message}")]
    Api {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Missing Figma credentials; set FIGMA_API_KEY or FIGMA_OAUTH_TOKEN")]
    MissingAuth,

    #[error("Malformed Figma response: {0}")]
    Malformed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FcxError {
    pub fn api(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        FcxError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        FcxError::Malformed(message.into())
    }

    /// Single-line message surfaced through the tool result channel.
    ///
    /// Tool callers never see a raw panic or a multi-line debug dump; every
    /// failure collapses to one human-readable line.
    pub fn user_message(&self) -> String {
        match self {
            FcxError::Api { status, message } => match status {
                Some(code) => format!("Figma API error {}: {}", code.as_u16(), first_line(message)),
                None => format!("Figma API error: {}", first_line(message)),
            },
            other => first_line(&other.to_string()).to_string(),
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim()
}

pub type Result<T> = std::result::Result<T, FcxError>;
