use slack_morphism::errors::SlackClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Missing or invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to access Slack API: {0}")]
    ApiError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File relay incomplete: {failed} of {total} files failed")]
    FileRelay { failed: usize, total: usize },

    #[error("{0}")]
    GeneralError(String),
}

impl From<SlackClientError> for ArchiveError {
    fn from(error: SlackClientError) -> Self {
        ArchiveError::ApiError(error.to_string())
    }
}

impl From<reqwest::Error> for ArchiveError {
    fn from(error: reqwest::Error) -> Self {
        ArchiveError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(error: serde_json::Error) -> Self {
        ArchiveError::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for ArchiveError {
    fn from(error: anyhow::Error) -> Self {
        ArchiveError::GeneralError(error.to_string())
    }
}
