use thiserror::Error;

/// Shown for every failure that happens before a well-formed response arrives.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Network error or backend unavailable";

/// Shown when the service reports a failure without saying why.
pub const DEFAULT_SERVICE_FAILURE_MESSAGE: &str = "Analysis failed";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Video URL is empty")]
    EmptyUrl,

    #[error("{msg}: {0}", msg = TRANSPORT_FAILURE_MESSAGE)]
    Transport(#[from] TransportError),

    #[error("Service reported failure: {message}")]
    Service { message: String },

    #[error("Summary is missing required field `{field}`")]
    IncompleteSummary { field: &'static str },

    #[error("No successful analysis to export")]
    NoResult,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecapError {
    /// Builds a service failure, falling back to the default message when the
    /// service sent none or an empty string.
    pub fn service(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_FAILURE_MESSAGE.to_string());
        RecapError::Service { message }
    }

    /// The inline message the view renders for this failure. Never empty.
    pub fn user_message(&self) -> String {
        match self {
            RecapError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            RecapError::Service { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for RecapError {
    fn from(e: reqwest::Error) -> Self {
        RecapError::Transport(TransportError::Http(e))
    }
}

impl From<serde_json::Error> for RecapError {
    fn from(e: serde_json::Error) -> Self {
        RecapError::Transport(TransportError::MalformedBody(e))
    }
}

pub type Result<T> = std::result::Result<T, RecapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_passed_through() {
        let err = RecapError::service(Some("Could not retrieve transcript".into()));
        assert_eq!(err.user_message(), "Could not retrieve transcript");
    }

    #[test]
    fn missing_or_empty_service_message_falls_back_to_default() {
        assert_eq!(RecapError::service(None).user_message(), "Analysis failed");
        assert_eq!(
            RecapError::service(Some(String::new())).user_message(),
            "Analysis failed"
        );
    }

    #[test]
    fn whitespace_service_message_is_kept_verbatim() {
        assert_eq!(RecapError::service(Some("  ".into())).user_message(), "  ");
    }

    #[test]
    fn transport_failures_use_fixed_message() {
        let parse_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = RecapError::from(parse_err);
        assert_eq!(err.user_message(), TRANSPORT_FAILURE_MESSAGE);
    }
}
