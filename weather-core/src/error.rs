use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while talking to the weather provider.
///
/// None of these are retried; callers show `to_string()` to the user.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error while fetching {what}: {source}")]
    Network {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{what} request failed with status {status}: {body}")]
    HttpStatus {
        what: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {what} response: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("Failed to decode icon '{code}': {source}")]
    Decode {
        code: String,
        #[source]
        source: image::ImageError,
    },
}

impl WeatherError {
    pub(crate) fn parse(what: &'static str, reason: impl std::fmt::Display) -> Self {
        WeatherError::Parse {
            what,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

/// Keep error bodies short enough for a one-line message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
