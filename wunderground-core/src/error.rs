use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error building http client")]
    Build(#[source] reqwest::Error),
    #[error("Error while performing request")]
    Transport(#[source] reqwest::Error),
    #[error("Error while reading response body")]
    Body(#[source] reqwest::Error),
    /// Non-200 response. Displays as the raw response body.
    #[error("{body}")]
    Upstream { status: StatusCode, body: String },
    #[error("Error while parsing json")]
    Decode(#[from] serde_json::Error),
    #[error("Request cancelled")]
    Cancelled,
}

impl Error {
    /// HTTP status of an upstream failure, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            Error::Transport(err) | Error::Body(err) => err.status(),
            _ => None,
        }
    }
}
