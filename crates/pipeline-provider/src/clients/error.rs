use provider_framework::FrameworkError;

/// Errors returned by the pipeline service client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not found: {url}")]
    NotFound { url: String },
    #[error("Request to {url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Cannot decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Invalid client configuration: {0}")]
    Config(String),
    #[error("Invalid id in request path: {0:?}")]
    InvalidPath(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

impl From<ClientError> for FrameworkError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NotFound { url } => FrameworkError::NotFound(url),
            ClientError::Status { status, body, .. } => FrameworkError::Api { status, body },
            ClientError::Decode { message, .. } => FrameworkError::Decode(message),
            ClientError::InvalidPath(segment) => {
                FrameworkError::InvalidKey(format!("{segment:?} is not a valid id"))
            }
            other @ (ClientError::Transport { .. } | ClientError::Config(_)) => {
                FrameworkError::Transport(other.to_string())
            }
        }
    }
}
