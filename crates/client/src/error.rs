use reelgen_core::error::{CoreError, ErrorKind};

/// Errors surfaced by the client SDK.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body did not match the expected schema.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    /// A domain error (non-success envelope, failed validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The session could not be refreshed; the user has been signed out.
    #[error("Session expired")]
    SessionExpired,

    /// The operation needs a session and none is established.
    #[error("Not signed in")]
    NoSession,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err)
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Core(CoreError::from(errors))
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Decode(_) => ErrorKind::Validation,
            ClientError::Http { status, .. } => ErrorKind::from_status(*status),
            ClientError::Core(core) => core.kind(),
            ClientError::SessionExpired | ClientError::NoSession => ErrorKind::Authentication,
            ClientError::Url(_) => ErrorKind::Unknown,
        }
    }

    /// Message to show the user, preferring the server's own wording.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Core(CoreError::Api { message, .. }) => message.clone(),
            other => other.kind().user_message().to_string(),
        }
    }
}
