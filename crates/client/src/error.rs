use tesis_core::error::CoreError;
use tesis_core::workflow::WorkflowError;

/// Shown when the backend cannot be reached at all.
pub const CONNECTION_ERROR_MESSAGE: &str = "Error de conexión";

/// Fallback when an error response carries no usable message.
pub const DEFAULT_API_MESSAGE: &str = "request failed";

/// Errors surfaced by the client library.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never got a response (DNS, refused connection, TLS).
    #[error("Error de conexión")]
    Connection(#[source] reqwest::Error),

    /// The backend answered 401.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A domain rule rejected the action before anything was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// A 2xx response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for client return values.
pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if e.is_builder() {
            Self::Config(format!("invalid request: {e}"))
        } else {
            Self::Connection(e)
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl ClientError {
    /// Text suitable for a toast or inline form error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection(_) => CONNECTION_ERROR_MESSAGE.to_string(),
            Self::Unauthorized { message } | Self::Api { message, .. } => message.clone(),
            Self::Core(core) => core.user_message(),
            Self::Workflow(e) => e.to_string(),
            Self::Decode(_) => "Respuesta inválida del servidor".to_string(),
            Self::Storage(e) => format!("No se pudo guardar el archivo: {e}"),
            Self::Config(msg) => msg.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error body. The backend uses
/// `message`, `mensaje` or `error` depending on the controller.
pub fn extract_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "mensaje", "error"].iter().find_map(|key| {
        json.get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
}
