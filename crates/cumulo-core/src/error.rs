// ── Core error types ──
//
// User-facing errors from cumulo-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<cumulo_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to tenant at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Platform disconnected")]
    PlatformDisconnected,

    #[error("Connection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Group not found: {identifier}")]
    GroupNotFound { identifier: String },

    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by platform: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The platform error code (e.g., "inventory/notFound").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cumulo_api::Error> for CoreError {
    fn from(err: cumulo_api::Error) -> Self {
        match err {
            cumulo_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            cumulo_api::Error::AccessDenied { message } => CoreError::Rejected {
                message: format!("access denied: {message}"),
            },
            cumulo_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound {
                        entity_type: "resource".into(),
                        identifier: e.url().map(|u| u.path().to_string()).unwrap_or_default(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            cumulo_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cumulo_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            cumulo_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            cumulo_api::Error::Api {
                message,
                error,
                status: 404,
            } => CoreError::NotFound {
                entity_type: error.unwrap_or_else(|| "resource".into()),
                identifier: message,
            },
            cumulo_api::Error::Api {
                message,
                error,
                status,
            } => CoreError::Api {
                message,
                code: error,
                status: Some(status),
            },
            cumulo_api::Error::Realtime { phase, message } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("realtime {phase} failed: {message}"),
            },
            cumulo_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
