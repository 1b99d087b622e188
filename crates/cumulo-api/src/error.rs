use thiserror::Error;

/// Top-level error type for the `cumulo-api` crate.
///
/// Covers every failure mode across the REST resource endpoints and the
/// realtime long-polling channel. `cumulo-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected by the platform (401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Authenticated but not permitted (403).
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Platform REST API ───────────────────────────────────────────
    /// Structured error from the platform (parsed from the
    /// `{error, message, info}` envelope).
    #[error("API error (HTTP {status}): {message}")]
    Api {
        message: String,
        /// Platform error code, e.g. `"inventory/notFound"`.
        error: Option<String>,
        status: u16,
    },

    // ── Realtime ────────────────────────────────────────────────────
    /// A `/meta/*` exchange failed (handshake or subscribe rejected,
    /// or the response shape was not the expected array wrapper).
    #[error("Realtime {phase} failed: {message}")]
    Realtime { phase: &'static str, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the platform error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}
