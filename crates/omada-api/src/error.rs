use thiserror::Error;

/// Top-level error type for the `omada-api` crate.
///
/// Covers every failure mode of a controller round trip: transport,
/// envelope interpretation, paging misuse, and filter validation.
/// Nothing here is retried internally; every variant propagates to the
/// immediate caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login succeeded at the HTTP level but the controller handed back
    /// something we can't use as a session token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The controller root did not redirect to its login page, so the
    /// API base URL could not be discovered.
    #[error("Expected redirect from {host}")]
    MissingRedirect { host: String },

    // ── Envelope ────────────────────────────────────────────────────
    /// The body was valid JSON but lacked the `errorCode` field.
    #[error("Response from {url} did not contain 'errorCode'")]
    MalformedResponse { url: String },

    /// The body could not be parsed as JSON at all. The controller answers
    /// unauthenticated requests with its HTML login page, so this usually
    /// means "not logged in" rather than a hard failure.
    #[error("Response from {url} is not JSON")]
    NotJson { url: String, body: String },

    /// Domain-level rejection reported through a nonzero `errorCode`.
    #[error("errorCode: {error_code}, msg: '{}'", message.as_deref().unwrap_or_default())]
    Omada {
        error_code: i64,
        message: Option<String>,
    },

    // ── Paging ──────────────────────────────────────────────────────
    /// `next()` was called on a pager that has already been exhausted.
    #[error("All pages have been loaded")]
    AllPagesLoaded,

    // ── Filters ─────────────────────────────────────────────────────
    /// A filter value outside its enumerated set.
    #[error("Invalid value ({value}) for '{filter}'. Must be one of {allowed:?}")]
    InvalidFilterValue {
        filter: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    // ── Data ────────────────────────────────────────────────────────
    /// The envelope decoded fine but its payload did not match the
    /// expected shape.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the body wasn't JSON (typically the login page).
    pub fn is_not_json(&self) -> bool {
        matches!(self, Self::NotJson { .. })
    }

    /// Returns `true` for failures that re-authenticating might resolve.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::NotJson { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::UNAUTHORIZED),
            _ => false,
        }
    }

    /// Extract the controller's `errorCode`, if this is a domain error.
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::Omada { error_code, .. } => Some(*error_code),
            _ => None,
        }
    }
}
