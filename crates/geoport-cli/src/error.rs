//! CLI error types with miette diagnostics.
//!
//! Maps connector, config, and table errors into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use geoport_config::ConfigError;
use geoport_core::ConnectError;
use geoport_core::table::TableError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the portal")]
    #[diagnostic(
        code(geoport::connection_failed),
        help(
            "Check that the portal is reachable and the URL is correct.\n\
             Cause: {cause}"
        )
    )]
    ConnectionFailed { cause: String },

    #[error("TLS certificate trust failure")]
    #[diagnostic(
        code(geoport::certificate_trust),
        help(
            "The portal's certificate could not be verified, and the\n\
             unverified retry failed too. Cause: {cause}"
        )
    )]
    CertificateTrust { cause: String },

    #[error("Portal rejected the trust-bundle parameter")]
    #[diagnostic(
        code(geoport::unsupported_parameter),
        help("The legacy verification retry also failed. Cause: {cause}")
    )]
    UnsupportedParameter { cause: String },

    #[error("Connected, but the session failed validation")]
    #[diagnostic(
        code(geoport::validation_failed),
        help("The identity query did not succeed. Cause: {cause}")
    )]
    SessionValidation { cause: String },

    #[error("Certificate verification failed for {url}")]
    #[diagnostic(
        code(geoport::cert_probe_failed),
        help("The TLS probe against the system trust bundle did not succeed.")
    )]
    CertProbeFailed { url: String },

    // ── Authentication / credentials ─────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(geoport::profile_not_found),
        help("Create one with: geoport config init")
    )]
    ProfileNotFound { name: String },

    #[error("Secret store operation failed")]
    #[diagnostic(code(geoport::secret_store), help("Cause: {cause}"))]
    SecretStore { cause: String },

    #[error("Secret input cancelled")]
    #[diagnostic(code(geoport::prompt_cancelled))]
    PromptCancelled,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(geoport::validation))]
    Validation { field: String, reason: String },

    // ── Fetch ────────────────────────────────────────────────────────

    #[error("Failed to fetch {url}")]
    #[diagnostic(code(geoport::fetch_failed), help("Cause: {cause}"))]
    FetchFailed { url: String, cause: String },

    // ── Tables ───────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(geoport::table))]
    Table(#[from] TableError),

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(geoport::config))]
    Config(#[from] ConfigError),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(geoport::config_exists),
        help("Pass --force to overwrite it. Path: {path}")
    )]
    ConfigExists { path: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(geoport::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::CertificateTrust { .. }
            | Self::UnsupportedParameter { .. }
            | Self::SessionValidation { .. }
            | Self::CertProbeFailed { .. }
            | Self::FetchFailed { .. } => exit_code::CONNECTION,
            Self::ProfileNotFound { .. } | Self::SecretStore { .. } | Self::PromptCancelled => {
                exit_code::AUTH
            }
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConnectError → CliError mapping ──────────────────────────────────

impl From<ConnectError> for CliError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::CertificateTrust { cause } => Self::CertificateTrust { cause },
            ConnectError::UnsupportedParameter { cause } => Self::UnsupportedParameter { cause },
            ConnectError::Validation { cause } => Self::SessionValidation { cause },
            ConnectError::UnknownProfile { name } => Self::ProfileNotFound { name },
            ConnectError::Connection { cause } => Self::ConnectionFailed { cause },
        }
    }
}
