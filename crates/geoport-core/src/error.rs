// ── Connect outcome errors ──
//
// What callers of the connector see. One variant per failure kind; the
// cause string carries the underlying error text verbatim so operators
// can grep server logs for it. The connector never panics and never
// lets an api-layer error escape untranslated.

use thiserror::Error;

use geoport_api::Error as ApiError;

/// Failure outcome of a `connect` call.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The certificate fallback was triggered and the retry with
    /// verification disabled also failed.
    #[error("certificate trust failure: {cause}")]
    CertificateTrust { cause: String },

    /// The legacy-parameter fallback was triggered and the retry with
    /// the legacy verification shape also failed.
    #[error("unsupported verification parameter: {cause}")]
    UnsupportedParameter { cause: String },

    /// Connected at the transport level, but the identity query failed.
    #[error("connection validation failed: {cause}")]
    Validation { cause: String },

    /// A profile name was given that the connector does not know.
    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

    /// Any other terminal failure.
    #[error("connection failed: {cause}")]
    Connection { cause: String },
}

impl ConnectError {
    /// The human-readable cause text.
    pub fn cause(&self) -> &str {
        match self {
            Self::CertificateTrust { cause }
            | Self::UnsupportedParameter { cause }
            | Self::Validation { cause }
            | Self::Connection { cause } => cause,
            Self::UnknownProfile { name } => name,
        }
    }
}

// ── Conversion from boundary errors ──────────────────────────────────

impl From<ApiError> for ConnectError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation { message } => Self::Validation { cause: message },
            other => Self::Connection {
                cause: other.to_string(),
            },
        }
    }
}
