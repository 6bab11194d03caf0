use thiserror::Error;

/// Top-level error type for the `geoport-api` crate.
///
/// Covers every failure mode at the portal boundary: token generation,
/// transport, TLS, the sharing REST error envelope, and session
/// validation. `geoport-core` maps these into connect outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in failed (wrong credentials, disabled account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Token was rejected or has expired.
    #[error("Token invalid or expired")]
    TokenExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error raised while building
    /// the HTTP client.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Portal REST API ─────────────────────────────────────────────
    /// Structured error from the sharing REST envelope
    /// (`{"error": {code, message, details}}`, delivered with HTTP 200).
    #[error("Portal API error ({code}): {message}")]
    Api { message: String, code: i64 },

    /// Connected at the transport level but the identity query failed.
    #[error("Session validation failed: {message}")]
    Validation { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Closed classification of a failed connection attempt.
///
/// The portal SDK surface reports failures as untyped text; the patterns
/// below are matched ONCE here, at the boundary, so the connector in
/// `geoport-core` can branch on a tag instead of scattering substring
/// checks through its control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server certificate could not be verified.
    CertificateTrust,
    /// The portal rejected the modern trust-bundle parameter shape.
    UnsupportedParameter,
    /// Everything else -- terminal, no fallback applies.
    Other,
}

/// Error-text fragments that indicate a certificate trust failure.
const CERTIFICATE_PATTERNS: [&str; 4] = [
    "certificate verify failed",
    "ssl error",
    "ssl certificate",
    "certificate_verify_failed",
];

/// Error-text fragments that indicate the modern trust-bundle parameter
/// is not supported by the remote end.
const UNSUPPORTED_PARAMETER_PATTERNS: [&str; 2] = ["ca_bundles", "unexpected keyword argument"];

impl Error {
    /// Classify this error into a [`FailureKind`].
    ///
    /// Walks the full source chain so that causes buried inside transport
    /// errors (rustls handshake failures surface two levels down in
    /// `reqwest::Error`) are still seen. Certificate patterns are checked
    /// before unsupported-parameter patterns; a text matching both only
    /// ever reports [`FailureKind::CertificateTrust`].
    pub fn failure_kind(&self) -> FailureKind {
        let text = self.full_text().to_lowercase();

        if CERTIFICATE_PATTERNS.iter().any(|p| text.contains(p)) {
            return FailureKind::CertificateTrust;
        }
        if UNSUPPORTED_PARAMETER_PATTERNS.iter().any(|p| text.contains(p)) {
            return FailureKind::UnsupportedParameter;
        }
        FailureKind::Other
    }

    /// The error display text plus every source in the chain.
    fn full_text(&self) -> String {
        let mut text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            text.push_str(": ");
            text.push_str(&err.to_string());
            source = err.source();
        }
        text
    }

    /// Returns `true` if this error indicates the session is no longer
    /// authenticated.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::TokenExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(message: &str) -> Error {
        Error::Api {
            message: message.into(),
            code: 400,
        }
    }

    #[test]
    fn certificate_patterns_classify_as_certificate_trust() {
        for message in [
            "SSL: CERTIFICATE_VERIFY_FAILED",
            "handshake failed: ssl error",
            "bad ssl certificate presented by peer",
            "certificate verify failed: unable to get local issuer",
        ] {
            assert_eq!(
                api(message).failure_kind(),
                FailureKind::CertificateTrust,
                "message: {message}"
            );
        }
    }

    #[test]
    fn unsupported_parameter_patterns_classify_as_unsupported() {
        for message in [
            "got an unexpected keyword argument",
            "unknown option ca_bundles",
        ] {
            assert_eq!(
                api(message).failure_kind(),
                FailureKind::UnsupportedParameter,
                "message: {message}"
            );
        }
    }

    #[test]
    fn certificate_wins_when_both_patterns_match() {
        // Fixed tie-break: the certificate branch is checked first.
        let err = api("ssl error while applying ca_bundles");
        assert_eq!(err.failure_kind(), FailureKind::CertificateTrust);
    }

    #[test]
    fn unrelated_errors_classify_as_other() {
        assert_eq!(
            api("Invalid username or password.").failure_kind(),
            FailureKind::Other
        );
        assert_eq!(
            Error::Validation {
                message: "identity query returned no user".into()
            }
            .failure_kind(),
            FailureKind::Other
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            api("SSL ERROR").failure_kind(),
            FailureKind::CertificateTrust
        );
        assert_eq!(
            api("CA_BUNDLES rejected").failure_kind(),
            FailureKind::UnsupportedParameter
        );
    }
}
