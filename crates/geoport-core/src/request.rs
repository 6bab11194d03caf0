// ── Connection request ──
//
// Immutable input to one `connect` call. Built by the CLI (or any other
// consumer) and handed to the connector; never mutated, never persisted.

use secrecy::SecretString;
use url::Url;

/// Everything one connection attempt sequence needs to know.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    /// Portal base URL. Optional: with no URL (and no profile URL) the
    /// connector targets the default online portal.
    pub url: Option<Url>,
    /// Identity (username) to sign in as, or a hint for the credential
    /// resolver.
    pub identity: Option<String>,
    /// Secret for `identity`. When both are supplied the credential
    /// resolver is never consulted.
    pub secret: Option<SecretString>,
    /// Named profile. Takes priority over identity+secret.
    pub profile: Option<String>,
    /// Verify TLS certificates on the primary attempt.
    pub verify_certificates: bool,
    /// Consult the credential resolver (secret store / prompt) when
    /// identity or secret are missing.
    pub use_secure_credentials: bool,
}

impl Default for ConnectionRequest {
    fn default() -> Self {
        Self {
            url: None,
            identity: None,
            secret: None,
            profile: None,
            verify_certificates: true,
            use_secure_credentials: true,
        }
    }
}

impl ConnectionRequest {
    /// A request targeting `url` with all defaults.
    pub fn to_url(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }

    /// True when both identity and secret were supplied up front.
    pub(crate) fn has_explicit_credentials(&self) -> bool {
        self.identity.is_some() && self.secret.is_some()
    }
}
