// ── Credential source capability ──
//
// The connector never talks to a secret store or a terminal itself; it
// asks whatever `CredentialSource` it was constructed with. The real
// implementation (keyring + no-echo prompt) lives in `geoport-config`;
// whether a store backend exists is that implementation's concern,
// decided once at construction.

use secrecy::SecretString;

/// An (identity, secret) pair, or nothing.
///
/// Never partially populated: an identity without a retrievable secret
/// is reported as absent.
#[derive(Debug, Clone, Default)]
pub struct CredentialPair {
    identity: Option<String>,
    secret: Option<SecretString>,
}

impl CredentialPair {
    /// A fully-populated pair.
    pub fn new(identity: impl Into<String>, secret: SecretString) -> Self {
        Self {
            identity: Some(identity.into()),
            secret: Some(secret),
        }
    }

    /// The absent pair.
    pub fn absent() -> Self {
        Self::default()
    }

    /// True when both halves are present.
    pub fn is_usable(&self) -> bool {
        self.identity.is_some() && self.secret.is_some()
    }

    /// Split into parts. Returns `(None, None)` unless both are present.
    pub fn into_parts(self) -> (Option<String>, Option<SecretString>) {
        if self.identity.is_some() && self.secret.is_some() {
            (self.identity, self.secret)
        } else {
            (None, None)
        }
    }
}

/// Resolves credentials for a connection attempt.
///
/// Implementations are synchronous and blocking (secret-store lookup,
/// interactive prompt); the connector calls them once per `connect`,
/// before any network work.
pub trait CredentialSource {
    /// Resolve a secret for `identity_hint`.
    ///
    /// Must return [`CredentialPair::absent`] rather than erroring when
    /// nothing can be resolved -- absence is an expected outcome, not a
    /// failure.
    fn resolve(&self, identity_hint: Option<&str>) -> CredentialPair;
}

impl<C: CredentialSource + ?Sized> CredentialSource for &C {
    fn resolve(&self, identity_hint: Option<&str>) -> CredentialPair {
        (**self).resolve(identity_hint)
    }
}

/// A source that never resolves anything.
///
/// For callers that want the default-profile path only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn resolve(&self, _identity_hint: Option<&str>) -> CredentialPair {
        CredentialPair::absent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_with_both_halves_is_usable() {
        let pair = CredentialPair::new("alice", SecretString::from("pw".to_string()));
        assert!(pair.is_usable());
        let (identity, secret) = pair.into_parts();
        assert_eq!(identity.as_deref(), Some("alice"));
        assert!(secret.is_some());
    }

    #[test]
    fn absent_pair_splits_into_nothing() {
        let (identity, secret) = CredentialPair::absent().into_parts();
        assert!(identity.is_none());
        assert!(secret.is_none());
    }
}
