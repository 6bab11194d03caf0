// ── Credential resolution ──
//
// Implements the connector's `CredentialSource` capability: platform
// secret store first, no-echo interactive prompt second, in strict
// order. Whether a store backend exists is decided once, when the
// resolver is constructed -- not re-checked per call. Interactively
// entered secrets are never written back into the store.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info, warn};

use geoport_core::{CredentialPair, CredentialSource};

/// Service name under which secrets are filed in the platform store.
pub const SERVICE_NAME: &str = "geoport";

// ── Secret store ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    #[error("secret store failure: {0}")]
    Backend(String),
}

/// Minimal secret-store surface the resolver needs.
pub trait SecretStore {
    fn get(&self, identity: &str) -> Result<Option<SecretString>, StoreError>;
    fn set(&self, identity: &str, secret: &SecretString) -> Result<(), StoreError>;
    fn delete(&self, identity: &str) -> Result<(), StoreError>;
}

/// Platform keyring backend (Windows Credential Manager, macOS
/// Keychain, Secret Service on Linux).
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self {
            service: SERVICE_NAME.into(),
        }
    }
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, identity: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, identity)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    /// One-time availability check: a lookup that answers "no entry"
    /// proves the backend is reachable.
    pub fn is_available(&self) -> bool {
        match self.get("geoport-availability-probe") {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "secret store not available");
                false
            }
        }
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, identity: &str) -> Result<Option<SecretString>, StoreError> {
        match self.entry(identity)?.get_password() {
            Ok(secret) => Ok(Some(SecretString::from(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    fn set(&self, identity: &str, secret: &SecretString) -> Result<(), StoreError> {
        self.entry(identity)?
            .set_password(secret.expose_secret())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn delete(&self, identity: &str) -> Result<(), StoreError> {
        match self.entry(identity)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}

// ── Interactive prompt ──────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PromptError {
    /// The user interrupted the prompt. Reported as "no credentials",
    /// never propagated as a failure.
    #[error("secret prompt cancelled")]
    Cancelled,

    #[error("secret prompt failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads a secret without echoing it.
pub trait SecretPrompt {
    fn read_secret(&self, label: &str) -> Result<SecretString, PromptError>;
}

impl<P: SecretPrompt + ?Sized> SecretPrompt for &P {
    fn read_secret(&self, label: &str) -> Result<SecretString, PromptError> {
        (**self).read_secret(label)
    }
}

/// Terminal prompt via rpassword.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtyPrompt;

impl SecretPrompt for TtyPrompt {
    fn read_secret(&self, label: &str) -> Result<SecretString, PromptError> {
        match rpassword::prompt_password(label) {
            Ok(secret) => Ok(SecretString::from(secret)),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::Interrupted | std::io::ErrorKind::UnexpectedEof
                ) =>
            {
                Err(PromptError::Cancelled)
            }
            Err(e) => Err(PromptError::Io(e)),
        }
    }
}

// ── Resolver ────────────────────────────────────────────────────────

/// The production credential source: optional store, then prompt.
pub struct CredentialResolver<S = KeyringStore, P = TtyPrompt> {
    store: Option<S>,
    prompt: P,
}

impl CredentialResolver {
    /// Build the platform resolver, probing store availability once.
    pub fn from_platform() -> Self {
        let keyring = KeyringStore::new();
        let store = keyring.is_available().then_some(keyring);
        if store.is_none() {
            debug!("no secret store backend -- prompt only");
        }
        Self {
            store,
            prompt: TtyPrompt,
        }
    }
}

impl<S: SecretStore, P: SecretPrompt> CredentialResolver<S, P> {
    /// Assemble a resolver from explicit parts (tests, embedders).
    pub fn with_parts(store: Option<S>, prompt: P) -> Self {
        Self { store, prompt }
    }
}

impl<S: SecretStore, P: SecretPrompt> CredentialSource for CredentialResolver<S, P> {
    fn resolve(&self, identity_hint: Option<&str>) -> CredentialPair {
        let Some(identity) = identity_hint else {
            return CredentialPair::absent();
        };

        // Method 1: stored secret -- no prompt on a hit.
        if let Some(store) = &self.store {
            match store.get(identity) {
                Ok(Some(secret)) => {
                    info!(identity, "retrieved credentials from secret store");
                    return CredentialPair::new(identity, secret);
                }
                Ok(None) => debug!(identity, "no stored secret"),
                Err(e) => warn!(error = %e, "failed to retrieve from secret store"),
            }
        }

        // Method 2: no-echo prompt.
        info!("prompting for secret (input not echoed)");
        match self.prompt.read_secret(&format!("Enter password for {identity}: ")) {
            Ok(secret) => CredentialPair::new(identity, secret),
            Err(PromptError::Cancelled) => {
                info!("secret input cancelled by user");
                CredentialPair::absent()
            }
            Err(PromptError::Io(e)) => {
                warn!(error = %e, "secret prompt failed");
                CredentialPair::absent()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MapStore {
        secrets: HashMap<String, String>,
        fail: bool,
    }

    impl MapStore {
        fn with(identity: &str, secret: &str) -> Self {
            let mut secrets = HashMap::new();
            secrets.insert(identity.to_string(), secret.to_string());
            Self {
                secrets,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                secrets: HashMap::new(),
                fail: true,
            }
        }
    }

    impl SecretStore for MapStore {
        fn get(&self, identity: &str) -> Result<Option<SecretString>, StoreError> {
            if self.fail {
                return Err(StoreError::Backend("simulated outage".into()));
            }
            Ok(self
                .secrets
                .get(identity)
                .map(|s| SecretString::from(s.clone())))
        }

        fn set(&self, _identity: &str, _secret: &SecretString) -> Result<(), StoreError> {
            Ok(())
        }

        fn delete(&self, _identity: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Prompt double that records invocations and plays a script.
    struct ScriptedPrompt {
        calls: RefCell<usize>,
        outcome: fn() -> Result<SecretString, PromptError>,
    }

    impl ScriptedPrompt {
        fn answering() -> Self {
            Self {
                calls: RefCell::new(0),
                outcome: || Ok(SecretString::from("typed-pw".to_string())),
            }
        }

        fn cancelling() -> Self {
            Self {
                calls: RefCell::new(0),
                outcome: || Err(PromptError::Cancelled),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl SecretPrompt for ScriptedPrompt {
        fn read_secret(&self, _label: &str) -> Result<SecretString, PromptError> {
            *self.calls.borrow_mut() += 1;
            (self.outcome)()
        }
    }

    #[test]
    fn store_hit_never_prompts() {
        let prompt = ScriptedPrompt::answering();
        let resolver =
            CredentialResolver::with_parts(Some(MapStore::with("alice", "stored-pw")), &prompt);

        let pair = resolver.resolve(Some("alice"));
        assert!(pair.is_usable());
        assert_eq!(prompt.calls(), 0);
    }

    #[test]
    fn store_miss_falls_through_to_the_prompt() {
        let prompt = ScriptedPrompt::answering();
        let resolver =
            CredentialResolver::with_parts(Some(MapStore::with("bob", "other")), &prompt);

        let pair = resolver.resolve(Some("alice"));
        assert!(pair.is_usable());
        assert_eq!(prompt.calls(), 1);
    }

    #[test]
    fn store_failure_degrades_to_the_prompt() {
        let prompt = ScriptedPrompt::answering();
        let resolver = CredentialResolver::with_parts(Some(MapStore::failing()), &prompt);

        let pair = resolver.resolve(Some("alice"));
        assert!(pair.is_usable());
        assert_eq!(prompt.calls(), 1);
    }

    #[test]
    fn cancelled_prompt_yields_absent_not_an_error() {
        let prompt = ScriptedPrompt::cancelling();
        let resolver = CredentialResolver::with_parts(None::<MapStore>, &prompt);

        let pair = resolver.resolve(Some("alice"));
        assert!(!pair.is_usable());
        assert_eq!(prompt.calls(), 1);
    }

    #[test]
    fn no_identity_hint_resolves_nothing_and_touches_nothing() {
        let prompt = ScriptedPrompt::answering();
        let resolver =
            CredentialResolver::with_parts(Some(MapStore::with("alice", "pw")), &prompt);

        let pair = resolver.resolve(None);
        assert!(!pair.is_usable());
        assert_eq!(prompt.calls(), 0);
    }
}
