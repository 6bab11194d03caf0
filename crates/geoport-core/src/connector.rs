// ── Portal connector ──
//
// Produces a validated session for a target portal, trying successively
// weaker guarantees until one succeeds or all are exhausted:
//
//   1. primary attempt with the resolved trust configuration
//   2. on a certificate-trust failure: one retry with verification off
//   3. on an unsupported-parameter failure: one retry with the legacy
//      verification shape
//
// The two fallbacks are mutually exclusive branches of the same failure
// inspection -- never chained -- so a single call performs at most two
// attempts. Failure classification happens once, at the api boundary;
// this module only branches on the resulting tag.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{error, info, warn};
use url::Url;

use geoport_api::{
    CertificateResolver, Error as ApiError, FailureKind, PortalClient, PortalSession, TlsMode,
    TransportConfig,
};

use crate::credentials::CredentialSource;
use crate::error::ConnectError;
use crate::request::ConnectionRequest;

/// A profile resolved ahead of time by the configuration layer.
///
/// The connector itself never reads config files or secret stores; the
/// caller hands in whatever named profiles exist, fully resolved, at
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct StoredProfile {
    pub url: Option<Url>,
    pub identity: Option<String>,
    pub secret: Option<SecretString>,
}

/// How one attempt signs in.
#[derive(Debug, Clone)]
pub enum AttemptAuth {
    /// Named profile (resolved to its stored parameters).
    Profile {
        name: String,
        identity: Option<String>,
        secret: Option<SecretString>,
    },
    /// Explicit identity + secret.
    Credentials {
        identity: String,
        secret: SecretString,
    },
    /// No credentials at all -- anonymous/default access.
    DefaultProfile,
}

/// One fully-described connection attempt: who signs in, and how TLS
/// is configured for it.
#[derive(Debug, Clone)]
pub struct AttemptPlan {
    pub auth: AttemptAuth,
    pub tls: TlsMode,
}

/// Where in an attempt the failure happened. A failed identity query
/// is reported differently from a failed sign-in, even though both are
/// inspected for the same fallback triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptStage {
    SignIn,
    Validation,
}

/// A failed attempt: the untranslated boundary error plus the stage it
/// came from.
#[derive(Debug)]
struct AttemptFailure {
    stage: AttemptStage,
    error: ApiError,
}

impl AttemptFailure {
    fn into_terminal(self) -> ConnectError {
        match self.stage {
            AttemptStage::Validation => ConnectError::Validation {
                cause: self.error.to_string(),
            },
            AttemptStage::SignIn => ConnectError::from(self.error),
        }
    }
}

impl AttemptPlan {
    /// The same attempt with a different TLS mode (fallback tiers).
    fn with_tls(&self, tls: TlsMode) -> Self {
        Self {
            auth: self.auth.clone(),
            tls,
        }
    }

    /// TLS mode for the primary attempt.
    ///
    /// A resolved bundle rides alongside the system store (modern
    /// shape); without one, default verification; verification off only
    /// when the caller asked for it.
    pub fn primary_tls(verify: bool, bundle: Option<&PathBuf>) -> TlsMode {
        match (verify, bundle) {
            (true, Some(bundle)) => TlsMode::TrustBundle(bundle.clone()),
            (true, None) => TlsMode::System,
            (false, _) => TlsMode::DangerAcceptInvalid,
        }
    }

    /// TLS mode for the legacy-shape fallback: the bundle becomes the
    /// verification argument itself, replacing the root store. With no
    /// bundle to demote, the attempt repeats without the modern shape.
    pub fn legacy_tls(verify: bool, bundle: Option<&PathBuf>) -> TlsMode {
        match (verify, bundle) {
            (_, Some(bundle)) => TlsMode::BundleOnly(bundle.clone()),
            (true, None) => TlsMode::System,
            (false, None) => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Orchestrates credential resolution, certificate resolution, and the
/// tiered attempt sequence.
pub struct PortalConnector<C> {
    credentials: C,
    cert_resolver: CertificateResolver,
    profiles: HashMap<String, StoredProfile>,
    timeout: Duration,
}

impl<C: CredentialSource> PortalConnector<C> {
    /// Create a connector around a credential source.
    pub fn new(credentials: C) -> Self {
        Self {
            credentials,
            cert_resolver: CertificateResolver::default(),
            profiles: HashMap::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Supply the named profiles this connector can resolve.
    pub fn with_profiles(mut self, profiles: HashMap<String, StoredProfile>) -> Self {
        self.profiles = profiles;
        self
    }

    /// Replace the certificate resolver (store directory, etc.).
    pub fn with_cert_resolver(mut self, resolver: CertificateResolver) -> Self {
        self.cert_resolver = resolver;
        self
    }

    /// Per-attempt request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connect to the portal described by `request`.
    ///
    /// Returns a session only after the identity query on it has
    /// succeeded. All failures come back as a [`ConnectError`] -- this
    /// method never panics and never propagates a raw api error.
    pub async fn connect(&self, request: &ConnectionRequest) -> Result<PortalSession, ConnectError> {
        // Profile lookup first: an unknown profile is a terminal,
        // pre-network failure.
        let profile = match &request.profile {
            Some(name) => Some(self.profiles.get(name).ok_or_else(|| {
                ConnectError::UnknownProfile { name: name.clone() }
            })?),
            None => None,
        };

        let target = request
            .url
            .clone()
            .or_else(|| profile.and_then(|p| p.url.clone()))
            .ok_or_else(|| ConnectError::Connection {
                cause: "no portal URL configured".into(),
            })?;

        // Step 1: credential resolution. Skipped entirely when a
        // profile is in play or both halves were supplied up front.
        let mut identity = request.identity.clone();
        let mut secret = request.secret.clone();
        if request.use_secure_credentials
            && request.profile.is_none()
            && !request.has_explicit_credentials()
        {
            info!("using secure credential retrieval");
            let pair = self.credentials.resolve(identity.as_deref());
            if pair.is_usable() {
                let (resolved_identity, resolved_secret) = pair.into_parts();
                identity = resolved_identity;
                secret = resolved_secret;
            } else if identity.is_none() {
                warn!("no credentials available -- will attempt default-profile connection");
            }
        }

        // Step 2: certificate resolution. Failure downgrades to default
        // verification; it never aborts the call.
        let bundle = if request.verify_certificates {
            match self.cert_resolver.resolve(&target).await {
                Some(bundle) => {
                    info!(bundle = %bundle.display(), "using trust bundle");
                    Some(bundle)
                }
                None => {
                    warn!("certificate resolution failed, using default verification");
                    None
                }
            }
        } else {
            None
        };

        // Step 3: auth priority is profile > identity+secret > default.
        let auth = match (&request.profile, profile) {
            (Some(name), Some(p)) => AttemptAuth::Profile {
                name: name.clone(),
                identity: p.identity.clone(),
                secret: p.secret.clone(),
            },
            _ => match (identity, secret) {
                (Some(identity), Some(secret)) => AttemptAuth::Credentials { identity, secret },
                _ => AttemptAuth::DefaultProfile,
            },
        };

        let primary = AttemptPlan {
            auth,
            tls: AttemptPlan::primary_tls(request.verify_certificates, bundle.as_ref()),
        };

        // Step 4: primary attempt, then at most one fallback.
        match self.attempt(&target, &primary).await {
            Ok(session) => Ok(session),
            Err(failure) => match failure.error.failure_kind() {
                FailureKind::CertificateTrust => {
                    warn!(
                        error = %failure.error,
                        "SSL certificate verification failed, retrying with verification disabled"
                    );
                    self.retry_without_verification(&target, &primary).await
                }
                FailureKind::UnsupportedParameter => {
                    warn!(
                        error = %failure.error,
                        "trust-bundle parameter not supported, retrying with legacy shape"
                    );
                    self.retry_legacy_shape(&target, &primary, request, bundle.as_ref())
                        .await
                }
                FailureKind::Other => {
                    error!(error = %failure.error, "failed to connect to portal");
                    Err(failure.into_terminal())
                }
            },
        }
    }

    /// Cert-fallback tier: same attempt, verification disabled.
    async fn retry_without_verification(
        &self,
        target: &Url,
        primary: &AttemptPlan,
    ) -> Result<PortalSession, ConnectError> {
        let plan = primary.with_tls(TlsMode::DangerAcceptInvalid);
        match self.attempt(target, &plan).await {
            Ok(session) => {
                warn!("connected with TLS verification disabled -- THIS CHANNEL IS NOT VERIFIED");
                Ok(session)
            }
            Err(failure) => {
                error!(error = %failure.error, "retry without verification failed");
                Err(ConnectError::CertificateTrust {
                    cause: failure.error.to_string(),
                })
            }
        }
    }

    /// Legacy-fallback tier: same attempt, bundle as the verification
    /// argument.
    async fn retry_legacy_shape(
        &self,
        target: &Url,
        primary: &AttemptPlan,
        request: &ConnectionRequest,
        bundle: Option<&PathBuf>,
    ) -> Result<PortalSession, ConnectError> {
        let plan = primary.with_tls(AttemptPlan::legacy_tls(request.verify_certificates, bundle));
        match self.attempt(target, &plan).await {
            Ok(session) => {
                info!("connected using legacy certificate shape");
                Ok(session)
            }
            Err(failure) => {
                error!(error = %failure.error, "legacy certificate retry failed");
                Err(ConnectError::UnsupportedParameter {
                    cause: failure.error.to_string(),
                })
            }
        }
    }

    /// Execute one attempt: build the client, sign in, validate.
    ///
    /// Errors surface unclassified, tagged only with the stage they
    /// came from; the caller inspects them for fallback triggers.
    async fn attempt(
        &self,
        target: &Url,
        plan: &AttemptPlan,
    ) -> Result<PortalSession, AttemptFailure> {
        let sign_in = |error| AttemptFailure {
            stage: AttemptStage::SignIn,
            error,
        };

        let transport = TransportConfig::new(plan.tls.clone(), self.timeout);
        let client = PortalClient::new(target.clone(), &transport).map_err(sign_in)?;

        let session = match &plan.auth {
            AttemptAuth::Profile {
                name,
                identity,
                secret,
            } => match (identity, secret) {
                (Some(identity), Some(secret)) => {
                    let token = client.generate_token(identity, secret).await.map_err(sign_in)?;
                    info!(profile = %name, "signed in using profile");
                    PortalSession::authenticated(client, token)
                }
                _ => {
                    info!(profile = %name, "profile carries no credentials -- anonymous session");
                    PortalSession::anonymous(client)
                }
            },
            AttemptAuth::Credentials { identity, secret } => {
                let token = client.generate_token(identity, secret).await.map_err(sign_in)?;
                info!(user = %identity, "signed in as user");
                PortalSession::authenticated(client, token)
            }
            AttemptAuth::DefaultProfile => {
                info!("connecting using default profile");
                PortalSession::anonymous(client)
            }
        };

        let user = session.current_user().await.map_err(|error| AttemptFailure {
            stage: AttemptStage::Validation,
            error,
        })?;
        info!(
            user = user.username.as_deref().unwrap_or("<unknown>"),
            "connection validated"
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> PathBuf {
        PathBuf::from("/etc/ssl/certs/ca-certificates.crt")
    }

    #[test]
    fn primary_uses_modern_bundle_shape_when_resolved() {
        let tls = AttemptPlan::primary_tls(true, Some(&bundle()));
        assert_eq!(tls, TlsMode::TrustBundle(bundle()));
    }

    #[test]
    fn primary_falls_back_to_system_store_without_bundle() {
        assert_eq!(AttemptPlan::primary_tls(true, None), TlsMode::System);
    }

    #[test]
    fn primary_honours_disabled_verification() {
        assert_eq!(
            AttemptPlan::primary_tls(false, Some(&bundle())),
            TlsMode::DangerAcceptInvalid
        );
    }

    #[test]
    fn legacy_shape_demotes_bundle_to_verification_argument() {
        let tls = AttemptPlan::legacy_tls(true, Some(&bundle()));
        assert_eq!(tls, TlsMode::BundleOnly(bundle()));
    }

    #[test]
    fn legacy_shape_without_bundle_repeats_plain_verification() {
        assert_eq!(AttemptPlan::legacy_tls(true, None), TlsMode::System);
        assert_eq!(
            AttemptPlan::legacy_tls(false, None),
            TlsMode::DangerAcceptInvalid
        );
    }
}
