// Shared transport configuration for building reqwest::Client instances.
//
// Every connection attempt gets its own client because the TLS mode can
// differ between attempts (verified primary, unverified fallback, legacy
// bundle shape). Building a client is cheap relative to a portal round trip.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// TLS verification mode for one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Modern shape: verify against the system store PLUS the CA
    /// certificates from the given PEM bundle.
    TrustBundle(PathBuf),
    /// Legacy shape: the bundle IS the verification argument -- it
    /// replaces the root store entirely instead of supplementing it.
    BundleOnly(PathBuf),
    /// Accept any certificate. Only ever used by the cert-fallback
    /// attempt, and loudly warned about.
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    pub fn new(tls: TlsMode, timeout: Duration) -> Self {
        Self { tls, timeout }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("geoport/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::TrustBundle(path) => {
                for cert in read_bundle(path)? {
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsMode::BundleOnly(path) => {
                builder = builder.tls_built_in_root_certs(false);
                for cert in read_bundle(path)? {
                    builder = builder.add_root_certificate(cert);
                }
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Read every CA certificate from a PEM bundle file.
fn read_bundle(path: &PathBuf) -> Result<Vec<reqwest::Certificate>, Error> {
    let pem = std::fs::read(path).map_err(|e| {
        Error::Tls(format!("failed to read CA bundle {}: {e}", path.display()))
    })?;
    reqwest::Certificate::from_pem_bundle(&pem)
        .map_err(|e| Error::Tls(format!("invalid CA bundle {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_verifies_against_system_store() {
        let config = TransportConfig::default();
        assert_eq!(config.tls, TlsMode::System);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_bundle_is_a_tls_error() {
        let config = TransportConfig::new(
            TlsMode::TrustBundle(PathBuf::from("/nonexistent/bundle.pem")),
            Duration::from_secs(5),
        );
        let err = config.build_client().expect_err("bundle should be missing");
        assert!(matches!(err, Error::Tls(_)), "got: {err:?}");
    }

    #[test]
    fn system_mode_builds() {
        let config = TransportConfig::default();
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn danger_mode_builds() {
        let config = TransportConfig::new(TlsMode::DangerAcceptInvalid, Duration::from_secs(5));
        assert!(config.build_client().is_ok());
    }
}
