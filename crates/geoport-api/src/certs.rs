// Certificate trust resolution
//
// Confirms that a portal host is reachable over TLS using a known CA
// bundle before the connector commits to a verified attempt. This is a
// smoke test: a passing probe does not guarantee every later request on
// the same bundle succeeds, and a failing probe only downgrades the
// connector to default verification.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{Error, FailureKind};
use crate::transport::{TlsMode, TransportConfig};

/// Well-known CA bundle locations, checked in order after `SSL_CERT_FILE`.
const SYSTEM_BUNDLE_CANDIDATES: [&str; 4] = [
    "/etc/ssl/certs/ca-certificates.crt",
    "/etc/pki/tls/certs/ca-bundle.crt",
    "/etc/ssl/ca-bundle.pem",
    "/etc/ssl/cert.pem",
];

/// Resolves a usable trust bundle for a portal host.
#[derive(Debug, Clone)]
pub struct CertificateResolver {
    store_dir: PathBuf,
    timeout: Duration,
}

impl Default for CertificateResolver {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("./certificates"),
            timeout: Duration::from_secs(10),
        }
    }
}

impl CertificateResolver {
    /// Create a resolver with a custom local certificate-store directory.
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            ..Self::default()
        }
    }

    /// Confirm TLS trust for the host of `url`.
    ///
    /// Returns the path of the trust bundle the probe verified against,
    /// or `None` when resolution failed -- the caller falls back to
    /// default verification. Any HTTP response, 4xx and 5xx included,
    /// counts as trust success; only a failure to complete the request
    /// (TLS handshake, DNS, refused, timeout) counts as failure.
    pub async fn resolve(&self, url: &Url) -> Option<PathBuf> {
        let target = probe_target(url)?;
        debug!(host = %target, "probing certificate trust");

        if let Err(e) = std::fs::create_dir_all(&self.store_dir) {
            warn!(dir = %self.store_dir.display(), error = %e, "could not create certificate store");
        }

        let Some(bundle) = system_trust_bundle() else {
            warn!("no system trust bundle found");
            return None;
        };
        debug!(bundle = %bundle.display(), "using system trust bundle");

        let transport = TransportConfig::new(TlsMode::BundleOnly(bundle.clone()), self.timeout);
        let client = match transport.build_client() {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "error during certificate verification");
                return None;
            }
        };

        match client.get(target).send().await {
            Ok(resp) => {
                info!(status = %resp.status(), "certificate verification successful");
                Some(bundle)
            }
            Err(e) => {
                let err = Error::Transport(e);
                if err.failure_kind() == FailureKind::CertificateTrust {
                    error!(error = %err, "certificate verification failed");
                } else {
                    error!(error = %err, "error during certificate verification");
                }
                None
            }
        }
    }
}

/// The HTTPS probe URL for a portal URL: scheme forced to https,
/// host and port carried over, path dropped.
fn probe_target(url: &Url) -> Option<Url> {
    let host = url.host_str()?;
    let target = match url.port() {
        Some(port) => format!("https://{host}:{port}"),
        None => format!("https://{host}"),
    };
    target.parse().ok()
}

/// Locate the system's default CA bundle.
///
/// `SSL_CERT_FILE` wins when set; otherwise the usual distro locations
/// are checked in order.
pub fn system_trust_bundle() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SSL_CERT_FILE") {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
    }
    first_existing(SYSTEM_BUNDLE_CANDIDATES.iter().map(Path::new))
}

fn first_existing<'a>(mut candidates: impl Iterator<Item = &'a Path>) -> Option<PathBuf> {
    candidates.find(|p| p.is_file()).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_target_forces_https_and_keeps_port() {
        let url: Url = "http://portal.example.com:7443/portal/home".parse().expect("url");
        let target = probe_target(&url).expect("target");
        assert_eq!(target.as_str(), "https://portal.example.com:7443/");
    }

    #[test]
    fn probe_target_drops_path_and_default_port() {
        let url: Url = "https://portal.example.com/sharing/rest".parse().expect("url");
        let target = probe_target(&url).expect("target");
        assert_eq!(target.as_str(), "https://portal.example.com/");
    }

    #[test]
    fn first_existing_picks_the_first_present_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("bundle.pem");
        std::fs::write(&present, "x").expect("write");
        let missing = dir.path().join("missing.pem");

        let found = first_existing([missing.as_path(), present.as_path()].into_iter());
        assert_eq!(found, Some(present));
    }

    #[tokio::test]
    async fn store_directory_creation_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = dir.path().join("certificates");
        let resolver = CertificateResolver::new(&store);

        // Unroutable host -- the probe fails either way; we only care
        // that repeated resolution attempts tolerate the existing dir.
        let url: Url = "https://localhost:1/".parse().expect("url");
        let _ = resolver.resolve(&url).await;
        let _ = resolver.resolve(&url).await;
        assert!(store.is_dir());
    }
}
