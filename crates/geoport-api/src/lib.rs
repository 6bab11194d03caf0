// geoport-api: Async Rust client for the sharing REST API of mapping portals

pub mod certs;
pub mod error;
pub mod portal;
pub mod transport;

pub use certs::CertificateResolver;
pub use error::{Error, FailureKind};
pub use portal::{PortalClient, PortalSession, PortalUser, Token};
pub use transport::{TlsMode, TransportConfig};
