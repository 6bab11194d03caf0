// geoport-core: Connection orchestration between geoport-api and consumers.

pub mod connector;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod request;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use connector::{AttemptAuth, AttemptPlan, PortalConnector, StoredProfile};
pub use credentials::{CredentialPair, CredentialSource, NoCredentials};
pub use error::ConnectError;
pub use request::ConnectionRequest;

// Re-export the session types callers receive.
pub use geoport_api::{PortalSession, PortalUser};
