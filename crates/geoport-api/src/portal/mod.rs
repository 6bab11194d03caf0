// Portal sharing REST surface: token sign-in, identity, metadata.

pub mod client;
pub mod session;

pub use client::{PortalClient, Token};
pub use session::{PortalSession, PortalUser};
