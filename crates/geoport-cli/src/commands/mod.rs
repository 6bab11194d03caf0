//! Command handlers, one module per top-level subcommand.

pub mod cert;
pub mod config_cmd;
pub mod connect;
pub mod cred;
pub mod fetch;
pub mod stats;
