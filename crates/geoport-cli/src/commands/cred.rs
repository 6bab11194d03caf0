//! `geoport cred` -- manage secrets in the platform credential store.

use geoport_config::credentials::{
    KeyringStore, PromptError, SecretPrompt, SecretStore, TtyPrompt,
};

use crate::cli::{CredArgs, CredCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: &CredArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = KeyringStore::new();

    match &args.command {
        CredCommand::Set { username } => {
            let secret = TtyPrompt
                .read_secret(&format!("New secret for {username}: "))
                .map_err(|e| match e {
                    PromptError::Cancelled => CliError::PromptCancelled,
                    PromptError::Io(io) => CliError::Io(io),
                })?;
            store
                .set(username, &secret)
                .map_err(|e| CliError::SecretStore {
                    cause: e.to_string(),
                })?;
            if !global.quiet {
                println!("Stored secret for {username}");
            }
        }

        CredCommand::Clear { username } => {
            store
                .delete(username)
                .map_err(|e| CliError::SecretStore {
                    cause: e.to_string(),
                })?;
            if !global.quiet {
                println!("Removed stored secret for {username}");
            }
        }
    }

    Ok(())
}
