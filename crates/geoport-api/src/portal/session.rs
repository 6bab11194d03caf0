// Authenticated (or anonymous) portal session
//
// A session is a client plus an optional token. It only reaches callers
// of the connector after the identity query has succeeded once; the
// methods here stay available for later queries on the same handle.

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::portal::client::{PortalClient, Token};

/// The signed-in identity reported by the portal.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalUser {
    pub username: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
}

/// A capability-bearing handle to the portal.
#[derive(Debug)]
pub struct PortalSession {
    client: PortalClient,
    token: Option<Token>,
}

impl PortalSession {
    /// Wrap a client and an issued token.
    pub fn authenticated(client: PortalClient, token: Token) -> Self {
        Self {
            client,
            token: Some(token),
        }
    }

    /// Wrap a client with no token (default-profile / anonymous access).
    pub fn anonymous(client: PortalClient) -> Self {
        Self {
            client,
            token: None,
        }
    }

    /// Whether this session carries an access token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The portal base URL this session talks to.
    pub fn portal_url(&self) -> &Url {
        self.client.base_url()
    }

    fn token_secret(&self) -> Option<&SecretString> {
        self.token.as_ref().map(|t| &t.token)
    }

    /// Query the current user identity.
    ///
    /// `GET /sharing/rest/community/self`
    ///
    /// This is the validation query: a session is only surfaced to
    /// callers once it has answered with a concrete username.
    pub async fn current_user(&self) -> Result<PortalUser, Error> {
        let user: PortalUser = self
            .client
            .get_json("community/self", self.token_secret())
            .await?;

        match &user.username {
            Some(username) => {
                debug!(username, "identity query answered");
                Ok(user)
            }
            None => Err(Error::Validation {
                message: "identity query returned no signed-in user".into(),
            }),
        }
    }

    /// Fetch portal metadata (name, hostname, version).
    ///
    /// `GET /sharing/rest/portals/self`
    ///
    /// Returns loosely-typed JSON because the field set varies widely
    /// between portal releases.
    pub async fn portal_info(&self) -> Result<serde_json::Value, Error> {
        self.client
            .get_json("portals/self", self.token_secret())
            .await
    }
}
