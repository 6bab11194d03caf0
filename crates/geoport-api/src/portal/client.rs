// Portal sharing REST HTTP client
//
// Wraps `reqwest::Client` with portal-specific URL construction and error
// envelope handling. The sharing REST API reports most failures as
// HTTP 200 with an `{"error": {code, message, details}}` body, so every
// response goes through the same envelope check before deserialization.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Token lifetime requested at sign-in, in minutes.
const TOKEN_EXPIRATION_MINUTES: u32 = 60;

/// An access token issued by `generateToken`.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub token: SecretString,
    /// Expiry as epoch milliseconds, when the portal reports one.
    pub expires: Option<i64>,
}

/// Error envelope delivered with HTTP 200.
#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: i64,
    message: Option<String>,
    #[serde(default)]
    details: Vec<String>,
}

impl ErrorBody {
    fn into_message(self) -> String {
        let mut message = self.message.unwrap_or_else(|| format!("code {}", self.code));
        if !self.details.is_empty() {
            message.push_str(": ");
            message.push_str(&self.details.join("; "));
        }
        message
    }
}

/// Raw HTTP client for a portal's sharing REST API.
#[derive(Debug)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the portal root (e.g. `https://maps.example.com`
    /// or `https://maps.example.com/portal` for a path-mounted install).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The portal base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build a full URL for a sharing REST path:
    /// `{base}/sharing/rest/{path}`
    pub(crate) fn sharing_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/sharing/rest/{path}");
        Url::parse(&full).expect("invalid sharing REST URL")
    }

    /// Sign in with username/password and obtain an access token.
    ///
    /// `POST /sharing/rest/generateToken` (form-encoded). Credential
    /// rejections arrive as an error envelope and surface as
    /// [`Error::Authentication`].
    pub async fn generate_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Token, Error> {
        let url = self.sharing_url("generateToken");
        debug!(%url, username, "requesting token");

        let referer = self.base_url.to_string();
        let expiration = TOKEN_EXPIRATION_MINUTES.to_string();
        let form = [
            ("username", username),
            ("password", password.expose_secret()),
            ("client", "referer"),
            ("referer", referer.as_str()),
            ("expiration", expiration.as_str()),
            ("f", "json"),
        ];

        let resp = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let token: Token = parse_body(resp).await.map_err(|e| match e {
            Error::Api { message, .. } => Error::Authentication { message },
            other => other,
        })?;

        debug!("token issued");
        Ok(token)
    }

    /// Send a GET to a sharing REST path and deserialize the response,
    /// attaching the token (if any) and `f=json`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let url = self.sharing_url(path);
        debug!(%url, "GET");

        let mut req = self.http.get(url).query(&[("f", "json")]);
        if let Some(token) = token {
            req = req.query(&[("token", token.expose_secret())]);
        }

        let resp = req.send().await.map_err(Error::Transport)?;
        parse_body(resp).await
    }
}

/// Check HTTP status, unwrap the error envelope, then deserialize.
async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Api {
            message: format!("HTTP {status}: {}", &body[..body.len().min(200)]),
            code: i64::from(status.as_u16()),
        });
    }

    // Portals answer errors with HTTP 200 and an envelope body.
    if let Ok(wrapper) = serde_json::from_str::<ErrorWrapper>(&body) {
        if let Some(err) = wrapper.error {
            let code = err.code;
            return Err(match code {
                498 | 499 => Error::TokenExpired,
                401 | 403 => Error::Authentication {
                    message: err.into_message(),
                },
                _ => Error::Api {
                    message: err.into_message(),
                    code,
                },
            });
        }
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
