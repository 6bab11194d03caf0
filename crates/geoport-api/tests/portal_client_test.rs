#![allow(clippy::unwrap_used)]
// Integration tests for `PortalClient` / `PortalSession` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geoport_api::{Error, PortalClient, PortalSession};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PortalClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = PortalClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn secret(s: &str) -> secrecy::SecretString {
    s.to_string().into()
}

// ── Token tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_token_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sharing/rest/generateToken"))
        .and(body_string_contains("username=alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-abc123",
            "expires": 1_750_000_000_000_i64,
            "ssl": true
        })))
        .mount(&server)
        .await;

    let token = client.generate_token("alice", &secret("pw")).await.unwrap();
    assert_eq!(token.expires, Some(1_750_000_000_000));
}

#[tokio::test]
async fn test_generate_token_rejection_is_authentication_error() {
    let (server, client) = setup().await;

    // Error envelope delivered with HTTP 200, as portals do.
    Mock::given(method("POST"))
        .and(path("/sharing/rest/generateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "Unable to generate token.",
                "details": ["Invalid username or password specified."]
            }
        })))
        .mount(&server)
        .await;

    let result = client.generate_token("alice", &secret("wrong")).await;
    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(
                message.contains("Invalid username or password"),
                "unexpected message: {message}"
            );
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_token_http_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sharing/rest/generateToken"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let result = client.generate_token("alice", &secret("pw")).await;
    assert!(
        matches!(result, Err(Error::Api { code: 503, .. })),
        "got: {result:?}"
    );
}

// ── Identity / validation tests ─────────────────────────────────────

#[tokio::test]
async fn test_current_user_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/community/self"))
        .and(query_param("f", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "alice",
            "fullName": "Alice Example",
            "role": "org_admin",
            "email": "alice@example.com"
        })))
        .mount(&server)
        .await;

    let session = PortalSession::anonymous(client);
    let user = session.current_user().await.unwrap();
    assert_eq!(user.username.as_deref(), Some("alice"));
    assert_eq!(user.full_name.as_deref(), Some("Alice Example"));
}

#[tokio::test]
async fn test_current_user_without_identity_fails_validation() {
    let (server, client) = setup().await;

    // Anonymous access: the portal answers, but with no signed-in user.
    Mock::given(method("GET"))
        .and(path("/sharing/rest/community/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let session = PortalSession::anonymous(client);
    let result = session.current_user().await;
    assert!(
        matches!(result, Err(Error::Validation { .. })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_expired_token_maps_to_token_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/community/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 498, "message": "Invalid token." }
        })))
        .mount(&server)
        .await;

    let session = PortalSession::anonymous(client);
    let result = session.current_user().await;
    assert!(matches!(result, Err(Error::TokenExpired)), "got: {result:?}");
}

// ── Metadata tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_portal_info() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/portals/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Example Maps",
            "portalHostname": "maps.example.com",
            "currentVersion": "11.2",
            "isPortal": true
        })))
        .mount(&server)
        .await;

    let session = PortalSession::anonymous(client);
    let info = session.portal_info().await.unwrap();
    assert_eq!(info["portalHostname"], "maps.example.com");
    assert_eq!(info["isPortal"], true);
}

// ── Envelope edge cases ─────────────────────────────────────────────

#[tokio::test]
async fn test_garbage_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sharing/rest/portals/self"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let session = PortalSession::anonymous(client);
    let result = session.portal_info().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_api_error_text_feeds_failure_classification() {
    let (server, client) = setup().await;

    // An error envelope whose text matches a certificate-trust pattern
    // must classify as a certificate failure at the boundary.
    Mock::given(method("POST"))
        .and(path("/sharing/rest/generateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "code": 495,
                "message": "SSL: CERTIFICATE_VERIFY_FAILED while contacting the authority"
            }
        })))
        .mount(&server)
        .await;

    let err = client
        .generate_token("alice", &secret("pw"))
        .await
        .unwrap_err();
    assert_eq!(err.failure_kind(), geoport_api::FailureKind::CertificateTrust);
}
