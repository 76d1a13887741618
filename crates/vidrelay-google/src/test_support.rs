//! Shared fixtures for client tests.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::auth::{ServiceAccountAuth, ServiceAccountKey};

pub(crate) const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/test_key.pem");

pub(crate) fn test_key(token_uri: &str) -> ServiceAccountKey {
    ServiceAccountKey {
        client_email: "relay@test-project.iam.gserviceaccount.com".to_string(),
        private_key: TEST_PRIVATE_KEY.to_string(),
        token_uri: token_uri.to_string(),
    }
}

/// Serve `POST /token` with a fixed bearer token.
pub(crate) async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// Authenticator pointed at the mock server's token endpoint.
pub(crate) async fn mock_auth(server: &MockServer) -> Arc<ServiceAccountAuth> {
    mount_token_endpoint(server).await;
    Arc::new(ServiceAccountAuth::new(
        test_key(&format!("{}/token", server.uri())),
        reqwest::Client::new(),
    ))
}
