//! Service account authentication.
//!
//! Implements the OAuth 2.0 JWT bearer flow: a claim set naming the requested
//! scopes is signed with the account's RSA key and exchanged at the token
//! endpoint for a short-lived access token. Tokens are cached per scope set.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::GoogleError;

pub const SCOPE_DRIVE: &str = "https://www.googleapis.com/auth/drive";
pub const SCOPE_SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Service account key file contents.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read a key from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, GoogleError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GoogleError::Credentials(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse a key from JSON text.
    pub fn from_json(content: &str) -> Result<Self, GoogleError> {
        let key: Self = serde_json::from_str(content)
            .map_err(|e| GoogleError::Credentials(e.to_string()))?;
        if key.client_email.is_empty() {
            return Err(GoogleError::Credentials("client_email is empty".to_string()));
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Bearer token source for a service account.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    http: reqwest::Client,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Self {
        Self {
            key,
            http,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load the key file and build an authenticator.
    pub fn from_file(path: &Path, http: reqwest::Client) -> Result<Self, GoogleError> {
        Ok(Self::new(ServiceAccountKey::from_file(path)?, http))
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Get an access token for the given scopes, refreshing when close to expiry.
    pub async fn token(&self, scopes: &[&str]) -> Result<String, GoogleError> {
        let scope = scopes.join(" ");
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.get(&scope) {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.access_token.clone());
            }
        }

        let fetched = self.fetch_token(&scope).await?;
        let access_token = fetched.access_token.clone();
        cache.insert(scope, fetched);
        Ok(access_token)
    }

    /// Build the signed JWT assertion for a scope string.
    fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, GoogleError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    async fn fetch_token(&self, scope: &str) -> Result<CachedToken, GoogleError> {
        let now = Utc::now();
        let assertion = self.assertion(scope, now)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::Token(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        debug!(
            "Obtained access token for {} (expires in {}s)",
            self.key.client_email, lifetime
        );

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(lifetime),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mount_token_endpoint, test_key, TEST_PRIVATE_KEY};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_key_from_json_defaults_token_uri() {
        let json = serde_json::json!({
            "client_email": "svc@project.iam.gserviceaccount.com",
            "private_key": TEST_PRIVATE_KEY,
        });
        let key = ServiceAccountKey::from_json(&json.to_string()).unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn test_key_from_json_rejects_missing_fields() {
        let result = ServiceAccountKey::from_json(r#"{"client_email": "a@b"}"#);
        assert!(matches!(result, Err(GoogleError::Credentials(_))));
    }

    #[test]
    fn test_key_debug_hides_private_key() {
        let key = test_key("http://localhost/token");
        let debug = format!("{:?}", key);
        assert!(debug.contains("client_email"));
        assert!(!debug.contains("PRIVATE KEY"));
    }

    #[test]
    fn test_key_from_missing_file() {
        let result = ServiceAccountKey::from_file(Path::new("/nonexistent/creds.json"));
        assert!(matches!(result, Err(GoogleError::Credentials(_))));
    }

    #[test]
    fn test_assertion_is_three_part_jwt() {
        let auth = ServiceAccountAuth::new(test_key("http://localhost/token"), reqwest::Client::new());
        let jwt = auth.assertion(SCOPE_DRIVE, Utc::now()).unwrap();
        assert_eq!(jwt.split('.').count(), 3);
    }

    #[test]
    fn test_assertion_with_bad_key_fails() {
        let mut key = test_key("http://localhost/token");
        key.private_key = "not a pem".to_string();
        let auth = ServiceAccountAuth::new(key, reqwest::Client::new());
        assert!(matches!(
            auth.assertion(SCOPE_DRIVE, Utc::now()),
            Err(GoogleError::Signing(_))
        ));
    }

    #[test]
    fn test_cached_token_freshness() {
        let now = Utc::now();
        let fresh = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::seconds(600),
        };
        let stale = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }

    #[tokio::test]
    async fn test_token_exchange_and_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant-type%3Ajwt-bearer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = ServiceAccountAuth::new(
            test_key(&format!("{}/token", server.uri())),
            reqwest::Client::new(),
        );

        assert_eq!(auth.token(&[SCOPE_DRIVE]).await.unwrap(), "ya29.test");
        // Second call is served from the cache.
        assert_eq!(auth.token(&[SCOPE_DRIVE]).await.unwrap(), "ya29.test");
    }

    #[tokio::test]
    async fn test_token_cached_per_scope_set() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        let auth = ServiceAccountAuth::new(
            test_key(&format!("{}/token", server.uri())),
            reqwest::Client::new(),
        );
        auth.token(&[SCOPE_DRIVE]).await.unwrap();
        auth.token(&[SCOPE_SPREADSHEETS, SCOPE_DRIVE]).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn test_token_exchange_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let auth = ServiceAccountAuth::new(
            test_key(&format!("{}/token", server.uri())),
            reqwest::Client::new(),
        );
        let err = auth.token(&[SCOPE_DRIVE]).await.unwrap_err();
        assert!(matches!(err, GoogleError::Token(ref msg) if msg.contains("invalid_grant")));
    }
}
