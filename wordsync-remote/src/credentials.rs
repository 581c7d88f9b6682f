//! Credential providers for remote stores.
//!
//! Stores only ever ask for a bearer token. Google service-account keys are
//! exchanged for one through the OAuth2 JWT-bearer grant and cached until
//! shortly before they expire.

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, info};
use wordsync_core::{SyncError, SyncResult};

/// OAuth2 scope granting Firestore access.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Supplies bearer tokens for remote calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Short description for logs.
    fn kind(&self) -> &'static str;

    /// Returns a valid access token.
    async fn access_token(&self) -> SyncResult<String>;
}

/// A pre-issued access token.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    fn kind(&self) -> &'static str {
        "static token"
    }

    async fn access_token(&self) -> SyncResult<String> {
        if self.token.is_empty() {
            return Err(SyncError::Auth("access token is empty".to_string()));
        }
        Ok(self.token.clone())
    }
}

/// A Google service-account key file.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Reads a key file downloaded from the Google Cloud console.
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyncError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SyncError::Config(format!("invalid service account key: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<SystemTime>,
}

/// Exchanges a service-account key for access tokens.
pub struct ServiceAccountCredentials {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountCredentials {
    /// Creates credentials for the Firestore scope.
    pub fn new(key: ServiceAccountKey) -> SyncResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SyncError::Config(format!("invalid service account private key: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            key,
            encoding_key,
            client,
            cached: RwLock::new(None),
        })
    }

    /// Loads the key file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        Self::new(ServiceAccountKey::from_file(path)?)
    }

    /// Project id recorded in the key file.
    pub fn project_id(&self) -> Option<&str> {
        self.key.project_id.as_deref()
    }

    /// Builds a signed JWT assertion for the token endpoint.
    pub fn assertion(&self) -> SyncResult<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SyncError::Auth(format!("clock error: {e}")))?
            .as_secs();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SyncError::Auth(format!("failed to sign assertion: {e}")))
    }

    async fn exchange(&self) -> SyncResult<CachedToken> {
        debug!("Exchanging service account assertion for {}", self.key.client_email);
        let assertion = self.assertion()?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("token exchange failed: {e}")))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth(format!("token exchange failed: {error}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Auth(format!("failed to parse token response: {e}")))?;

        let expires_at = token.expires_in.map(|secs| {
            SystemTime::now() + Duration::from_secs(secs.saturating_sub(EXPIRY_MARGIN_SECS))
        });

        info!("Authenticated as {}", self.key.client_email);
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl CredentialProvider for ServiceAccountCredentials {
    fn kind(&self) -> &'static str {
        "service account"
    }

    async fn access_token(&self) -> SyncResult<String> {
        {
            let guard = self.cached.read().await;
            if let Some(cached) = guard.as_ref() {
                let expired = cached
                    .expires_at
                    .is_some_and(|exp| SystemTime::now() > exp);
                if !expired {
                    return Ok(cached.access_token.clone());
                }
            }
        } // read lock dropped here

        let fresh = self.exchange().await?;
        let token = fresh.access_token.clone();
        *self.cached.write().await = Some(fresh);
        Ok(token)
    }
}
