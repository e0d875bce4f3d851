//! Service account credentials and OAuth2 token minting.
//!
//! The admin REST surface wants a bearer token obtained by exchanging a
//! signed JWT assertion at the service account's token URI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::backend::{BackendError, BackendResult};
use crate::error::{Result, SeederError};

const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/datastore \
     https://www.googleapis.com/auth/devstorage.read_write \
     https://www.googleapis.com/auth/identitytoolkit";

/// Access tokens are requested for one hour, the maximum Google grants.
const TOKEN_LIFETIME_SECS: u64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a service account key file the seeder needs.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccount {
    /// Load and parse a service account key file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)?;
        serde_json::from_slice(&raw).map_err(|e| {
            SeederError::Credentials(format!("malformed key file {}: {}", path.display(), e))
        })
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange a signed JWT assertion for an access token.
pub async fn mint_access_token(
    http: &reqwest::Client,
    account: &ServiceAccount,
) -> BackendResult<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let claims = Claims {
        iss: &account.client_email,
        scope: OAUTH_SCOPES,
        aud: &account.token_uri,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };

    let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
        .map_err(|e| BackendError::Other(format!("invalid private key: {}", e)))?;
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| BackendError::Other(format!("failed to sign assertion: {}", e)))?;

    let response = http
        .post(&account.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Http(format!(
            "token exchange failed: {}: {}",
            status, body
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}
