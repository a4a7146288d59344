// Thin client for the identity provider's management API.
//
// Requests only. Keeping the identity-provider traffic in one place, with no
// app logic mixed in, is what keeps it easy to stub out in tests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Auth0Config;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A user profile as returned by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityUser {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub app_metadata: Value,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct IdentityClient {
    http: reqwest::Client,
    domain: String,
    client_id: String,
    client_secret: String,
}

impl IdentityClient {
    /// Build the client from config. Returns None unless all provider
    /// settings are present, in which case dependent features degrade to
    /// claims-only output.
    pub fn from_config(config: &Auth0Config) -> Option<Self> {
        let domain = config.domain.clone()?;
        let client_id = config.client_id.clone()?;
        let client_secret = config.client_secret.clone()?;

        Some(Self {
            http: reqwest::Client::new(),
            domain,
            client_id,
            client_secret,
        })
    }

    /// Fetch a management-API token via the client-credentials grant
    pub async fn oauth_token(&self) -> Result<String, IdentityError> {
        let response: TokenResponse = self
            .http
            .post(format!("https://{}/oauth/token", self.domain))
            .json(&json!({
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "audience": format!("https://{}/api/v2/", self.domain),
                "grant_type": "client_credentials",
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.access_token)
    }

    /// Fetch one user's profile
    pub async fn get_user(&self, token: &str, userid: &str) -> Result<IdentityUser, IdentityError> {
        let user = self
            .http
            .get(format!("https://{}/api/v2/users/{}", self.domain, userid))
            .bearer_auth(token)
            .query(&[("fields", "user_id,username,app_metadata")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(user)
    }
}
