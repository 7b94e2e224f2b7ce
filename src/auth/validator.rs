//! Credential validators.
//!
//! The gate depends on [`CredentialValidator`] only. Production uses the
//! identity service over HTTP; the static validator serves local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

use super::Principal;
use crate::config::{AuthConfig, StaticToken, ValidatorType};

/// Validation failures. Each one rejects the call as unauthenticated.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("auth service not reachable: {0}")]
    Unreachable(String),

    #[error("auth service timed out")]
    Timeout,

    #[error("invalid token or unauthorized: status {status}")]
    Rejected { status: u16 },

    #[error("malformed auth service response: {0}")]
    MalformedResponse(String),

    #[error("failed to build auth client: {0}")]
    Client(String),
}

/// Resolves a bearer token to a principal.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Principal, ValidatorError>;
}

/// Identity-service response body.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityResponse {
    pub user_id: String,
    pub role: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: String,
}

impl From<IdentityResponse> for Principal {
    fn from(resp: IdentityResponse) -> Self {
        Self {
            user_id: resp.user_id,
            role: resp.role,
            expires_at: resp.expires_at,
        }
    }
}

/// Validates tokens with `GET <url>` and `Authorization: Bearer <token>`.
///
/// Only a 200 with a well-formed JSON body counts as success. The client's
/// timeout bounds every round trip; there are no retries.
pub struct HttpCredentialValidator {
    client: Client,
    url: String,
}

impl HttpCredentialValidator {
    pub fn new(config: &AuthConfig) -> Result<Self, ValidatorError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ValidatorError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: config.identity_url.clone(),
        })
    }
}

#[async_trait]
impl CredentialValidator for HttpCredentialValidator {
    async fn validate(&self, token: &str) -> Result<Principal, ValidatorError> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.url, error = %e, "Auth service request failed");
                if e.is_timeout() {
                    ValidatorError::Timeout
                } else {
                    ValidatorError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "Token rejected by auth service");
            return Err(ValidatorError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ValidatorError::Timeout
            } else {
                ValidatorError::MalformedResponse(e.to_string())
            }
        })?;

        let identity: IdentityResponse = serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, "Failed to decode auth service response");
            ValidatorError::MalformedResponse(e.to_string())
        })?;

        Ok(identity.into())
    }
}

/// Validates tokens against a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialValidator {
    tokens: HashMap<String, Principal>,
}

impl StaticCredentialValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `principal`.
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

impl From<&[StaticToken]> for StaticCredentialValidator {
    fn from(tokens: &[StaticToken]) -> Self {
        tokens.iter().fold(Self::new(), |validator, t| {
            validator.with_token(
                &t.token,
                Principal {
                    user_id: t.user_id.clone(),
                    role: t.role.clone(),
                    expires_at: t.expires_at.clone(),
                },
            )
        })
    }
}

#[async_trait]
impl CredentialValidator for StaticCredentialValidator {
    async fn validate(&self, token: &str) -> Result<Principal, ValidatorError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(ValidatorError::Rejected { status: 401 })
    }
}

/// Build the validator selected by configuration.
pub fn build_validator(config: &AuthConfig) -> Result<Arc<dyn CredentialValidator>, ValidatorError> {
    match config.validator {
        ValidatorType::Http => Ok(Arc::new(HttpCredentialValidator::new(config)?)),
        ValidatorType::Static => Ok(Arc::new(StaticCredentialValidator::from(
            config.static_tokens.as_slice(),
        ))),
    }
}
