//! Authorization gate configuration types.

use std::time::Duration;

use serde::Deserialize;

/// Default identity-service validation endpoint.
pub const DEFAULT_IDENTITY_URL: &str = "http://auth-service:8080/api/v1/auth/validate";

/// Role required by the default protected operations.
pub const ADMIN_ROLE: &str = "admin";

/// Credential validator discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorType {
    /// Validate tokens against the identity service over HTTP.
    #[default]
    Http,
    /// Validate tokens against `static_tokens` (local development only).
    Static,
}

/// One protected gRPC method and the role it requires.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtectedOperation {
    /// Full gRPC method path, e.g. `/inventory.InventoryService/DeleteResource`.
    pub method: String,
    pub role: String,
}

/// A token accepted by the static validator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StaticToken {
    pub token: String,
    pub user_id: String,
    pub role: String,
    /// Reported expiry, passed through unchanged.
    #[serde(default)]
    pub expires_at: String,
}

/// Authorization configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub validator: ValidatorType,
    /// Identity-service validation endpoint.
    pub identity_url: String,
    /// Deadline for one validation round trip, in milliseconds.
    pub timeout_ms: u64,
    /// Deadline for establishing the TCP connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Methods that require a role. Every other method is public.
    pub protected_operations: Vec<ProtectedOperation>,
    pub static_tokens: Vec<StaticToken>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorType::Http,
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            protected_operations: default_protected_operations(),
            static_tokens: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Mutating inventory operations require the admin role; reads are public.
pub fn default_protected_operations() -> Vec<ProtectedOperation> {
    ["CreateResource", "UpdateResourceStatus", "DeleteResource"]
        .into_iter()
        .map(|name| ProtectedOperation {
            method: format!("/inventory.InventoryService/{}", name),
            role: ADMIN_ROLE.to_string(),
        })
        .collect()
}
