//! Per-call authorization gate.
//!
//! [`AuthGate`] decides whether an inbound gRPC call may proceed. Methods
//! absent from the [`ProtectedOperations`] table pass straight through.
//! Protected methods need an `authorization: Bearer <token>` entry; the token
//! is validated by a [`CredentialValidator`] on every call (nothing is
//! cached) and the returned role must equal the method's required role.
//!
//! [`AuthLayer`] applies the gate to a tonic server at the HTTP layer.

mod layer;
mod validator;

pub use layer::{AuthLayer, AuthService};
pub use validator::{
    build_validator, CredentialValidator, HttpCredentialValidator, IdentityResponse,
    StaticCredentialValidator, ValidatorError,
};

use std::collections::HashMap;
use std::sync::Arc;

use tonic::Status;
use tracing::{debug, info, warn};

use crate::config::ProtectedOperation;

/// Metadata key carrying the bearer credential.
pub const AUTHORIZATION_METADATA_KEY: &str = "authorization";

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated identity, valid for a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: String,
    /// Expiry as reported by the identity service.
    pub expires_at: String,
}

/// Gate rejections.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredential,

    #[error("token validation failed: {0}")]
    InvalidCredential(#[from] ValidatorError),

    #[error("insufficient permissions: {method} requires role {required}")]
    PermissionDenied { method: String, required: String },
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential | AuthError::InvalidCredential(_) => {
                Status::unauthenticated(err.to_string())
            }
            AuthError::PermissionDenied { .. } => Status::permission_denied("insufficient permissions"),
        }
    }
}

/// Mapping from full gRPC method path to the role it requires.
#[derive(Debug, Clone, Default)]
pub struct ProtectedOperations {
    roles: HashMap<String, String>,
}

impl ProtectedOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `role` for `method`, replacing any earlier requirement.
    pub fn with(mut self, method: impl Into<String>, role: impl Into<String>) -> Self {
        self.roles.insert(method.into(), role.into());
        self
    }

    /// Role required for `method`, or `None` if the method is public.
    pub fn required_role(&self, method: &str) -> Option<&str> {
        self.roles.get(method).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl From<&[ProtectedOperation]> for ProtectedOperations {
    fn from(operations: &[ProtectedOperation]) -> Self {
        operations
            .iter()
            .fold(Self::new(), |table, op| table.with(&op.method, &op.role))
    }
}

/// Strip the literal `Bearer ` prefix and surrounding whitespace.
///
/// A value without the prefix is used as-is; the result may be empty.
pub fn extract_bearer_token(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim()
}

/// Stateless authorization decision for one call.
pub struct AuthGate {
    operations: ProtectedOperations,
    validator: Arc<dyn CredentialValidator>,
}

impl AuthGate {
    pub fn new(operations: ProtectedOperations, validator: Arc<dyn CredentialValidator>) -> Self {
        Self {
            operations,
            validator,
        }
    }

    /// Decide whether a call to `method` may proceed.
    ///
    /// Returns `Ok(None)` for public methods and `Ok(Some(principal))` when a
    /// protected method was authorized.
    pub async fn authorize(
        &self,
        method: &str,
        authorization: Option<&str>,
    ) -> Result<Option<Principal>, AuthError> {
        let Some(required_role) = self.operations.required_role(method) else {
            debug!(method = %method, "Public method, skipping authorization");
            return Ok(None);
        };

        let Some(header) = authorization else {
            warn!(method = %method, "Missing authorization header");
            return Err(AuthError::MissingCredential);
        };

        let token = extract_bearer_token(header);
        let principal = self.validator.validate(token).await.map_err(|e| {
            warn!(method = %method, error = %e, "Token validation failed");
            AuthError::from(e)
        })?;

        if principal.role != required_role {
            info!(
                method = %method,
                user_id = %principal.user_id,
                required = %required_role,
                actual = %principal.role,
                "Permission denied"
            );
            return Err(AuthError::PermissionDenied {
                method: method.to_string(),
                required: required_role.to_string(),
            });
        }

        debug!(method = %method, user_id = %principal.user_id, "Call authorized");
        Ok(Some(principal))
    }
}
