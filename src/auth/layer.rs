//! Tower layer applying the [`AuthGate`] to every inbound gRPC call.
//!
//! The gate runs at the HTTP layer, before tonic decodes the request body.
//! The method is taken from the request path and the credential from the
//! `authorization` header (gRPC metadata travels as HTTP/2 headers).
//! Rejections are answered with a trailers-only gRPC error response; on
//! success the [`Principal`](super::Principal) is inserted into the request
//! extensions, where handlers read it via `tonic::Request::extensions`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tonic::body::BoxBody;
use tonic::Status;
use tower::{Layer, Service};

use super::{AuthGate, AUTHORIZATION_METADATA_KEY};

/// Layer that wraps services with [`AuthService`].
///
/// # Example
/// ```ignore
/// Server::builder()
///     .layer(AuthLayer::new(gate))
///     .add_service(InventoryServiceServer::new(service));
/// ```
#[derive(Clone)]
pub struct AuthLayer {
    gate: Arc<AuthGate>,
}

impl AuthLayer {
    pub fn new(gate: AuthGate) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// Service that authorizes each request before forwarding it.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    gate: Arc<AuthGate>,
}

impl<S, ReqBody> Service<http::Request<ReqBody>> for AuthService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<BoxBody>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<ReqBody>) -> Self::Future {
        let gate = self.gate.clone();
        // The readied service handles this request; a fresh clone takes its place.
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            let method = request.uri().path().to_string();
            // A non-ASCII value is present but unusable; it validates as empty.
            let authorization = request
                .headers()
                .get(AUTHORIZATION_METADATA_KEY)
                .map(|value| value.to_str().unwrap_or_default().to_string());

            match gate.authorize(&method, authorization.as_deref()).await {
                Ok(Some(principal)) => {
                    request.extensions_mut().insert(principal);
                    ready_inner.call(request).await
                }
                Ok(None) => ready_inner.call(request).await,
                Err(e) => Ok(Status::from(e).into_http()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use tonic::Code;
    use tower::ServiceExt;

    use super::super::{Principal, ProtectedOperations, StaticCredentialValidator};
    use super::*;

    const CREATE: &str = "/inventory.InventoryService/CreateResource";
    const LIST: &str = "/inventory.InventoryService/ListResources";

    fn layer() -> AuthLayer {
        let validator = StaticCredentialValidator::new()
            .with_token(
                "admin-token",
                Principal {
                    user_id: "u-1".to_string(),
                    role: "admin".to_string(),
                    expires_at: String::new(),
                },
            )
            .with_token(
                "viewer-token",
                Principal {
                    user_id: "u-2".to_string(),
                    role: "viewer".to_string(),
                    expires_at: String::new(),
                },
            );
        let gate = AuthGate::new(
            ProtectedOperations::new().with(CREATE, "admin"),
            Arc::new(validator),
        );
        AuthLayer::new(gate)
    }

    /// Inner service that echoes the principal's user id in a header.
    #[derive(Clone)]
    struct EchoPrincipal;

    impl Service<http::Request<()>> for EchoPrincipal {
        type Response = http::Response<BoxBody>;
        type Error = Infallible;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: http::Request<()>) -> Self::Future {
            let mut response = http::Response::new(tonic::body::empty_body());
            if let Some(principal) = request.extensions().get::<Principal>() {
                response
                    .headers_mut()
                    .insert("x-user-id", principal.user_id.parse().unwrap());
            }
            std::future::ready(Ok(response))
        }
    }

    fn request(path: &str, authorization: Option<&str>) -> http::Request<()> {
        let mut builder = http::Request::builder().uri(format!("http://localhost{}", path));
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(()).unwrap()
    }

    fn grpc_code(response: &http::Response<BoxBody>) -> Option<Code> {
        Status::from_header_map(response.headers()).map(|status| status.code())
    }

    #[tokio::test]
    async fn test_public_method_passes_without_credential() {
        let service = layer().layer(EchoPrincipal);

        let response = service.oneshot(request(LIST, None)).await.unwrap();

        assert_eq!(grpc_code(&response), None);
        assert!(response.headers().get("x-user-id").is_none());
    }

    #[tokio::test]
    async fn test_protected_method_without_credential_is_rejected() {
        let service = layer().layer(EchoPrincipal);

        let response = service.oneshot(request(CREATE, None)).await.unwrap();

        assert_eq!(grpc_code(&response), Some(Code::Unauthenticated));
    }

    #[tokio::test]
    async fn test_protected_method_with_wrong_role_is_denied() {
        let service = layer().layer(EchoPrincipal);

        let response = service
            .oneshot(request(CREATE, Some("Bearer viewer-token")))
            .await
            .unwrap();

        assert_eq!(grpc_code(&response), Some(Code::PermissionDenied));
    }

    #[tokio::test]
    async fn test_authorized_call_carries_principal() {
        let service = layer().layer(EchoPrincipal);

        let response = service
            .oneshot(request(CREATE, Some("Bearer admin-token")))
            .await
            .unwrap();

        assert_eq!(grpc_code(&response), None);
        assert_eq!(response.headers().get("x-user-id").unwrap(), "u-1");
    }
}
