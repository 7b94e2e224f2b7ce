//! Server transport: TCP listener plumbing and request tracing.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::Routes;
use tonic::transport::server::Router;
use tower::{Layer, Service};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;

/// Serve a gRPC router on the configured address until `signal` completes.
///
/// The listener is bound before serving starts so a bind failure is reported
/// as an error instead of surfacing from inside the server.
pub async fn serve_with_shutdown<L, ResBody, F>(
    router: Router<L>,
    config: &ServerConfig,
    signal: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    L: Layer<Routes> + Clone,
    L::Service: Service<http::Request<tonic::body::BoxBody>, Response = http::Response<ResBody>>
        + Clone
        + Send
        + 'static,
    <L::Service as Service<http::Request<tonic::body::BoxBody>>>::Future: Send + 'static,
    <L::Service as Service<http::Request<tonic::body::BoxBody>>>::Error:
        Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    ResBody: http_body::Body<Data = bytes::Bytes> + Send + 'static,
    ResBody::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    F: Future<Output = ()> + Send,
{
    let addr: SocketAddr = config.addr().parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!(address = %listener.local_addr()?, transport = "tcp", "Server listening");

    router
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Tower trace layer opening one span per gRPC call.
///
/// The span carries the request path and the `x-correlation-id` header when
/// the caller sends one.
pub fn grpc_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::GrpcErrorsAsFailures>,
    impl Fn(&http::Request<tonic::body::BoxBody>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_grpc().make_span_with(|request: &http::Request<tonic::body::BoxBody>| {
        let correlation_id = request
            .headers()
            .get("x-correlation-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let path = request.uri().path();
        tracing::info_span!("grpc", %correlation_id, %path)
    })
}
