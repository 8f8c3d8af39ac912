//! Server helpers for running the provider as a plugin process.
//!
//! This module defines the [`ProviderService`] trait the provider implements
//! and the [`serve`] functions that expose it over gRPC with the handshake
//! protocol.
//!
//! # Signal Handling
//!
//! The server handles SIGTERM and SIGINT for graceful shutdown. When a signal
//! is received, the server:
//! 1. Stops accepting new connections
//! 2. Waits for in-flight requests to complete (bounded by
//!    [`ServeOptions::shutdown_timeout`])
//! 3. Calls the provider's `stop()` method
//! 4. Exits cleanly

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::generated;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema, Schema};
use crate::types::{handshake_line, ProviderMetadata};

/// Trait the provider implements; the gRPC layer translates protocol
/// messages into calls on it.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Provider type name and version plus registered type names.
    fn metadata(&self) -> ProviderMetadata;

    /// Schemas for provider configuration, resources and data sources.
    fn schema(&self) -> ProviderSchema;

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider. Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider gracefully.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Err(ProviderError::UnknownResource(resource_type.to_string()))
    }

    /// Create a new resource.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Read the current state of a resource.
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Err(ProviderError::UnknownDataSource(data_source_type.to_string()))
    }

    /// Read data from the GNS3 server.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError>;
}

/// Wrapper that implements the generated gRPC trait.
struct ProviderGrpcService<P: ProviderService> {
    provider: Arc<P>,
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<generated::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|d| generated::Diagnostic {
            severity: match d.severity {
                DiagnosticSeverity::Error => generated::diagnostic::Severity::Error as i32,
                DiagnosticSeverity::Warning => generated::diagnostic::Severity::Warning as i32,
            },
            summary: d.summary,
            detail: d.detail.unwrap_or_default(),
            attribute: d.attribute.unwrap_or_default(),
        })
        .collect()
}

fn error_to_diagnostics(err: ProviderError) -> Vec<generated::Diagnostic> {
    vec![generated::Diagnostic {
        severity: generated::diagnostic::Severity::Error as i32,
        summary: err.to_string(),
        detail: String::new(),
        attribute: String::new(),
    }]
}

fn schema_to_proto(schema: &Schema) -> generated::Schema {
    generated::Schema {
        version: schema.version as i64,
        attributes: schema
            .attributes
            .iter()
            .map(|(name, attr)| generated::Attribute {
                name: name.clone(),
                r#type: serde_json::to_vec(&attr.attr_type).unwrap_or_default(),
                required: attr.flags.required,
                optional: attr.flags.optional,
                computed: attr.flags.computed,
                description: attr.description.clone().unwrap_or_default(),
                default_value: attr
                    .default
                    .as_ref()
                    .map(|v| serde_json::to_vec(v).unwrap_or_default())
                    .unwrap_or_default(),
            })
            .collect(),
        description: schema.description.clone().unwrap_or_default(),
    }
}

/// Decode a JSON payload; an empty payload means null.
fn decode_json(bytes: &[u8]) -> Result<Value, ProviderError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

fn encode_json(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

fn log_diagnostics(operation: &str, diagnostics: &[Diagnostic]) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        warn!(operation, errors, diagnostics = diagnostics.len(), "Completed with errors");
    } else {
        info!(operation, "Completed successfully");
    }
}

/// Run a diagnostics-returning call and fold any error into the response.
async fn diagnostics_call<F>(operation: &str, call: F) -> Vec<generated::Diagnostic>
where
    F: std::future::Future<Output = Result<Vec<Diagnostic>, ProviderError>>,
{
    match call.await {
        Ok(diagnostics) => {
            log_diagnostics(operation, &diagnostics);
            diagnostics_to_proto(diagnostics)
        },
        Err(e) => {
            error!(operation, error = %e, "Failed");
            error_to_diagnostics(e)
        },
    }
}

/// Run a state-returning call; on error the state is empty.
async fn state_call<F>(operation: &str, call: F) -> (Vec<u8>, Vec<generated::Diagnostic>)
where
    F: std::future::Future<Output = Result<Value, ProviderError>>,
{
    match call.await {
        Ok(state) => {
            debug!(operation, "Completed successfully");
            (encode_json(&state), vec![])
        },
        Err(e) => {
            error!(operation, error = %e, "Failed");
            (vec![], error_to_diagnostics(e))
        },
    }
}

#[tonic::async_trait]
impl<P: ProviderService> generated::provider_server::Provider for ProviderGrpcService<P> {
    #[instrument(skip(self, _request), name = "grpc.get_metadata")]
    async fn get_metadata(
        &self,
        _request: tonic::Request<generated::GetMetadataRequest>,
    ) -> Result<tonic::Response<generated::GetMetadataResponse>, tonic::Status> {
        debug!("GetMetadata called");
        let metadata = self.provider.metadata();
        info!(
            type_name = %metadata.type_name,
            version = %metadata.version,
            resources = metadata.resources.len(),
            data_sources = metadata.data_sources.len(),
            "GetMetadata completed"
        );
        Ok(tonic::Response::new(generated::GetMetadataResponse {
            type_name: metadata.type_name,
            version: metadata.version,
            resources: metadata.resources,
            data_sources: metadata.data_sources,
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, _request), name = "grpc.get_schema")]
    async fn get_schema(
        &self,
        _request: tonic::Request<generated::GetSchemaRequest>,
    ) -> Result<tonic::Response<generated::GetSchemaResponse>, tonic::Status> {
        debug!("GetSchema called");
        let schema = self.provider.schema();
        Ok(tonic::Response::new(generated::GetSchemaResponse {
            provider: Some(schema_to_proto(&schema.provider)),
            resources: schema
                .resources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            data_sources: schema
                .data_sources
                .iter()
                .map(|(k, v)| (k.clone(), schema_to_proto(v)))
                .collect(),
            diagnostics: vec![],
        }))
    }

    #[instrument(skip(self, request), name = "grpc.validate_provider_config")]
    async fn validate_provider_config(
        &self,
        request: tonic::Request<generated::ValidateProviderConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateProviderConfigResponse>, tonic::Status> {
        debug!("ValidateProviderConfig called");
        let req = request.into_inner();
        let diagnostics = diagnostics_call("ValidateProviderConfig", async {
            let config = decode_json(&req.config)?;
            self.provider.validate_provider_config(config).await
        })
        .await;
        Ok(tonic::Response::new(
            generated::ValidateProviderConfigResponse { diagnostics },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.configure")]
    async fn configure(
        &self,
        request: tonic::Request<generated::ConfigureRequest>,
    ) -> Result<tonic::Response<generated::ConfigureResponse>, tonic::Status> {
        debug!("Configure called");
        let req = request.into_inner();
        let diagnostics = diagnostics_call("Configure", async {
            let config = decode_json(&req.config)?;
            self.provider.configure(config).await
        })
        .await;
        Ok(tonic::Response::new(generated::ConfigureResponse { diagnostics }))
    }

    #[instrument(skip(self, _request), name = "grpc.stop")]
    async fn stop(
        &self,
        _request: tonic::Request<generated::StopRequest>,
    ) -> Result<tonic::Response<generated::StopResponse>, tonic::Status> {
        info!("Stop called");
        let error = match self.provider.stop().await {
            Ok(()) => String::new(),
            Err(e) => {
                error!(error = %e, "Stop failed");
                e.to_string()
            },
        };
        Ok(tonic::Response::new(generated::StopResponse { error }))
    }

    #[instrument(skip(self, request), name = "grpc.validate_resource_config")]
    async fn validate_resource_config(
        &self,
        request: tonic::Request<generated::ValidateResourceConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateResourceConfigResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(resource_type = %req.resource_type, "ValidateResourceConfig called");
        let diagnostics = diagnostics_call("ValidateResourceConfig", async {
            let config = decode_json(&req.config)?;
            self.provider
                .validate_resource_config(&req.resource_type, config)
                .await
        })
        .await;
        Ok(tonic::Response::new(
            generated::ValidateResourceConfigResponse { diagnostics },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.create")]
    async fn create(
        &self,
        request: tonic::Request<generated::CreateRequest>,
    ) -> Result<tonic::Response<generated::CreateResponse>, tonic::Status> {
        let req = request.into_inner();
        info!(resource_type = %req.resource_type, "Create called");
        let (state, diagnostics) = state_call("Create", async {
            let planned_state = decode_json(&req.planned_state)?;
            self.provider.create(&req.resource_type, planned_state).await
        })
        .await;
        Ok(tonic::Response::new(generated::CreateResponse { state, diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.read")]
    async fn read(
        &self,
        request: tonic::Request<generated::ReadRequest>,
    ) -> Result<tonic::Response<generated::ReadResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(resource_type = %req.resource_type, "Read called");
        let (state, diagnostics) = state_call("Read", async {
            let current_state = decode_json(&req.current_state)?;
            self.provider.read(&req.resource_type, current_state).await
        })
        .await;
        Ok(tonic::Response::new(generated::ReadResponse { state, diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.update")]
    async fn update(
        &self,
        request: tonic::Request<generated::UpdateRequest>,
    ) -> Result<tonic::Response<generated::UpdateResponse>, tonic::Status> {
        let req = request.into_inner();
        info!(resource_type = %req.resource_type, "Update called");
        let (state, diagnostics) = state_call("Update", async {
            let prior_state = decode_json(&req.prior_state)?;
            let planned_state = decode_json(&req.planned_state)?;
            self.provider
                .update(&req.resource_type, prior_state, planned_state)
                .await
        })
        .await;
        Ok(tonic::Response::new(generated::UpdateResponse { state, diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.delete")]
    async fn delete(
        &self,
        request: tonic::Request<generated::DeleteRequest>,
    ) -> Result<tonic::Response<generated::DeleteResponse>, tonic::Status> {
        let req = request.into_inner();
        info!(resource_type = %req.resource_type, "Delete called");
        let result = async {
            let current_state = decode_json(&req.current_state)?;
            self.provider.delete(&req.resource_type, current_state).await
        }
        .await;
        let diagnostics = match result {
            Ok(()) => {
                info!(resource_type = %req.resource_type, "Delete completed successfully");
                vec![]
            },
            Err(e) => {
                error!(resource_type = %req.resource_type, error = %e, "Delete failed");
                error_to_diagnostics(e)
            },
        };
        Ok(tonic::Response::new(generated::DeleteResponse { diagnostics }))
    }

    #[instrument(skip(self, request), name = "grpc.validate_data_source_config")]
    async fn validate_data_source_config(
        &self,
        request: tonic::Request<generated::ValidateDataSourceConfigRequest>,
    ) -> Result<tonic::Response<generated::ValidateDataSourceConfigResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(data_source_type = %req.data_source_type, "ValidateDataSourceConfig called");
        let diagnostics = diagnostics_call("ValidateDataSourceConfig", async {
            let config = decode_json(&req.config)?;
            self.provider
                .validate_data_source_config(&req.data_source_type, config)
                .await
        })
        .await;
        Ok(tonic::Response::new(
            generated::ValidateDataSourceConfigResponse { diagnostics },
        ))
    }

    #[instrument(skip(self, request), name = "grpc.read_data_source")]
    async fn read_data_source(
        &self,
        request: tonic::Request<generated::ReadDataSourceRequest>,
    ) -> Result<tonic::Response<generated::ReadDataSourceResponse>, tonic::Status> {
        let req = request.into_inner();
        debug!(data_source_type = %req.data_source_type, "ReadDataSource called");
        let (state, diagnostics) = state_call("ReadDataSource", async {
            let config = decode_json(&req.config)?;
            self.provider
                .read_data_source(&req.data_source_type, config)
                .await
        })
        .await;
        Ok(tonic::Response::new(generated::ReadDataSourceResponse {
            state,
            diagnostics,
        }))
    }
}

/// Options for configuring the provider server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// After a shutdown signal, how long to wait for in-flight requests.
    /// Default: 30 seconds.
    pub shutdown_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServeOptions {
    /// Create new serve options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT, CTRL+C on Windows).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!(error = %e, "Failed to install signal handlers");
                    std::future::pending::<()>().await;
                    return;
                },
            };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received CTRL+C, initiating graceful shutdown");
    }

    #[cfg(not(any(unix, windows)))]
    {
        std::future::pending::<()>().await;
    }
}

/// Serve a provider implementation as a gRPC server.
///
/// This function:
/// 1. Binds an available loopback port
/// 2. Outputs the handshake string to stdout
/// 3. Serves gRPC until SIGTERM/SIGINT
///
/// The handshake format is: `GNS3_PROVIDER|<protocol_version>|<address>`
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), Box<dyn std::error::Error>> {
    serve_with_options(provider, ServeOptions::default()).await
}

/// Serve a provider with custom options.
pub async fn serve_with_options<P: ProviderService>(
    provider: P,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    serve_on_listener(provider, listener, options).await
}

/// Serve a provider on a specific address.
pub async fn serve_on<P: ProviderService>(
    provider: P,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    serve_on_with_options(provider, addr, ServeOptions::default()).await
}

/// Serve a provider on a specific address with custom options.
pub async fn serve_on_with_options<P: ProviderService>(
    provider: P,
    addr: SocketAddr,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    serve_on_listener(provider, listener, options).await
}

async fn serve_on_listener<P: ProviderService>(
    provider: P,
    listener: TcpListener,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = listener.local_addr()?;

    // stdout carries only the handshake; logs go to stderr
    println!("{}", handshake_line(&addr));

    info!(address = %addr, "Provider server starting");

    let provider = Arc::new(provider);
    let provider_for_shutdown = Arc::clone(&provider);

    let grpc_service = ProviderGrpcService { provider };
    let server = generated::provider_server::ProviderServer::new(grpc_service);

    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let server_future = Server::builder().add_service(server).serve_with_incoming_shutdown(
        tokio_stream::wrappers::TcpListenerStream::new(listener),
        async move {
            wait_for_shutdown_signal().await;
            let _ = signal_tx.send(());
        },
    );
    tokio::pin!(server_future);

    // The shutdown timeout only starts counting once a signal arrives
    let result = tokio::select! {
        biased;
        result = &mut server_future => Some(result),
        _ = signal_rx => {
            match tokio::time::timeout(options.shutdown_timeout, &mut server_future).await {
                Ok(result) => Some(result),
                Err(_) => None,
            }
        }
    };

    match result {
        Some(Ok(())) => info!("Server shutdown complete"),
        Some(Err(e)) => {
            error!(error = %e, "Server error");
            return Err(ProviderError::from(e).into());
        },
        None => warn!(
            timeout = ?options.shutdown_timeout,
            "Shutdown timeout exceeded, forcing shutdown"
        ),
    }

    debug!("Calling provider stop()");
    if let Err(e) = provider_for_shutdown.stop().await {
        warn!(error = %e, "Provider stop() returned error");
    }

    info!("Provider shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generated::provider_server::Provider as _;
    use crate::provider::Gns3Provider;
    use crate::validation::UNKNOWN_VALUE;
    use serde_json::json;

    fn service() -> ProviderGrpcService<Gns3Provider> {
        ProviderGrpcService {
            provider: Arc::new(Gns3Provider::new("test")),
        }
    }

    #[test]
    fn test_serve_options() {
        let options = ServeOptions::new();
        assert_eq!(options.shutdown_timeout, Duration::from_secs(30));

        let options = ServeOptions::new().with_shutdown_timeout(Duration::from_secs(5));
        assert_eq!(options.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_decode_json() {
        assert_eq!(decode_json(b"").unwrap(), Value::Null);
        assert_eq!(decode_json(b"{\"a\":1}").unwrap(), json!({"a": 1}));
        assert!(matches!(
            decode_json(b"{not json"),
            Err(ProviderError::Serialization(_))
        ));
    }

    #[test]
    fn test_schema_to_proto() {
        let schema = crate::config::ProviderConfig::schema();
        let proto = schema_to_proto(&schema);
        let names: Vec<_> = proto.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["host", "port", "request_timeout"]);
        assert!(proto.attributes[0].required);
        assert_eq!(proto.attributes[1].r#type, b"\"int32\"".to_vec());
        assert_eq!(proto.attributes[2].default_value, b"10".to_vec());
    }

    #[tokio::test]
    async fn test_grpc_get_metadata() {
        let response = service()
            .get_metadata(tonic::Request::new(generated::GetMetadataRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.type_name, "gns3");
        assert_eq!(response.version, "test");
        assert!(response.resources.is_empty());
        assert!(response.data_sources.is_empty());
    }

    #[tokio::test]
    async fn test_grpc_configure_unknown_values() {
        let config = json!({"host": UNKNOWN_VALUE, "port": UNKNOWN_VALUE});
        let response = service()
            .configure(tonic::Request::new(generated::ConfigureRequest {
                config: serde_json::to_vec(&config).unwrap(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.diagnostics.len(), 2);
        assert_eq!(response.diagnostics[0].attribute, "host");
        assert_eq!(response.diagnostics[1].attribute, "port");
        assert!(response
            .diagnostics
            .iter()
            .all(|d| d.severity == generated::diagnostic::Severity::Error as i32));
    }

    #[tokio::test]
    async fn test_grpc_configure_malformed_payload() {
        let response = service()
            .configure(tonic::Request::new(generated::ConfigureRequest {
                config: b"{host".to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].summary.contains("Serialization error"));
    }

    #[tokio::test]
    async fn test_grpc_unknown_resource() {
        let response = service()
            .read(tonic::Request::new(generated::ReadRequest {
                resource_type: "gns3_node".to_string(),
                current_state: b"{}".to_vec(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.state.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].summary.contains("gns3_node"));
    }
}
