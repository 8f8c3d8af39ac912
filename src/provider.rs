//! The GNS3 provider.
//!
//! [`Gns3Provider`] answers the host's Metadata, Schema and Configure calls.
//! A successful Configure builds the GNS3 [`Client`] and publishes it to the
//! registered resources and data sources.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::{Client, DEFAULT_TIMEOUT};
use crate::config::{ProviderConfig, HOST_ATTRIBUTE, PORT_ATTRIBUTE, REQUEST_TIMEOUT_ATTRIBUTE};
use crate::error::ProviderError;
use crate::resource::{
    find_data_source, find_resource, DataSource, DataSourceFactory, Resource, ResourceFactory,
};
use crate::schema::{Diagnostic, Diagnostics, ProviderSchema};
use crate::server::ProviderService;
use crate::types::ProviderMetadata;
use crate::validation;

/// Provider type name, and prefix of every resource and data source type.
pub const TYPE_NAME: &str = "gns3";

/// The GNS3 provider.
pub struct Gns3Provider {
    /// "dev" for local builds, "test" under acceptance tests, the release
    /// version otherwise.
    version: String,
    client: RwLock<Option<Arc<Client>>>,
    data_sources: Vec<DataSourceFactory>,
    resources: Vec<ResourceFactory>,
}

impl Gns3Provider {
    /// Create a provider reporting `version`, with empty registries.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            client: RwLock::new(None),
            data_sources: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Register a data source type.
    pub fn with_data_source(mut self, factory: DataSourceFactory) -> Self {
        self.data_sources.push(factory);
        self
    }

    /// Register a resource type.
    pub fn with_resource(mut self, factory: ResourceFactory) -> Self {
        self.resources.push(factory);
        self
    }

    /// The provider version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Data source factories.
    pub fn data_sources(&self) -> &[DataSourceFactory] {
        &self.data_sources
    }

    /// Resource factories.
    pub fn resources(&self) -> &[ResourceFactory] {
        &self.resources
    }

    /// The client published by the last successful Configure.
    pub async fn client(&self) -> Option<Arc<Client>> {
        self.client.read().await.clone()
    }

    async fn configured_client(&self) -> Result<Arc<Client>, ProviderError> {
        self.client().await.ok_or_else(|| {
            ProviderError::NotConfigured(
                "the GNS3 client is created by a successful configure call".to_string(),
            )
        })
    }

    fn resource(&self, resource_type: &str) -> Result<Box<dyn Resource>, ProviderError> {
        find_resource(&self.resources, TYPE_NAME, resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<Box<dyn DataSource>, ProviderError> {
        find_data_source(&self.data_sources, TYPE_NAME, data_source_type)
            .ok_or_else(|| ProviderError::UnknownDataSource(data_source_type.to_string()))
    }
}

#[async_trait]
impl ProviderService for Gns3Provider {
    fn metadata(&self) -> ProviderMetadata {
        let mut metadata = ProviderMetadata::new(TYPE_NAME, self.version.clone());
        metadata.resources = self
            .resources
            .iter()
            .map(|factory| factory().type_name(TYPE_NAME))
            .collect();
        metadata.data_sources = self
            .data_sources
            .iter()
            .map(|factory| factory().type_name(TYPE_NAME))
            .collect();
        metadata
    }

    fn schema(&self) -> ProviderSchema {
        let mut schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        for factory in &self.resources {
            let resource = factory();
            schema = schema.with_resource(resource.type_name(TYPE_NAME), resource.schema());
        }
        for factory in &self.data_sources {
            let data_source = factory();
            schema =
                schema.with_data_source(data_source.type_name(TYPE_NAME), data_source.schema());
        }
        schema
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = match ProviderConfig::from_value(&config) {
            Ok(config) => config,
            Err(diagnostics) => return Ok(diagnostics.into_vec()),
        };
        Ok(config.check_ranges().into_vec())
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        // A failed configure must not leave the previous client published
        if self.client.write().await.take().is_some() {
            debug!("Released previously configured GNS3 client");
        }

        let config = match ProviderConfig::from_value(&config) {
            Ok(config) => config,
            Err(diagnostics) => {
                warn!(errors = diagnostics.len(), "Provider configuration is invalid");
                return Ok(diagnostics.into_vec());
            },
        };

        let mut diagnostics = Diagnostics::new();

        if config.host.is_unknown() {
            diagnostics.add_attribute_error(
                HOST_ATTRIBUTE,
                "Unknown GNS3 Host",
                "The provider cannot create the GNS3 client as there is an unknown configuration \
                 value for the GNS3 server host. Set the value statically in the provider \
                 configuration.",
            );
        }

        if config.port.is_unknown() {
            diagnostics.add_attribute_error(
                PORT_ATTRIBUTE,
                "Unknown GNS3 Port",
                "The provider cannot create the GNS3 client as there is an unknown configuration \
                 value for the GNS3 server port. Set the value statically in the provider \
                 configuration.",
            );
        }

        if diagnostics.has_error() {
            return Ok(diagnostics.into_vec());
        }

        if config.request_timeout.is_unknown() {
            diagnostics.add_attribute_warning(
                REQUEST_TIMEOUT_ATTRIBUTE,
                "Unknown GNS3 Request Timeout",
                format!(
                    "The request timeout is not known yet, so the GNS3 client uses the default \
                     of {} seconds.",
                    DEFAULT_TIMEOUT.as_secs()
                ),
            );
        }

        diagnostics.extend(config.check_ranges());
        if diagnostics.has_error() {
            return Ok(diagnostics.into_vec());
        }

        let (Some(host), Some(port)) = (
            config.host.known(),
            config.port.known().and_then(|p| u16::try_from(*p).ok()),
        ) else {
            diagnostics.add_error(
                "Incomplete GNS3 Configuration",
                "Both host and port must be set to create the GNS3 client.",
            );
            return Ok(diagnostics.into_vec());
        };

        match Client::from_host_port(host, port, config.client_options()) {
            Ok(client) => {
                info!(
                    host_url = %client.host_url(),
                    timeout = ?client.timeout(),
                    "Configured GNS3 client"
                );
                *self.client.write().await = Some(Arc::new(client));
            },
            Err(e) => {
                warn!(error = %e, "Unable to create GNS3 client");
                diagnostics.add_error(
                    "Unable to Create GNS3 Client",
                    format!(
                        "An unexpected error occurred when creating the GNS3 API client. \
                         GNS3 Client Error: {}",
                        e
                    ),
                );
            },
        }

        Ok(diagnostics.into_vec())
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        debug!("Releasing GNS3 client");
        self.client.write().await.take();
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        Ok(validation::validate(&resource.schema(), &config))
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.configured_client().await?;
        resource.create(&client, planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.configured_client().await?;
        resource.read(&client, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.configured_client().await?;
        resource.update(&client, prior_state, planned_state).await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        let client = self.configured_client().await?;
        resource.delete(&client, current_state).await
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        Ok(validation::validate(&data_source.schema(), &config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        let client = self.configured_client().await?;
        data_source.read(&client, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::fixtures::{echo_resource, version_data_source};
    use crate::schema::DiagnosticSeverity;
    use crate::validation::UNKNOWN_VALUE;
    use serde_json::json;

    #[test]
    fn test_metadata() {
        let provider = Gns3Provider::new("dev");
        let metadata = provider.metadata();
        assert_eq!(metadata.type_name, "gns3");
        assert_eq!(metadata.version, "dev");
        assert!(metadata.resources.is_empty());
        assert!(metadata.data_sources.is_empty());
        assert!(provider.resources().is_empty());
        assert!(provider.data_sources().is_empty());
    }

    #[test]
    fn test_schema_declares_host_and_port() {
        let schema = Gns3Provider::new("test").schema();
        let host = schema.provider.attribute("host").unwrap();
        let port = schema.provider.attribute("port").unwrap();
        assert!(host.flags.required);
        assert!(port.flags.required);
        assert_eq!(port.attr_type, crate::schema::AttributeType::Int32);
        assert!(schema.resources.is_empty());
        assert!(schema.data_sources.is_empty());
    }

    #[tokio::test]
    async fn test_configure_known_values_publishes_client() {
        let provider = Gns3Provider::new("test");
        assert!(provider.client().await.is_none());

        let diagnostics = provider
            .configure(json!({"host": "192.168.56.10", "port": 3080}))
            .await
            .unwrap();
        assert!(diagnostics.is_empty());

        let client = provider.client().await.unwrap();
        assert_eq!(client.host_url(), "http://192.168.56.10:3080");
        assert_eq!(client.timeout(), std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_configure_unknown_host() {
        let provider = Gns3Provider::new("test");
        let diagnostics = provider
            .configure(json!({"host": UNKNOWN_VALUE, "port": 3080}))
            .await
            .unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Error);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("host"));
        assert_eq!(diagnostics[0].summary, "Unknown GNS3 Host");
        assert!(provider.client().await.is_none());
    }

    #[tokio::test]
    async fn test_configure_unknown_host_and_port() {
        let provider = Gns3Provider::new("test");
        let diagnostics = provider
            .configure(json!({"host": UNKNOWN_VALUE, "port": UNKNOWN_VALUE}))
            .await
            .unwrap();

        assert_eq!(diagnostics.len(), 2);
        let attrs: Vec<_> = diagnostics.iter().map(|d| d.attribute.as_deref()).collect();
        assert_eq!(attrs, vec![Some("host"), Some("port")]);
        assert!(provider.client().await.is_none());
    }

    #[tokio::test]
    async fn test_configure_surfaces_construction_error() {
        let provider = Gns3Provider::new("test");
        let diagnostics = provider
            .configure(json!({"host": "not a host", "port": 3080}))
            .await
            .unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Unable to Create GNS3 Client");
        assert!(provider.client().await.is_none());
    }

    #[tokio::test]
    async fn test_configure_out_of_range_port() {
        let provider = Gns3Provider::new("test");
        let diagnostics = provider
            .configure(json!({"host": "localhost", "port": 0}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("port"));
    }

    #[tokio::test]
    async fn test_configure_with_request_timeout() {
        let provider = Gns3Provider::new("test");
        let diagnostics = provider
            .configure(json!({"host": "localhost", "port": 3080, "request_timeout": 2}))
            .await
            .unwrap();
        assert!(diagnostics.is_empty());
        let client = provider.client().await.unwrap();
        assert_eq!(client.timeout(), std::time::Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_validate_allows_unknown_values() {
        let provider = Gns3Provider::new("test");
        let diagnostics = provider
            .validate_provider_config(json!({"host": UNKNOWN_VALUE, "port": 3080}))
            .await
            .unwrap();
        assert!(diagnostics.is_empty());

        let diagnostics = provider
            .validate_provider_config(json!({"port": "3080"}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 2);
    }

    #[tokio::test]
    async fn test_stop_releases_client() {
        let provider = Gns3Provider::new("test");
        provider
            .configure(json!({"host": "localhost", "port": 3080}))
            .await
            .unwrap();
        assert!(provider.client().await.is_some());

        provider.stop().await.unwrap();
        assert!(provider.client().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_reconfigure_releases_previous_client() {
        let provider = Gns3Provider::new("test").with_resource(echo_resource);
        provider
            .configure(json!({"host": "a.lab", "port": 3080}))
            .await
            .unwrap();
        assert_eq!(provider.client().await.unwrap().host_url(), "http://a.lab:3080");

        let diagnostics = provider
            .configure(json!({"host": UNKNOWN_VALUE, "port": 3080}))
            .await
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(provider.client().await.is_none());

        let err = provider
            .create("gns3_echo", json!({"name": "r1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));

        // Construction failures release it too
        provider
            .configure(json!({"host": "a.lab", "port": 3080}))
            .await
            .unwrap();
        let diagnostics = provider
            .configure(json!({"host": "http://b.lab/api", "port": 3080}))
            .await
            .unwrap();
        assert_eq!(diagnostics[0].summary, "Unable to Create GNS3 Client");
        assert!(provider.client().await.is_none());
    }

    #[tokio::test]
    async fn test_configure_unknown_request_timeout_warns() {
        let provider = Gns3Provider::new("test");
        let diagnostics = provider
            .configure(json!({"host": "localhost", "port": 3080, "request_timeout": UNKNOWN_VALUE}))
            .await
            .unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("request_timeout"));

        let client = provider.client().await.unwrap();
        assert_eq!(client.timeout(), std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_empty_registries_reject_types() {
        let provider = Gns3Provider::new("test");
        let err = provider.read("gns3_node", json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        let err = provider
            .read_data_source("gns3_version", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownDataSource(_)));
    }

    #[tokio::test]
    async fn test_registered_resource_requires_configure() {
        let provider = Gns3Provider::new("test").with_resource(echo_resource);
        assert_eq!(provider.metadata().resources, vec!["gns3_echo"]);

        let err = provider
            .create("gns3_echo", json!({"name": "r1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));

        provider
            .configure(json!({"host": "localhost", "port": 3080}))
            .await
            .unwrap();
        let state = provider
            .create("gns3_echo", json!({"name": "r1"}))
            .await
            .unwrap();
        assert_eq!(state["id"], "echo-1");
    }

    #[tokio::test]
    async fn test_registered_data_source_uses_published_client() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/version")
            .with_status(200)
            .with_body(r#"{"version": "2.2.46"}"#)
            .create_async()
            .await;

        let addr = server.host_with_port();
        let (host, port) = addr.rsplit_once(':').unwrap();
        let port: i32 = port.parse().unwrap();

        let provider = Gns3Provider::new("test").with_data_source(version_data_source);
        let diagnostics = provider
            .configure(json!({"host": host, "port": port}))
            .await
            .unwrap();
        assert!(diagnostics.is_empty());

        let state = provider
            .read_data_source("gns3_version", json!({}))
            .await
            .unwrap();
        assert_eq!(state["version"], "2.2.46");

        let schema = provider.schema();
        assert!(schema.data_sources.contains_key("gns3_version"));
    }
}
