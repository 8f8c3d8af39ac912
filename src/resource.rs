//! Extension points for resources and data sources.
//!
//! A provider publishes its resource and data source types as lists of
//! factories. Each factory produces a fresh implementation of the lifecycle
//! trait; the provider hands it the configured GNS3 [`Client`] on every call.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::Client;
use crate::error::ProviderError;
use crate::schema::Schema;

/// A read-only entity type exposed by the provider.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Full type name, usually `<provider_type_name>_<suffix>`.
    fn type_name(&self, provider_type_name: &str) -> String;

    /// Schema of the data source configuration and result.
    fn schema(&self) -> Schema;

    /// Query the GNS3 server and return the resulting state.
    async fn read(&self, client: &Client, config: Value) -> Result<Value, ProviderError>;
}

/// A managed entity type with a create/read/update/delete lifecycle.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, usually `<provider_type_name>_<suffix>`.
    fn type_name(&self, provider_type_name: &str) -> String;

    /// Schema of the resource state.
    fn schema(&self) -> Schema;

    /// Create the entity from the planned state and return the new state.
    async fn create(&self, client: &Client, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh the state of an existing entity.
    async fn read(&self, client: &Client, current_state: Value) -> Result<Value, ProviderError>;

    /// Apply planned changes to an existing entity.
    async fn update(
        &self,
        client: &Client,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Remove the entity.
    async fn delete(&self, client: &Client, current_state: Value) -> Result<(), ProviderError>;
}

/// Produces a data source implementation.
pub type DataSourceFactory = fn() -> Box<dyn DataSource>;

/// Produces a resource implementation.
pub type ResourceFactory = fn() -> Box<dyn Resource>;

/// Instantiate the data source registered under `type_name`.
pub fn find_data_source(
    factories: &[DataSourceFactory],
    provider_type_name: &str,
    type_name: &str,
) -> Option<Box<dyn DataSource>> {
    factories
        .iter()
        .map(|factory| factory())
        .find(|ds| ds.type_name(provider_type_name) == type_name)
}

/// Instantiate the resource registered under `type_name`.
pub fn find_resource(
    factories: &[ResourceFactory],
    provider_type_name: &str,
    type_name: &str,
) -> Option<Box<dyn Resource>> {
    factories
        .iter()
        .map(|factory| factory())
        .find(|r| r.type_name(provider_type_name) == type_name)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! In-memory implementations used to exercise the registries.

    use super::*;
    use crate::schema::Attribute;

    pub struct VersionDataSource;

    #[async_trait]
    impl DataSource for VersionDataSource {
        fn type_name(&self, provider_type_name: &str) -> String {
            format!("{}_version", provider_type_name)
        }

        fn schema(&self) -> Schema {
            Schema::v0().with_attribute("version", Attribute::computed_string())
        }

        async fn read(&self, client: &Client, _config: Value) -> Result<Value, ProviderError> {
            let request = client
                .request(reqwest::Method::GET, "/v2/version")
                .build()
                .map_err(crate::error::ClientError::from)?;
            let body = client.do_request(request).await?;
            Ok(serde_json::from_slice(&body)?)
        }
    }

    pub fn version_data_source() -> Box<dyn DataSource> {
        Box::new(VersionDataSource)
    }

    pub struct EchoResource;

    #[async_trait]
    impl Resource for EchoResource {
        fn type_name(&self, provider_type_name: &str) -> String {
            format!("{}_echo", provider_type_name)
        }

        fn schema(&self) -> Schema {
            Schema::v0()
                .with_attribute("name", Attribute::required_string())
                .with_attribute("id", Attribute::computed_string())
        }

        async fn create(
            &self,
            _client: &Client,
            mut planned_state: Value,
        ) -> Result<Value, ProviderError> {
            planned_state["id"] = Value::from("echo-1");
            Ok(planned_state)
        }

        async fn read(
            &self,
            _client: &Client,
            current_state: Value,
        ) -> Result<Value, ProviderError> {
            Ok(current_state)
        }

        async fn update(
            &self,
            _client: &Client,
            prior_state: Value,
            mut planned_state: Value,
        ) -> Result<Value, ProviderError> {
            planned_state["id"] = prior_state["id"].clone();
            Ok(planned_state)
        }

        async fn delete(
            &self,
            _client: &Client,
            _current_state: Value,
        ) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    pub fn echo_resource() -> Box<dyn Resource> {
        Box::new(EchoResource)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_find_resource() {
        let factories: Vec<ResourceFactory> = vec![echo_resource];
        assert!(find_resource(&factories, "gns3", "gns3_echo").is_some());
        assert!(find_resource(&factories, "gns3", "gns3_node").is_none());
        assert!(find_resource(&[], "gns3", "gns3_echo").is_none());
    }

    #[test]
    fn test_find_data_source() {
        let factories: Vec<DataSourceFactory> = vec![version_data_source];
        let ds = find_data_source(&factories, "gns3", "gns3_version").unwrap();
        assert!(ds.schema().attribute("version").is_some());
        assert!(find_data_source(&factories, "gns3", "gns3_projects").is_none());
    }
}
