//! Testing utilities for provider implementations.
//!
//! Drives a [`ProviderService`] directly, without a gRPC server.
//!
//! # Example
//!
//! ```ignore
//! use gns3_provider::testing::ProviderTester;
//! use gns3_provider::Gns3Provider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_configure() {
//!     let tester = ProviderTester::new(Gns3Provider::new("test"));
//!     tester.configure(json!({"host": "localhost", "port": 3080})).await.unwrap();
//! }
//! ```

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use serde_json::Value;

/// A test harness wrapping a `ProviderService` implementation.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration, failing on any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider and return every diagnostic, errors included.
    pub async fn configure_diagnostics(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        self.provider.configure(config).await
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Run create → read → update → read → delete.
    ///
    /// Returns the state after the update.
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.create(resource_type, initial_config).await?;
        let created = self.read(resource_type, created).await?;

        let updated = self.update(resource_type, created, updated_config).await?;
        let updated = self.read(resource_type, updated).await?;

        self.delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that an error diagnostic's summary contains `substring`.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let found = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        found,
        "Expected an error containing '{}', but got: {:?}",
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that exactly the given attributes carry errors, in order.
///
/// # Panics
///
/// Panics if the attributes of the error diagnostics differ from `attributes`.
pub fn assert_errors_on_attributes(diagnostics: &[Diagnostic], attributes: &[&str]) {
    let actual: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.attribute.as_deref().unwrap_or(""))
        .collect();

    assert_eq!(
        actual, attributes,
        "Expected errors on {:?}, but got errors on {:?}",
        attributes, actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Gns3Provider;
    use crate::resource::fixtures::echo_resource;
    use crate::validation::UNKNOWN_VALUE;
    use serde_json::json;

    #[tokio::test]
    async fn test_tester_configure() {
        let tester = ProviderTester::new(Gns3Provider::new("test"));
        assert!(tester.resource_types().is_empty());
        assert!(tester.data_source_types().is_empty());

        tester
            .validate_provider_config(json!({"host": "localhost", "port": 3080}))
            .await
            .unwrap();
        tester
            .configure(json!({"host": "localhost", "port": 3080}))
            .await
            .unwrap();
        assert!(tester.provider().client().await.is_some());

        tester.stop().await.unwrap();
        assert!(tester.provider().client().await.is_none());
    }

    #[tokio::test]
    async fn test_tester_configure_reports_diagnostics() {
        let tester = ProviderTester::new(Gns3Provider::new("test"));
        let err = tester
            .configure(json!({"host": UNKNOWN_VALUE, "port": UNKNOWN_VALUE}))
            .await
            .unwrap_err();

        match err {
            TestError::Diagnostics(diags) => {
                assert_errors_on_attributes(&diags, &["host", "port"]);
                assert_error_contains(&diags, "Unknown GNS3 Port");
            },
            TestError::Provider(e) => panic!("unexpected provider error: {}", e),
        }
    }

    #[tokio::test]
    async fn test_tester_configure_diagnostics() {
        let tester = ProviderTester::new(Gns3Provider::new("test"));
        let diags = tester
            .configure_diagnostics(json!({"host": UNKNOWN_VALUE, "port": 3080}))
            .await
            .unwrap();
        assert_has_errors(&diags);
        assert_errors_on_attributes(&diags, &["host"]);

        let diags = tester
            .configure_diagnostics(json!({"host": "localhost", "port": 3080}))
            .await
            .unwrap();
        assert_no_errors(&diags);
    }

    #[tokio::test]
    async fn test_lifecycle_crud() {
        let tester = ProviderTester::new(Gns3Provider::new("test").with_resource(echo_resource));
        tester
            .configure(json!({"host": "localhost", "port": 3080}))
            .await
            .unwrap();
        tester
            .validate_resource_config("gns3_echo", json!({"name": "a"}))
            .await
            .unwrap();

        let state = tester
            .lifecycle_crud("gns3_echo", json!({"name": "a"}), json!({"name": "b"}))
            .await
            .unwrap();
        assert_eq!(state["name"], "b");
        assert_eq!(state["id"], "echo-1");
    }

    #[tokio::test]
    async fn test_data_source_unknown_type() {
        let tester = ProviderTester::new(Gns3Provider::new("test"));
        let err = tester
            .validate_data_source_config("gns3_projects", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TestError::Provider(ProviderError::UnknownDataSource(_))
        ));

        let err = tester
            .read_data_source("gns3_projects", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownDataSource(_)));
    }

    #[test]
    fn test_error_display() {
        let err = TestError::Diagnostics(vec![Diagnostic::error("Unknown GNS3 Host")
            .with_detail("set it statically")
            .with_attribute("host")]);
        let msg = err.to_string();
        assert!(msg.contains("1 diagnostic(s)"));
        assert!(msg.contains("Unknown GNS3 Host: set it statically (at host)"));
    }
}
