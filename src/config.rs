//! Provider configuration model.
//!
//! The host sends the provider block as a JSON object. Each attribute may be
//! set, unset, or not yet known (an interpolated expression the host has not
//! evaluated). [`ProviderConfig`] keeps that distinction so `configure` can
//! report every unresolved field.

use std::time::Duration;

use serde_json::Value;

use crate::client::{ClientOptions, DEFAULT_TIMEOUT};
use crate::schema::{Attribute, Diagnostics, Schema};
use crate::validation::{self, is_unknown};

/// Attribute name of the GNS3 server host.
pub const HOST_ATTRIBUTE: &str = "host";

/// Attribute name of the GNS3 server port.
pub const PORT_ATTRIBUTE: &str = "port";

/// Attribute name of the per-request timeout, in seconds.
pub const REQUEST_TIMEOUT_ATTRIBUTE: &str = "request_timeout";

/// A configuration value as seen at configure time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigValue<T> {
    /// A concrete value.
    Known(T),
    /// Present in configuration but not resolved by the host yet.
    Unknown,
    /// Not set.
    #[default]
    Null,
}

impl<T> ConfigValue<T> {
    /// Whether the value is unresolved.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether the value is unset.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The concrete value, if known.
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }
}

/// Decoded provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderConfig {
    /// GNS3 server host name, address or URL.
    pub host: ConfigValue<String>,
    /// GNS3 server port.
    pub port: ConfigValue<i32>,
    /// Per-request timeout in seconds.
    pub request_timeout: ConfigValue<i64>,
}

impl ProviderConfig {
    /// The provider configuration schema.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Configuration for the GNS3 provider.")
            .with_attribute(
                HOST_ATTRIBUTE,
                Attribute::required_string().with_description("The host of the GNS3 server."),
            )
            .with_attribute(
                PORT_ATTRIBUTE,
                Attribute::required_int32().with_description("The port for the GNS3 server."),
            )
            .with_attribute(
                REQUEST_TIMEOUT_ATTRIBUTE,
                Attribute::optional_int64()
                    .with_description(
                        "Timeout in seconds for each request to the GNS3 server. An unknown \
                         value falls back to the default of 10 seconds.",
                    )
                    .with_default(Value::from(DEFAULT_TIMEOUT.as_secs())),
            )
    }

    /// Decode a configuration document.
    ///
    /// The document is validated against [`ProviderConfig::schema`] first;
    /// any problem is returned as diagnostics.
    pub fn from_value(value: &Value) -> Result<Self, Diagnostics> {
        let diagnostics: Diagnostics = validation::validate(&Self::schema(), value).into();
        if diagnostics.has_error() {
            return Err(diagnostics);
        }

        Ok(Self {
            host: decode(value.get(HOST_ATTRIBUTE), |v| v.as_str().map(str::to_string)),
            port: decode(value.get(PORT_ATTRIBUTE), |v| {
                v.as_i64().and_then(|n| i32::try_from(n).ok())
            }),
            request_timeout: decode(value.get(REQUEST_TIMEOUT_ATTRIBUTE), Value::as_i64),
        })
    }

    /// Range checks on known values that the schema types cannot express.
    pub fn check_ranges(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        if let Some(port) = self.port.known() {
            if u16::try_from(*port).map_or(true, |p| p == 0) {
                diagnostics.add_attribute_error(
                    PORT_ATTRIBUTE,
                    "Invalid GNS3 Port",
                    format!("The GNS3 server port must be between 1 and 65535, got {}.", port),
                );
            }
        }

        if let Some(timeout) = self.request_timeout.known() {
            if *timeout <= 0 {
                diagnostics.add_attribute_error(
                    REQUEST_TIMEOUT_ATTRIBUTE,
                    "Invalid GNS3 Request Timeout",
                    format!(
                        "The request timeout must be a positive number of seconds, got {}.",
                        timeout
                    ),
                );
            }
        }

        diagnostics
    }

    /// Client options derived from the configuration.
    ///
    /// An unknown or unset timeout yields [`DEFAULT_TIMEOUT`].
    pub fn client_options(&self) -> ClientOptions {
        match self.request_timeout.known() {
            Some(secs) if *secs > 0 => {
                ClientOptions::new().with_timeout(Duration::from_secs(*secs as u64))
            },
            _ => ClientOptions::default(),
        }
    }
}

fn decode<T>(value: Option<&Value>, extract: impl Fn(&Value) -> Option<T>) -> ConfigValue<T> {
    match value {
        None | Some(Value::Null) => ConfigValue::Null,
        Some(v) if is_unknown(v) => ConfigValue::Unknown,
        Some(v) => extract(v).map_or(ConfigValue::Null, ConfigValue::Known),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::UNKNOWN_VALUE;
    use serde_json::json;

    #[test]
    fn test_schema_attributes() {
        let schema = ProviderConfig::schema();
        let host = schema.attribute(HOST_ATTRIBUTE).unwrap();
        let port = schema.attribute(PORT_ATTRIBUTE).unwrap();

        assert!(host.flags.required);
        assert!(port.flags.required);
        assert!(host.default.is_none());
        assert!(port.default.is_none());
        assert!(!schema.attribute(REQUEST_TIMEOUT_ATTRIBUTE).unwrap().flags.required);
    }

    #[test]
    fn test_decode_known() {
        let config =
            ProviderConfig::from_value(&json!({"host": "10.0.0.5", "port": 3080})).unwrap();
        assert_eq!(config.host, ConfigValue::Known("10.0.0.5".to_string()));
        assert_eq!(config.port, ConfigValue::Known(3080));
        assert!(config.request_timeout.is_null());
        assert_eq!(config.client_options(), ClientOptions::default());
    }

    #[test]
    fn test_decode_unknown() {
        let config =
            ProviderConfig::from_value(&json!({"host": UNKNOWN_VALUE, "port": 3080})).unwrap();
        assert!(config.host.is_unknown());
        assert_eq!(config.port.known(), Some(&3080));
    }

    #[test]
    fn test_decode_invalid_document() {
        let diagnostics = ProviderConfig::from_value(&json!({"host": 1})).unwrap_err();
        assert!(diagnostics.has_error());
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_check_ranges() {
        let config = ProviderConfig::from_value(&json!({
            "host": "h",
            "port": 70000,
            "request_timeout": 0
        }))
        .unwrap();
        let diagnostics = config.check_ranges();
        assert_eq!(diagnostics.len(), 2);

        let config = ProviderConfig::from_value(&json!({"host": "h", "port": 3080})).unwrap();
        assert!(config.check_ranges().is_empty());
    }

    #[test]
    fn test_client_options_from_timeout() {
        let config = ProviderConfig::from_value(&json!({
            "host": "h",
            "port": 3080,
            "request_timeout": 45
        }))
        .unwrap();
        assert_eq!(config.client_options().timeout, Duration::from_secs(45));
    }
}
