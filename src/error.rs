//! Error types for the GNS3 provider.

use thiserror::Error;

/// Errors raised by the GNS3 HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request failed before a complete response was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status other than 200 OK.
    #[error("status: {status}, body: {body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Raw response body, lossily decoded as UTF-8.
        body: String,
    },

    /// The base URL assembled from the configuration is not a valid URL.
    #[error("invalid GNS3 server URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ClientError {
    /// Returns the HTTP status code for [`ClientError::Status`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::InvalidUrl { .. } => None,
        }
    }
}

/// Errors that can occur while serving the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An operation needed the GNS3 client before `configure` succeeded.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The requested resource type is not registered.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The requested data source type is not registered.
    #[error("Unknown data source type: {0}")]
    UnknownDataSource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The GNS3 API call failed.
    #[error("GNS3 client error: {0}")]
    Client(#[from] ClientError),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::UnknownDataSource(msg) => tonic::Status::not_found(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Client(err) => match err {
                ClientError::Status { status: 404, .. } => {
                    tonic::Status::not_found(err.to_string())
                },
                ClientError::InvalidUrl { .. } => {
                    tonic::Status::invalid_argument(err.to_string())
                },
                _ => tonic::Status::unavailable(err.to_string()),
            },
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            status: 404,
            body: "{\"message\": \"project not found\"}".to_string(),
        };
        let msg = err.to_string();
        assert_eq!(msg, "status: 404, body: {\"message\": \"project not found\"}");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_invalid_url_display() {
        let err = ClientError::InvalidUrl {
            url: "http://bad host:3080".to_string(),
            reason: "invalid domain character".to_string(),
        };
        assert!(err.to_string().contains("http://bad host:3080"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::UnknownResource("gns3_node".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: gns3_node");

        let err = ProviderError::NotConfigured("call configure first".to_string());
        assert_eq!(
            format!("{}", err),
            "Provider not configured: call configure first"
        );
    }

    #[test]
    fn test_error_to_status() {
        let status: tonic::Status = ProviderError::UnknownResource("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = ProviderError::UnknownDataSource("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = ProviderError::NotConfigured("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
    }

    #[test]
    fn test_client_error_to_status() {
        let err = ProviderError::Client(ClientError::Status {
            status: 404,
            body: "missing".to_string(),
        });
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::NotFound);
        assert!(status.message().contains("missing"));

        let err = ProviderError::Client(ClientError::Status {
            status: 500,
            body: "boom".to_string(),
        });
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }
}
