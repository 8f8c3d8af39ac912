//! Protocol-level types shared by the server and provider implementations.

use serde::{Deserialize, Serialize};

/// Provider metadata returned by GetMetadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// The provider type name, used as prefix for resource type names.
    pub type_name: String,
    /// The provider version.
    pub version: String,
    /// Registered resource type names.
    pub resources: Vec<String>,
    /// Registered data source type names.
    pub data_sources: Vec<String>,
}

impl ProviderMetadata {
    /// Create metadata with empty registries.
    pub fn new(type_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            version: version.into(),
            resources: Vec::new(),
            data_sources: Vec::new(),
        }
    }
}

/// The protocol version for the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// The handshake prefix output by the provider on startup.
pub const HANDSHAKE_PREFIX: &str = "GNS3_PROVIDER";

/// Format the handshake line written to stdout once the server is bound.
pub fn handshake_line(addr: &std::net::SocketAddr) -> String {
    format!("{}|{}|{}", HANDSHAKE_PREFIX, PROTOCOL_VERSION, addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_new() {
        let metadata = ProviderMetadata::new("gns3", "dev");
        assert_eq!(metadata.type_name, "gns3");
        assert_eq!(metadata.version, "dev");
        assert!(metadata.resources.is_empty());
        assert!(metadata.data_sources.is_empty());
    }

    #[test]
    fn test_handshake_line() {
        let addr: std::net::SocketAddr = "127.0.0.1:50051".parse().unwrap();
        assert_eq!(handshake_line(&addr), "GNS3_PROVIDER|1|127.0.0.1:50051");
    }
}
