//! GNS3 Provider
//!
//! An infrastructure provider plugin for the [GNS3](https://www.gns3.com)
//! network emulation platform, in the style of a Terraform provider.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **HTTP client** ([`client::Client`]): a base URL plus a `reqwest`
//!   transport with a bounded timeout, and a `do_request` call that buffers
//!   the response body and rejects any status other than 200
//! - **Provider shell** ([`Gns3Provider`]): metadata, a `host`/`port`
//!   configuration schema, and a Configure stage that builds the client and
//!   publishes it to resources and data sources
//! - **Extension points** ([`resource`]): factory registries for resource and
//!   data source implementations (empty in this release)
//! - **Plugin server** ([`serve`]): the gRPC protocol and startup handshake
//! - **Logging**: `tracing` to stderr, filtered by `RUST_LOG`
//!
//! # Handshake Protocol
//!
//! On startup the provider prints a single line to stdout:
//!
//! ```text
//! GNS3_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `GNS3_PROVIDER|<protocol_version>|<address>`. The host then
//! connects over gRPC and drives GetMetadata, GetSchema,
//! ValidateProviderConfig and Configure.
//!
//! # Configuration
//!
//! ```hcl
//! provider "gns3" {
//!   host = "192.168.56.10"
//!   port = 3080
//! }
//! ```
//!
//! Values the host has not resolved yet arrive as
//! [`validation::UNKNOWN_VALUE`]; Configure reports one error per unresolved
//! field and does not build a client.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

// Re-export main types at crate root
pub use client::{Client, ClientOptions};
pub use config::{ConfigValue, ProviderConfig};
pub use error::{ClientError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::Gns3Provider;
pub use schema::{Diagnostic, Diagnostics, ProviderSchema};
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{ProviderMetadata, HANDSHAKE_PREFIX, PROTOCOL_VERSION};
pub use validation::{is_valid, validate, validate_result, UNKNOWN_VALUE};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use reqwest;
pub use serde_json;
pub use tonic;
pub use tracing;
