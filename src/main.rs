//! GNS3 provider plugin binary.
//!
//! Started by the orchestration host; prints the handshake line on stdout
//! and serves the plugin protocol until signalled.

use gns3_provider::{init_logging, serve, Gns3Provider};

/// Set at build time for releases; local builds report "dev".
const VERSION: &str = match option_env!("GNS3_PROVIDER_VERSION") {
    Some(version) => version,
    None => "dev",
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    tracing::info!(version = VERSION, "Starting GNS3 provider");

    serve(Gns3Provider::new(VERSION)).await
}
