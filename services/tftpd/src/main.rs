//! TFTP Service
//!
//! Serves the TFTP side of network booting: kernels and initrds from
//! disk, PXE configuration files generated on the fly by asking the
//! config-generation endpoint.

mod backend;
mod error;

use std::env;
use std::net::SocketAddr;

use async_tftp::server::TftpServerBuilder;
use tracing::info;

use crate::backend::TftpBackend;
use crate::error::TftpdError;

#[tokio::main]
async fn main() -> Result<(), TftpdError> {
    tracing_subscriber::fmt::init();

    info!("Starting TFTP service");

    // Load configuration from environment variables
    let listen = env::var("TFTPD_LISTEN").unwrap_or_else(|_| "0.0.0.0:69".to_string());
    let listen: SocketAddr = listen
        .parse()
        .map_err(|_| TftpdError::InvalidConfig(format!("bad TFTPD_LISTEN address: {listen}")))?;
    let root = env::var("TFTPD_ROOT").unwrap_or_else(|_| "/var/lib/tftproot".to_string());
    let generator_url = env::var("PXE_GENERATOR_URL").map_err(|_| {
        TftpdError::InvalidConfig("PXE_GENERATOR_URL environment variable is required".to_string())
    })?;

    info!("Configuration:");
    info!("  Listen: {}", listen);
    info!("  Root: {}", root);
    info!("  Generator URL: {}", generator_url);

    let handler = TftpBackend::new(root, &generator_url)?;
    let server = TftpServerBuilder::with_handler(handler)
        .bind(listen)
        .build()
        .await?;

    info!("Serving TFTP on {}", listen);
    server.serve().await?;

    Ok(())
}
