//! Provisioning Backend API Client
//!
//! A Rust client for the machine inventory API of the provisioning
//! backend. The backend owns netboot profiles and discovers machines by
//! MAC address; this client is how the reconciler and boot services read
//! and mutate that inventory.
//!
//! # Example
//!
//! ```no_run
//! use provisioner_client::{ProvisionerClient, ProvisionerClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ProvisionerClient::new(
//!     "http://provisioner:8800".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! // Full inventory, keyed by machine name
//! let machines = client.get_machines().await?;
//!
//! // Register a machine with its boot MAC
//! let macs = ["aa:bb:cc:dd:ee:ff".to_string()].into_iter().collect();
//! client.add_machine("node-1", "precise-amd64", &macs).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod provisioner_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::ProvisionerClient;
pub use error::ProvisionerError;
pub use models::*;
pub use provisioner_trait::ProvisionerClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockCounters, MockProvisionerClient};
