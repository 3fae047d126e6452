//! Inventory reconciliation
//!
//! The provisioning backend discovers machines as they netboot; the
//! local store is what the rest of the system operates on. Either side
//! can drift. This crate repairs the drift in both directions without
//! ever deleting a machine: discovery mistakes are cheaper to clean up
//! by hand than a machine silently dropped from inventory.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use provisioner_client::ProvisionerClient;
//! use reconciler::{MemoryMachineStore, Reconciler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryMachineStore::new());
//! let client = Arc::new(ProvisionerClient::new(
//!     "http://provisioner:8800".to_string(),
//!     "your-api-token".to_string(),
//! )?);
//!
//! let reconciler = Reconciler::new(store, client, "precise");
//! let report = reconciler.reconcile().await?;
//! println!("created locally: {}", report.created_local);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod reconcile;
pub mod store;

pub use error::{ReconcileError, StoreError};
pub use reconcile::{ReconcileReport, Reconciler};
pub use store::{Architecture, Machine, MachineStore, MemoryMachineStore};
