//! ProvisionerClient trait for mocking
//!
//! Abstracts the provisioning backend so the reconciler can run against
//! an in-memory implementation in unit tests. All async methods must be
//! `Send` to work with Tokio's work-stealing runtime.

use crate::error::ProvisionerError;
use crate::models::RemoteMachine;
use std::collections::{BTreeSet, HashMap};

/// Trait for provisioning backend operations
#[async_trait::async_trait]
pub trait ProvisionerClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Fetch the backend's complete machine inventory, keyed by name.
    async fn get_machines(&self) -> Result<HashMap<String, RemoteMachine>, ProvisionerError>;

    /// Fetch the named machines. Names the backend does not know are
    /// simply absent from the result, not an error.
    async fn get_machines_by_name(
        &self,
        names: &[&str],
    ) -> Result<HashMap<String, RemoteMachine>, ProvisionerError>;

    /// Register a new machine with the backend.
    async fn add_machine(
        &self,
        name: &str,
        profile: &str,
        mac_addresses: &BTreeSet<String>,
    ) -> Result<(), ProvisionerError>;

    /// Remove the named machines. Unknown names are ignored.
    async fn delete_machines_by_name(&self, names: &[&str]) -> Result<(), ProvisionerError>;

    /// Replace a machine's registered MAC addresses with exactly this
    /// set. Declarative, not incremental.
    async fn set_mac_addresses(
        &self,
        name: &str,
        mac_addresses: &BTreeSet<String>,
    ) -> Result<(), ProvisionerError>;
}
