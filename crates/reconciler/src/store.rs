//! Local machine inventory
//!
//! The reconciler treats the local store as an abstract seam so it can
//! run against whatever the owning application persists machines in.
//! [`MemoryMachineStore`] covers tests and single-process deployments.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// Machine CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Amd64,
    I386,
    Armhf,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::I386 => "i386",
            Architecture::Armhf => "armhf",
        }
    }
}

impl Default for Architecture {
    // Assumed for machines discovered remotely with no architecture
    // information of their own.
    fn default() -> Self {
        Architecture::Amd64
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amd64" => Ok(Architecture::Amd64),
            "i386" => Ok(Architecture::I386),
            "armhf" => Ok(Architecture::Armhf),
            other => Err(format!("unknown architecture: {other}")),
        }
    }
}

/// A machine in the local inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// Stable system id, doubling as the backend-side machine name
    pub system_id: String,
    /// Machine hostname
    pub hostname: String,
    /// CPU architecture
    pub architecture: Architecture,
    /// Power driver name, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_type: Option<String>,
    /// MAC addresses of the machine's interfaces
    #[serde(default)]
    pub macs: BTreeSet<String>,
}

/// The local inventory the reconciler reads and repairs.
#[async_trait::async_trait]
pub trait MachineStore: Send + Sync {
    /// All machines, keyed by system id.
    async fn list_machines(&self) -> Result<HashMap<String, Machine>, StoreError>;

    /// Add a new machine. Fails if the system id is taken.
    async fn create_machine(&self, machine: Machine) -> Result<(), StoreError>;

    /// Register one more MAC address on an existing machine. Adding a
    /// MAC the machine already has is a no-op.
    async fn add_mac_address(&self, system_id: &str, mac: &str) -> Result<(), StoreError>;
}

/// In-memory [`MachineStore`]
#[derive(Debug, Default)]
pub struct MemoryMachineStore {
    machines: Mutex<HashMap<String, Machine>>,
}

impl MemoryMachineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current machine record, if any (for test assertions)
    pub fn machine(&self, system_id: &str) -> Result<Option<Machine>, StoreError> {
        Ok(self.lock()?.get(system_id).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Machine>>, StoreError> {
        self.machines
            .lock()
            .map_err(|_| StoreError::Storage("machine store mutex poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl MachineStore for MemoryMachineStore {
    async fn list_machines(&self) -> Result<HashMap<String, Machine>, StoreError> {
        Ok(self.lock()?.clone())
    }

    async fn create_machine(&self, machine: Machine) -> Result<(), StoreError> {
        let mut machines = self.lock()?;
        if machines.contains_key(&machine.system_id) {
            return Err(StoreError::AlreadyExists(machine.system_id));
        }
        machines.insert(machine.system_id.clone(), machine);
        Ok(())
    }

    async fn add_mac_address(&self, system_id: &str, mac: &str) -> Result<(), StoreError> {
        let mut machines = self.lock()?;
        let machine = machines
            .get_mut(system_id)
            .ok_or_else(|| StoreError::NotFound(system_id.to_string()))?;
        machine.macs.insert(mac.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(system_id: &str) -> Machine {
        Machine {
            system_id: system_id.to_string(),
            hostname: system_id.to_string(),
            architecture: Architecture::Amd64,
            power_type: None,
            macs: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let store = MemoryMachineStore::new();
        store.create_machine(machine("node-1")).await.unwrap();
        let machines = store.list_machines().await.unwrap();
        assert_eq!(machines.len(), 1);
        assert!(machines.contains_key("node-1"));
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = MemoryMachineStore::new();
        store.create_machine(machine("node-1")).await.unwrap();
        let err = store.create_machine(machine("node-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn add_mac_is_idempotent() {
        let store = MemoryMachineStore::new();
        store.create_machine(machine("node-1")).await.unwrap();
        store
            .add_mac_address("node-1", "aa:bb:cc:dd:ee:ff")
            .await
            .unwrap();
        store
            .add_mac_address("node-1", "aa:bb:cc:dd:ee:ff")
            .await
            .unwrap();
        let stored = store.machine("node-1").unwrap().unwrap();
        assert_eq!(stored.macs.len(), 1);
    }

    #[test]
    fn architecture_round_trips_through_from_str() {
        for arch in [Architecture::Amd64, Architecture::I386, Architecture::Armhf] {
            assert_eq!(arch.as_str().parse::<Architecture>().unwrap(), arch);
        }
        assert!("sparc".parse::<Architecture>().is_err());
    }
}
