//! JSON-file-backed machine store
//!
//! Deployment-grade local inventory for installations without a
//! database: one JSON file holding the machine list, rewritten on every
//! mutation. Good enough for the one-shot reconciler; anything bigger
//! should implement [`MachineStore`] over its own storage.

use std::collections::HashMap;
use std::path::PathBuf;

use reconciler::{Machine, MachineStore, StoreError};
use tokio::sync::Mutex;
use tracing::debug;

/// [`MachineStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct JsonFileMachineStore {
    path: PathBuf,
    machines: Mutex<HashMap<String, Machine>>,
}

impl JsonFileMachineStore {
    /// Open the store at `path`. A missing file is an empty inventory.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let machines = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let list: Vec<Machine> = serde_json::from_slice(&bytes)
                    .map_err(|err| StoreError::Storage(format!("parsing {}: {err}", path.display())))?;
                list.into_iter().map(|m| (m.system_id.clone(), m)).collect()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(StoreError::Storage(format!(
                    "reading {}: {err}",
                    path.display()
                )));
            }
        };
        debug!(path = %path.display(), machines = machines.len(), "loaded machine store");
        Ok(Self {
            path,
            machines: Mutex::new(machines),
        })
    }

    async fn persist(&self, machines: &HashMap<String, Machine>) -> Result<(), StoreError> {
        let mut list: Vec<&Machine> = machines.values().collect();
        list.sort_by(|a, b| a.system_id.cmp(&b.system_id));
        let json = serde_json::to_vec_pretty(&list)
            .map_err(|err| StoreError::Storage(err.to_string()))?;
        tokio::fs::write(&self.path, json).await.map_err(|err| {
            StoreError::Storage(format!("writing {}: {err}", self.path.display()))
        })
    }
}

#[async_trait::async_trait]
impl MachineStore for JsonFileMachineStore {
    async fn list_machines(&self) -> Result<HashMap<String, Machine>, StoreError> {
        Ok(self.machines.lock().await.clone())
    }

    async fn create_machine(&self, machine: Machine) -> Result<(), StoreError> {
        let mut machines = self.machines.lock().await;
        if machines.contains_key(&machine.system_id) {
            return Err(StoreError::AlreadyExists(machine.system_id));
        }
        machines.insert(machine.system_id.clone(), machine);
        self.persist(&machines).await
    }

    async fn add_mac_address(&self, system_id: &str, mac: &str) -> Result<(), StoreError> {
        let mut machines = self.machines.lock().await;
        let machine = machines
            .get_mut(system_id)
            .ok_or_else(|| StoreError::NotFound(system_id.to_string()))?;
        machine.macs.insert(mac.to_string());
        self.persist(&machines).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconciler::Architecture;
    use std::collections::BTreeSet;

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
    async fn missing_file_is_an_empty_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileMachineStore::load(dir.path().join("machines.json"))
            .await
            .unwrap();
        assert!(store.list_machines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutations_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("machines.json");

        let store = JsonFileMachineStore::load(&path).await.unwrap();
        store.create_machine(machine("node-1")).await.unwrap();
        store
            .add_mac_address("node-1", "aa:bb:cc:dd:ee:ff")
            .await
            .unwrap();

        let reloaded = JsonFileMachineStore::load(&path).await.unwrap();
        let machines = reloaded.list_machines().await.unwrap();
        assert_eq!(machines.len(), 1);
        assert!(machines["node-1"].macs.contains("aa:bb:cc:dd:ee:ff"));
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("machines.json");
        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileMachineStore::load(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }
}
