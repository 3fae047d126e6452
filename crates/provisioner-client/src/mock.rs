//! Mock ProvisionerClient for unit testing
//!
//! In-memory implementation of [`ProvisionerClientTrait`] so the
//! reconciler can be tested without a running backend. Every mutating
//! call is counted, which lets tests assert that a second reconcile run
//! performs zero mutations.

use crate::error::ProvisionerError;
use crate::models::RemoteMachine;
use crate::provisioner_trait::ProvisionerClientTrait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// Counts of mutating operations performed against the mock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockCounters {
    pub machines_added: usize,
    pub machines_deleted: usize,
    pub mac_sets_pushed: usize,
}

/// Mock provisioning backend for testing
#[derive(Clone)]
pub struct MockProvisionerClient {
    base_url: String,
    machines: Arc<Mutex<HashMap<String, RemoteMachine>>>,
    counters: Arc<Mutex<MockCounters>>,
    fail_inventory: Arc<Mutex<bool>>,
    fail_machines: Arc<Mutex<BTreeSet<String>>>,
}

impl MockProvisionerClient {
    /// Create a new, empty mock backend
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            machines: Arc::new(Mutex::new(HashMap::new())),
            counters: Arc::new(Mutex::new(MockCounters::default())),
            fail_inventory: Arc::new(Mutex::new(false)),
            fail_machines: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    /// Seed a machine into the mock store (for test setup)
    pub fn add_machine_record(&self, machine: RemoteMachine) {
        self.machines
            .lock()
            .unwrap()
            .insert(machine.name.clone(), machine);
    }

    /// Snapshot of the mutation counters
    pub fn counters(&self) -> MockCounters {
        self.counters.lock().unwrap().clone()
    }

    /// Reset the mutation counters (for between-phases assertions)
    pub fn reset_counters(&self) {
        *self.counters.lock().unwrap() = MockCounters::default();
    }

    /// Make the next inventory fetches fail
    pub fn set_fail_inventory(&self, fail: bool) {
        *self.fail_inventory.lock().unwrap() = fail;
    }

    /// Make every mutating call against the named machine fail
    pub fn fail_machine(&self, name: impl Into<String>) {
        self.fail_machines.lock().unwrap().insert(name.into());
    }

    /// Current machine record, if any (for test assertions)
    pub fn machine(&self, name: &str) -> Option<RemoteMachine> {
        self.machines.lock().unwrap().get(name).cloned()
    }

    fn check_machine_failure(&self, name: &str) -> Result<(), ProvisionerError> {
        if self.fail_machines.lock().unwrap().contains(name) {
            return Err(ProvisionerError::Api(format!(
                "injected failure for machine {name}"
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProvisionerClientTrait for MockProvisionerClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_machines(&self) -> Result<HashMap<String, RemoteMachine>, ProvisionerError> {
        if *self.fail_inventory.lock().unwrap() {
            return Err(ProvisionerError::Api("injected inventory failure".into()));
        }
        Ok(self.machines.lock().unwrap().clone())
    }

    async fn get_machines_by_name(
        &self,
        names: &[&str],
    ) -> Result<HashMap<String, RemoteMachine>, ProvisionerError> {
        let machines = self.machines.lock().unwrap();
        Ok(names
            .iter()
            .filter_map(|name| machines.get(*name).map(|m| (m.name.clone(), m.clone())))
            .collect())
    }

    async fn add_machine(
        &self,
        name: &str,
        profile: &str,
        mac_addresses: &BTreeSet<String>,
    ) -> Result<(), ProvisionerError> {
        self.check_machine_failure(name)?;
        let mut machines = self.machines.lock().unwrap();
        if machines.contains_key(name) {
            return Err(ProvisionerError::InvalidRequest(format!(
                "machine already exists: {name}"
            )));
        }
        machines.insert(
            name.to_string(),
            RemoteMachine {
                name: name.to_string(),
                profile: profile.to_string(),
                mac_addresses: mac_addresses.clone(),
                power_type: None,
            },
        );
        self.counters.lock().unwrap().machines_added += 1;
        Ok(())
    }

    async fn delete_machines_by_name(&self, names: &[&str]) -> Result<(), ProvisionerError> {
        let mut machines = self.machines.lock().unwrap();
        for name in names {
            if machines.remove(*name).is_some() {
                self.counters.lock().unwrap().machines_deleted += 1;
            }
        }
        Ok(())
    }

    async fn set_mac_addresses(
        &self,
        name: &str,
        mac_addresses: &BTreeSet<String>,
    ) -> Result<(), ProvisionerError> {
        self.check_machine_failure(name)?;
        let mut machines = self.machines.lock().unwrap();
        let machine = machines
            .get_mut(name)
            .ok_or_else(|| ProvisionerError::NotFound(format!("machine: {name}")))?;
        machine.mac_addresses = mac_addresses.clone();
        self.counters.lock().unwrap().mac_sets_pushed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(name: &str, macs: &[&str]) -> RemoteMachine {
        RemoteMachine {
            name: name.to_string(),
            profile: "precise-amd64".to_string(),
            mac_addresses: macs.iter().map(|m| (*m).to_string()).collect(),
            power_type: None,
        }
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let mock = MockProvisionerClient::new("http://mock");
        mock.add_machine(
            "node-1",
            "precise-amd64",
            &["aa:bb:cc:dd:ee:ff".to_string()].into_iter().collect(),
        )
        .await
        .unwrap();

        let machines = mock.get_machines().await.unwrap();
        assert_eq!(machines.len(), 1);
        assert!(machines["node-1"]
            .mac_addresses
            .contains("aa:bb:cc:dd:ee:ff"));
        assert_eq!(mock.counters().machines_added, 1);
    }

    #[tokio::test]
    async fn by_name_skips_unknown_machines() {
        let mock = MockProvisionerClient::new("http://mock");
        mock.add_machine_record(machine("known", &[]));
        let machines = mock
            .get_machines_by_name(&["known", "unknown"])
            .await
            .unwrap();
        assert_eq!(machines.len(), 1);
        assert!(machines.contains_key("known"));
    }

    #[tokio::test]
    async fn set_mac_addresses_is_declarative() {
        let mock = MockProvisionerClient::new("http://mock");
        mock.add_machine_record(machine("node-1", &["aa:aa:aa:aa:aa:aa"]));
        mock.set_mac_addresses(
            "node-1",
            &["bb:bb:bb:bb:bb:bb".to_string()].into_iter().collect(),
        )
        .await
        .unwrap();

        let result = mock.machine("node-1").unwrap();
        assert_eq!(result.mac_addresses.len(), 1);
        assert!(result.mac_addresses.contains("bb:bb:bb:bb:bb:bb"));
        assert_eq!(mock.counters().mac_sets_pushed, 1);
    }

    #[tokio::test]
    async fn injected_inventory_failure_surfaces() {
        let mock = MockProvisionerClient::new("http://mock");
        mock.set_fail_inventory(true);
        assert!(mock.get_machines().await.is_err());
        mock.set_fail_inventory(false);
        assert!(mock.get_machines().await.is_ok());
    }
}
