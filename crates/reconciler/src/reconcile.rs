//! The reconciliation pass
//!
//! Compares the local machine inventory against the provisioning
//! backend's and repairs both sides. Machines the backend discovered
//! get created locally; machines only the local store knows get
//! registered with the backend; for machines known to both, MAC
//! addresses are merged. The backend is authoritative for discovering
//! machines and MACs, the local store is authoritative for the final
//! MAC set it pushes back.

use std::collections::BTreeSet;
use std::sync::Arc;

use provisioner_client::{ProvisionerClientTrait, RemoteMachine};
use tracing::{info, warn};

use crate::error::ReconcileError;
use crate::store::{Architecture, Machine, MachineStore};

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Machines created in the local store
    pub created_local: usize,
    /// Machines registered with the backend
    pub created_remote: usize,
    /// MAC addresses added to local machines
    pub macs_added_local: usize,
    /// Declarative MAC set pushes to the backend
    pub mac_sets_pushed: usize,
    /// Per-item failures; the pass continues past these
    pub failures: Vec<String>,
}

impl ReconcileReport {
    /// True when the pass found nothing to change and nothing failed.
    /// A converged pass is the expected steady state: running the
    /// reconciler twice in a row must make the second report converged.
    pub fn is_converged(&self) -> bool {
        self.created_local == 0
            && self.created_remote == 0
            && self.macs_added_local == 0
            && self.mac_sets_pushed == 0
            && self.failures.is_empty()
    }
}

/// Two-way inventory reconciler.
pub struct Reconciler {
    store: Arc<dyn MachineStore>,
    provisioner: Arc<dyn ProvisionerClientTrait>,
    release: String,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("release", &self.release)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create a reconciler. `release` is the OS release used when
    /// composing install profiles for machines pushed to the backend.
    pub fn new(
        store: Arc<dyn MachineStore>,
        provisioner: Arc<dyn ProvisionerClientTrait>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provisioner,
            release: release.into(),
        }
    }

    /// The install profile a machine is registered under.
    fn profile_for(&self, architecture: Architecture) -> String {
        format!("{}-{}", self.release, architecture)
    }

    /// Run one reconciliation pass.
    ///
    /// Both inventory fetches must succeed before anything is mutated;
    /// a fetch failure aborts with no side effects. After that, each
    /// machine is handled independently and failures are collected in
    /// the report rather than aborting the batch.
    pub async fn reconcile(&self) -> Result<ReconcileReport, ReconcileError> {
        let remote = self
            .provisioner
            .get_machines()
            .await
            .map_err(ReconcileError::RemoteFetch)?;
        let local = self
            .store
            .list_machines()
            .await
            .map_err(ReconcileError::LocalFetch)?;

        let mut report = ReconcileReport::default();

        // Machines the backend knows that the local store does not.
        for (name, remote_machine) in &remote {
            if local.contains_key(name) {
                continue;
            }
            info!(machine = %name, "creating local machine from remote record");
            match self.create_local(remote_machine).await {
                Ok(()) => report.created_local += 1,
                Err(err) => {
                    warn!(machine = %name, error = %err, "local create failed");
                    report.failures.push(format!("create local {name}: {err}"));
                }
            }
        }

        // Machines only the local store knows.
        for (name, local_machine) in &local {
            if remote.contains_key(name) {
                continue;
            }
            info!(machine = %name, "registering local machine with the backend");
            let profile = self.profile_for(local_machine.architecture);
            match self
                .provisioner
                .add_machine(name, &profile, &local_machine.macs)
                .await
            {
                Ok(()) => report.created_remote += 1,
                Err(err) => {
                    warn!(machine = %name, error = %err, "remote create failed");
                    report.failures.push(format!("create remote {name}: {err}"));
                }
            }
        }

        // Machines known to both sides: merge MAC addresses.
        for (name, local_machine) in &local {
            let Some(remote_machine) = remote.get(name) else {
                continue;
            };
            if let Err(err) = self
                .sync_macs(name, local_machine, remote_machine, &mut report)
                .await
            {
                warn!(machine = %name, error = %err, "MAC sync failed");
                report.failures.push(format!("sync macs {name}: {err}"));
            }
        }

        info!(
            created_local = report.created_local,
            created_remote = report.created_remote,
            macs_added_local = report.macs_added_local,
            mac_sets_pushed = report.mac_sets_pushed,
            failures = report.failures.len(),
            "reconcile pass finished"
        );
        Ok(report)
    }

    async fn create_local(
        &self,
        remote_machine: &RemoteMachine,
    ) -> Result<(), crate::error::StoreError> {
        // No architecture information comes back from the backend, so
        // newly discovered machines get the default.
        self.store
            .create_machine(Machine {
                system_id: remote_machine.name.clone(),
                hostname: remote_machine.name.clone(),
                architecture: Architecture::default(),
                power_type: remote_machine.power_type.clone(),
                macs: remote_machine.mac_addresses.clone(),
            })
            .await
    }

    async fn sync_macs(
        &self,
        name: &str,
        local_machine: &Machine,
        remote_machine: &RemoteMachine,
        report: &mut ReconcileReport,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let local_macs = &local_machine.macs;
        let remote_macs = &remote_machine.mac_addresses;

        for mac in remote_macs.difference(local_macs) {
            self.store.add_mac_address(name, mac).await?;
            report.macs_added_local += 1;
        }

        if local_macs.difference(remote_macs).next().is_some() {
            // The final set is the union of both sides: the remote-only
            // MACs were just added locally, so push the merged set.
            let merged: BTreeSet<String> = local_macs.union(remote_macs).cloned().collect();
            self.provisioner.set_mac_addresses(name, &merged).await?;
            report.mac_sets_pushed += 1;
        }
        Ok(())
    }
}
