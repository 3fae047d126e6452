//! Provisioning backend data models

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A machine as the provisioning backend knows it.
///
/// The backend identifies machines by name; the MAC addresses are what
/// it uses to recognize a machine when it netboots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMachine {
    /// Backend-side machine name
    pub name: String,
    /// Install profile the machine boots, e.g. `precise-amd64`
    pub profile: String,
    /// MAC addresses registered for the machine
    #[serde(default)]
    pub mac_addresses: BTreeSet<String>,
    /// Power driver name, if the backend knows how to power-cycle it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_type: Option<String>,
}

/// Body for a machine create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMachineRequest {
    pub name: String,
    pub profile: String,
    #[serde(default)]
    pub mac_addresses: BTreeSet<String>,
}

/// Body for a declarative MAC address set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMacAddressesRequest {
    pub mac_addresses: BTreeSet<String>,
}
