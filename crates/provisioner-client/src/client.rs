//! Provisioning backend API client
//!
//! Speaks the backend's machine API: /api/machines/ for the inventory
//! and /api/machines/{name}/ for individual machines.

use crate::error::ProvisionerError;
use crate::models::{AddMachineRequest, RemoteMachine, SetMacAddressesRequest};
use crate::provisioner_trait::ProvisionerClientTrait;
use reqwest::Client;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::debug;

/// Provisioning backend API client
pub struct ProvisionerClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ProvisionerClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL (e.g., "http://provisioner:8800")
    /// * `token` - API token for authentication
    pub fn new(base_url: String, token: String) -> Result<Self, ProvisionerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ProvisionerError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn machine_url(&self, name: &str) -> String {
        format!(
            "{}/api/machines/{}/",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    async fn get_json<T: for<'de> serde::Deserialize<'de>>(
        &self,
        url: &str,
    ) -> Result<T, ProvisionerError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(ProvisionerError::Http)?;

        let status = response.status();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProvisionerError::Authentication(format!(
                "{status} - {body}"
            )));
        }
        if status == 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProvisionerError::NotFound(format!("{url} - {body}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProvisionerError::Api(format!(
                "GET {url} failed: {status} - {body}"
            )));
        }

        response.json().await.map_err(ProvisionerError::Http)
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<(), ProvisionerError> {
        debug!("{} {}", method, url);
        let response = self
            .client
            .request(method.clone(), url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(ProvisionerError::Http)?;

        let status = response.status();
        if status == 401 || status == 403 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProvisionerError::Authentication(format!(
                "{status} - {body_text}"
            )));
        }
        if status == 404 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProvisionerError::NotFound(format!("{url} - {body_text}")));
        }
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProvisionerError::Api(format!(
                "{method} {url} failed: {status} - {body_text}"
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProvisionerClientTrait for ProvisionerClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_machines(&self) -> Result<HashMap<String, RemoteMachine>, ProvisionerError> {
        let url = format!("{}/api/machines/", self.base_url);
        let machines: Vec<RemoteMachine> = self.get_json(&url).await?;
        Ok(machines.into_iter().map(|m| (m.name.clone(), m)).collect())
    }

    async fn get_machines_by_name(
        &self,
        names: &[&str],
    ) -> Result<HashMap<String, RemoteMachine>, ProvisionerError> {
        let mut machines = HashMap::new();
        for name in names {
            match self.get_json::<RemoteMachine>(&self.machine_url(name)).await {
                Ok(machine) => {
                    machines.insert(machine.name.clone(), machine);
                }
                // Absent machines are not an error for a by-name query.
                Err(ProvisionerError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(machines)
    }

    async fn add_machine(
        &self,
        name: &str,
        profile: &str,
        mac_addresses: &BTreeSet<String>,
    ) -> Result<(), ProvisionerError> {
        let url = format!("{}/api/machines/", self.base_url);
        let request = AddMachineRequest {
            name: name.to_string(),
            profile: profile.to_string(),
            mac_addresses: mac_addresses.clone(),
        };
        let body = serde_json::to_value(&request)?;
        self.send_json(reqwest::Method::POST, &url, &body).await
    }

    async fn delete_machines_by_name(&self, names: &[&str]) -> Result<(), ProvisionerError> {
        for name in names {
            let url = self.machine_url(name);
            debug!("DELETE {}", url);
            let response = self
                .client
                .delete(&url)
                .header("Authorization", self.auth_header())
                .send()
                .await
                .map_err(ProvisionerError::Http)?;

            let status = response.status();
            // Deleting an unknown machine is a no-op.
            if !status.is_success() && status != 404 && status != 204 {
                let body = response.text().await.unwrap_or_default();
                return Err(ProvisionerError::Api(format!(
                    "DELETE {url} failed: {status} - {body}"
                )));
            }
        }
        Ok(())
    }

    async fn set_mac_addresses(
        &self,
        name: &str,
        mac_addresses: &BTreeSet<String>,
    ) -> Result<(), ProvisionerError> {
        let request = SetMacAddressesRequest {
            mac_addresses: mac_addresses.clone(),
        };
        let body = serde_json::to_value(&request)?;
        self.send_json(reqwest::Method::PUT, &self.machine_url(name), &body)
            .await
    }
}
