//! ISC dhcpd configuration rendering
//!
//! The template carries two vendor-class match blocks (generic PXE
//! clients and the U-Boot class used by the embedded-ARM boards) and one
//! subnet declaration whose dynamic-BOOTP pool is split in two, gated by
//! vendor class. Every parameter is required; rendering fails loudly on
//! the first missing one so an ambiguous config is never written.

use crate::error::BootConfigError;
use crate::template::substitute;
use std::collections::BTreeMap;

/// ISC dhcpd configuration template.
pub const DHCP_CONFIG_TEMPLATE: &str = r#"class "pxe" {
  match if substring (option vendor-class-identifier, 0, 9) = "PXEClient";
}
class "uboot-highbank" {
  match if substring (option vendor-class-identifier, 0, 21) = "U-boot.armv7.highbank";
}

subnet {{subnet}} netmask {{subnet_mask}} {
       next-server {{next_server}};
       option subnet-mask {{subnet_mask}};
       option broadcast-address {{broadcast_address}};
       option domain-name-servers {{dns_servers}};
       option routers {{gateway}};
       range dynamic-bootp {{low_range}} {{high_range}};

       pool {
               allow members of "uboot-highbank";
               filename "/arm/highbank/empty";
       }
       pool {
               allow members of "pxe";
               filename "/x86/pxelinux.0";
       }
}
"#;

/// The fixed, required parameter set for a DHCP subnet declaration.
///
/// There are no optional members and no implicit defaults beyond what
/// the template itself embeds.
#[derive(Debug, Clone)]
pub struct DhcpParams {
    /// Base subnet declaration, e.g. `192.168.1.0`
    pub subnet: String,
    /// Mask for the subnet, e.g. `255.255.255.0`
    pub subnet_mask: String,
    /// Address of the TFTP server for PXE booting
    pub next_server: String,
    /// Broadcast address for the subnet
    pub broadcast_address: String,
    /// One or more DNS server addresses
    pub dns_servers: String,
    /// Router/gateway address for the subnet
    pub gateway: String,
    /// First address of the dynamic range
    pub low_range: String,
    /// Last address of the dynamic range
    pub high_range: String,
}

impl DhcpParams {
    fn to_template_params(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("subnet", self.subnet.clone()),
            ("subnet_mask", self.subnet_mask.clone()),
            ("next_server", self.next_server.clone()),
            ("broadcast_address", self.broadcast_address.clone()),
            ("dns_servers", self.dns_servers.clone()),
            ("gateway", self.gateway.clone()),
            ("low_range", self.low_range.clone()),
            ("high_range", self.high_range.clone()),
        ])
    }
}

/// Render the dhcpd configuration for one subnet.
pub fn render_dhcp_config(params: &DhcpParams) -> Result<String, BootConfigError> {
    render_dhcp_template(DHCP_CONFIG_TEMPLATE, &params.to_template_params())
}

/// Render an arbitrary dhcpd template against a raw parameter map.
///
/// Exposed so callers with their own template can keep the same
/// fail-on-missing contract.
pub fn render_dhcp_template(
    template: &str,
    params: &BTreeMap<&str, String>,
) -> Result<String, BootConfigError> {
    substitute(template, params)
}
