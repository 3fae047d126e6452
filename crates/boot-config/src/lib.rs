//! Boot and zone configuration rendering
//!
//! Everything a network-boot install farm writes out for its daemons and
//! hands to booting machines: ISC dhcpd configs, BIND zone files,
//! PXELINUX configs, kernel command lines and the TFTP path conventions
//! that tie them together.
//!
//! All rendering is strict template substitution. A missing parameter is
//! an error naming the variable, never silently defaulted, so a broken
//! render can not put a half-configured daemon or machine on the
//! network.

pub mod dhcp;
pub mod dns;
pub mod error;
pub mod files;
pub mod kernel_opts;
pub mod pxe;
pub mod template;
pub mod tftppath;

pub use dhcp::{render_dhcp_config, DhcpParams, DHCP_CONFIG_TEMPLATE};
pub use dns::{render_zone, write_zone_file, zone_file_name, DnsZone};
pub use error::BootConfigError;
pub use kernel_opts::{
    compose_enlistment_preseed_url, compose_kernel_command_line, compose_preseed_url, BootPurpose,
    BootSettings, MachineIdentity,
};
pub use pxe::{render_pxe_config, PXE_CONFIG_TEMPLATE};
pub use tftppath::{compose_config_path, compose_image_path, locate_tftp_path};
