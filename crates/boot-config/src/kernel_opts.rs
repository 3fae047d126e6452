//! Kernel command-line composition for PXE configs
//!
//! Builds the APPEND line handed to a booting machine: initrd path,
//! preseed URL, suite and hostname, in that fixed order. A machine that
//! cannot be resolved is assumed to need enlisting and gets a made-up
//! hostname plus the enlistment preseed.

use crate::tftppath::compose_image_path;
use std::fmt;
use std::str::FromStr;

/// Sub-architecture used when a machine has none.
pub const DEFAULT_SUBARCH: &str = "generic";

/// Hostname handed to machines that are not known yet.
pub const ENLISTMENT_HOSTNAME: &str = "maas-enlist";

/// Metadata API version the preseed URLs are pinned to.
pub const LATEST_API_VERSION: &str = "latest";

/// Why a machine is booting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPurpose {
    /// OS installation
    Install,
    /// Hardware commissioning
    Commissioning,
    /// Enlistment of an unknown machine
    Enlist,
    /// Fallback purpose
    Default,
}

impl BootPurpose {
    /// The path segment / wire name for this purpose.
    pub fn as_str(self) -> &'static str {
        match self {
            BootPurpose::Install => "install",
            BootPurpose::Commissioning => "commissioning",
            BootPurpose::Enlist => "enlist",
            BootPurpose::Default => "default",
        }
    }
}

impl fmt::Display for BootPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BootPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(BootPurpose::Install),
            "commissioning" => Ok(BootPurpose::Commissioning),
            "enlist" => Ok(BootPurpose::Enlist),
            "default" => Ok(BootPurpose::Default),
            other => Err(format!("unknown boot purpose: {other}")),
        }
    }
}

/// Identity of a resolved machine, supplied by the owning application.
#[derive(Debug, Clone)]
pub struct MachineIdentity {
    /// Stable system id
    pub system_id: String,
    /// Machine hostname
    pub hostname: String,
}

/// System-wide boot settings.
///
/// The release is a single pinned value for the whole system; making it
/// per-machine is a known limitation, so it is a configuration input
/// here rather than a literal in the composer.
#[derive(Debug, Clone)]
pub struct BootSettings {
    /// OS release/suite, e.g. `precise`
    pub release: String,
    /// Base URL of the metadata service
    pub metadata_url: String,
}

impl Default for BootSettings {
    fn default() -> Self {
        Self {
            release: "precise".to_string(),
            metadata_url: "http://localhost/metadata".to_string(),
        }
    }
}

/// URL from which an unknown machine fetches the enlistment preseed.
pub fn compose_enlistment_preseed_url(settings: &BootSettings) -> String {
    format!(
        "{}/{}/enlist-preseed/",
        settings.metadata_url.trim_end_matches('/'),
        LATEST_API_VERSION
    )
}

/// URL from which a known machine fetches its preseed, addressed by its
/// stable system id.
pub fn compose_preseed_url(settings: &BootSettings, system_id: &str) -> String {
    format!(
        "{}/{}/by-id/{}/?op=get_preseed",
        settings.metadata_url.trim_end_matches('/'),
        LATEST_API_VERSION,
        system_id
    )
}

fn compose_initrd_opt(arch: &str, subarch: &str, release: &str, purpose: BootPurpose) -> String {
    format!(
        "initrd={}/initrd.gz",
        compose_image_path(arch, subarch, release, purpose)
    )
}

fn compose_preseed_opt(preseed_url: &str) -> String {
    format!("auto url={preseed_url}")
}

fn compose_suite_opt(release: &str) -> String {
    format!("suite={release}")
}

fn compose_hostname_opt(hostname: &str) -> String {
    format!("hostname={hostname}")
}

/// Generate the kernel option line for booting a machine.
///
/// `machine` may be `None`, in which case it boots into enlistment: the
/// fixed enlistment hostname plus the enlistment preseed URL. The option
/// order is fixed: initrd, preseed, suite, hostname.
pub fn compose_kernel_command_line(
    machine: Option<&MachineIdentity>,
    arch: &str,
    subarch: &str,
    purpose: BootPurpose,
    settings: &BootSettings,
) -> String {
    let preseed_url = match machine {
        Some(m) => compose_preseed_url(settings, &m.system_id),
        None => compose_enlistment_preseed_url(settings),
    };
    let hostname = machine.map_or(ENLISTMENT_HOSTNAME, |m| m.hostname.as_str());

    [
        compose_initrd_opt(arch, subarch, &settings.release, purpose),
        compose_preseed_opt(&preseed_url),
        compose_suite_opt(&settings.release),
        compose_hostname_opt(hostname),
    ]
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BootSettings {
        BootSettings {
            release: "precise".to_string(),
            metadata_url: "http://maas.example.com/metadata".to_string(),
        }
    }

    #[test]
    fn enlisting_machine_gets_fixed_hostname_and_enlist_preseed() {
        let line = compose_kernel_command_line(
            None,
            "amd64",
            DEFAULT_SUBARCH,
            BootPurpose::Install,
            &settings(),
        );
        assert_eq!(
            line,
            concat!(
                "initrd=amd64/generic/precise/install/initrd.gz ",
                "auto url=http://maas.example.com/metadata/latest/enlist-preseed/ ",
                "suite=precise hostname=maas-enlist"
            )
        );
    }

    #[test]
    fn known_machine_gets_its_hostname_and_by_id_preseed() {
        let machine = MachineIdentity {
            system_id: "node-89ab".to_string(),
            hostname: "coleman".to_string(),
        };
        let line = compose_kernel_command_line(
            Some(&machine),
            "armhf",
            "highbank",
            BootPurpose::Commissioning,
            &settings(),
        );
        assert!(line.starts_with("initrd=armhf/highbank/precise/commissioning/initrd.gz "));
        assert!(line.contains(
            "auto url=http://maas.example.com/metadata/latest/by-id/node-89ab/?op=get_preseed"
        ));
        assert!(line.contains("suite=precise"));
        assert!(line.ends_with("hostname=coleman"));
    }

    #[test]
    fn option_order_is_fixed() {
        let line =
            compose_kernel_command_line(None, "i386", "generic", BootPurpose::Enlist, &settings());
        let initrd = line.find("initrd=").unwrap();
        let preseed = line.find("auto url=").unwrap();
        let suite = line.find("suite=").unwrap();
        let hostname = line.find("hostname=").unwrap();
        assert!(initrd < preseed && preseed < suite && suite < hostname);
    }

    #[test]
    fn purpose_round_trips_through_from_str() {
        for purpose in [
            BootPurpose::Install,
            BootPurpose::Commissioning,
            BootPurpose::Enlist,
            BootPurpose::Default,
        ] {
            assert_eq!(purpose.as_str().parse::<BootPurpose>().unwrap(), purpose);
        }
        assert!("netboot".parse::<BootPurpose>().is_err());
    }
}
