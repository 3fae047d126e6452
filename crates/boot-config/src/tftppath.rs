//! TFTP path conventions for PXE files
//!
//! Booting firmware encodes these paths at request time, so they must be
//! preserved exactly: configs live at
//! `maas/<arch>/<subarch>/pxelinux.cfg/<name>`. Kernel and initrd image
//! directories are referenced from inside a PXE config, which the loader
//! resolves relative to the config's own directory tree, so those paths
//! carry no `maas/` prefix: `<arch>/<subarch>/<release>/<purpose>`.

use crate::kernel_opts::BootPurpose;
use std::path::{Path, PathBuf};

/// Directory under the TFTP root that holds generated boot material.
pub const TFTP_SUBDIR: &str = "maas";

/// Compose the TFTP path for a PXE configuration file, relative to the
/// TFTP root as clients on the network identify it.
pub fn compose_config_path(arch: &str, subarch: &str, name: &str) -> String {
    format!("{TFTP_SUBDIR}/{arch}/{subarch}/pxelinux.cfg/{name}")
}

/// Compose the path of a kernel/initrd image directory as referenced
/// from a PXE configuration file.
pub fn compose_image_path(arch: &str, subarch: &str, release: &str, purpose: BootPurpose) -> String {
    format!("{arch}/{subarch}/{release}/{}", purpose.as_str())
}

/// Return the local filesystem path corresponding to `tftp_path`.
///
/// This is where a file must be placed to be served over TFTP under that
/// path. Leading slashes in the request are ignored; TFTP clients are
/// inconsistent about sending them.
pub fn locate_tftp_path(base: &Path, tftp_path: &str) -> PathBuf {
    base.join(tftp_path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_matches_the_wire_convention() {
        assert_eq!(
            compose_config_path("i386", "generic", "default"),
            "maas/i386/generic/pxelinux.cfg/default"
        );
    }

    #[test]
    fn image_path_is_relative_to_the_boot_directory() {
        assert_eq!(
            compose_image_path("amd64", "generic", "precise", BootPurpose::Install),
            "amd64/generic/precise/install"
        );
    }

    #[test]
    fn locate_strips_leading_slashes() {
        let located = locate_tftp_path(Path::new("/var/lib/tftproot"), "//maas/i386/file");
        assert_eq!(located, PathBuf::from("/var/lib/tftproot/maas/i386/file"));
    }
}
