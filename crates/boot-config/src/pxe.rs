//! PXELINUX configuration rendering
//!
//! Renders the config file a PXE loader fetches over TFTP. Variables are
//! `menutitle`, `kernelimage` and `append`; like the DHCP renderer this
//! is strict, a missing variable fails the render rather than emitting a
//! config that boots the wrong thing.

use crate::error::BootConfigError;
use crate::template::substitute;
use std::collections::BTreeMap;

/// PXELINUX configuration template.
///
/// Format reference: <https://wiki.syslinux.org/wiki/index.php?title=Config>
pub const PXE_CONFIG_TEMPLATE: &str = r#"DEFAULT execute
PROMPT 0
TIMEOUT 0

LABEL execute
  SAY {{menutitle}}
  KERNEL {{kernelimage}}
  APPEND {{append}}
"#;

/// Render a PXELINUX config from `menutitle`, `kernelimage` and `append`.
pub fn render_pxe_config(
    menutitle: &str,
    kernelimage: &str,
    append: &str,
) -> Result<String, BootConfigError> {
    let params = BTreeMap::from([
        ("menutitle", menutitle.to_string()),
        ("kernelimage", kernelimage.to_string()),
        ("append", append.to_string()),
    ]);
    render_pxe_template(PXE_CONFIG_TEMPLATE, &params)
}

/// Render an arbitrary PXELINUX template against a raw parameter map.
pub fn render_pxe_template(
    template: &str,
    params: &BTreeMap<&str, String>,
) -> Result<String, BootConfigError> {
    substitute(template, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_places_each_variable_on_its_directive() {
        let config = render_pxe_config(
            "Install Ubuntu",
            "amd64/generic/precise/install/linux",
            "initrd=amd64/generic/precise/install/initrd.gz suite=precise",
        )
        .unwrap();
        assert!(config.contains("SAY Install Ubuntu\n"));
        assert!(config.contains("KERNEL amd64/generic/precise/install/linux\n"));
        assert!(config.contains(
            "APPEND initrd=amd64/generic/precise/install/initrd.gz suite=precise\n"
        ));
    }

    #[test]
    fn missing_variable_fails_the_render() {
        let params = BTreeMap::from([("menutitle", "title".to_string())]);
        let err = render_pxe_template(PXE_CONFIG_TEMPLATE, &params).unwrap_err();
        assert!(matches!(err, BootConfigError::MissingParameter { .. }));
    }
}
