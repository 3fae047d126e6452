//! DNS zone file rendering and rewriting
//!
//! A zone file is regenerated in full on every change. The SOA serial
//! comes from the per-zone allocator and is rendered as a 10-digit
//! zero-padded decimal so secondaries always see it grow in string
//! comparison too.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;
use zone_serial::{format_serial, ZoneSerialAllocator};

use crate::error::BootConfigError;
use crate::files::write_config;
use crate::template::substitute;

/// Zone file template.
///
/// The `{{mappings}}` block expands to one A record per host.
pub const ZONE_TEMPLATE: &str = r#"$TTL 300
@   IN  SOA {{domain}}. ns.{{domain}}. (
        {{serial}} ; serial
        600 ; refresh
        600 ; retry
        604800 ; expire
        300 ; nxttl
        )
@   IN  NS  ns.{{domain}}.
{{mappings}}"#;

/// A forward zone: numeric identifier, domain name and host addresses.
#[derive(Debug, Clone)]
pub struct DnsZone {
    /// Numeric zone identifier, used to name the zone file
    pub id: u64,
    /// Domain the zone is authoritative for
    pub domain: String,
    /// Hostname to IPv4 address mappings
    pub mappings: BTreeMap<String, String>,
}

/// File name under the DNS config directory for a zone.
pub fn zone_file_name(zone_id: u64) -> String {
    format!("zone.{zone_id}")
}

/// Render the zone file for `zone` with the given SOA serial.
pub fn render_zone(zone: &DnsZone, serial: u32) -> Result<String, BootConfigError> {
    let mut records = String::new();
    for (hostname, ip) in &zone.mappings {
        records.push_str(&format!("{hostname} IN A {ip}\n"));
    }
    let params = BTreeMap::from([
        ("domain", zone.domain.clone()),
        ("serial", format_serial(serial)),
        ("mappings", records),
    ]);
    substitute(ZONE_TEMPLATE, &params)
}

/// Allocate the next serial for `zone`, render it and atomically write
/// `zone.<id>` under `dir`. Returns the serial used.
///
/// Rendering happens before any file is touched, so a failed render
/// leaves the previous zone file intact and no serial is wasted on it
/// beyond the one already drawn.
pub async fn write_zone_file(
    allocator: &ZoneSerialAllocator,
    dir: &Path,
    zone: &DnsZone,
) -> Result<u32, BootConfigError> {
    let serial = allocator.next(&zone.domain).await?;
    let rendered = render_zone(zone, serial)?;
    let target: PathBuf = dir.join(zone_file_name(zone.id));
    write_config(&target, &rendered)?;
    debug!(zone = %zone.domain, serial, path = %target.display(), "wrote zone file");
    Ok(serial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use zone_serial::MemorySerialStore;

    fn example_zone() -> DnsZone {
        DnsZone {
            id: 3,
            domain: "example.com".to_string(),
            mappings: BTreeMap::from([
                ("host1".to_string(), "10.0.0.1".to_string()),
                ("host2".to_string(), "10.0.0.2".to_string()),
            ]),
        }
    }

    #[test]
    fn serial_is_ten_digit_zero_padded() {
        let rendered = render_zone(&example_zone(), 2).unwrap();
        assert!(rendered.contains("0000000002 ; serial"));
    }

    #[test]
    fn one_a_record_per_mapping() {
        let rendered = render_zone(&example_zone(), 1).unwrap();
        assert!(rendered.contains("host1 IN A 10.0.0.1\n"));
        assert!(rendered.contains("host2 IN A 10.0.0.2\n"));
        assert!(rendered.contains("IN  SOA example.com. ns.example.com."));
    }

    #[test]
    fn zone_file_is_named_by_id() {
        assert_eq!(zone_file_name(3), "zone.3");
    }

    #[tokio::test]
    async fn consecutive_writes_bump_the_serial() {
        let allocator = ZoneSerialAllocator::new(Arc::new(MemorySerialStore::new()));
        let dir = tempfile::tempdir().unwrap();
        let zone = example_zone();

        let first = write_zone_file(&allocator, dir.path(), &zone)
            .await
            .unwrap();
        let second = write_zone_file(&allocator, dir.path(), &zone)
            .await
            .unwrap();
        assert_eq!((first, second), (0, 1));

        let contents = std::fs::read_to_string(dir.path().join("zone.3")).unwrap();
        assert!(contents.contains("0000000001 ; serial"));
    }
}
