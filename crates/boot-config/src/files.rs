//! Atomic config file writes
//!
//! Daemons like dhcpd and named re-read their configs on signal, so a
//! half-written file is worse than a stale one. Rendered output is
//! written to a temp file in the target directory and renamed into
//! place.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::BootConfigError;

/// Write `contents` to `target`, atomically with respect to readers.
///
/// The temp file is created in the target's own directory so the final
/// rename never crosses a filesystem boundary.
pub fn write_config(target: &Path, contents: &str) -> Result<(), BootConfigError> {
    let dir = match target.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.persist(target).map_err(|err| err.error)?;
    Ok(())
}
