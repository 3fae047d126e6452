//! DNS zone serial allocation
//!
//! Every rewrite of a zone's data gets stamped with a fresh serial so
//! secondary servers notice the change. Serials are 32-bit, monotonically
//! increasing per zone, and wrap from the maximum value back to the
//! minimum instead of overflowing.
//!
//! The counter itself lives behind the [`SerialStore`] trait so the
//! backing store is injected by the caller rather than being ambient
//! process state: [`MemorySerialStore`] for a single process, a database
//! sequence for multi-worker deployments.
//!
//! # Example
//!
//! ```
//! use zone_serial::{MemorySerialStore, ZoneSerialAllocator, format_serial};
//!
//! # async fn example() -> Result<(), zone_serial::SequenceError> {
//! let allocator = ZoneSerialAllocator::new(std::sync::Arc::new(MemorySerialStore::new()));
//! let serial = allocator.next("example.com").await?;
//! assert_eq!(format_serial(serial), "0000000000");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod store;

pub use error::SequenceError;
pub use store::{MemorySerialStore, SerialStore};

use std::sync::Arc;
use tracing::debug;

/// A DNS zone serial is a 32-bit unsigned integer.
pub const SERIAL_MAX: u32 = u32::MAX;

/// Hands out the next serial for a named zone.
///
/// The per-zone counter is created lazily on first use and advanced with
/// step 1 over the full [0, 2^32 - 1] range. Concurrent rewrites of the
/// same zone serialize through the store's atomic increment; there is no
/// application-level locking here.
#[derive(Clone)]
pub struct ZoneSerialAllocator {
    store: Arc<dyn SerialStore>,
}

impl std::fmt::Debug for ZoneSerialAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneSerialAllocator").finish_non_exhaustive()
    }
}

impl ZoneSerialAllocator {
    /// Create an allocator over the given counter store.
    pub fn new(store: Arc<dyn SerialStore>) -> Self {
        Self { store }
    }

    /// Return the next serial for `zone_name`.
    ///
    /// Values returned for the same name are strictly increasing modulo
    /// 2^32: after `SERIAL_MAX` the next value is 0.
    pub async fn next(&self, zone_name: &str) -> Result<u32, SequenceError> {
        match self.store.nextval(zone_name).await {
            Err(SequenceError::NotFound(_)) => {
                debug!("creating serial counter for zone {}", zone_name);
                match self.store.create(zone_name, 1, 0, SERIAL_MAX).await {
                    // A concurrent caller may have created it first.
                    Ok(()) | Err(SequenceError::AlreadyExists(_)) => {}
                    Err(e) => return Err(e),
                }
                self.store.nextval(zone_name).await
            }
            other => other,
        }
    }

    /// Return the next serial for `zone_name`, rendered for a zone file.
    pub async fn next_formatted(&self, zone_name: &str) -> Result<String, SequenceError> {
        Ok(format_serial(self.next(zone_name).await?))
    }
}

/// Render a serial the way it appears in a zone file: a fixed-width,
/// 10-digit zero-padded decimal string.
pub fn format_serial(serial: u32) -> String {
    format!("{serial:010}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn next_creates_counter_on_first_use() {
        let allocator = ZoneSerialAllocator::new(Arc::new(MemorySerialStore::new()));
        assert_eq!(allocator.next("example.com").await.unwrap(), 0);
        assert_eq!(allocator.next("example.com").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn zones_do_not_share_serials() {
        let allocator = ZoneSerialAllocator::new(Arc::new(MemorySerialStore::new()));
        assert_eq!(allocator.next("one.example.com").await.unwrap(), 0);
        assert_eq!(allocator.next("one.example.com").await.unwrap(), 1);
        assert_eq!(allocator.next("two.example.com").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn next_resumes_an_existing_counter() {
        let store = MemorySerialStore::new();
        store.create("zone", 1, 0, SERIAL_MAX).await.unwrap();
        for _ in 0..3 {
            store.nextval("zone").await.unwrap();
        }
        let allocator = ZoneSerialAllocator::new(Arc::new(store));
        assert_eq!(allocator.next("zone").await.unwrap(), 3);
        assert_eq!(allocator.next("zone").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn formatted_serial_is_ten_digits() {
        assert_eq!(format_serial(0), "0000000000");
        assert_eq!(format_serial(42), "0000000042");
        assert_eq!(format_serial(u32::MAX), "4294967295");
    }
}
