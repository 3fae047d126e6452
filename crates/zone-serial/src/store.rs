//! Counter stores
//!
//! A `SerialStore` hands out strictly increasing (modulo the configured
//! range) values for named counters. The increment-and-read must be a
//! single indivisible operation so that two concurrent callers can never
//! observe the same value.

use crate::error::SequenceError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Backing store for named serial counters.
///
/// Implementations must make `nextval` atomic: an increment-and-read in
/// one operation, never a read-then-write pair. Database-backed stores
/// would map this onto a native sequence (e.g. `SELECT nextval(...)`).
#[async_trait::async_trait]
pub trait SerialStore: Send + Sync {
    /// Create a counter. The first `nextval` call returns `minvalue`.
    ///
    /// Creating a counter that already exists is an explicit error.
    async fn create(
        &self,
        name: &str,
        incr: u32,
        minvalue: u32,
        maxvalue: u32,
    ) -> Result<(), SequenceError>;

    /// Return the counter's current value and atomically advance it.
    ///
    /// After returning `maxvalue`, the next call returns `minvalue`;
    /// wrapping is never an error.
    async fn nextval(&self, name: &str) -> Result<u32, SequenceError>;

    /// Drop a counter. Deleting a counter that does not exist is an
    /// explicit error.
    async fn delete(&self, name: &str) -> Result<(), SequenceError>;
}

#[derive(Debug)]
struct Counter {
    value: u32,
    incr: u32,
    minvalue: u32,
    maxvalue: u32,
}

/// In-process `SerialStore`.
///
/// The whole next-value computation happens under one lock, which makes
/// it indivisible for every caller sharing this store. Cross-process
/// deployments need a store backed by a shared sequence instead.
#[derive(Debug, Default)]
pub struct MemorySerialStore {
    counters: Mutex<HashMap<String, Counter>>,
}

impl MemorySerialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Counter>>, SequenceError> {
        self.counters
            .lock()
            .map_err(|_| SequenceError::Store("counter mutex poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl SerialStore for MemorySerialStore {
    async fn create(
        &self,
        name: &str,
        incr: u32,
        minvalue: u32,
        maxvalue: u32,
    ) -> Result<(), SequenceError> {
        let mut counters = self.lock()?;
        if counters.contains_key(name) {
            return Err(SequenceError::AlreadyExists(name.to_string()));
        }
        counters.insert(
            name.to_string(),
            Counter {
                value: minvalue,
                incr,
                minvalue,
                maxvalue,
            },
        );
        Ok(())
    }

    async fn nextval(&self, name: &str) -> Result<u32, SequenceError> {
        let mut counters = self.lock()?;
        let counter = counters
            .get_mut(name)
            .ok_or_else(|| SequenceError::NotFound(name.to_string()))?;
        let value = counter.value;
        counter.value = match value.checked_add(counter.incr) {
            Some(next) if next <= counter.maxvalue => next,
            _ => counter.minvalue,
        };
        Ok(value)
    }

    async fn delete(&self, name: &str) -> Result<(), SequenceError> {
        let mut counters = self.lock()?;
        counters
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SequenceError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nextval_is_strictly_increasing() {
        let store = MemorySerialStore::new();
        store.create("example.com", 1, 0, u32::MAX).await.unwrap();
        let mut previous = store.nextval("example.com").await.unwrap();
        for _ in 0..100 {
            let value = store.nextval("example.com").await.unwrap();
            assert!(value > previous);
            previous = value;
        }
    }

    #[tokio::test]
    async fn nextval_wraps_to_minvalue_at_maxvalue() {
        let store = MemorySerialStore::new();
        store.create("wrap", 1, 0, 2).await.unwrap();
        assert_eq!(store.nextval("wrap").await.unwrap(), 0);
        assert_eq!(store.nextval("wrap").await.unwrap(), 1);
        assert_eq!(store.nextval("wrap").await.unwrap(), 2);
        // Exactly one wrap event, back to minvalue, no error.
        assert_eq!(store.nextval("wrap").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn counters_are_independent() {
        let store = MemorySerialStore::new();
        store.create("a", 1, 0, u32::MAX).await.unwrap();
        store.create("b", 1, 0, u32::MAX).await.unwrap();
        assert_eq!(store.nextval("a").await.unwrap(), 0);
        assert_eq!(store.nextval("a").await.unwrap(), 1);
        assert_eq!(store.nextval("b").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_existing_is_an_error() {
        let store = MemorySerialStore::new();
        store.create("dup", 1, 0, u32::MAX).await.unwrap();
        let err = store.create("dup", 1, 0, u32::MAX).await.unwrap_err();
        assert!(matches!(err, SequenceError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn delete_missing_is_an_error() {
        let store = MemorySerialStore::new();
        let err = store.delete("absent").await.unwrap_err();
        assert!(matches!(err, SequenceError::NotFound(_)));
    }

    #[tokio::test]
    async fn nextval_missing_is_an_error() {
        let store = MemorySerialStore::new();
        let err = store.nextval("absent").await.unwrap_err();
        assert!(matches!(err, SequenceError::NotFound(_)));
    }
}
