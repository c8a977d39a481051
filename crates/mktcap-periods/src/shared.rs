//! Sharing a reference table between readers while it is rebuilt.

use crate::reference::PeriodReferenceTable;
use std::sync::{Arc, PoisonError, RwLock};

/// Holds the current [`PeriodReferenceTable`] for concurrent readers.
///
/// Readers take an `Arc` snapshot and keep using it for as long as they
/// like; a rebuild publishes a complete new table by swapping the `Arc`.
/// A reader never observes a partially built table.
#[derive(Debug)]
pub struct ReferenceTableHandle {
    current: RwLock<Arc<PeriodReferenceTable>>,
}

impl ReferenceTableHandle {
    /// Creates a handle publishing `table`.
    pub fn new(table: PeriodReferenceTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Returns the currently published table.
    pub fn snapshot(&self) -> Arc<PeriodReferenceTable> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publishes a rebuilt table and returns the one it replaced.
    pub fn publish(&self, table: PeriodReferenceTable) -> Arc<PeriodReferenceTable> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PeriodInferer, PeriodReferenceBuilder};
    use std::thread;

    fn table_with(label: &str, day: f64) -> PeriodReferenceTable {
        PeriodReferenceBuilder::new(0.0, 365.0)
            .unwrap()
            .build_from_records([("AAPL", label, day)])
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let handle = ReferenceTableHandle::new(table_with("Q1", 30.0));
        let before = handle.snapshot();

        let replaced = handle.publish(table_with("Q2", 120.0));
        assert!(Arc::ptr_eq(&before, &replaced));

        assert!(before.reference("AAPL", "Q1").is_some());
        assert!(handle.snapshot().reference("AAPL", "Q2").is_some());
        assert!(handle.snapshot().reference("AAPL", "Q1").is_none());
    }

    #[test]
    fn test_concurrent_readers() {
        let handle = Arc::new(ReferenceTableHandle::new(table_with("Q1", 30.0)));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || {
                    let table = handle.snapshot();
                    PeriodInferer::for_table(&table).infer("AAPL", 31.0)
                })
            })
            .collect();

        handle.publish(table_with("Q1", 35.0));

        for reader in readers {
            assert_eq!(reader.join().unwrap().as_deref(), Some("Q1"));
        }
    }
}
