//! Internal disposal stack for realized singletons.

use crate::instance::Disposer;
use crate::key::TypeKey;

/// A singleton waiting to be disposed.
pub(crate) struct DisposalRecord {
    pub(crate) key: TypeKey,
    pub(crate) disposer: Disposer,
}

/// Append-only stack of disposal records with LIFO draining.
///
/// Sync and async disposers share one stack so that teardown follows the
/// exact reverse of construction order. Once closed, the stack refuses new
/// records and hands them back to the caller.
#[derive(Default)]
pub(crate) struct DisposeBag {
    records: Vec<DisposalRecord>,
    closed: bool,
}

impl DisposeBag {
    /// Pushes a record, or returns it if the bag has been closed.
    pub(crate) fn push(&mut self, record: DisposalRecord) -> Result<(), DisposalRecord> {
        if self.closed {
            return Err(record);
        }
        self.records.push(record);
        Ok(())
    }

    /// Stops accepting records.
    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    /// Pops the most recently pushed record.
    pub(crate) fn pop(&mut self) -> Option<DisposalRecord> {
        self.records.pop()
    }

    /// Whether nothing is waiting to be disposed.
    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Dispose;
    use std::sync::Arc;

    struct Noop;
    impl Dispose for Noop {
        fn dispose(&self) {}
    }

    struct First;
    struct Second;

    fn record(key: TypeKey) -> DisposalRecord {
        DisposalRecord {
            key,
            disposer: Disposer::Sync(Arc::new(Noop)),
        }
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut bag = DisposeBag::default();
        assert!(bag.push(record(TypeKey::of::<First>())).is_ok());
        assert!(bag.push(record(TypeKey::of::<Second>())).is_ok());
        assert_eq!(bag.len(), 2);

        assert_eq!(bag.pop().map(|r| r.key), Some(TypeKey::of::<Second>()));
        assert_eq!(bag.pop().map(|r| r.key), Some(TypeKey::of::<First>()));
        assert!(bag.pop().is_none());
        assert!(bag.is_empty());
    }

    #[test]
    fn test_closed_bag_rejects_records() {
        let mut bag = DisposeBag::default();
        bag.close();

        let rejected = bag.push(record(TypeKey::of::<First>()));
        assert_eq!(rejected.err().map(|r| r.key), Some(TypeKey::of::<First>()));
        assert!(bag.is_empty());
    }
}
