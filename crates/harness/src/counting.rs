use std::cell::Cell;

use rowkeep_core::{ColumnValue, RecordId};
use rowkeep_storage::{Equals, QueryExecutor, Row, SqliteStorage, StorageError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCounts {
    pub selects: usize,
    pub updates: usize,
    pub inserts: usize,
    pub counts: usize,
}

impl QueryCounts {
    pub fn total(&self) -> usize {
        self.selects + self.updates + self.inserts + self.counts
    }
}

/// SQLite storage that records how many statements of each kind it ran.
pub struct CountingStorage {
    inner: SqliteStorage,
    counts: Cell<QueryCounts>,
}

impl CountingStorage {
    pub fn new(inner: SqliteStorage) -> Self {
        Self {
            inner,
            counts: Cell::new(QueryCounts::default()),
        }
    }

    pub fn inner(&self) -> &SqliteStorage {
        &self.inner
    }

    pub fn counts(&self) -> QueryCounts {
        self.counts.get()
    }

    pub fn reset_counts(&self) {
        self.counts.set(QueryCounts::default());
    }

    fn bump(&self, f: impl FnOnce(&mut QueryCounts)) {
        let mut counts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }
}

impl QueryExecutor for CountingStorage {
    fn select(
        &self,
        table: &str,
        columns: &[&str],
        filter: &Equals,
    ) -> Result<Vec<Row>, StorageError> {
        self.bump(|c| c.selects += 1);
        self.inner.select(table, columns, filter)
    }

    fn update(
        &mut self,
        table: &str,
        values: &[(&str, ColumnValue)],
        filter: &Equals,
    ) -> Result<usize, StorageError> {
        self.bump(|c| c.updates += 1);
        self.inner.update(table, values, filter)
    }

    fn insert(
        &mut self,
        table: &str,
        values: &[(&str, ColumnValue)],
    ) -> Result<RecordId, StorageError> {
        self.bump(|c| c.inserts += 1);
        self.inner.insert(table, values)
    }

    fn count(&self, table: &str, filter: &Equals) -> Result<u64, StorageError> {
        self.bump(|c| c.counts += 1);
        self.inner.count(table, filter)
    }
}
