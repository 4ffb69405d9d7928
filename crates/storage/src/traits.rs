use std::collections::BTreeMap;

use rowkeep_core::{ColumnValue, RecordId};

use crate::error::StorageError;

/// Primary key column shared by every record table.
pub const ID_COLUMN: &str = "ID";

/// Single-predicate equality filter: `column = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equals {
    pub column: String,
    pub value: ColumnValue,
}

impl Equals {
    pub fn new(column: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// `ID = id`, the filter every record operation uses.
    pub fn id(id: RecordId) -> Self {
        Self::new(ID_COLUMN, id.get())
    }
}

/// One result row, keyed by column name as it was requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, ColumnValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: ColumnValue) {
        self.columns.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns.get(column)
    }

    pub fn take(&mut self, column: &str) -> Option<ColumnValue> {
        self.columns.remove(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// The query-execution collaborator the record layer runs against.
///
/// Every filter is a single equality predicate. Implementations own
/// timeouts, retries and connection handling; callers see their errors
/// unmodified.
pub trait QueryExecutor {
    fn select(
        &self,
        table: &str,
        columns: &[&str],
        filter: &Equals,
    ) -> Result<Vec<Row>, StorageError>;

    /// Returns the number of rows the update matched.
    fn update(
        &mut self,
        table: &str,
        values: &[(&str, ColumnValue)],
        filter: &Equals,
    ) -> Result<usize, StorageError>;

    /// Returns the id of the inserted row.
    fn insert(
        &mut self,
        table: &str,
        values: &[(&str, ColumnValue)],
    ) -> Result<RecordId, StorageError>;

    fn count(&self, table: &str, filter: &Equals) -> Result<u64, StorageError>;
}
