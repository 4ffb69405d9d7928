use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, params_from_iter};

use rowkeep_core::{ColumnValue, RecordId};

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::schema::{init_connection, quote_ident};
use crate::traits::{Equals, QueryExecutor, Row};

fn to_sql_value(value: &ColumnValue) -> Value {
    match value {
        ColumnValue::Null => Value::Null,
        ColumnValue::Integer(n) => Value::Integer(*n),
        ColumnValue::Real(n) => Value::Real(*n),
        ColumnValue::Text(s) => Value::Text(s.clone()),
        ColumnValue::Blob(b) => Value::Blob(b.clone()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Result<ColumnValue, StorageError> {
    Ok(match value {
        ValueRef::Null => ColumnValue::Null,
        ValueRef::Integer(n) => ColumnValue::Integer(n),
        ValueRef::Real(n) => ColumnValue::Real(n),
        ValueRef::Text(bytes) => ColumnValue::Text(
            String::from_utf8(bytes.to_vec())
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
        ),
        ValueRef::Blob(bytes) => ColumnValue::Blob(bytes.to_vec()),
    })
}

fn column_list(columns: &[&str]) -> Result<String, StorageError> {
    if columns.is_empty() {
        return Err(StorageError::EmptyColumnList);
    }
    let quoted = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.join(", "))
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        Self::open_with(path, &StorageConfig::default())
    }

    pub fn open_with(path: &str, config: &StorageConfig) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        init_connection(&conn, config)?;
        tracing::debug!(path, journal_mode = config.journal_mode.as_str(), "opened sqlite storage");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        init_connection(&conn, &StorageConfig::default())?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run DDL or other multi-statement SQL.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StorageError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl QueryExecutor for SqliteStorage {
    fn select(
        &self,
        table: &str,
        columns: &[&str],
        filter: &Equals,
    ) -> Result<Vec<Row>, StorageError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            column_list(columns)?,
            quote_ident(table)?,
            quote_ident(&filter.column)?,
        );
        tracing::trace!(table, columns = columns.len(), "select");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([to_sql_value(&filter.value)])?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut out = Row::new();
            for (index, column) in columns.iter().enumerate() {
                out.insert(*column, from_sql_value(row.get_ref(index)?)?);
            }
            result.push(out);
        }
        Ok(result)
    }

    fn update(
        &mut self,
        table: &str,
        values: &[(&str, ColumnValue)],
        filter: &Equals,
    ) -> Result<usize, StorageError> {
        if values.is_empty() {
            return Err(StorageError::EmptyColumnList);
        }
        let assignments = values
            .iter()
            .enumerate()
            .map(|(index, (column, _))| -> Result<String, StorageError> {
                Ok(format!("{} = ?{}", quote_ident(column)?, index + 1))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            quote_ident(table)?,
            assignments.join(", "),
            quote_ident(&filter.column)?,
            values.len() + 1,
        );
        tracing::trace!(table, columns = values.len(), "update");

        let params = values
            .iter()
            .map(|(_, value)| to_sql_value(value))
            .chain(std::iter::once(to_sql_value(&filter.value)));
        let changed = self.conn.execute(&sql, params_from_iter(params))?;
        Ok(changed)
    }

    fn insert(
        &mut self,
        table: &str,
        values: &[(&str, ColumnValue)],
    ) -> Result<RecordId, StorageError> {
        let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
        let placeholders = (1..=values.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table)?,
            column_list(&columns)?,
            placeholders,
        );
        tracing::trace!(table, columns = values.len(), "insert");

        self.conn.execute(
            &sql,
            params_from_iter(values.iter().map(|(_, value)| to_sql_value(value))),
        )?;
        Ok(RecordId::new(self.conn.last_insert_rowid())?)
    }

    fn count(&self, table: &str, filter: &Equals) -> Result<u64, StorageError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?1",
            quote_ident(table)?,
            quote_ident(&filter.column)?,
        );
        tracing::trace!(table, "count");

        let count: i64 = self
            .conn
            .query_row(&sql, [to_sql_value(&filter.value)], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SqliteStorage {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .execute_batch(
                "CREATE TABLE ITEMS (
                    ID INTEGER PRIMARY KEY,
                    NAME TEXT NOT NULL,
                    COLOR BLOB,
                    WEIGHT REAL,
                    DELETED INTEGER NOT NULL DEFAULT 0
                );",
            )
            .unwrap();
        storage
    }

    #[test]
    fn insert_then_select_roundtrips_storage_classes() {
        let mut storage = storage();
        let id = storage
            .insert(
                "ITEMS",
                &[
                    ("NAME", ColumnValue::from("lamp")),
                    ("COLOR", ColumnValue::Blob(vec![0xab, 0xcd])),
                    ("WEIGHT", ColumnValue::Real(1.5)),
                ],
            )
            .unwrap();

        let rows = storage
            .select("ITEMS", &["NAME", "COLOR", "WEIGHT", "DELETED"], &Equals::id(id))
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get("NAME"), Some(&ColumnValue::Text("lamp".into())));
        assert_eq!(row.get("COLOR"), Some(&ColumnValue::Blob(vec![0xab, 0xcd])));
        assert_eq!(row.get("WEIGHT"), Some(&ColumnValue::Real(1.5)));
        assert_eq!(row.get("DELETED"), Some(&ColumnValue::Integer(0)));
    }

    #[test]
    fn update_reports_affected_rows() {
        let mut storage = storage();
        let id = storage
            .insert("ITEMS", &[("NAME", ColumnValue::from("desk"))])
            .unwrap();

        let changed = storage
            .update(
                "ITEMS",
                &[("NAME", ColumnValue::from("chair")), ("DELETED", true.into())],
                &Equals::id(id),
            )
            .unwrap();
        assert_eq!(changed, 1);

        let missing = RecordId::new(id.get() + 100).unwrap();
        let changed = storage
            .update("ITEMS", &[("NAME", ColumnValue::from("x"))], &Equals::id(missing))
            .unwrap();
        assert_eq!(changed, 0);

        let rows = storage.select("ITEMS", &["NAME"], &Equals::id(id)).unwrap();
        assert_eq!(rows[0].get("NAME"), Some(&ColumnValue::Text("chair".into())));
    }

    #[test]
    fn count_matches_filter() {
        let mut storage = storage();
        storage.insert("ITEMS", &[("NAME", ColumnValue::from("a"))]).unwrap();
        storage.insert("ITEMS", &[("NAME", ColumnValue::from("a"))]).unwrap();
        storage.insert("ITEMS", &[("NAME", ColumnValue::from("b"))]).unwrap();

        assert_eq!(storage.count("ITEMS", &Equals::new("NAME", "a")).unwrap(), 2);
        assert_eq!(storage.count("ITEMS", &Equals::new("NAME", "c")).unwrap(), 0);
    }

    #[test]
    fn hostile_names_never_reach_sql() {
        let mut storage = storage();
        let filter = Equals::new("ID", 1i64);
        assert!(matches!(
            storage.select("ITEMS; DROP TABLE ITEMS", &["NAME"], &filter),
            Err(StorageError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            storage.update("ITEMS", &[("NAME\" = 1 --", ColumnValue::Null)], &filter),
            Err(StorageError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            storage.select("ITEMS", &[], &filter),
            Err(StorageError::EmptyColumnList)
        ));
        assert!(matches!(
            storage.update("ITEMS", &[], &filter),
            Err(StorageError::EmptyColumnList)
        ));
    }

    #[test]
    fn file_backed_storage_applies_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.db");
        let config = StorageConfig::from_toml("journal_mode = \"truncate\"").unwrap();
        let storage = SqliteStorage::open_with(path.to_str().unwrap(), &config).unwrap();

        let mode: String = storage
            .conn()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_ascii_uppercase(), "TRUNCATE");
    }
}
