use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A CSV-backed table held authoritatively in memory.
///
/// Rows are loaded once at open time and every mutation goes through
/// [`CsvTable::update`], which stages the change on a copy, writes the whole
/// file once, and only then swaps the copy in. A failed write or a failed
/// closure leaves both the file and the in-memory rows untouched, so callers
/// get all-or-nothing semantics for multi-row mutations.
///
/// The write lock is the unit of mutual exclusion: any check-then-set a caller
/// performs inside the `update` closure is a single critical section.
pub struct CsvTable<T> {
    path: PathBuf,
    rows: RwLock<Vec<T>>,
}

impl<T> CsvTable<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open a table, loading existing rows. A missing file is an empty table.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = if path.exists() {
            let mut reader = csv::Reader::from_path(&path)?;
            reader.deserialize().collect::<Result<Vec<T>, _>>()?
        } else {
            Vec::new()
        };
        debug!("Opened table {} with {} rows", path.display(), rows.len());
        Ok(Self {
            path,
            rows: RwLock::new(rows),
        })
    }

    /// One consistent snapshot of the current rows.
    pub async fn snapshot(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Mutate the table under the write lock.
    ///
    /// The closure receives a staged copy of the rows; if it fails, or the
    /// flush fails, nothing changes. On success the staged rows are written to
    /// disk in a single pass and become the new in-memory state.
    pub async fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut guard = self.rows.write().await;
        let mut staged = guard.clone();
        let out = mutate(&mut staged)?;
        write_rows(&self.path, &staged).map_err(E::from)?;
        *guard = staged;
        Ok(out)
    }

    /// Append rows and flush.
    pub async fn append(&self, new_rows: Vec<T>) -> Result<(), StoreError> {
        self.update(|rows| {
            rows.extend(new_rows);
            Ok::<_, StoreError>(())
        })
        .await
    }

    /// Replace the whole table and flush.
    pub async fn replace_all(&self, new_rows: Vec<T>) -> Result<(), StoreError> {
        self.update(|rows| {
            *rows = new_rows;
            Ok::<_, StoreError>(())
        })
        .await
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Write to a sibling temp file and rename so readers never observe a
    // half-written table.
    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp_path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Row {
        name: String,
        available: bool,
    }

    fn row(name: &str, available: bool) -> Row {
        Row {
            name: name.to_string(),
            available,
        }
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let table: CsvTable<Row> = CsvTable::open(dir.path().join("rows.csv")).unwrap();
        assert!(table.is_empty().await);
    }

    #[tokio::test]
    async fn append_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");

        let table: CsvTable<Row> = CsvTable::open(&path).unwrap();
        table
            .append(vec![row("a", true), row("b", false)])
            .await
            .unwrap();
        assert_eq!(table.len().await, 2);

        let reopened: CsvTable<Row> = CsvTable::open(&path).unwrap();
        assert_eq!(reopened.snapshot().await, vec![row("a", true), row("b", false)]);
    }

    #[tokio::test]
    async fn failed_update_leaves_table_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");

        let table: CsvTable<Row> = CsvTable::open(&path).unwrap();
        table.append(vec![row("a", true)]).await.unwrap();

        #[derive(Debug, Error)]
        enum TestError {
            #[error("boom")]
            Boom,
            #[error(transparent)]
            Store(#[from] StoreError),
        }

        let result: Result<(), TestError> = table
            .update(|rows| {
                rows[0].available = false;
                rows.push(row("b", true));
                Err(TestError::Boom)
            })
            .await;
        assert!(result.is_err());

        // Memory and disk both still show the original row.
        assert_eq!(table.snapshot().await, vec![row("a", true)]);
        let reopened: CsvTable<Row> = CsvTable::open(&path).unwrap();
        assert_eq!(reopened.snapshot().await, vec![row("a", true)]);
    }
}
