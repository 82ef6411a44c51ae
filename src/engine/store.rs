// Propatch — Store Accessor
// The only code that talks to SQLite. Opens an existing database file, runs
// reads with every column coerced to text, and runs bound-parameter writes.
// The connection closes when `Store` is dropped, on every exit path.

use crate::atoms::constants::NULL_MARKER;
use crate::atoms::error::{PatchError, PatchResult};
use crate::atoms::types::Rows;
use log::{debug, info};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Params};
use std::path::{Path, PathBuf};

pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Open an existing database read-write. Never creates the file, and
    /// reads the schema so a non-database file fails here.
    pub fn open(path: impl AsRef<Path>) -> PatchResult<Self> {
        let path = path.as_ref();
        info!("[store] Opening database at {:?}", path);

        // Plain filesystem paths only: no URI parsing, no in-memory names.
        if !path.is_file() {
            return Err(PatchError::open_failed(path, "not an existing regular file"));
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| PatchError::open_failed(path, e.to_string()))?;

        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| PatchError::open_failed(path, e.to_string()))?;

        Ok(Store { conn, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a read-only query and collect every row as text columns.
    pub fn select<P: Params>(&self, sql: &str, params: P) -> PatchResult<Rows> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt.column_count();
        let mut rows = stmt.query(params)?;

        let mut out = Rows::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns);
            for idx in 0..columns {
                values.push(value_as_text(idx, row.get_ref(idx)?)?);
            }
            out.push(values);
        }
        debug!("[store] select returned {} rows x {} columns", out.len(), columns);
        Ok(out)
    }

    /// Run a mutating statement with bound parameters. Returns affected rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> PatchResult<usize> {
        let changed = self.conn.execute(sql, params)?;
        debug!("[store] execute changed {} rows", changed);
        Ok(changed)
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        debug!("[store] Closing database at {:?}", self.path);
    }
}

// Mirrors sqlite3_exec's text view of a column. Bytes that are not UTF-8
// are refused rather than replaced, so nothing lossy can be written back.
fn value_as_text(idx: usize, value: ValueRef<'_>) -> PatchResult<String> {
    match value {
        ValueRef::Null => Ok(NULL_MARKER.to_string()),
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Real(f) => Ok(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| PatchError::MalformedJson(format!("column {} is not valid UTF-8: {}", idx, e))),
    }
}
