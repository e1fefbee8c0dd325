/**
In-process engine.

- Implements `Engine` in Rust so the binding's ownership rules can be exercised without the
  native library: every token, string and blob it hands out is tracked, and misuse (double
  release, double free, unknown handle) is counted as a fault instead of corrupting memory.
- Contract checks follow the native runtime: rows, columns and cell types are validated, `copy`
  ranges must be inside the table, comparisons need the same column shape, and `rows_same`
  needs identity columns.
- Tables are built by the caller (a test or a procedure stand in) and registered with `insert`,
  which is what a native procedure returning a result set does.
- String and blob payloads are `malloc`ed, same as the C shim, and must come back through
  `free_string` / `free_blob`.
**/

use std::collections::hash_map::DefaultHasher;
use std::collections::{
    HashMap,
    HashSet,
};
use std::hash::{
    Hash,
    Hasher,
};
use std::os::raw::{
    c_char,
    c_void,
};
use std::ptr;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{
    Engine,
    RawBlob,
    RawDb,
    RawRs,
    INVALID,
};
use crate::err::{
    Error,
    Result,
};


#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone, Copy)]
pub enum ColumnType {
    Bool,
    Int,
    Long,
    Double,
    Text,
    Blob,
    // A nested result set.
    Object,
}


#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub encoded: bool,
    pub identity: bool,
}

impl Column {
    pub fn new(name: &str, kind: ColumnType) -> Column {
        Column {
            name: name.to_string(),
            kind,
            encoded: false,
            identity: false,
        }
    }

    pub fn encoded(mut self) -> Column {
        self.encoded = true;
        self
    }

    pub fn identity(mut self) -> Column {
        self.identity = true;
        self
    }
}


#[derive(Debug)]
#[derive(Clone)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Child(Arc<Table>),
}

impl Cell {
    fn kind(&self) -> Option<ColumnType> {
        match self {
            Cell::Null => None,
            Cell::Bool(_) => Some(ColumnType::Bool),
            Cell::Int(_) => Some(ColumnType::Int),
            Cell::Long(_) => Some(ColumnType::Long),
            Cell::Double(_) => Some(ColumnType::Double),
            Cell::Text(_) => Some(ColumnType::Text),
            Cell::Blob(_) => Some(ColumnType::Blob),
            Cell::Child(_) => Some(ColumnType::Object),
        }
    }

    // Child result sets compare by reference, like object columns in the runtime.
    fn same_value(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Long(a), Cell::Long(b)) => a == b,
            (Cell::Double(a), Cell::Double(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Blob(a), Cell::Blob(b)) => a == b,
            (Cell::Child(a), Cell::Child(b)) => Arc::ptr_eq(a, b),
            _ => false
        }
    }

    fn hash_into<H: Hasher>(&self, h: &mut H) {
        match self {
            Cell::Null => 0u8.hash(h),
            Cell::Bool(v) => v.hash(h),
            Cell::Int(v) => v.hash(h),
            Cell::Long(v) => v.hash(h),
            Cell::Double(v) => v.to_bits().hash(h),
            Cell::Text(v) => v.hash(h),
            Cell::Blob(v) => v.hash(h),
            Cell::Child(v) => (Arc::as_ptr(v) as usize).hash(h),
        }
    }
}


#[derive(Debug)]
#[derive(Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Table {
        Table {
            columns,
            rows: vec![],
        }
    }

    pub fn with_rows(columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Result<Table> {
        let mut t = Table::new(columns);
        for r in rows {
            t.push_row(r)?;
        }
        Ok(t)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::engine(format!("row has {} cells, table has {} columns", row.len(), self.columns.len())));
        }

        for (c, cell) in self.columns.iter().zip(row.iter()) {
            if let Some(kind) = cell.kind() {
                if kind != c.kind {
                    return Err(Error::engine(format!("column `{}` is {:?}, cell is {:?}", c.name, c.kind, kind)));
                }
            }
        }

        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn same_shape(&self, other: &Table) -> bool {
        self.columns == other.columns
    }

    fn row(&self, row: i32) -> Result<&Vec<Cell>> {
        if row < 0 || row as usize >= self.rows.len() {
            return Err(Error::engine(format!("row {} out of range ({} rows)", row, self.rows.len())));
        }
        Ok(&self.rows[row as usize])
    }

    fn column(&self, col: i32) -> Result<&Column> {
        if col < 0 || col as usize >= self.columns.len() {
            return Err(Error::engine(format!("column {} out of range ({} columns)", col, self.columns.len())));
        }
        Ok(&self.columns[col as usize])
    }

    fn cell(&self, row: i32, col: i32) -> Result<&Cell> {
        self.column(col)?;
        Ok(&self.row(row)?[col as usize])
    }
}


// Counters for asserting the ownership rules from tests.
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone, Copy, Default)]
pub struct Stats {
    pub dbs_opened: u64,
    pub dbs_closed: u64,
    pub result_sets_created: u64,
    pub releases: u64,
    pub blobs_fetched: u64,
    pub blob_frees: u64,
    pub strings_fetched: u64,
    pub string_frees: u64,
    // Double release, double free, unknown handles.
    pub faults: u64,
}


#[derive(Default)]
struct State {
    next: i64,
    dbs: HashSet<RawDb>,
    sets: HashMap<RawRs, Arc<Table>>,

    // Outstanding allocations by address.
    blobs: HashSet<usize>,
    strings: HashSet<usize>,

    fail_open: bool,
    stats: Stats,
}

impl State {
    fn token(&mut self) -> i64 {
        self.next += 1;
        self.next
    }

    fn add_set(&mut self, t: Arc<Table>) -> RawRs {
        let rs = self.token();
        self.sets.insert(rs, t);
        self.stats.result_sets_created += 1;
        rs
    }

    fn fault(&mut self, msg: String) -> Error {
        self.stats.faults += 1;
        warn!(fault = %msg, "mem engine contract violation");
        Error::Engine(msg)
    }
}


#[derive(Default)]
pub struct MemEngine {
    state: Mutex<State>,
}


impl MemEngine {
    pub fn new() -> MemEngine {
        MemEngine::default()
    }

    // `open_db` returns the invalid token, like a native open that failed.
    pub fn failing_open() -> MemEngine {
        let e = MemEngine::default();
        e.lock().fail_open = true;
        e
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn table(&self, rs: RawRs) -> Result<Arc<Table>> {
        let mut s = self.lock();
        let found = s.sets.get(&rs).cloned();
        match found {
            Some(t) => Ok(t),
            None => Err(s.fault(format!("unknown result set {}", rs)))
        }
    }

    fn cell(&self, rs: RawRs, row: i32, col: i32) -> Result<Cell> {
        let t = self.table(rs)?;
        t.cell(row, col).map(|c| c.clone())
    }

    fn type_error(&self, rs: RawRs, col: i32, wanted: ColumnType) -> Error {
        Error::engine(format!("result set {} column {} is not {:?}", rs, col, wanted))
    }

    // Registers a result set and hands out its token; the caller owns it.
    pub fn insert(&self, table: Table) -> RawRs {
        self.lock().add_set(Arc::new(table))
    }

    pub fn live_result_sets(&self) -> usize {
        self.lock().sets.len()
    }

    pub fn is_live(&self, rs: RawRs) -> bool {
        self.lock().sets.contains_key(&rs)
    }

    pub fn open_dbs(&self) -> usize {
        self.lock().dbs.len()
    }

    pub fn outstanding_blobs(&self) -> usize {
        self.lock().blobs.len()
    }

    pub fn outstanding_strings(&self) -> usize {
        self.lock().strings.len()
    }

    pub fn stats(&self) -> Stats {
        self.lock().stats
    }

    fn malloc_copy(bytes: &[u8], nul: bool) -> Result<*mut c_void> {
        let n = bytes.len() + if nul { 1 } else { 0 };

        // Never `malloc(0)`: every fetch needs a unique address to free.
        let p = unsafe { libc::malloc(n.max(1)) };
        if p.is_null() {
            return Err(Error::engine("out of memory"));
        }

        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), p as *mut u8, bytes.len());
            if nul {
                *(p as *mut u8).add(bytes.len()) = 0;
            }
        }

        Ok(p)
    }
}


impl Engine for MemEngine {
    fn open_db(&self) -> Result<RawDb> {
        let mut s = self.lock();

        if s.fail_open {
            return Ok(INVALID);
        }

        let db = s.token();
        s.dbs.insert(db);
        s.stats.dbs_opened += 1;
        Ok(db)
    }

    fn close_db(&self, db: RawDb) -> Result<()> {
        let mut s = self.lock();

        if !s.dbs.remove(&db) {
            return Err(s.fault(format!("close of unknown db {}", db)));
        }

        s.stats.dbs_closed += 1;
        Ok(())
    }

    fn release(&self, rs: RawRs) -> Result<()> {
        let mut s = self.lock();

        if s.sets.remove(&rs).is_none() {
            return Err(s.fault(format!("release of unknown result set {}", rs)));
        }

        s.stats.releases += 1;
        Ok(())
    }

    fn get_count(&self, rs: RawRs) -> Result<i32> {
        Ok(self.table(rs)?.len() as i32)
    }

    fn is_null(&self, rs: RawRs, row: i32, col: i32) -> Result<bool> {
        match self.cell(rs, row, col)? {
            Cell::Null => Ok(true),
            _ => Ok(false)
        }
    }

    fn get_boolean(&self, rs: RawRs, row: i32, col: i32) -> Result<bool> {
        match self.cell(rs, row, col)? {
            Cell::Bool(v) => Ok(v),
            Cell::Null => Ok(false),
            _ => Err(self.type_error(rs, col, ColumnType::Bool))
        }
    }

    fn get_integer(&self, rs: RawRs, row: i32, col: i32) -> Result<i32> {
        match self.cell(rs, row, col)? {
            Cell::Int(v) => Ok(v),
            Cell::Null => Ok(0),
            _ => Err(self.type_error(rs, col, ColumnType::Int))
        }
    }

    fn get_long(&self, rs: RawRs, row: i32, col: i32) -> Result<i64> {
        match self.cell(rs, row, col)? {
            Cell::Long(v) => Ok(v),
            Cell::Null => Ok(0),
            _ => Err(self.type_error(rs, col, ColumnType::Long))
        }
    }

    fn get_double(&self, rs: RawRs, row: i32, col: i32) -> Result<f64> {
        match self.cell(rs, row, col)? {
            Cell::Double(v) => Ok(v),
            Cell::Null => Ok(0.0),
            _ => Err(self.type_error(rs, col, ColumnType::Double))
        }
    }

    fn get_string(&self, rs: RawRs, row: i32, col: i32) -> Result<*mut c_char> {
        let text = match self.cell(rs, row, col)? {
            Cell::Text(v) => v,
            Cell::Null => return Ok(ptr::null_mut()),
            _ => return Err(self.type_error(rs, col, ColumnType::Text))
        };

        // Interior NULs would truncate on the reader side; the runtime's strings have none either.
        if text.as_bytes().contains(&0) {
            return Err(Error::engine("string contains NUL"));
        }

        let p = MemEngine::malloc_copy(text.as_bytes(), true)?;

        let mut s = self.lock();
        s.strings.insert(p as usize);
        s.stats.strings_fetched += 1;

        Ok(p as *mut c_char)
    }

    unsafe fn free_string(&self, p: *mut c_char) {
        let mut s = self.lock();

        if !s.strings.remove(&(p as usize)) {
            s.fault(format!("free of unknown string {:p}", p));
            return;
        }

        s.stats.string_frees += 1;
        libc::free(p as *mut c_void);
    }

    fn get_blob(&self, rs: RawRs, row: i32, col: i32) -> Result<RawBlob> {
        let bytes = match self.cell(rs, row, col)? {
            Cell::Blob(v) => v,
            Cell::Null => vec![],
            _ => return Err(self.type_error(rs, col, ColumnType::Blob))
        };

        let p = MemEngine::malloc_copy(&bytes, false)?;

        let mut s = self.lock();
        s.blobs.insert(p as usize);
        s.stats.blobs_fetched += 1;

        Ok(RawBlob { ptr: p, size: bytes.len() as i32 })
    }

    unsafe fn free_blob(&self, p: *mut c_void) {
        let mut s = self.lock();

        if !s.blobs.remove(&(p as usize)) {
            s.fault(format!("free of unknown blob {:p}", p));
            return;
        }

        s.stats.blob_frees += 1;
        libc::free(p);
    }

    fn copy_child_result_set(&self, rs: RawRs, row: i32, col: i32) -> Result<RawRs> {
        match self.cell(rs, row, col)? {
            Cell::Child(t) => Ok(self.lock().add_set(t)),
            Cell::Null => Err(Error::engine(format!("result set {} row {} column {} has no child", rs, row, col))),
            _ => Err(self.type_error(rs, col, ColumnType::Object))
        }
    }

    fn row_hash_code(&self, rs: RawRs, row: i32) -> Result<i64> {
        let t = self.table(rs)?;
        let mut h = DefaultHasher::new();

        for cell in t.row(row)? {
            cell.hash_into(&mut h);
        }

        Ok(h.finish() as i64)
    }

    fn rows_equal(&self, rs1: RawRs, row1: i32, rs2: RawRs, row2: i32) -> Result<bool> {
        let (t1, t2) = (self.table(rs1)?, self.table(rs2)?);

        if !t1.same_shape(&t2) {
            return Err(Error::engine("rows_equal on result sets with different columns"));
        }

        let (r1, r2) = (t1.row(row1)?, t2.row(row2)?);
        Ok(r1.iter().zip(r2.iter()).all(|(a, b)| a.same_value(b)))
    }

    fn rows_same(&self, rs1: RawRs, row1: i32, rs2: RawRs, row2: i32) -> Result<bool> {
        let (t1, t2) = (self.table(rs1)?, self.table(rs2)?);

        if !t1.same_shape(&t2) {
            return Err(Error::engine("rows_same on result sets with different columns"));
        }

        let identity: Vec<usize> = t1.columns.iter()
            .enumerate()
            .filter(|(_, c)| c.identity)
            .map(|(i, _)| i)
            .collect();

        if identity.is_empty() {
            return Err(Error::engine("rows_same on a result set without identity columns"));
        }

        let (r1, r2) = (t1.row(row1)?, t2.row(row2)?);
        Ok(identity.iter().all(|&i| r1[i].same_value(&r2[i])))
    }

    fn copy(&self, rs: RawRs, row: i32, count: i32) -> Result<RawRs> {
        let t = self.table(rs)?;

        let from = row as i64;
        let to = from + count as i64;
        if from < 0 || count < 0 || to > t.len() as i64 {
            return Err(Error::engine(format!("copy of rows [{}, {}) from {} rows", from, to, t.len())));
        }

        let copied = Table {
            columns: t.columns.clone(),
            rows: t.rows[from as usize..to as usize].to_vec(),
        };

        Ok(self.lock().add_set(Arc::new(copied)))
    }

    fn get_is_encoded(&self, rs: RawRs, col: i32) -> Result<bool> {
        Ok(self.table(rs)?.column(col)?.encoded)
    }
}


impl Drop for MemEngine {
    fn drop(&mut self) {
        let s = self.lock();

        // Leaked allocations still belong to libc.
        for p in s.blobs.iter().chain(s.strings.iter()) {
            unsafe { libc::free(*p as *mut c_void) };
        }
    }
}
