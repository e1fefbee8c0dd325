use std::os::raw::{
    c_char,
    c_void,
};

use crate::err::Result;


// Opaque tokens handed out by the native engine.
// - Only meaningful to the engine that produced them.
// - `0` is the invalid sentinel for both kinds.
pub type RawDb = i64;
pub type RawRs = i64;

pub const INVALID: i64 = 0;


// A blob buffer allocated by the engine for one `get_blob` call.
// - The caller owns it and must pass `ptr` back to `Engine::free_blob` exactly once.
#[derive(Debug)]
pub struct RawBlob {
    pub ptr: *mut c_void,
    pub size: i32,
}


/**
The native engine as seen through its C ABI.

- One method per exported symbol of the interop shim (`c-code/cql_interop.c`).
- Rows and columns are zero based `i32`s, exactly as the ABI passes them.
- No method validates ownership; that is the job of `db::Db` and `rset::ResultSet`.
- `Send + Sync`: a shared `&ResultSet` may call in from several threads at once, so an
  implementation serializes whatever the engine itself does not (`NativeEngine` takes one
  process wide lock per call, `MemEngine` locks its state).
- The native implementation can only report failure through null handles, so most
  methods always return `Ok` there. The in-process engine (`mem::MemEngine`) reports
  every contract violation it can detect.
**/
pub trait Engine: Send + Sync {
    fn open_db(&self) -> Result<RawDb>;
    fn close_db(&self, db: RawDb) -> Result<()>;

    fn release(&self, rs: RawRs) -> Result<()>;

    fn get_count(&self, rs: RawRs) -> Result<i32>;
    fn is_null(&self, rs: RawRs, row: i32, col: i32) -> Result<bool>;

    fn get_boolean(&self, rs: RawRs, row: i32, col: i32) -> Result<bool>;
    fn get_integer(&self, rs: RawRs, row: i32, col: i32) -> Result<i32>;
    fn get_long(&self, rs: RawRs, row: i32, col: i32) -> Result<i64>;
    fn get_double(&self, rs: RawRs, row: i32, col: i32) -> Result<f64>;

    // Returns a NUL terminated copy owned by the caller, or null for a null cell.
    fn get_string(&self, rs: RawRs, row: i32, col: i32) -> Result<*mut c_char>;

    /// # Safety
    /// `s` must come from `get_string` on this engine and not have been freed.
    unsafe fn free_string(&self, s: *mut c_char);

    fn get_blob(&self, rs: RawRs, row: i32, col: i32) -> Result<RawBlob>;

    /// # Safety
    /// `blob` must come from `get_blob` on this engine and not have been freed.
    unsafe fn free_blob(&self, blob: *mut c_void);

    fn copy_child_result_set(&self, rs: RawRs, row: i32, col: i32) -> Result<RawRs>;

    fn row_hash_code(&self, rs: RawRs, row: i32) -> Result<i64>;
    fn rows_equal(&self, rs1: RawRs, row1: i32, rs2: RawRs, row2: i32) -> Result<bool>;
    fn rows_same(&self, rs1: RawRs, row1: i32, rs2: RawRs, row2: i32) -> Result<bool>;

    fn copy(&self, rs: RawRs, row: i32, count: i32) -> Result<RawRs>;

    fn get_is_encoded(&self, rs: RawRs, col: i32) -> Result<bool>;
}
