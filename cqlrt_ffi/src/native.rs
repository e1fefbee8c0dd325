use std::os::raw::{
    c_char,
    c_void,
};

use tracing::debug;

use crate::cffi::*;
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
use crate::fns::serialized;


// The CQL runtime behind the C shim.
// - Reference counts in the runtime are plain integers, so every call into the shim runs under
//   one process wide lock (`fns::serialized`), across all `NativeEngine` values.
// - Contract violations inside the runtime (`cql_contract`) abort the process; they cannot be
//   turned into `Err`. `rset::ResultSet` checks rows before calling in for that reason.
#[derive(Debug, Default)]
pub struct NativeEngine;


impl NativeEngine {
    pub fn new() -> NativeEngine {
        NativeEngine
    }
}


fn non_null_rs(raw: RawRs, what: &str) -> Result<RawRs> {
    if raw == INVALID {
        return Err(Error::engine(format!("{} returned a null result set", what)));
    }
    Ok(raw)
}


impl Engine for NativeEngine {
    fn open_db(&self) -> Result<RawDb> {
        let db = serialized(|| unsafe { cql_interop_open_db() });
        if db == INVALID {
            return Err(Error::OpenFailed);
        }
        debug!(db = db, "native db opened");
        Ok(db)
    }

    fn close_db(&self, db: RawDb) -> Result<()> {
        serialized(|| unsafe { cql_interop_close_db(db) });
        Ok(())
    }

    fn release(&self, rs: RawRs) -> Result<()> {
        serialized(|| unsafe { cql_interop_release(rs) });
        Ok(())
    }

    fn get_count(&self, rs: RawRs) -> Result<i32> {
        Ok(serialized(|| unsafe { cql_interop_get_count(rs) }))
    }

    fn is_null(&self, rs: RawRs, row: i32, col: i32) -> Result<bool> {
        Ok(serialized(|| unsafe { cql_interop_is_null(rs, row, col) }))
    }

    fn get_boolean(&self, rs: RawRs, row: i32, col: i32) -> Result<bool> {
        Ok(serialized(|| unsafe { cql_interop_get_boolean(rs, row, col) }))
    }

    fn get_integer(&self, rs: RawRs, row: i32, col: i32) -> Result<i32> {
        Ok(serialized(|| unsafe { cql_interop_get_integer(rs, row, col) }))
    }

    fn get_long(&self, rs: RawRs, row: i32, col: i32) -> Result<i64> {
        Ok(serialized(|| unsafe { cql_interop_get_long(rs, row, col) }))
    }

    fn get_double(&self, rs: RawRs, row: i32, col: i32) -> Result<f64> {
        Ok(serialized(|| unsafe { cql_interop_get_double(rs, row, col) }))
    }

    fn get_string(&self, rs: RawRs, row: i32, col: i32) -> Result<*mut c_char> {
        Ok(serialized(|| unsafe { cql_interop_get_string(rs, row, col) }))
    }

    unsafe fn free_string(&self, s: *mut c_char) {
        libc::free(s as *mut libc::c_void);
    }

    fn get_blob(&self, rs: RawRs, row: i32, col: i32) -> Result<RawBlob> {
        let mut size: i32 = 0;
        let ptr = serialized(|| unsafe { cql_interop_get_blob(rs, row, col, &mut size) });

        // `malloc(0)` may legally return null; the shim never returns null for a non-empty blob.
        if ptr.is_null() && size > 0 {
            return Err(Error::engine("blob allocation failed"));
        }

        Ok(RawBlob { ptr, size })
    }

    unsafe fn free_blob(&self, blob: *mut c_void) {
        serialized(|| cql_interop_free_blob(blob));
    }

    fn copy_child_result_set(&self, rs: RawRs, row: i32, col: i32) -> Result<RawRs> {
        non_null_rs(serialized(|| unsafe { cql_interop_copy_child_result_set(rs, row, col) }), "copy_child_result_set")
    }

    fn row_hash_code(&self, rs: RawRs, row: i32) -> Result<i64> {
        Ok(serialized(|| unsafe { cql_interop_row_hash_code(rs, row) }))
    }

    fn rows_equal(&self, rs1: RawRs, row1: i32, rs2: RawRs, row2: i32) -> Result<bool> {
        Ok(serialized(|| unsafe { cql_interop_rows_equal(rs1, row1, rs2, row2) }))
    }

    fn rows_same(&self, rs1: RawRs, row1: i32, rs2: RawRs, row2: i32) -> Result<bool> {
        Ok(serialized(|| unsafe { cql_interop_rows_same(rs1, row1, rs2, row2) }))
    }

    fn copy(&self, rs: RawRs, row: i32, count: i32) -> Result<RawRs> {
        non_null_rs(serialized(|| unsafe { cql_interop_copy(rs, row, count) }), "copy")
    }

    fn get_is_encoded(&self, rs: RawRs, col: i32) -> Result<bool> {
        Ok(serialized(|| unsafe { cql_interop_get_is_encoded(rs, col) }))
    }
}
