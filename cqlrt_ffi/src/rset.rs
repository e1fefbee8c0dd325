use std::fmt;

use tracing::{
    debug,
    error,
};

use crate::config::NullPolicy;
use crate::db::Db;
use crate::encoded::EncodedString;
use crate::engine::{
    Engine,
    RawRs,
    INVALID,
};
use crate::err::{
    Error,
    Result,
};
use crate::fns::{
    BlobGuard,
    CStrGuard,
};


// Move only owner of one native result set token.
// - Not `Clone`/`Copy`: two owners would release twice.
// - `take` resets to the invalid sentinel, so a second release finds nothing to do.
#[derive(Debug)]
#[derive(PartialEq)]
pub struct RsHandle(RawRs);

impl RsHandle {
    pub fn get(&self) -> Option<RawRs> {
        match self.0 {
            INVALID => None,
            raw => Some(raw)
        }
    }

    pub fn take(&mut self) -> Option<RawRs> {
        let raw = self.get();
        self.0 = INVALID;
        raw
    }
}


/**
Safe owner of a native result set.

- Every accessor takes a zero based `(row, col)`; rows are checked against the count read
  at construction (the count of a result set never changes), columns are checked by the engine.
- Accessors on a closed result set return `Error::Closed` instead of reading freed memory.
- Derived result sets (`copy`, `get_child_result_set`) own new, independent tokens. Closing the
  parent does not close them, and the other way around.
- Released exactly once: by `close` or, failing that, by `drop`.
- `&ResultSet` may be shared between threads; the engine serializes the calls.
**/
pub struct ResultSet<'db> {
    db: &'db Db,
    handle: RsHandle,
    count: i32,
}


impl fmt::Debug for ResultSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("handle", &self.handle)
            .field("count", &self.count)
            .finish()
    }
}


impl<'db> ResultSet<'db> {
    // Takes ownership of `raw`, including when reading the count fails.
    pub fn from_raw(db: &'db Db, raw: RawRs) -> Result<ResultSet<'db>> {
        if raw == INVALID {
            return Err(Error::NullResultSet);
        }

        let mut rs = ResultSet {
            db,
            handle: RsHandle(raw),
            count: 0,
        };

        rs.count = db.engine().get_count(raw)?;
        Ok(rs)
    }

    fn engine(&self) -> &'db dyn Engine {
        self.db.engine()
    }

    fn raw(&self) -> Result<RawRs> {
        self.handle.get().ok_or(Error::Closed)
    }

    fn check_row(&self, row: i32) -> Result<()> {
        if row < 0 || row >= self.count {
            return Err(Error::RowOutOfRange { row, count: self.count });
        }
        Ok(())
    }

    // Open handle for a cell in range.
    fn cell(&self, row: i32) -> Result<RawRs> {
        let rs = self.raw()?;
        self.check_row(row)?;
        Ok(rs)
    }

    fn check_not_null(&self, rs: RawRs, row: i32, col: i32) -> Result<()> {
        if let NullPolicy::FailFast = self.db.config().null_policy {
            if self.engine().is_null(rs, row, col)? {
                return Err(Error::NullValue { row, col });
            }
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.handle.get().is_none()
    }

    pub fn get_count(&self) -> Result<i32> {
        self.raw()?;
        Ok(self.count)
    }

    pub fn is_null(&self, row: i32, col: i32) -> Result<bool> {
        let rs = self.cell(row)?;
        self.engine().is_null(rs, row, col)
    }

    pub fn get_boolean(&self, row: i32, col: i32) -> Result<bool> {
        let rs = self.cell(row)?;
        self.check_not_null(rs, row, col)?;
        self.engine().get_boolean(rs, row, col)
    }

    pub fn get_integer(&self, row: i32, col: i32) -> Result<i32> {
        let rs = self.cell(row)?;
        self.check_not_null(rs, row, col)?;
        self.engine().get_integer(rs, row, col)
    }

    pub fn get_long(&self, row: i32, col: i32) -> Result<i64> {
        let rs = self.cell(row)?;
        self.check_not_null(rs, row, col)?;
        self.engine().get_long(rs, row, col)
    }

    pub fn get_double(&self, row: i32, col: i32) -> Result<f64> {
        let rs = self.cell(row)?;
        self.check_not_null(rs, row, col)?;
        self.engine().get_double(rs, row, col)
    }

    // A null cell reads as "" unless the null policy is fail fast.
    pub fn get_string(&self, row: i32, col: i32) -> Result<String> {
        let rs = self.cell(row)?;
        self.check_not_null(rs, row, col)?;
        Ok(self.fetch_string(rs, row, col)?.unwrap_or_default())
    }

    fn fetch_string(&self, rs: RawRs, row: i32, col: i32) -> Result<Option<String>> {
        let s = self.engine().get_string(rs, row, col)?;
        let guard = CStrGuard::new(self.engine(), s);
        Ok(guard.to_owned_string())
    }

    pub fn get_nullable_boolean(&self, row: i32, col: i32) -> Result<Option<bool>> {
        if self.is_null(row, col)? {
            return Ok(None);
        }
        self.get_boolean(row, col).map(Some)
    }

    pub fn get_nullable_integer(&self, row: i32, col: i32) -> Result<Option<i32>> {
        if self.is_null(row, col)? {
            return Ok(None);
        }
        self.get_integer(row, col).map(Some)
    }

    pub fn get_nullable_long(&self, row: i32, col: i32) -> Result<Option<i64>> {
        if self.is_null(row, col)? {
            return Ok(None);
        }
        self.get_long(row, col).map(Some)
    }

    pub fn get_nullable_double(&self, row: i32, col: i32) -> Result<Option<f64>> {
        if self.is_null(row, col)? {
            return Ok(None);
        }
        self.get_double(row, col).map(Some)
    }

    pub fn get_nullable_string(&self, row: i32, col: i32) -> Result<Option<String>> {
        if self.is_null(row, col)? {
            return Ok(None);
        }
        self.get_string(row, col).map(Some)
    }

    // The native buffer is copied and freed before returning, including for zero length blobs.
    pub fn get_blob(&self, row: i32, col: i32) -> Result<Vec<u8>> {
        let rs = self.cell(row)?;
        self.check_not_null(rs, row, col)?;

        let blob = self.engine().get_blob(rs, row, col)?;
        let guard = BlobGuard::new(self.engine(), blob);

        guard.to_vec()
    }

    pub fn get_nullable_blob(&self, row: i32, col: i32) -> Result<Option<Vec<u8>>> {
        if self.is_null(row, col)? {
            return Ok(None);
        }
        self.get_blob(row, col).map(Some)
    }

    // Redaction is only a Rust side presentation rule, the engine returns the plain string.
    pub fn get_encoded_string(&self, row: i32, col: i32) -> Result<EncodedString> {
        self.get_string(row, col).map(EncodedString::new)
    }

    pub fn get_nullable_encoded_string(&self, row: i32, col: i32) -> Result<Option<EncodedString>> {
        if self.is_null(row, col)? {
            return Ok(None);
        }
        self.get_encoded_string(row, col).map(Some)
    }

    pub fn get_child_result_set(&self, row: i32, col: i32) -> Result<ResultSet<'db>> {
        let rs = self.cell(row)?;
        let child = self.engine().copy_child_result_set(rs, row, col)?;
        ResultSet::from_raw(self.db, child)
    }

    pub fn get_is_encoded(&self, col: i32) -> Result<bool> {
        let rs = self.raw()?;
        self.engine().get_is_encoded(rs, col)
    }

    pub fn row_hash_code(&self, row: i32) -> Result<i64> {
        let rs = self.cell(row)?;
        self.engine().row_hash_code(rs, row)
    }

    fn pair(&self, row1: i32, other: &ResultSet<'_>, row2: i32) -> Result<(RawRs, RawRs)> {
        let rs1 = self.cell(row1)?;
        let rs2 = other.cell(row2)?;

        if !self.db.same_engine(other.db) {
            return Err(Error::EngineMismatch);
        }

        Ok((rs1, rs2))
    }

    pub fn rows_equal(&self, row1: i32, other: &ResultSet<'_>, row2: i32) -> Result<bool> {
        let (rs1, rs2) = self.pair(row1, other, row2)?;
        self.engine().rows_equal(rs1, row1, rs2, row2)
    }

    // Direct delegation; identity column gating happens in `view_model::ViewModel::rows_same`.
    pub fn rows_same(&self, row1: i32, other: &ResultSet<'_>, row2: i32) -> Result<bool> {
        let (rs1, rs2) = self.pair(row1, other, row2)?;
        self.engine().rows_same(rs1, row1, rs2, row2)
    }

    // New result set over rows `[row, row + count)`.
    pub fn copy(&self, row: i32, count: i32) -> Result<ResultSet<'db>> {
        let rs = self.raw()?;

        let in_bounds = row >= 0 && count >= 0 && (row as i64) + (count as i64) <= self.count as i64;
        if !in_bounds {
            return Err(Error::RangeOutOfBounds { row, len: count, count: self.count });
        }

        let copied = self.engine().copy(rs, row, count)?;
        ResultSet::from_raw(self.db, copied)
    }

    // Hands the token to the caller without releasing it.
    pub fn into_raw(mut self) -> Result<RawRs> {
        self.handle.take().ok_or(Error::Closed)
    }

    // Idempotent: only the first call reaches the engine.
    pub fn close(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(raw) => {
                debug!(rs = raw, "result set released");
                self.engine().release(raw)
            }
            None => Ok(())
        }
    }
}


impl Drop for ResultSet<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(error = %e, "result set release failed during drop");
        }
    }
}
