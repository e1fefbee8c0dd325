use cqlrt_ffi::{
    Db,
    EncodedString,
    RawRs,
    Result,
    ResultSet,
    ViewModel,
};

use crate::procs::Arg;


// Row accessors for the sample procedures, one type per result shape.
// - Each type owns its `ResultSet`, dropping it releases the native result set.
// - Column numbers are the order of the procedure's outputs.

pub mod col {
    pub const RESULT_CODE: i32 = 0;

    pub const OUT_ARG_T: i32 = 0;
    pub const OUT_ARG_Y: i32 = 1;
    pub const OUT_ARG_Z: i32 = 2;

    pub const TEST: i32 = 0;
    pub const TEST_BLOB: i32 = 1;
    pub const FIB_RESULT: i32 = 0;
    pub const X: i32 = 0;
    pub const DEMO_RESULT_SET: i32 = 1;

    pub const NAME: i32 = 0;
    pub const BYTES: i32 = 1;
    pub const AGE: i32 = 2;
    pub const THING: i32 = 3;
    pub const KEY1: i32 = 4;
    pub const KEY2: i32 = 5;
    pub const MY_CHILD_RESULT: i32 = 6;

    pub const IROW: i32 = 0;
    pub const CHILD_T: i32 = 1;
}


// `check_*` procedures: a single row holding the result code.
pub struct ResultCodeRow<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for ResultCodeRow<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> ResultCodeRow<'db> {
    pub fn from_raw(db: &'db Db, rs: RawRs) -> Result<ResultCodeRow<'db>> {
        Ok(ResultCodeRow { rs: db.result_set(rs)? })
    }

    pub fn get_result_code(&self) -> Result<i32> {
        self.rs.get_integer(0, col::RESULT_CODE)
    }
}


pub struct OutArgThing<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for OutArgThing<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> OutArgThing<'db> {
    pub fn from_raw(db: &'db Db, rs: RawRs) -> Result<OutArgThing<'db>> {
        Ok(OutArgThing { rs: db.result_set(rs)? })
    }

    pub fn get_t(&self) -> Result<String> {
        self.rs.get_string(0, col::OUT_ARG_T)
    }

    pub fn get_y(&self) -> Result<i32> {
        self.rs.get_integer(0, col::OUT_ARG_Y)
    }

    pub fn get_z(&self) -> Result<i32> {
        self.rs.get_integer(0, col::OUT_ARG_Z)
    }
}


// `out_*` and `in_out_*` procedures: one `test` column of the argument's type.
pub struct EchoRow<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for EchoRow<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> EchoRow<'db> {
    pub fn from_raw(db: &'db Db, rs: RawRs) -> Result<EchoRow<'db>> {
        Ok(EchoRow { rs: db.result_set(rs)? })
    }

    // Reads `test` as the same kind as `like`.
    pub fn get_test(&self, like: &Arg) -> Result<Arg> {
        let (rs, c) = (&self.rs, col::TEST);

        let v = match like {
            Arg::Boolean(_) => Arg::Boolean(rs.get_boolean(0, c)?),
            Arg::Integer(_) => Arg::Integer(rs.get_integer(0, c)?),
            Arg::Long(_) => Arg::Long(rs.get_long(0, c)?),
            Arg::Real(_) => Arg::Real(rs.get_double(0, c)?),
            Arg::NullableBoolean(_) => Arg::NullableBoolean(rs.get_nullable_boolean(0, c)?),
            Arg::NullableInteger(_) => Arg::NullableInteger(rs.get_nullable_integer(0, c)?),
            Arg::NullableLong(_) => Arg::NullableLong(rs.get_nullable_long(0, c)?),
            Arg::NullableReal(_) => Arg::NullableReal(rs.get_nullable_double(0, c)?),
            Arg::Text(_) => Arg::Text(rs.get_nullable_string(0, c)?),
            Arg::Blob(_) => Arg::Blob(rs.get_nullable_blob(0, c)?),
        };

        Ok(v)
    }
}


pub struct BlobRow<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for BlobRow<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> BlobRow<'db> {
    pub fn from_raw(db: &'db Db, rs: RawRs) -> Result<BlobRow<'db>> {
        Ok(BlobRow { rs: db.result_set(rs)? })
    }

    pub fn get_result_code(&self) -> Result<i32> {
        self.rs.get_integer(0, col::RESULT_CODE)
    }

    pub fn get_test_blob(&self) -> Result<Option<Vec<u8>>> {
        self.rs.get_nullable_blob(0, col::TEST_BLOB)
    }
}


pub struct FibRow<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for FibRow<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> FibRow<'db> {
    pub fn from_raw(db: &'db Db, rs: RawRs) -> Result<FibRow<'db>> {
        Ok(FibRow { rs: db.result_set(rs)? })
    }

    pub fn get_result(&self) -> Result<i32> {
        self.rs.get_integer(0, col::FIB_RESULT)
    }
}


// Rows of `out` / `out union` statements: one `x` column.
pub struct XRows<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for XRows<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> XRows<'db> {
    pub fn from_raw(db: &'db Db, rs: RawRs) -> Result<XRows<'db>> {
        Ok(XRows { rs: db.result_set(rs)? })
    }

    pub fn get_x(&self, row: i32) -> Result<i32> {
        self.rs.get_integer(row, col::X)
    }
}


// `rust_demo` outputs: the result code and the query's rows.
pub struct DemoOutputs<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for DemoOutputs<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> DemoOutputs<'db> {
    pub fn from_raw(db: &'db Db, rs: RawRs) -> Result<DemoOutputs<'db>> {
        Ok(DemoOutputs { rs: db.result_set(rs)? })
    }

    pub fn get_result_code(&self) -> Result<i32> {
        self.rs.get_integer(0, col::RESULT_CODE)
    }

    pub fn get_result_set(&self) -> Result<DemoRows<'db>> {
        Ok(DemoRows { rs: self.rs.get_child_result_set(0, col::DEMO_RESULT_SET)? })
    }
}


/**
Rows of the demo query.

- `age` and `key2` are encoded columns.
- `key1, key2` are the identity columns, two rows are "the same" when both match.
**/
pub struct DemoRows<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for DemoRows<'db> {
    const HAS_IDENTITY_COLUMNS: bool = true;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> DemoRows<'db> {
    pub fn get_name(&self, row: i32) -> Result<String> {
        self.rs.get_string(row, col::NAME)
    }

    pub fn get_bytes(&self, row: i32) -> Result<Option<Vec<u8>>> {
        self.rs.get_nullable_blob(row, col::BYTES)
    }

    pub fn get_age(&self, row: i32) -> Result<i64> {
        self.rs.get_long(row, col::AGE)
    }

    pub fn get_age_is_encoded(&self) -> Result<bool> {
        self.rs.get_is_encoded(col::AGE)
    }

    pub fn get_thing(&self, row: i32) -> Result<f64> {
        self.rs.get_double(row, col::THING)
    }

    pub fn get_key1(&self, row: i32) -> Result<String> {
        self.rs.get_string(row, col::KEY1)
    }

    pub fn get_key1_is_encoded(&self) -> Result<bool> {
        self.rs.get_is_encoded(col::KEY1)
    }

    pub fn get_key2(&self, row: i32) -> Result<EncodedString> {
        self.rs.get_encoded_string(row, col::KEY2)
    }

    pub fn get_key2_is_encoded(&self) -> Result<bool> {
        self.rs.get_is_encoded(col::KEY2)
    }

    pub fn get_my_child_result(&self, row: i32) -> Result<ChildRows<'db>> {
        Ok(ChildRows { rs: self.rs.get_child_result_set(row, col::MY_CHILD_RESULT)? })
    }

    // Rows `[row, row + count)` as an independent result set.
    pub fn copy(&self, row: i32, count: i32) -> Result<DemoRows<'db>> {
        Ok(DemoRows { rs: self.rs.copy(row, count)? })
    }
}


pub struct ChildRows<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for ChildRows<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl<'db> ChildRows<'db> {
    pub fn get_irow(&self, row: i32) -> Result<i32> {
        self.rs.get_integer(row, col::IROW)
    }

    pub fn get_t(&self, row: i32) -> Result<String> {
        self.rs.get_string(row, col::CHILD_T)
    }
}
