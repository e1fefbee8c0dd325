/**
Sample procedures.

- Every procedure returns a result set token for its outputs: a single row with the out and
  inout arguments, a `result_code` column first when the procedure uses the database.
  The caller owns the token and wraps it in the matching `models` type.
- Nullable scalars cross the ABI split in two, `has_value` and `value`; text is a C string or
  NULL, blobs are a pointer and length.
- `NativeSample` (feature `native`) calls the generated interop entry points,
  `MemSample` builds the same rows in a `MemEngine`.
**/

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cqlrt_ffi::mem::{
    Cell,
    Column,
    ColumnType,
    MemEngine,
    Table,
};
use cqlrt_ffi::{
    Db,
    Engine,
    RawRs,
};

use crate::{
    DemoError,
    DemoResult,
};


pub const SQLITE_OK: i32 = 0;
pub const SQLITE_ERROR: i32 = 1;


// One argument of a `check_*`, `out_*` or `in_out_*` procedure, the variant picks the procedure.
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone)]
pub enum Arg {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Real(f64),
    NullableBoolean(Option<bool>),
    NullableInteger(Option<i32>),
    NullableLong(Option<i64>),
    NullableReal(Option<f64>),
    Text(Option<String>),
    Blob(Option<Vec<u8>>),
}

impl Arg {
    pub fn same_kind(&self, other: &Arg) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    // What an `in_out_*` procedure hands back: booleans flip, numbers go up by one
    // (integers wrap at their maximum), null stays null.
    pub fn in_out(&self) -> DemoResult<Arg> {
        let v = match self {
            Arg::Boolean(v) => Arg::Boolean(!v),
            Arg::Integer(v) => Arg::Integer(v.wrapping_add(1)),
            Arg::Long(v) => Arg::Long(v.wrapping_add(1)),
            Arg::Real(v) => Arg::Real(v + 1.0),
            Arg::NullableBoolean(v) => Arg::NullableBoolean(v.map(|v| !v)),
            Arg::NullableInteger(v) => Arg::NullableInteger(v.map(|v| v.wrapping_add(1))),
            Arg::NullableLong(v) => Arg::NullableLong(v.map(|v| v.wrapping_add(1))),
            Arg::NullableReal(v) => Arg::NullableReal(v.map(|v| v + 1.0)),
            other => return Err(DemoError::Argument(format!("no in_out procedure for {:?}", other)))
        };
        Ok(v)
    }

    fn column_type(&self) -> ColumnType {
        match self {
            Arg::Boolean(_) | Arg::NullableBoolean(_) => ColumnType::Bool,
            Arg::Integer(_) | Arg::NullableInteger(_) => ColumnType::Int,
            Arg::Long(_) | Arg::NullableLong(_) => ColumnType::Long,
            Arg::Real(_) | Arg::NullableReal(_) => ColumnType::Double,
            Arg::Text(_) => ColumnType::Text,
            Arg::Blob(_) => ColumnType::Blob,
        }
    }

    fn to_cell(&self) -> Cell {
        fn or_null<T: Clone>(v: &Option<T>, f: fn(T) -> Cell) -> Cell {
            v.clone().map_or(Cell::Null, f)
        }

        match self {
            Arg::Boolean(v) => Cell::Bool(*v),
            Arg::Integer(v) => Cell::Int(*v),
            Arg::Long(v) => Cell::Long(*v),
            Arg::Real(v) => Cell::Double(*v),
            Arg::NullableBoolean(v) => or_null(v, Cell::Bool),
            Arg::NullableInteger(v) => or_null(v, Cell::Int),
            Arg::NullableLong(v) => or_null(v, Cell::Long),
            Arg::NullableReal(v) => or_null(v, Cell::Double),
            Arg::Text(v) => or_null(v, Cell::Text),
            Arg::Blob(v) => or_null(v, Cell::Blob),
        }
    }
}


#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone, Copy)]
pub enum Binding {
    Out,
    InOut,
}


pub trait SampleProcs {
    // `t` comes back prefixed, `y` incremented, `z = x + y`.
    fn out_arg_thing(&self, t: &str, x: i32, y: i32) -> DemoResult<RawRs>;

    // `result_code` is `SQLITE_OK` when both arguments are equal.
    fn check(&self, x: &Arg, y: &Arg) -> DemoResult<RawRs>;

    // `out_*` returns the argument as `test`, `in_out_*` returns `Arg::in_out`.
    fn echo(&self, binding: Binding, x: &Arg) -> DemoResult<RawRs>;

    fn create_blob_from_text(&self, db: &Db, t: &str) -> DemoResult<RawRs>;

    fn fib(&self, n: i32) -> DemoResult<RawRs>;

    // One row, `x`.
    fn out_statement(&self, x: i32) -> DemoResult<RawRs>;

    // Two rows, `x + 1` and `x + 2`.
    fn out_union_statement(&self, x: i32) -> DemoResult<RawRs>;

    // `result_code` and the demo query's rows as a nested result set.
    fn rust_demo(&self, db: &Db) -> DemoResult<RawRs>;
}


// Engine and procedures the binary runs against.
#[cfg(not(feature = "native"))]
pub fn backend() -> (Arc<dyn Engine>, Box<dyn SampleProcs>) {
    let sample = MemSample::new();
    let engine: Arc<dyn Engine> = sample.engine();
    (engine, Box::new(sample))
}

#[cfg(feature = "native")]
pub fn backend() -> (Arc<dyn Engine>, Box<dyn SampleProcs>) {
    (Arc::new(cqlrt_ffi::native::NativeEngine::new()), Box::new(native::NativeSample))
}


pub struct MemSample {
    engine: Arc<MemEngine>,
}

impl Default for MemSample {
    fn default() -> Self {
        MemSample::new()
    }
}

impl MemSample {
    pub fn new() -> MemSample {
        MemSample {
            engine: Arc::new(MemEngine::new()),
        }
    }

    // Open the `Db` on this engine, tokens from the procedures are only known here.
    pub fn engine(&self) -> Arc<MemEngine> {
        self.engine.clone()
    }

    fn insert(&self, columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> DemoResult<RawRs> {
        let t = Table::with_rows(columns, rows)?;
        Ok(self.engine.insert(t))
    }

    fn result_code(&self, rc: i32) -> DemoResult<RawRs> {
        self.insert(vec![Column::new("result_code", ColumnType::Int)], vec![vec![Cell::Int(rc)]])
    }

    fn x_rows(&self, xs: &[i32]) -> DemoResult<RawRs> {
        let rows = xs.iter().map(|x| vec![Cell::Int(*x)]).collect();
        self.insert(vec![Column::new("x", ColumnType::Int)], rows)
    }
}

fn fib(n: i32) -> i32 {
    match n {
        n if n <= 0 => 0,
        1 | 2 => 1,
        n => fib(n - 1) + fib(n - 2)
    }
}

// `n` rows: `irow` counts from 1, `t` is `irow` quoted.
fn child_rows(n: i32) -> DemoResult<Table> {
    let cols = vec![
        Column::new("irow", ColumnType::Int),
        Column::new("t", ColumnType::Text),
    ];

    let rows = (1..=n)
        .map(|irow| vec![Cell::Int(irow), Cell::Text(format!("'{}'", irow))])
        .collect();

    Ok(Table::with_rows(cols, rows)?)
}

const DEMO_ROWS: i32 = 5;

fn demo_rows() -> DemoResult<Table> {
    let cols = vec![
        Column::new("name", ColumnType::Text),
        Column::new("bytes", ColumnType::Blob),
        Column::new("age", ColumnType::Long).encoded(),
        Column::new("thing", ColumnType::Double),
        Column::new("key1", ColumnType::Text).identity(),
        Column::new("key2", ColumnType::Text).encoded().identity(),
        Column::new("my_child_result", ColumnType::Object),
    ];

    let mut t = Table::new(cols);
    for i in 0..DEMO_ROWS {
        t.push_row(vec![
            Cell::Text(format!("name_{}", i)),
            Cell::Blob(format!("blob_{}", i).into_bytes()),
            Cell::Long(20 + i as i64),
            Cell::Double(i as f64 * 1.5),
            Cell::Text(format!("k1_{}", i)),
            Cell::Text(format!("k2_{}", i)),
            Cell::Child(Arc::new(child_rows(i + 1)?)),
        ])?;
    }

    Ok(t)
}

impl SampleProcs for MemSample {
    fn out_arg_thing(&self, t: &str, x: i32, y: i32) -> DemoResult<RawRs> {
        let cols = vec![
            Column::new("t", ColumnType::Text),
            Column::new("y", ColumnType::Int),
            Column::new("z", ColumnType::Int),
        ];

        self.insert(cols, vec![vec![
            Cell::Text(format!("prefix_{}", t)),
            Cell::Int(y + 1),
            Cell::Int(x + y),
        ]])
    }

    fn check(&self, x: &Arg, y: &Arg) -> DemoResult<RawRs> {
        if !x.same_kind(y) {
            return Err(DemoError::Argument(format!("check of {:?} against {:?}", x, y)));
        }

        self.result_code(if x == y { SQLITE_OK } else { SQLITE_ERROR })
    }

    fn echo(&self, binding: Binding, x: &Arg) -> DemoResult<RawRs> {
        let v = match binding {
            Binding::Out => x.clone(),
            Binding::InOut => x.in_out()?,
        };

        self.insert(vec![Column::new("test", v.column_type())], vec![vec![v.to_cell()]])
    }

    fn create_blob_from_text(&self, _db: &Db, t: &str) -> DemoResult<RawRs> {
        let cols = vec![
            Column::new("result_code", ColumnType::Int),
            Column::new("test_blob", ColumnType::Blob),
        ];

        self.insert(cols, vec![vec![Cell::Int(SQLITE_OK), Cell::Blob(t.as_bytes().to_vec())]])
    }

    fn fib(&self, n: i32) -> DemoResult<RawRs> {
        self.insert(vec![Column::new("result", ColumnType::Int)], vec![vec![Cell::Int(fib(n))]])
    }

    fn out_statement(&self, x: i32) -> DemoResult<RawRs> {
        self.x_rows(&[x])
    }

    fn out_union_statement(&self, x: i32) -> DemoResult<RawRs> {
        self.x_rows(&[x + 1, x + 2])
    }

    fn rust_demo(&self, _db: &Db) -> DemoResult<RawRs> {
        let cols = vec![
            Column::new("result_code", ColumnType::Int),
            Column::new("result_set", ColumnType::Object),
        ];

        let rows = Arc::new(demo_rows()?);
        self.insert(cols, vec![vec![Cell::Int(SQLITE_OK), Cell::Child(rows)]])
    }
}


#[cfg(feature = "native")]
pub mod native {
    use std::convert::TryFrom;
    use std::ffi::CString;
    use std::os::raw::{
        c_char,
        c_void,
    };
    use std::ptr;

    use cqlrt_ffi::{
        Db,
        RawDb,
        RawRs,
    };

    use super::{
        Arg,
        Binding,
        SampleProcs,
    };
    use crate::{
        DemoError,
        DemoResult,
    };


    // Interop entry points generated from the sample procedures, compiled in through `CQL_GENERATED`.
    #[allow(non_snake_case)]
    extern "C" {
        fn Sample_OutArgThing(t: *const c_char, x: i32, y: i32) -> RawRs;

        fn Sample_CheckBoolean(x: bool, y: bool) -> RawRs;
        fn Sample_CheckInteger(x: i32, y: i32) -> RawRs;
        fn Sample_CheckLong(x: i64, y: i64) -> RawRs;
        fn Sample_CheckReal(x: f64, y: f64) -> RawRs;
        fn Sample_CheckNullableBoolean(x_has_value: bool, x_value: bool, y_has_value: bool, y_value: bool) -> RawRs;
        fn Sample_CheckNullableInteger(x_has_value: bool, x_value: i32, y_has_value: bool, y_value: i32) -> RawRs;
        fn Sample_CheckNullableLong(x_has_value: bool, x_value: i64, y_has_value: bool, y_value: i64) -> RawRs;
        fn Sample_CheckNullableReal(x_has_value: bool, x_value: f64, y_has_value: bool, y_value: f64) -> RawRs;
        fn Sample_CheckText(x: *const c_char, y: *const c_char) -> RawRs;
        fn Sample_CheckBlob(x: *const c_void, x_len: i32, y: *const c_void, y_len: i32) -> RawRs;

        fn Sample_OutBoolean(x: bool) -> RawRs;
        fn Sample_OutInteger(x: i32) -> RawRs;
        fn Sample_OutLong(x: i64) -> RawRs;
        fn Sample_OutReal(x: f64) -> RawRs;
        fn Sample_OutNullableBoolean(x_has_value: bool, x_value: bool) -> RawRs;
        fn Sample_OutNullableInteger(x_has_value: bool, x_value: i32) -> RawRs;
        fn Sample_OutNullableLong(x_has_value: bool, x_value: i64) -> RawRs;
        fn Sample_OutNullableReal(x_has_value: bool, x_value: f64) -> RawRs;

        fn Sample_InOutBoolean(x: bool) -> RawRs;
        fn Sample_InOutInteger(x: i32) -> RawRs;
        fn Sample_InOutLong(x: i64) -> RawRs;
        fn Sample_InOutReal(x: f64) -> RawRs;
        fn Sample_InOutNullableBoolean(x_has_value: bool, x_value: bool) -> RawRs;
        fn Sample_InOutNullableInteger(x_has_value: bool, x_value: i32) -> RawRs;
        fn Sample_InOutNullableLong(x_has_value: bool, x_value: i64) -> RawRs;
        fn Sample_InOutNullableReal(x_has_value: bool, x_value: f64) -> RawRs;

        fn Sample_CreateBlobFromText(db: RawDb, t: *const c_char) -> RawRs;
        fn Sample_Fib(n: i32) -> RawRs;
        fn Sample_OutStatement(x: i32) -> RawRs;
        fn Sample_OutUnionStatement(x: i32) -> RawRs;
        fn Sample_RustDemo(db: RawDb) -> RawRs;
    }


    fn split<T: Copy + Default>(v: &Option<T>) -> (bool, T) {
        match *v {
            Some(x) => (true, x),
            None => (false, T::default())
        }
    }

    fn c_text(s: &str) -> DemoResult<CString> {
        CString::new(s).map_err(|e| DemoError::Argument(e.to_string()))
    }

    fn c_nullable_text(s: &Option<String>) -> DemoResult<Option<CString>> {
        match s {
            Some(s) => Ok(Some(c_text(s)?)),
            None => Ok(None)
        }
    }

    fn text_ptr(s: &Option<CString>) -> *const c_char {
        s.as_ref().map_or(ptr::null(), |s| s.as_ptr())
    }

    fn blob_parts(b: &Option<Vec<u8>>) -> DemoResult<(*const c_void, i32)> {
        match b {
            Some(b) => {
                let len = i32::try_from(b.len()).map_err(|e| DemoError::Argument(e.to_string()))?;
                Ok((b.as_ptr() as *const c_void, len))
            }
            None => Ok((ptr::null(), 0))
        }
    }


    pub struct NativeSample;

    impl SampleProcs for NativeSample {
        fn out_arg_thing(&self, t: &str, x: i32, y: i32) -> DemoResult<RawRs> {
            let t = c_text(t)?;
            Ok(unsafe { Sample_OutArgThing(t.as_ptr(), x, y) })
        }

        fn check(&self, x: &Arg, y: &Arg) -> DemoResult<RawRs> {
            let rs = match (x, y) {
                (Arg::Boolean(a), Arg::Boolean(b)) => unsafe { Sample_CheckBoolean(*a, *b) },
                (Arg::Integer(a), Arg::Integer(b)) => unsafe { Sample_CheckInteger(*a, *b) },
                (Arg::Long(a), Arg::Long(b)) => unsafe { Sample_CheckLong(*a, *b) },
                (Arg::Real(a), Arg::Real(b)) => unsafe { Sample_CheckReal(*a, *b) },
                (Arg::NullableBoolean(a), Arg::NullableBoolean(b)) => {
                    let (a, b) = (split(a), split(b));
                    unsafe { Sample_CheckNullableBoolean(a.0, a.1, b.0, b.1) }
                }
                (Arg::NullableInteger(a), Arg::NullableInteger(b)) => {
                    let (a, b) = (split(a), split(b));
                    unsafe { Sample_CheckNullableInteger(a.0, a.1, b.0, b.1) }
                }
                (Arg::NullableLong(a), Arg::NullableLong(b)) => {
                    let (a, b) = (split(a), split(b));
                    unsafe { Sample_CheckNullableLong(a.0, a.1, b.0, b.1) }
                }
                (Arg::NullableReal(a), Arg::NullableReal(b)) => {
                    let (a, b) = (split(a), split(b));
                    unsafe { Sample_CheckNullableReal(a.0, a.1, b.0, b.1) }
                }
                (Arg::Text(a), Arg::Text(b)) => {
                    // Both CStrings live until the call returns.
                    let (a, b) = (c_nullable_text(a)?, c_nullable_text(b)?);
                    unsafe { Sample_CheckText(text_ptr(&a), text_ptr(&b)) }
                }
                (Arg::Blob(a), Arg::Blob(b)) => {
                    let (a, b) = (blob_parts(a)?, blob_parts(b)?);
                    unsafe { Sample_CheckBlob(a.0, a.1, b.0, b.1) }
                }
                _ => return Err(DemoError::Argument(format!("check of {:?} against {:?}", x, y)))
            };

            Ok(rs)
        }

        fn echo(&self, binding: Binding, x: &Arg) -> DemoResult<RawRs> {
            use Binding::{
                InOut,
                Out,
            };

            let rs = match (binding, x) {
                (Out, Arg::Boolean(v)) => unsafe { Sample_OutBoolean(*v) },
                (Out, Arg::Integer(v)) => unsafe { Sample_OutInteger(*v) },
                (Out, Arg::Long(v)) => unsafe { Sample_OutLong(*v) },
                (Out, Arg::Real(v)) => unsafe { Sample_OutReal(*v) },
                (Out, Arg::NullableBoolean(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_OutNullableBoolean(h, v) }
                }
                (Out, Arg::NullableInteger(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_OutNullableInteger(h, v) }
                }
                (Out, Arg::NullableLong(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_OutNullableLong(h, v) }
                }
                (Out, Arg::NullableReal(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_OutNullableReal(h, v) }
                }
                (InOut, Arg::Boolean(v)) => unsafe { Sample_InOutBoolean(*v) },
                (InOut, Arg::Integer(v)) => unsafe { Sample_InOutInteger(*v) },
                (InOut, Arg::Long(v)) => unsafe { Sample_InOutLong(*v) },
                (InOut, Arg::Real(v)) => unsafe { Sample_InOutReal(*v) },
                (InOut, Arg::NullableBoolean(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_InOutNullableBoolean(h, v) }
                }
                (InOut, Arg::NullableInteger(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_InOutNullableInteger(h, v) }
                }
                (InOut, Arg::NullableLong(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_InOutNullableLong(h, v) }
                }
                (InOut, Arg::NullableReal(v)) => {
                    let (h, v) = split(v);
                    unsafe { Sample_InOutNullableReal(h, v) }
                }
                (_, other) => return Err(DemoError::Argument(format!("no {:?} procedure for {:?}", binding, other)))
            };

            Ok(rs)
        }

        fn create_blob_from_text(&self, db: &Db, t: &str) -> DemoResult<RawRs> {
            let t = c_text(t)?;
            Ok(unsafe { Sample_CreateBlobFromText(db.raw(), t.as_ptr()) })
        }

        fn fib(&self, n: i32) -> DemoResult<RawRs> {
            Ok(unsafe { Sample_Fib(n) })
        }

        fn out_statement(&self, x: i32) -> DemoResult<RawRs> {
            Ok(unsafe { Sample_OutStatement(x) })
        }

        fn out_union_statement(&self, x: i32) -> DemoResult<RawRs> {
            Ok(unsafe { Sample_OutUnionStatement(x) })
        }

        fn rust_demo(&self, db: &Db) -> DemoResult<RawRs> {
            Ok(unsafe { Sample_RustDemo(db.raw()) })
        }
    }
}
