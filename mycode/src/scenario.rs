use chrono::{
    DateTime,
    Utc,
};
use serde::{Deserialize, Serialize};
use tracing::{
    debug,
    info,
};

use cqlrt_ffi::{
    Db,
    ViewModel,
};

use crate::models::{
    BlobRow,
    DemoOutputs,
    DemoRows,
    EchoRow,
    FibRow,
    OutArgThing,
    ResultCodeRow,
    XRows,
};
use crate::procs::{
    Arg,
    Binding,
    SampleProcs,
    SQLITE_ERROR,
    SQLITE_OK,
};
use crate::{
    DemoError,
    DemoResult,
};


pub const EXPECTED_DEMO_ROWS: i32 = 5;


#[derive(Debug)]
#[derive(Serialize, Deserialize)]
#[derive(Clone)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    // Expectations that held.
    pub checks: u32,
    pub fib_10: i32,
    pub demo: Vec<DemoRowReport>,
}


// `key2` is encoded, only its redacted form is reported.
#[derive(Debug)]
#[derive(Serialize, Deserialize)]
#[derive(Clone)]
pub struct DemoRowReport {
    pub name: String,
    pub blob: String,
    pub age: i64,
    pub age_encoded: bool,
    pub thing: f64,
    pub key1: String,
    pub key2: String,
    pub key2_encoded: bool,
    pub children: Vec<ChildRowReport>,
}


#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone)]
pub struct ChildRowReport {
    pub irow: i32,
    pub t: String,
}


#[derive(Default)]
struct Checks {
    passed: u32,
}

impl Checks {
    fn expect(&mut self, ok: bool, msg: &str) -> DemoResult<()> {
        if !ok {
            return Err(DemoError::Expectation(msg.to_string()));
        }
        self.passed += 1;
        Ok(())
    }

    fn check(&mut self, db: &Db, procs: &dyn SampleProcs, x: Arg, y: Arg, rc: i32) -> DemoResult<()> {
        let row = ResultCodeRow::from_raw(db, procs.check(&x, &y)?)?;
        self.expect(row.get_result_code()? == rc, &format!("check of {:?} against {:?}", x, y))
    }

    fn echo(&mut self, db: &Db, procs: &dyn SampleProcs, binding: Binding, x: Arg) -> DemoResult<()> {
        let expected = match binding {
            Binding::Out => x.clone(),
            Binding::InOut => x.in_out()?,
        };

        let row = EchoRow::from_raw(db, procs.echo(binding, &x)?)?;
        let got = row.get_test(&expected)?;
        self.expect(got == expected, &format!("mismatched {:?} of {:?}, got {:?}", binding, x, got))
    }
}


// Arguments passed to both sides of a `check_*` procedure.
fn check_args() -> Vec<Arg> {
    vec![
        Arg::Boolean(true),
        Arg::Integer(1234),
        Arg::Long(12345),
        Arg::Real(2.5),
        Arg::NullableBoolean(Some(true)),
        Arg::NullableInteger(Some(1234)),
        Arg::NullableLong(Some(12345)),
        Arg::NullableReal(Some(2.5)),
        Arg::NullableBoolean(None),
        Arg::NullableInteger(None),
        Arg::NullableLong(None),
        Arg::NullableReal(None),
        Arg::Text(Some("foo".to_string())),
        Arg::Text(None),
    ]
}

fn echo_args() -> Vec<Arg> {
    vec![
        Arg::Boolean(true),
        Arg::Integer(123),
        Arg::Long(456),
        Arg::Real(8.5),
        Arg::NullableBoolean(Some(false)),
        Arg::NullableInteger(Some(1234)),
        Arg::NullableLong(Some(4567)),
        Arg::NullableReal(Some(8.25)),
        Arg::NullableBoolean(None),
        Arg::NullableInteger(None),
        Arg::NullableLong(None),
        Arg::NullableReal(None),
    ]
}


// Calls every sample procedure and checks its outputs, the first failed expectation ends the run.
pub fn run(db: &Db, procs: &dyn SampleProcs) -> DemoResult<Report> {
    let started_at = Utc::now();
    let mut c = Checks::default();

    let out = OutArgThing::from_raw(db, procs.out_arg_thing("_input", 5, 2)?)?;
    c.expect(out.get_y()? == 3, "in out argument not incremented")?;
    c.expect(out.get_z()? == 7, "sum not computed")?;
    c.expect(out.get_t()? == "prefix__input", "string not assigned")?;

    for x in check_args() {
        c.check(db, procs, x.clone(), x, SQLITE_OK)?;
    }
    c.check(db, procs, Arg::Integer(1), Arg::Integer(2), SQLITE_ERROR)?;

    let b1 = BlobRow::from_raw(db, procs.create_blob_from_text(db, "a blob from text")?)?;
    let b2 = BlobRow::from_raw(db, procs.create_blob_from_text(db, "a blob from text")?)?;
    c.expect(b1.get_result_code()? == SQLITE_OK, "create_blob_from_text failed")?;
    c.check(db, procs, Arg::Blob(b1.get_test_blob()?), Arg::Blob(b2.get_test_blob()?), SQLITE_OK)?;
    c.check(db, procs, Arg::Blob(None), Arg::Blob(None), SQLITE_OK)?;

    for binding in [Binding::Out, Binding::InOut].iter() {
        for x in echo_args() {
            c.echo(db, procs, *binding, x)?;
        }
    }

    let fib = FibRow::from_raw(db, procs.fib(10)?)?;
    let fib_10 = fib.get_result()?;
    info!(fib_10, "fibonacci result");
    c.expect(fib_10 == 55, "fibonacci value did not compute correctly")?;

    let out_s = XRows::from_raw(db, procs.out_statement(314)?)?;
    c.expect(out_s.get_count()? == 1, "expected row count is 1")?;
    c.expect(out_s.get_x(0)? == 314, "value not echoed with out_statement")?;

    let out_u = XRows::from_raw(db, procs.out_union_statement(300)?)?;
    c.expect(out_u.get_count()? == 2, "expected row count is 2")?;
    c.expect(out_u.get_x(0)? == 301, "value+1 not echoed with out_union_statement")?;
    c.expect(out_u.get_x(1)? == 302, "value+2 not echoed with out_union_statement")?;

    let results = DemoOutputs::from_raw(db, procs.rust_demo(db)?)?;
    let rc = results.get_result_code()?;
    info!(rc, "rust_demo result code");
    c.expect(rc == SQLITE_OK, "rc == SQLITE_OK")?;

    let data = results.get_result_set()?;
    let demo = dump_results(&mut c, &data)?;

    Ok(
        Report {
            started_at,
            finished_at: Utc::now(),
            checks: c.passed,
            fib_10,
            demo,
        }
    )
}


fn dump_results(c: &mut Checks, data: &DemoRows<'_>) -> DemoResult<Vec<DemoRowReport>> {
    let count = data.get_count()?;
    info!(count, "dumping demo rows");
    c.expect(count == EXPECTED_DEMO_ROWS, "count == 5")?;

    let age_encoded = data.get_age_is_encoded()?;
    let key2_encoded = data.get_key2_is_encoded()?;
    c.expect(age_encoded, "age should be encoded")?;
    c.expect(key2_encoded, "key2 should be encoded")?;
    c.expect(!data.get_key1_is_encoded()?, "key1 should be clear")?;

    let mut rows = vec![];

    for i in 0..count {
        let name = data.get_name(i)?;
        let blob = String::from_utf8_lossy(&data.get_bytes(i)?.unwrap_or_default()).into_owned();
        let key2 = data.get_key2(i)?;

        info!(row = i, name = %name, blob = %blob, key2 = %key2, "demo row");

        let child = data.get_my_child_result(i)?;
        let mut children = vec![];

        for j in 0..child.get_count()? {
            let irow = child.get_irow(j)?;
            let t = child.get_t(j)?;

            debug!(row = i, child_row = j, irow, t = %t, "child row");
            c.expect(irow == j + 1, "index should correspond to value")?;
            c.expect(t == format!("'{}'", irow), "invalid format transform through the query")?;

            children.push(ChildRowReport { irow, t });
        }

        rows.push(
            DemoRowReport {
                name,
                blob,
                age: data.get_age(i)?,
                age_encoded,
                thing: data.get_thing(i)?,
                key1: data.get_key1(i)?,
                key2: key2.to_string(),
                key2_encoded,
                children,
            }
        );
    }

    // Identity columns: a row is the same as itself, and neighbours have different keys.
    c.expect(data.rows_same(0, data, 0)?, "row 0 should be the same as itself")?;
    c.expect(!data.rows_same(0, data, 1)?, "rows 0 and 1 should have different keys")?;

    let tail = data.copy(1, 2)?;
    c.expect(tail.get_count()? == 2, "copy should hold 2 rows")?;
    c.expect(tail.rows_equal(0, data, 1)?, "copied row should equal its source")?;
    c.expect(tail.rows_same(1, data, 2)?, "copied row should be the same as its source")?;

    Ok(rows)
}
