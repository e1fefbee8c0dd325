use std::sync::Arc;

use rstest::rstest;

use cqlrt_ffi::{
    Config,
    Db,
    Engine,
    RawRs,
    ViewModel,
};

use super::*;
use crate::models::{
    DemoOutputs,
    EchoRow,
    OutArgThing,
};
use crate::procs::{
    Arg,
    Binding,
    MemSample,
    SampleProcs,
};
use crate::scenario::{
    run,
    EXPECTED_DEMO_ROWS,
};


fn open(sample: &MemSample) -> Db {
    let engine: Arc<dyn Engine> = sample.engine();
    Db::open(engine, Config::default()).unwrap()
}


#[test]
fn test_full_run() {
    let sample = MemSample::new();
    let db = open(&sample);

    let report = run(&db, &sample).unwrap();

    assert_eq!(report.fib_10, 55);
    assert!(report.checks > 0);
    assert!(report.finished_at >= report.started_at);
    assert_eq!(report.demo.len(), EXPECTED_DEMO_ROWS as usize);

    for (i, row) in report.demo.iter().enumerate() {
        assert!(row.age_encoded);
        assert!(row.key2_encoded);
        assert_eq!(row.key2, "[secret]");
        assert_eq!(row.children.len(), i + 1);

        for (j, child) in row.children.iter().enumerate() {
            assert_eq!(child.irow, j as i32 + 1);
            assert_eq!(child.t, format!("'{}'", child.irow));
        }
    }

    // Every result set the run took ownership of was released.
    let engine = sample.engine();
    assert_eq!(engine.live_result_sets(), 0);
    assert_eq!(engine.outstanding_blobs(), 0);
    assert_eq!(engine.outstanding_strings(), 0);
    assert_eq!(engine.stats().faults, 0);
}


#[test]
fn test_report_serializes() {
    let sample = MemSample::new();
    let db = open(&sample);

    let report = run(&db, &sample).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["fib_10"], 55);
    assert_eq!(json["demo"][2]["children"][1]["t"], "'2'");
    assert!(!json.to_string().contains("k2_"));
}


#[test]
fn test_out_arg_thing() {
    let sample = MemSample::new();
    let db = open(&sample);

    let out = OutArgThing::from_raw(&db, sample.out_arg_thing("_input", 5, 2).unwrap()).unwrap();

    assert_eq!(out.get_y().unwrap(), 3);
    assert_eq!(out.get_z().unwrap(), 7);
    assert_eq!(out.get_t().unwrap(), "prefix__input");
}


#[rstest]
#[case(Binding::Out, Arg::NullableInteger(None), Arg::NullableInteger(None))]
#[case(Binding::InOut, Arg::NullableInteger(None), Arg::NullableInteger(None))]
#[case(Binding::InOut, Arg::NullableLong(Some(4567)), Arg::NullableLong(Some(4568)))]
#[case(Binding::InOut, Arg::Boolean(false), Arg::Boolean(true))]
#[case(Binding::InOut, Arg::Real(8.5), Arg::Real(9.5))]
#[case(Binding::Out, Arg::NullableReal(Some(8.25)), Arg::NullableReal(Some(8.25)))]
#[case(Binding::InOut, Arg::Integer(i32::MAX), Arg::Integer(i32::MIN))]
#[case(Binding::InOut, Arg::NullableLong(Some(i64::MAX)), Arg::NullableLong(Some(i64::MIN)))]
fn test_echo(#[case] binding: Binding, #[case] x: Arg, #[case] expected: Arg) {
    let sample = MemSample::new();
    let db = open(&sample);

    let row = EchoRow::from_raw(&db, sample.echo(binding, &x).unwrap()).unwrap();
    assert_eq!(row.get_test(&expected).unwrap(), expected);
}


#[test]
fn test_bad_arguments() {
    let sample = MemSample::new();

    match sample.check(&Arg::Integer(1), &Arg::Long(1)) {
        Err(DemoError::Argument(_)) => {}
        other => panic!("expected argument error, got {:?}", other)
    }

    match sample.echo(Binding::InOut, &Arg::Text(None)) {
        Err(DemoError::Argument(_)) => {}
        other => panic!("expected argument error, got {:?}", other)
    }
}


#[test]
fn test_demo_rows_identity() {
    let sample = MemSample::new();
    let db = open(&sample);

    let results = DemoOutputs::from_raw(&db, sample.rust_demo(&db).unwrap()).unwrap();
    let a = results.get_result_set().unwrap();
    let b = results.get_result_set().unwrap();

    // Two child result sets of the same rows: same keys, and the same values.
    assert!(a.rows_same(3, &b, 3).unwrap());
    assert!(a.rows_equal(3, &b, 3).unwrap());
    assert!(!a.rows_same(3, &b, 4).unwrap());

    // Children are plain rows, never "the same".
    let c = a.get_my_child_result(2).unwrap();
    assert!(c.rows_equal(0, &c, 0).unwrap());
    assert!(!c.rows_same(0, &c, 0).unwrap());
}


// Delegates to `MemSample` except for one wrong answer.
struct WrongFib(MemSample);

impl SampleProcs for WrongFib {
    fn out_arg_thing(&self, t: &str, x: i32, y: i32) -> DemoResult<RawRs> {
        self.0.out_arg_thing(t, x, y)
    }

    fn check(&self, x: &Arg, y: &Arg) -> DemoResult<RawRs> {
        self.0.check(x, y)
    }

    fn echo(&self, binding: Binding, x: &Arg) -> DemoResult<RawRs> {
        self.0.echo(binding, x)
    }

    fn create_blob_from_text(&self, db: &Db, t: &str) -> DemoResult<RawRs> {
        self.0.create_blob_from_text(db, t)
    }

    fn fib(&self, n: i32) -> DemoResult<RawRs> {
        self.0.fib(n + 1)
    }

    fn out_statement(&self, x: i32) -> DemoResult<RawRs> {
        self.0.out_statement(x)
    }

    fn out_union_statement(&self, x: i32) -> DemoResult<RawRs> {
        self.0.out_union_statement(x)
    }

    fn rust_demo(&self, db: &Db) -> DemoResult<RawRs> {
        self.0.rust_demo(db)
    }
}


#[test]
fn test_failed_expectation_ends_run() {
    let procs = WrongFib(MemSample::new());
    let db = open(&procs.0);

    match run(&db, &procs) {
        Err(DemoError::Expectation(msg)) => assert!(msg.contains("fibonacci")),
        other => panic!("expected expectation failure, got {:?}", other)
    }

    // The run stopped early, but nothing it owned leaked.
    assert_eq!(procs.0.engine().live_result_sets(), 0);
}


#[test]
fn test_global_slot_run() {
    let sample = MemSample::new();
    let engine: Arc<dyn Engine> = sample.engine();

    cqlrt_ffi::db::global::open(engine, Config::default()).unwrap();
    let report = cqlrt_ffi::db::global::with_db(|db| run(db, &sample)).unwrap().unwrap();
    cqlrt_ffi::db::global::close().unwrap();

    assert_eq!(report.fib_10, 55);
    assert_eq!(sample.engine().open_dbs(), 0);
}
