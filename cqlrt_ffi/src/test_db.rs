use std::sync::Arc;

use super::*;
use crate::db::global;
use crate::mem::MemEngine;
use crate::test_fixtures::*;


#[test]
fn test_open_close_once() {
    let engine = Arc::new(MemEngine::new());

    // At the end of each iteration `drop` closes the db.
    for _ in 0..5 {
        let db = Db::open(engine.clone(), Config::default()).unwrap();
        assert_ne!(db.raw(), INVALID);
        assert_eq!(engine.open_dbs(), 1);
    }

    let stats = engine.stats();
    assert_eq!(stats.dbs_opened, 5);
    assert_eq!(stats.dbs_closed, 5);
    assert_eq!(stats.faults, 0);
}


#[test]
fn test_explicit_close_is_not_repeated_by_drop() {
    let engine = Arc::new(MemEngine::new());
    let db = Db::open(engine.clone(), Config::default()).unwrap();

    db.close().unwrap();

    assert_eq!(engine.open_dbs(), 0);
    assert_eq!(engine.stats().dbs_closed, 1);
    assert_eq!(engine.stats().faults, 0);
}


#[test]
fn test_open_failure() {
    let engine = Arc::new(MemEngine::failing_open());

    let e = Db::open(engine.clone(), Config::default()).unwrap_err();
    assert_eq!(e, Error::OpenFailed);
    assert!(e.is_invalid_handle());
    assert_eq!(engine.stats().dbs_closed, 0);
}


#[test]
fn test_result_sets_released_before_db() {
    let (engine, db) = open(Config::default());

    let a = db.result_set(engine.insert(all_types_table())).unwrap();
    let b = a.get_child_result_set(0, COL_CHILD).unwrap();
    assert_eq!(engine.live_result_sets(), 2);

    drop(b);
    drop(a);
    db.close().unwrap();

    assert_eq!(engine.live_result_sets(), 0);
    assert_eq!(engine.open_dbs(), 0);
    assert_eq!(engine.stats().faults, 0);
}


// The process slot is shared by every test in this binary, so all of its checks live here.
#[test]
fn test_global_slot_lifecycle() {
    let engine = Arc::new(MemEngine::new());

    assert_eq!(global::get(), INVALID);
    assert!(!global::is_open());
    assert_eq!(global::with_db(|db| db.raw()), Err(Error::NotOpen));

    // Closing an empty slot never reaches the engine.
    global::close().unwrap();
    assert_eq!(engine.stats().dbs_closed, 0);

    global::open(engine.clone(), Config::default()).unwrap();
    let raw = global::get();
    assert_ne!(raw, INVALID);
    assert_eq!(global::with_db(|db| db.raw()).unwrap(), raw);

    assert_eq!(global::open(engine.clone(), Config::default()), Err(Error::AlreadyOpen));
    assert_eq!(engine.open_dbs(), 1);

    let count = global::with_db(|db| {
        let rs = db.result_set(engine.insert(child_table(5)))?;
        rs.get_count()
    }).unwrap();
    assert_eq!(count, Ok(5));

    global::close().unwrap();
    assert_eq!(global::get(), INVALID);

    global::close().unwrap();

    let stats = engine.stats();
    assert_eq!(stats.dbs_opened, 1);
    assert_eq!(stats.dbs_closed, 1);
    assert_eq!(stats.faults, 0);
    assert_eq!(engine.live_result_sets(), 0);
}


#[test]
fn test_config() {
    assert_eq!(Config::default().null_policy, NullPolicy::EngineDefined);

    let c = Config::from_json(r#"{"null_policy": "fail-fast"}"#).unwrap();
    assert_eq!(c.null_policy, NullPolicy::FailFast);

    let c = Config::from_json(r#"{"null_policy": "engine"}"#).unwrap();
    assert_eq!(c.null_policy, NullPolicy::EngineDefined);

    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    assert!(Config::from_json(r#"{"null_policy": "never"}"#).is_err());

    assert_eq!(NullPolicy::parse(" Fail-Fast ").unwrap(), NullPolicy::FailFast);
    match NullPolicy::parse("sometimes") {
        Err(Error::Config(_)) => {}
        other => panic!("expected config error, got {:?}", other)
    }
}
