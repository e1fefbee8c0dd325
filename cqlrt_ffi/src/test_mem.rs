// Contract checks of the in-process engine itself, called through the raw `Engine` API.

use std::ptr;

use super::*;
use crate::mem::{
    Cell,
    Column,
    ColumnType,
    MemEngine,
    Table,
};
use crate::test_fixtures::*;


#[test]
fn test_double_release_is_a_fault() {
    let engine = MemEngine::new();
    let rs = engine.insert(child_table(2));

    engine.release(rs).unwrap();
    assert!(engine.release(rs).is_err());

    let stats = engine.stats();
    assert_eq!(stats.releases, 1);
    assert_eq!(stats.faults, 1);
}


#[test]
fn test_unknown_frees_are_faults() {
    let engine = MemEngine::new();
    let rs = engine.insert(all_types_table());

    let blob = engine.get_blob(rs, 0, COL_BLOB).unwrap();
    assert_eq!(blob.size, 16);

    unsafe {
        engine.free_blob(blob.ptr);
        engine.free_blob(blob.ptr);
        engine.free_string(ptr::null_mut());
    }

    let stats = engine.stats();
    assert_eq!(stats.blob_frees, 1);
    assert_eq!(stats.faults, 2);
}


#[test]
fn test_contract_checks() {
    let engine = MemEngine::new();
    let rs = engine.insert(child_table(3));

    assert!(engine.get_integer(rs, 3, 0).is_err());
    assert!(engine.get_integer(rs, 0, 2).is_err());
    assert!(engine.get_string(rs, 0, 0).is_err());
    assert!(engine.copy(rs, 2, 2).is_err());
    assert!(engine.copy(rs, -1, 1).is_err());

    // No identity columns.
    assert!(engine.rows_same(rs, 0, rs, 1).is_err());

    // Different shapes.
    let other = engine.insert(all_types_table());
    assert!(engine.rows_equal(rs, 0, other, 0).is_err());

    assert!(engine.get_count(12345).is_err());
}


#[test]
fn test_table_rejects_bad_rows() {
    let mut t = Table::new(vec![Column::new("x", ColumnType::Int)]);

    assert!(t.push_row(vec![Cell::Int(1)]).is_ok());
    assert!(t.push_row(vec![Cell::Null]).is_ok());
    assert!(t.push_row(vec![Cell::Text("1".to_string())]).is_err());
    assert!(t.push_row(vec![Cell::Int(1), Cell::Int(2)]).is_err());

    assert_eq!(t.len(), 2);
}


#[test]
fn test_open_close_tokens() {
    let engine = MemEngine::new();

    let db = engine.open_db().unwrap();
    assert_ne!(db, INVALID);
    engine.close_db(db).unwrap();
    assert!(engine.close_db(db).is_err());

    let failing = MemEngine::failing_open();
    assert_eq!(failing.open_db().unwrap(), INVALID);
}
