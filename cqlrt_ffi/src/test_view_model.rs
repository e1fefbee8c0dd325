use super::*;
use crate::mem::{
    Cell,
    Column,
    ColumnType,
    Table,
};
use crate::test_fixtures::*;


// Shaped like generated code: owns the result set, typed getters per column.
struct KeyedRows<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for KeyedRows<'db> {
    const HAS_IDENTITY_COLUMNS: bool = true;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}

impl KeyedRows<'_> {
    fn get_name(&self, row: i32) -> Result<String> {
        self.rs.get_string(row, 1)
    }
}


struct PlainRows<'db> {
    rs: ResultSet<'db>,
}

impl<'db> ViewModel<'db> for PlainRows<'db> {
    const HAS_IDENTITY_COLUMNS: bool = false;

    fn result_set(&self) -> &ResultSet<'db> {
        &self.rs
    }
}


fn keyed_table() -> Table {
    let cols = vec![
        Column::new("key", ColumnType::Long).identity(),
        Column::new("name", ColumnType::Text),
    ];

    Table::with_rows(cols, vec![
        vec![Cell::Long(1), Cell::Text("a".to_string())],
        vec![Cell::Long(1), Cell::Text("b".to_string())],
        vec![Cell::Long(2), Cell::Text("a".to_string())],
    ]).unwrap()
}

fn plain_table() -> Table {
    let cols = vec![
        Column::new("key", ColumnType::Long),
        Column::new("name", ColumnType::Text),
    ];

    Table::with_rows(cols, vec![
        vec![Cell::Long(1), Cell::Text("a".to_string())],
        vec![Cell::Long(1), Cell::Text("a".to_string())],
    ]).unwrap()
}


#[test]
fn test_no_identity_columns_is_never_same() {
    let (engine, db) = open(Config::default());

    let a = PlainRows { rs: db.result_set(engine.insert(plain_table())).unwrap() };
    let b = PlainRows { rs: db.result_set(engine.insert(plain_table())).unwrap() };

    // Content equal, but without identity columns never the same row.
    assert!(a.rows_equal(0, &a, 1).unwrap());
    assert!(a.rows_equal(0, &b, 0).unwrap());
    assert!(!a.rows_same(0, &a, 1).unwrap());
    assert!(!a.rows_same(0, &b, 0).unwrap());
    assert!(!a.rows_same(0, &a, 0).unwrap());

    // The engine refuses `rows_same` on such tables, so it was never asked.
    assert_eq!(engine.stats().faults, 0);
    assert!(a.result_set().rows_same(0, b.result_set(), 0).is_err());
}


#[test]
fn test_identity_columns_decide_sameness() {
    let (engine, db) = open(Config::default());

    let a = KeyedRows { rs: db.result_set(engine.insert(keyed_table())).unwrap() };
    let b = KeyedRows { rs: db.result_set(engine.insert(keyed_table())).unwrap() };

    // Same key, different content.
    assert!(a.rows_same(0, &a, 1).unwrap());
    assert!(!a.rows_equal(0, &a, 1).unwrap());

    // Different key, same name.
    assert!(!a.rows_same(0, &a, 2).unwrap());

    assert!(a.rows_same(2, &b, 2).unwrap());
    assert!(a.rows_equal(2, &b, 2).unwrap());

    assert_eq!(a.get_name(1).unwrap(), "b");
}


#[test]
fn test_delegation_to_result_set() {
    let (engine, db) = open(Config::default());

    let a = KeyedRows { rs: db.result_set(engine.insert(keyed_table())).unwrap() };

    assert_eq!(a.get_count().unwrap(), 3);
    for row in 0..3 {
        assert_eq!(a.row_hash_code(row).unwrap(), a.result_set().row_hash_code(row).unwrap());
    }
    assert!(a.row_hash_code(3).unwrap_err().is_out_of_range());
}


#[test]
fn test_owner_releases_result_set() {
    let (engine, db) = open(Config::default());

    {
        let a = PlainRows { rs: db.result_set(engine.insert(plain_table())).unwrap() };
        assert_eq!(a.get_count().unwrap(), 2);
        assert_eq!(engine.live_result_sets(), 1);
    }

    assert_eq!(engine.live_result_sets(), 0);
    assert_eq!(engine.stats().releases, 1);
}
