use std::sync::Arc;

use crate::config::Config;
use crate::db::Db;
use crate::engine::Engine;
use crate::mem::{
    Cell,
    Column,
    ColumnType,
    MemEngine,
    Table,
};


pub const COL_B: i32 = 0;
pub const COL_I: i32 = 1;
pub const COL_L: i32 = 2;
pub const COL_D: i32 = 3;
pub const COL_S: i32 = 4;
pub const COL_BLOB: i32 = 5;
pub const COL_SECRET: i32 = 6;
pub const COL_CHILD: i32 = 7;


pub fn open(config: Config) -> (Arc<MemEngine>, Db) {
    let engine = Arc::new(MemEngine::new());
    let dyn_engine: Arc<dyn Engine> = engine.clone();
    let db = Db::open(dyn_engine, config).expect("mem db opens");
    (engine, db)
}

pub fn child_table(n: i32) -> Table {
    let cols = vec![
        Column::new("irow", ColumnType::Int),
        Column::new("t", ColumnType::Text),
    ];

    let rows = (1..=n)
        .map(|i| vec![Cell::Int(i), Cell::Text(format!("'{}'", i))])
        .collect();

    Table::with_rows(cols, rows).expect("child rows match columns")
}

// Four rows; row 2 is all nulls, row 3 repeats row 0.
pub fn all_types_table() -> Table {
    let cols = vec![
        Column::new("b", ColumnType::Bool),
        Column::new("i", ColumnType::Int),
        Column::new("l", ColumnType::Long),
        Column::new("d", ColumnType::Double),
        Column::new("s", ColumnType::Text),
        Column::new("blob", ColumnType::Blob),
        Column::new("secret", ColumnType::Text).encoded(),
        Column::new("child", ColumnType::Object),
    ];

    let child = Arc::new(child_table(3));

    let row0 = vec![
        Cell::Bool(true),
        Cell::Int(1234),
        Cell::Long(12345),
        Cell::Double(2.5),
        Cell::Text("foo".to_string()),
        Cell::Blob(b"a blob from text".to_vec()),
        Cell::Text("hunter2".to_string()),
        Cell::Child(child.clone()),
    ];

    let row1 = vec![
        Cell::Bool(false),
        Cell::Int(-1),
        Cell::Long(i64::max_value()),
        Cell::Double(-0.25),
        Cell::Text("".to_string()),
        Cell::Blob(vec![]),
        Cell::Text("pw".to_string()),
        Cell::Child(Arc::new(child_table(1))),
    ];

    let row2 = vec![Cell::Null; 8];

    let row3 = row0.clone();

    Table::with_rows(cols, vec![row0, row1, row2, row3]).expect("rows match columns")
}
