#![allow(dead_code)]

// Symbols exported by `c-code/cql_interop.c`.
// - `build.rs` compiles the shim into `libcqlinteroprustbuild.a` and links it when the `native` feature is on.
// - Handles cross the boundary as `int64_t`, matching `cql_int64` in the CQL runtime.

use std::os::raw::{
    c_char,
    c_void,
};


extern "C" {
    pub fn cql_interop_open_db() -> i64;
    pub fn cql_interop_close_db(db: i64);

    pub fn cql_interop_release(rs: i64);

    pub fn cql_interop_get_count(rs: i64) -> i32;
    pub fn cql_interop_is_null(rs: i64, row: i32, col: i32) -> bool;

    pub fn cql_interop_get_boolean(rs: i64, row: i32, col: i32) -> bool;
    pub fn cql_interop_get_integer(rs: i64, row: i32, col: i32) -> i32;
    pub fn cql_interop_get_long(rs: i64, row: i32, col: i32) -> i64;
    pub fn cql_interop_get_double(rs: i64, row: i32, col: i32) -> f64;

    // `strdup` copy, release with `free`.
    pub fn cql_interop_get_string(rs: i64, row: i32, col: i32) -> *mut c_char;

    pub fn cql_interop_get_blob(rs: i64, row: i32, col: i32, size_out: *mut i32) -> *mut c_void;
    pub fn cql_interop_free_blob(blob: *mut c_void);

    pub fn cql_interop_copy_child_result_set(rs: i64, row: i32, col: i32) -> i64;

    pub fn cql_interop_row_hash_code(rs: i64, row: i32) -> i64;
    pub fn cql_interop_rows_equal(rs1: i64, row1: i32, rs2: i64, row2: i32) -> bool;
    pub fn cql_interop_rows_same(rs1: i64, row1: i32, rs2: i64, row2: i32) -> bool;

    pub fn cql_interop_copy(rs: i64, row: i32, count: i32) -> i64;

    pub fn cql_interop_get_is_encoded(rs: i64, col: i32) -> bool;
}
