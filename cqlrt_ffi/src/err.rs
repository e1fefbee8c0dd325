// Errors surfaced at the call site of every binding operation, never retried.

use serde::{Deserialize, Serialize};
use thiserror::Error;


#[derive(Debug, Error)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(Clone)]
pub enum Error {
    // Invalid handle.
    #[error("database could not be opened by the native engine")]
    OpenFailed,

    #[error("a database is already open in the process slot")]
    AlreadyOpen,

    #[error("no database is open")]
    NotOpen,

    #[error("native engine returned a null result set")]
    NullResultSet,

    #[error("result set was used after it was closed")]
    Closed,

    #[error("result sets belong to different engines")]
    EngineMismatch,

    // Out of range.
    #[error("row {row} is out of range, result set has {count} rows")]
    RowOutOfRange { row: i32, count: i32 },

    #[error("rows [{row}, {row}+{len}) are out of range, result set has {count} rows")]
    RangeOutOfBounds { row: i32, len: i32, count: i32 },

    // Null policy.
    #[error("cell ({row}, {col}) is null")]
    NullValue { row: i32, col: i32 },

    // Native engine failures, opaque to this layer.
    #[error("native engine: {0}")]
    Engine(String),

    #[error("invalid config: {0}")]
    Config(String),
}


pub type Result<T> = std::result::Result<T, Error>;


impl Error {
    pub fn engine<S: Into<String>>(msg: S) -> Error {
        Error::Engine(msg.into())
    }

    // Errors caused by the caller holding a stale or missing handle.
    pub fn is_invalid_handle(&self) -> bool {
        match self {
            Error::OpenFailed |
            Error::NotOpen |
            Error::NullResultSet |
            Error::Closed => true,
            _ => false
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        match self {
            Error::RowOutOfRange { .. } |
            Error::RangeOutOfBounds { .. } => true,
            _ => false
        }
    }
}
