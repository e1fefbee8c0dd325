//! Demonstration program for the `cqlrt_ffi` binding.
//!
//! - `procs` holds the sample procedures, `models` the typed rows they return.
//! - `scenario::run` calls every procedure once and checks what comes back.

use thiserror::Error;

pub mod models;
pub mod procs;
pub mod scenario;


#[cfg(test)]
mod test_scenario;


#[derive(Debug, Error)]
pub enum DemoError {
    // A procedure returned something other than what the demo expects.
    #[error("expectation failed: {0}")]
    Expectation(String),

    // An argument the procedure ABI cannot carry (interior NUL, mismatched kinds).
    #[error("bad argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Binding(#[from] cqlrt_ffi::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type DemoResult<T> = std::result::Result<T, DemoError>;
