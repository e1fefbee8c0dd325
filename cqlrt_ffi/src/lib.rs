//! Safe Rust binding over the CQL result set runtime.
//!
//! - `db::Db` owns one native database, `rset::ResultSet` owns one native result set.
//! - Release happens exactly once, by `close` or by `drop`.
//! - `engine::Engine` is the seam to the native ABI: `native::NativeEngine` (feature `native`)
//!   calls the C shim, `mem::MemEngine` is an in-process engine for tests and dry runs.

#[cfg(feature = "native")]
mod cffi;
#[cfg(feature = "native")]
pub mod native;

pub mod config;
pub mod db;
pub mod encoded;
pub mod engine;
pub mod err;
mod fns;
pub mod mem;
pub mod rset;
pub mod view_model;


#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod test_db;
#[cfg(test)]
mod test_view_model;
#[cfg(test)]
mod test_mem;


pub use config::{
    Config,
    NullPolicy,
};
pub use db::Db;
pub use encoded::EncodedString;
pub use engine::{
    Engine,
    RawDb,
    RawRs,
    INVALID,
};
pub use err::{
    Error,
    Result,
};
pub use rset::ResultSet;
pub use view_model::ViewModel;
