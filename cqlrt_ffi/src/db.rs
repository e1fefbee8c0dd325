use std::fmt;
use std::sync::Arc;

use tracing::{
    debug,
    error,
};

use crate::config::Config;
use crate::engine::{
    Engine,
    RawDb,
    RawRs,
    INVALID,
};
use crate::err::{
    Error,
    Result,
};
use crate::rset::ResultSet;


// One open native database.
// - `open_db` is called once in `Db::open`, `close_db` once in `Db::close` or `drop`.
// - Result sets borrow the `Db` (`ResultSet<'db>`), so they cannot outlive it.
pub struct Db {
    engine: Arc<dyn Engine>,
    db: RawDb,
    config: Config,
}


impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("db", &self.db)
            .field("config", &self.config)
            .finish()
    }
}


impl Db {
    pub fn open(engine: Arc<dyn Engine>, config: Config) -> Result<Db> {
        let db = engine.open_db()?;

        if db == INVALID {
            return Err(Error::OpenFailed);
        }

        debug!(db = db, "db opened");

        Ok(
            Db {
                engine,
                db,
                config,
            }
        )
    }

    // Token to pass to generated procedures that take the database as an argument.
    pub fn raw(&self) -> RawDb {
        self.db
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // Data pointer comparison; vtable pointers for the same type can differ between codegen units.
    pub fn same_engine(&self, other: &Db) -> bool {
        Arc::as_ptr(&self.engine) as *const () == Arc::as_ptr(&other.engine) as *const ()
    }

    // Takes ownership of a result set token returned by a procedure call.
    pub fn result_set(&self, rs: RawRs) -> Result<ResultSet<'_>> {
        ResultSet::from_raw(self, rs)
    }

    pub fn close(mut self) -> Result<()> {
        self.close_once()
    }

    fn close_once(&mut self) -> Result<()> {
        if self.db == INVALID {
            return Ok(());
        }

        let db = self.db;
        self.db = INVALID;

        debug!(db = db, "db closing");
        self.engine.close_db(db)
    }
}


impl Drop for Db {
    fn drop(&mut self) {
        if let Err(e) = self.close_once() {
            error!(error = %e, "close_db failed during drop");
        }
    }
}


/**
Process wide database slot.

- Mirrors a single static handle: `open`, `get`, `close`.
- Guarded by a mutex so concurrent callers are serialized.
- Prefer passing a `Db` explicitly; this exists for code that can only reach the database through a global.
**/
pub mod global {
    use std::sync::{
        Arc,
        Mutex,
        MutexGuard,
    };

    use lazy_static::lazy_static;
    use tracing::warn;

    use super::Db;
    use crate::config::Config;
    use crate::engine::{
        Engine,
        RawDb,
        INVALID,
    };
    use crate::err::{
        Error,
        Result,
    };


    lazy_static! {
        static ref SLOT: Mutex<Option<Db>> = Mutex::new(None);
    }


    // A panic while holding the lock leaves the slot value intact, keep using it.
    fn lock() -> MutexGuard<'static, Option<Db>> {
        SLOT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }


    pub fn open(engine: Arc<dyn Engine>, config: Config) -> Result<()> {
        let mut slot = lock();

        if slot.is_some() {
            return Err(Error::AlreadyOpen);
        }

        *slot = Some(Db::open(engine, config)?);
        Ok(())
    }

    // `0` when nothing is open.
    pub fn get() -> RawDb {
        match &*lock() {
            Some(db) => db.raw(),
            None => INVALID
        }
    }

    pub fn is_open() -> bool {
        lock().is_some()
    }

    // Closing an empty slot is a no-op; the sentinel is never passed to the engine.
    pub fn close() -> Result<()> {
        let taken = lock().take();

        match taken {
            Some(db) => db.close(),
            None => {
                warn!("close called on the process db slot but no db is open");
                Ok(())
            }
        }
    }

    // Runs `f` with the open database while holding the slot lock.
    // - Do not call other `global` functions from inside `f`, the lock is not re-entrant.
    pub fn with_db<T, F>(f: F) -> Result<T>
        where F: FnOnce(&Db) -> T
    {
        match &*lock() {
            Some(db) => Ok(f(db)),
            None => Err(Error::NotOpen)
        }
    }
}
