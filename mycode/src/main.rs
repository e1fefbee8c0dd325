use std::process;

use tracing::{
    error,
    info,
};

use cqlrt_ffi::db::global;
use cqlrt_ffi::Config;

use mycode::procs::backend;
use mycode::scenario::{
    self,
    Report,
};
use mycode::DemoResult;


fn run() -> DemoResult<Report> {
    let config = Config::from_env()?;
    info!(config = ?config, "starting demo");

    let (engine, procs) = backend();

    // Opened through the process slot, like a host that only knows the global handle.
    global::open(engine, config)?;

    let report = global::with_db(|db| scenario::run(db, procs.as_ref()));
    let closed = global::close();

    let report = report??;
    closed?;

    Ok(report)
}


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let report = run().and_then(|r| Ok(serde_json::to_string_pretty(&r)?));

    match report {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!(error = %e, "demo failed");
            eprintln!("demo failed: {}", e);
            process::exit(1);
        }
    }
}
