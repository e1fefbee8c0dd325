#[cfg(feature = "native")]
use std::env;

// Note: Actual file has `lib` and '.a` prepended/appended (e.g `libcqlinteroprustbuild.a`).
#[allow(dead_code)]
static FILE_INTEROP_COMPILED: &'static str = "cqlinteroprustbuild";

#[allow(dead_code)]
static FILE_INTEROP_SRC: &'static str = "c-code/cql_interop.c";


/*
Compiles the C shim against an externally supplied CQL runtime.

- Only runs with `--features native`; the default build needs no C toolchain.
- `CQL_RUNTIME_DIR` must contain `cqlrt.h` and the runtime sources (`cqlrt.c`, `cqlrt_common.c`).
- `CQL_GENERATED` may list extra generated `.c` files (`;` separated) to link, e.g. the sample procedures used by `mycode`.
- SQLite is linked dynamically from the system.

@see https://doc.rust-lang.org/cargo/reference/build-scripts.html#case-study-building-some-native-code
*/
#[cfg(feature = "native")]
fn main() {
    println!("cargo:rerun-if-changed={}", FILE_INTEROP_SRC);
    println!("cargo:rerun-if-env-changed=CQL_RUNTIME_DIR");
    println!("cargo:rerun-if-env-changed=CQL_GENERATED");

    let runtime_dir = match env::var("CQL_RUNTIME_DIR") {
        Ok(dir) => dir,
        Err(_) => panic!("CQL_RUNTIME_DIR must point at the CQL runtime sources when building with `native`."),
    };

    let mut cfg = cc::Build::new();

    cfg.file(FILE_INTEROP_SRC);
    cfg.file(format!("{}/cqlrt.c", runtime_dir));
    cfg.file(format!("{}/cqlrt_common.c", runtime_dir));
    cfg.include(&runtime_dir);

    if let Ok(generated) = env::var("CQL_GENERATED") {
        for f in generated.split(';').filter(|f| !f.is_empty()) {
            println!("cargo:rerun-if-changed={}", f);
            cfg.file(f);
        }
    }

    // Ignore `warning: unused parameter` from the runtime code.
    cfg.warnings(false);
    cfg.compile(FILE_INTEROP_COMPILED);

    println!("cargo:rustc-link-lib=sqlite3");
}

#[cfg(not(feature = "native"))]
fn main() {}
