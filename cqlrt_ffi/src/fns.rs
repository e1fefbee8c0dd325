use std::ffi::CStr;
use std::os::raw::{
    c_char,
    c_void,
};
use std::ptr;
use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::engine::{
    Engine,
    RawBlob,
};
use crate::err::{
    Error,
    Result,
};


lazy_static! {
    static ref NATIVE_LOCK: Mutex<()> = Mutex::new(());
}


// Runs `f` while holding the process wide native lock.
// - A panic inside `f` does not poison later calls: the lock guards no data.
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub fn serialized<T, F>(f: F) -> T
    where F: FnOnce() -> T
{
    let _held = NATIVE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f()
}


// Copies `n` bytes from native memory into a Rust owned `Vec`.
// - A null `ptr` is only accepted for `n == 0`.
//
// # Safety
// A non null `ptr` must be valid for reads of `n` bytes.
pub unsafe fn to_owned_vec(ptr: *const u8, n: usize) -> Result<Vec<u8>> {
    if n == 0 {
        return Ok(vec![]);
    }
    if ptr.is_null() {
        return Err(Error::engine(format!("null blob pointer with size {}", n)));
    }

    let mut dst = Vec::with_capacity(n);
    ptr::copy_nonoverlapping(ptr, dst.as_mut_ptr(), n);
    dst.set_len(n);

    Ok(dst)
}


// Frees an engine blob buffer when dropped.
// - Exactly one `free_blob` per `get_blob`, on every exit path including panics during the copy.
pub struct BlobGuard<'e> {
    engine: &'e dyn Engine,
    blob: RawBlob,
}

impl<'e> BlobGuard<'e> {
    pub fn new(engine: &'e dyn Engine, blob: RawBlob) -> BlobGuard<'e> {
        BlobGuard { engine, blob }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let n = if self.blob.size > 0 { self.blob.size as usize } else { 0 };
        unsafe { to_owned_vec(self.blob.ptr as *const u8, n) }
    }
}

impl Drop for BlobGuard<'_> {
    fn drop(&mut self) {
        // Note: freed even when null/empty so the engine sees one release per fetch.
        unsafe { self.engine.free_blob(self.blob.ptr) };
        self.blob.ptr = ptr::null_mut::<c_void>();
    }
}


// Same discipline for engine allocated C strings.
pub struct CStrGuard<'e> {
    engine: &'e dyn Engine,
    s: *mut c_char,
}

impl<'e> CStrGuard<'e> {
    pub fn new(engine: &'e dyn Engine, s: *mut c_char) -> CStrGuard<'e> {
        CStrGuard { engine, s }
    }

    // `None` for a null cell.
    pub fn to_owned_string(&self) -> Option<String> {
        if self.s.is_null() {
            return None;
        }
        let c_buf = unsafe { CStr::from_ptr(self.s) };
        Some(c_buf.to_string_lossy().into_owned())
    }
}

impl Drop for CStrGuard<'_> {
    fn drop(&mut self) {
        if !self.s.is_null() {
            unsafe { self.engine.free_string(self.s) };
            self.s = ptr::null_mut();
        }
    }
}
