use std::fmt;


pub static REDACTED: &'static str = "[secret]";


/**
A string read from a column marked as encoded (vaulted).

- `Display` and `Debug` print `[secret]`, so logging, `format!` and `dbg!` never leak it.
- No `Clone`, `PartialEq`, `Hash`, `Deref`, `AsRef<str>` or `Serialize`.
- The value is only reachable through `with_exposed`.
**/
pub struct EncodedString {
    value: String,
}


impl EncodedString {
    pub fn new(value: String) -> EncodedString {
        EncodedString { value }
    }

    pub fn with_exposed<T, F>(&self, f: F) -> T
        where F: FnOnce(&str) -> T
    {
        f(&self.value)
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}


impl fmt::Display for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Debug for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
