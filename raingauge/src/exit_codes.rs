#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// One or more records failed threshold validation.
    ValidationFailed = 10,

    /// Tracks failed to extract, or a sweep produced no data at all.
    MalformedInput = 20,

    /// Invalid CLI/config/options (bad flags, unreadable threshold files).
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, unexpected invariants).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
