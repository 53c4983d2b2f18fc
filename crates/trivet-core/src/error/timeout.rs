use super::Error;

/// Error when the database reports a statement timed out or could not acquire
/// a lock in time.
#[derive(Debug)]
pub(super) struct TimeoutError {
    message: Box<str>,
}

impl std::error::Error for TimeoutError {}

impl core::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "timed out: {}", self.message)
    }
}

impl Error {
    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Timeout(TimeoutError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Timeout(_))
    }
}
