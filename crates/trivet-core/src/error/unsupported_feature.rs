use super::Error;

/// Error when a database does not support a requested feature.
///
/// This occurs when:
/// - A transaction or savepoint is requested from a database without support
/// - An isolation level is not offered by the database
/// - Generated key retrieval is not available on the driver
/// - A dialect has no native upsert statement
///
/// Callers can use [`Error::is_unsupported_feature`] to fall back to a
/// different strategy, the way upsert falls back to update-then-insert.
#[derive(Debug)]
pub(super) struct UnsupportedFeature {
    message: Box<str>,
}

impl std::error::Error for UnsupportedFeature {}

impl core::fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported feature: {}", self.message)
    }
}

impl Error {
    /// Creates an unsupported feature error.
    pub fn unsupported_feature(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedFeature(UnsupportedFeature {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an unsupported feature error.
    pub fn is_unsupported_feature(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedFeature(_))
    }
}
