use super::Error;

/// Error when a write operation receives nothing usable to write with.
///
/// This occurs when:
/// - An insert is attempted with an entity that has no fields
/// - An update has no fields to set, or no conditions to match rows by
/// - A delete has no conditions, which would otherwise wipe the whole table
///
/// These errors are raised before any statement is sent to the database.
#[derive(Debug)]
pub(super) struct EmptyEntityError {
    message: Box<str>,
}

impl std::error::Error for EmptyEntityError {}

impl core::fmt::Display for EmptyEntityError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "empty entity: {}", self.message)
    }
}

impl Error {
    /// Creates an empty entity error.
    pub fn empty_entity(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::EmptyEntity(EmptyEntityError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an empty entity error.
    pub fn is_empty_entity(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::EmptyEntity(_))
    }
}
