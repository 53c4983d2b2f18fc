use super::Error;

/// Error when a statement violates a database constraint.
///
/// Raised by drivers for unique, primary key, foreign key, not-null, and check
/// constraint failures.
#[derive(Debug)]
pub(super) struct ConstraintViolationError {
    message: Box<str>,
}

impl std::error::Error for ConstraintViolationError {}

impl core::fmt::Display for ConstraintViolationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "constraint violation: {}", self.message)
    }
}

impl Error {
    /// Creates a constraint violation error.
    pub fn constraint_violation(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ConstraintViolation(
            ConstraintViolationError {
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is a constraint violation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConstraintViolation(_))
    }
}
