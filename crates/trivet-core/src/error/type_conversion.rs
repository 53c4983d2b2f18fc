use super::Error;
use crate::Value;

/// Error when a [`Value`] cannot be converted to the requested Rust type.
#[derive(Debug)]
pub(super) struct TypeConversionError {
    found: &'static str,
    target: Box<str>,
}

impl std::error::Error for TypeConversionError {}

impl core::fmt::Display for TypeConversionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "cannot convert {} to {}", self.found, self.target)
    }
}

impl Error {
    /// Creates a type conversion error from the value that failed to convert
    /// and the name of the target type.
    pub fn type_conversion(value: &Value, target: impl Into<String>) -> Error {
        Error::type_conversion_from(value.type_name(), target)
    }

    /// Creates a type conversion error for a source that is not a [`Value`],
    /// named by `found`.
    pub fn type_conversion_from(found: &'static str, target: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::TypeConversion(TypeConversionError {
            found,
            target: target.into().into(),
        }))
    }

    /// Returns `true` if this error is a type conversion error.
    pub fn is_type_conversion(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::TypeConversion(_))
    }
}
