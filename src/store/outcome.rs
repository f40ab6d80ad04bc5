use crate::error::{CoreError, ValidationError};

/// Result of a store operation as handed to the presentation layer.
///
/// Store operations never return `Err`; failures are carried here so the
/// caller can render them without unwinding.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<CoreError>,
    /// The response arrived after a newer request superseded it and was
    /// dropped. Not an error; there is nothing to show.
    pub discarded: bool,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            discarded: false,
        }
    }

    pub fn failed(error: impl Into<CoreError>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            discarded: false,
        }
    }

    pub fn discarded() -> Self {
        Self {
            success: false,
            data: None,
            error: None,
            discarded: true,
        }
    }

    /// User-facing message of the failure, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Field-level errors for inline display; empty unless validation failed.
    pub fn validation_errors(&self) -> &[ValidationError] {
        self.error
            .as_ref()
            .map(CoreError::validation_errors)
            .unwrap_or(&[])
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            discarded: self.discarded,
        }
    }

    pub fn into_result(self) -> Result<Option<T>, CoreError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data),
        }
    }
}
