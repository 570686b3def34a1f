//! # Error Traits
//!
//! Conversion traits for error handling.

use crate::{AppError, Result};

/// Extension methods for Result types.
pub trait ResultExt<T> {
    /// Convert the error into an [`AppError`] and prefix its message.
    fn context<C: ToString>(self, context: C) -> Result<T>;

    /// Convert the error into an [`AppError`], logging it at error level.
    fn log_error(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn context<C: ToString>(self, context: C) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            err.context(context)
        })
    }

    fn log_error(self) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            tracing::error!(error = %err, "Error occurred");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_on_err() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let err = result.context("Saving submission document").unwrap_err();
        assert!(err.message().contains("Saving submission document"));
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn test_context_on_ok() {
        let result: std::result::Result<u8, std::io::Error> = Ok(7);
        assert_eq!(result.context("unused").unwrap(), 7);
    }
}
