//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `MultipartError` variants.

use crate::base::error::MultipartError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add file context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use mimeparts::base::context::IoResultExt;
    ///
    /// let file = tokio::fs::File::open(&path).await.file_context(&path)?;
    /// // Error: "Reading upload.bin failed: No such file or directory"
    /// ```
    fn file_context(self, path: &Path) -> Result<T, MultipartError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn file_context(self, path: &Path) -> Result<T, MultipartError> {
        self.map_err(|e| MultipartError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Extension trait for body errors coming from `http_body` implementations.
pub trait BodyResultExt<T> {
    /// Convert an arbitrary body error into `MultipartError::Io`.
    fn body_context(self) -> Result<T, MultipartError>;
}

impl<T, E> BodyResultExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn body_context(self) -> Result<T, MultipartError> {
        self.map_err(|e| {
            let boxed: Box<dyn std::error::Error + Send + Sync> = e.into();
            match boxed.downcast::<io::Error>() {
                Ok(io_err) => MultipartError::from(*io_err),
                Err(other) => MultipartError::io(other),
            }
        })
    }
}
