//! Convenience result type alias for ResDao.

use crate::error::AppError;

/// A specialized `Result` type for ResDao operations.
pub type AppResult<T> = Result<T, AppError>;
