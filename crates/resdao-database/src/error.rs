//! Classification of sqlx errors into [`AppError`] kinds.

use resdao_core::error::{AppError, ErrorKind};

/// Build a `map_err` adapter that classifies a sqlx error, prefixing the
/// message with `context`.
pub fn store_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| classify(context, err)
}

/// Classify a sqlx error.
///
/// Unique-key violations become `Conflict` and missing rows `NotFound`;
/// everything else (connectivity, pool timeouts, protocol and query
/// failures) is reported as `StoreUnavailable`. The sqlx error is kept as
/// the source.
pub fn classify(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::Conflict,
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        _ => ErrorKind::StoreUnavailable,
    };
    let message = format!("{context}: {err}");
    AppError::with_source(kind, message, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_store_unavailable() {
        let err = classify("Failed to count resources", sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
        assert!(err.message.starts_with("Failed to count resources"));
        assert!(err.source.is_some());
    }

    #[test]
    fn test_io_error_is_store_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = store_error("Failed to save resource")(sqlx::Error::Io(io));
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        let err = classify("Failed to find resource", sqlx::Error::RowNotFound);
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
