use sqlx::error::ErrorKind;

use stockroom_inventory::StoreError;

/// Classify a sqlx failure into the store error taxonomy.
pub(crate) fn map_sqlx_error(err: &sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => StoreError::Constraint(db.message().to_string()),
            _ => StoreError::Query(db.message().to_string()),
        },
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::Corrupt(err.to_string()),
        _ => StoreError::Unavailable(err.to_string()),
    }
}

/// Log and classify a failure of the named store operation.
pub(crate) fn store_failure(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| {
        let mapped = map_sqlx_error(&err);
        tracing::error!(operation, error = %err, kind = ?mapped, "item store operation failed");
        mapped
    }
}
