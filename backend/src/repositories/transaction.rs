//! Transaction management utilities for repositories.

use crate::error::AppError;
use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

/// Begin a new database transaction.
pub async fn begin_transaction(db: &PgPool) -> Result<PgTransaction<'_>, AppError> {
    db.begin()
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Commit a transaction, making its changes visible to readers.
pub async fn commit_transaction(tx: PgTransaction<'_>) -> Result<(), AppError> {
    tx.commit()
        .await
        .map_err(|e| AppError::Internal(e.into()))
}
