//! Error handling utilities for repositories

use packscout_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::Persistence(e.to_string())
}
