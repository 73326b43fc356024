//! Ward operations.
//!
//! Each operation validates every precondition against the current state before it touches
//! anything, so a rejected operation leaves the ward exactly as it was. A successful operation
//! appends one event to the audit trail and returns the record it created.

pub mod admin;
pub mod assignment;
pub mod discharge;
pub mod transfer;
pub mod vitals;

use crate::WardResult;

/// Logs a rejected operation at `warn` and passes the result through.
pub(crate) fn log_rejection<T>(operation: &'static str, result: WardResult<T>) -> WardResult<T> {
    if let Err(err) = &result {
        tracing::warn!(operation, error = %err, "operation rejected");
    }
    result
}
