use thiserror::Error;

use fundlens_warehouse::WarehouseError;

/// Errors raised while shaping query results for display.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("column '{column}' not found")]
    MissingColumn { column: String },
}
