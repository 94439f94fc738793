use fundlens_core::dashboard::INVALID_RANGE;
use fundlens_core::{CoreError, ReportError};
use fundlens_warehouse::WarehouseError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ReportError> for CliError {
    fn from(error: ReportError) -> Self {
        match error {
            ReportError::InvalidRange => Self::Validation(INVALID_RANGE.to_string()),
            ReportError::Warehouse(error) => Self::Warehouse(error),
            ReportError::Core(error) => Self::Core(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Warehouse(WarehouseError::ConfigRejected(_)) => 2,
            Self::Warehouse(_) => 3,
            Self::Core(CoreError::InvalidDate { .. }) => 2,
            Self::Core(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn invalid_range_is_a_validation_failure() {
        let error = CliError::from(ReportError::InvalidRange);
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "Please select a valid date range.");
    }

    #[test]
    fn warehouse_failures_map_to_their_own_code() {
        let missing = CliError::from(WarehouseError::DatabaseMissing {
            path: PathBuf::from("/nowhere.db"),
        });
        assert_eq!(missing.exit_code(), 3);

        let rejected = CliError::from(WarehouseError::ConfigRejected("bad".into()));
        assert_eq!(rejected.exit_code(), 2);
    }
}
