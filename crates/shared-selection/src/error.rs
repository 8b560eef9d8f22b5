//! Error types for shared-selection.

use crate::row::ColumnKind;

/// Result type alias for fallible shared-selection operations.
pub type Result<T> = std::result::Result<T, RowError>;

/// Errors that can occur when building a [`RowEntry`](crate::row::RowEntry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// A column marker is not one of `string`, `boolean` or `choice`.
    #[error("Unsupported column type '{marker}': expected 'string', 'boolean' or 'choice'")]
    UnknownColumnType { marker: String },

    /// The default values do not line up with the columns.
    #[error("Expected {columns} default values, got {defaults}")]
    DefaultsLength { columns: usize, defaults: usize },

    /// The number of choice models differs from the number of choice columns.
    #[error("{choice_columns} choice columns but {models} choice models")]
    ChoiceModelCount { choice_columns: usize, models: usize },

    /// The supplied cell values do not add up to the number of columns.
    #[error("{columns} columns but {supplied} cell values")]
    CellCount { columns: usize, supplied: usize },

    /// A column has no value of its kind left to take.
    #[error("No {kind} value left for column {column}")]
    MissingCellValue { column: usize, kind: ColumnKind },
}

impl RowError {
    /// Create an unknown column type error.
    pub fn unknown_column_type(marker: impl Into<String>) -> Self {
        Self::UnknownColumnType {
            marker: marker.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RowError::unknown_column_type("date").to_string(),
            "Unsupported column type 'date': expected 'string', 'boolean' or 'choice'"
        );
        assert_eq!(
            RowError::ChoiceModelCount {
                choice_columns: 2,
                models: 1
            }
            .to_string(),
            "2 choice columns but 1 choice models"
        );
        assert_eq!(
            RowError::MissingCellValue {
                column: 3,
                kind: ColumnKind::Flag
            }
            .to_string(),
            "No boolean value left for column 3"
        );
    }
}
