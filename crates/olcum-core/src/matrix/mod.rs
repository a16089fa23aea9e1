pub mod catalog;
pub mod counters;
pub mod serialization;

pub use catalog::ParameterCatalog;
pub use counters::{CounterMap, count};
pub use serialization::{ChimneyAssignment, SubmissionPayload, deserialize, serialize};

use crate::domain::{
    ChimneyRow, MAX_CHIMNEYS, MIN_CHIMNEYS, OlcumError, chimney_count_in_range,
    default_chimney_name,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("chimney count {requested} is outside the allowed range {min}..={max}")]
    OutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
    #[error("chimney row {index} does not exist (matrix has {len} rows)")]
    RowOutOfBounds { index: usize, len: usize },
}

impl From<MatrixError> for OlcumError {
    fn from(error: MatrixError) -> Self {
        let placeholder = match error {
            MatrixError::OutOfRange { .. } => "INTERNAL.MATRIX_RANGE",
            MatrixError::RowOutOfBounds { .. } => "INTERNAL.MATRIX_INDEX",
        };
        OlcumError::internal(placeholder, error.to_string())
    }
}

/// Chimney rows and the parameters selected for each of them.
///
/// Rows are identified by position. Resizing keeps every surviving row
/// untouched: growth appends empty rows with default names, shrinking drops
/// rows from the tail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatrixModel {
    rows: Vec<ChimneyRow>,
}

impl MatrixModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(count: usize) -> Result<Self, MatrixError> {
        let mut matrix = Self::new();
        matrix.resize(count)?;
        Ok(matrix)
    }

    pub fn from_rows(rows: Vec<ChimneyRow>) -> Self {
        Self { rows }
    }

    pub fn resize(&mut self, new_count: usize) -> Result<(), MatrixError> {
        if !chimney_count_in_range(new_count) {
            return Err(MatrixError::OutOfRange {
                requested: new_count,
                min: MIN_CHIMNEYS,
                max: MAX_CHIMNEYS,
            });
        }

        let current = self.rows.len();
        if new_count > current {
            let appended = (current + 1..=new_count).map(default_chimney_name);
            self.rows.extend(appended.map(ChimneyRow::new));
        } else {
            self.rows.truncate(new_count);
        }
        debug!(from = current, to = new_count, "resized chimney matrix");
        Ok(())
    }

    /// Returns whether the cell changed.
    pub fn set_cell(
        &mut self,
        row_index: usize,
        parameter: &str,
        selected: bool,
    ) -> Result<bool, MatrixError> {
        let row = self.row_mut(row_index)?;
        let changed = if selected {
            row.selected.insert(parameter.to_string())
        } else {
            row.selected.remove(parameter)
        };
        if changed {
            debug!(row = row_index, parameter, selected, "toggled matrix cell");
        }
        Ok(changed)
    }

    pub fn rename_row(
        &mut self,
        row_index: usize,
        name: impl Into<String>,
    ) -> Result<(), MatrixError> {
        self.row_mut(row_index)?.name = name.into();
        Ok(())
    }

    /// Strips surrounding whitespace from every row name.
    pub fn trim_names(&mut self) {
        for row in &mut self.rows {
            let trimmed = row.trimmed_name();
            if trimmed.len() != row.name.len() {
                row.name = trimmed.to_string();
            }
        }
    }

    pub fn to_rows(&self) -> &[ChimneyRow] {
        &self.rows
    }

    pub fn row(&self, row_index: usize) -> Option<&ChimneyRow> {
        self.rows.get(row_index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row_mut(&mut self, row_index: usize) -> Result<&mut ChimneyRow, MatrixError> {
        let len = self.rows.len();
        self.rows
            .get_mut(row_index)
            .ok_or(MatrixError::RowOutOfBounds {
                index: row_index,
                len,
            })
    }
}
