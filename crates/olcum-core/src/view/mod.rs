//! Declarative view of the matrix editor.
//!
//! [`MatrixView::render`] turns the model into a snapshot of controls keyed by
//! `(row, parameter)`. Front ends keep the previous snapshot, render a new one
//! after every event and apply the [`ViewPatch`]es from [`MatrixView::diff`];
//! bindings attach to keys, so redrawing never duplicates them.

pub mod table;

pub use table::render_table;

use crate::matrix::{CounterMap, MatrixError, MatrixModel, ParameterCatalog};

/// Parameter name with every whitespace run, leading and trailing ones
/// included, replaced by a single `_`.
pub fn control_key(parameter: &str) -> String {
    let mut key = String::with_capacity(parameter.len());
    let mut in_whitespace = false;
    for ch in parameter.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                key.push('_');
            }
            in_whitespace = true;
        } else {
            key.push(ch);
            in_whitespace = false;
        }
    }
    key
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterHeader {
    pub parameter: String,
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub parameter: String,
    pub control_id: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub index: usize,
    pub input_name: String,
    pub name: String,
    pub placeholder: String,
    pub cells: Vec<CellView>,
    /// Selected parameters the catalog no longer lists. Display only.
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatrixView {
    pub headers: Vec<CounterHeader>,
    pub rows: Vec<RowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPatch {
    /// The catalog columns differ; redraw the whole table.
    ColumnsChanged,
    RowAdded { row: usize },
    RowRemoved { row: usize },
    NameChanged { row: usize, name: String },
    CellChanged {
        row: usize,
        parameter: String,
        checked: bool,
    },
    CounterChanged { parameter: String, count: usize },
}

/// Interaction reported by a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    NameEdited { row: usize, value: String },
    CellToggled {
        row: usize,
        parameter: String,
        checked: bool,
    },
}

/// Feeds one interaction into the model. Returns whether the model changed.
pub fn apply_event(matrix: &mut MatrixModel, event: &ControlEvent) -> Result<bool, MatrixError> {
    match event {
        ControlEvent::NameEdited { row, value } => {
            let changed = matrix.row(*row).is_some_and(|current| current.name != *value);
            matrix.rename_row(*row, value.clone())?;
            Ok(changed)
        }
        ControlEvent::CellToggled {
            row,
            parameter,
            checked,
        } => matrix.set_cell(*row, parameter, *checked),
    }
}

impl MatrixView {
    pub fn render(catalog: &ParameterCatalog, matrix: &MatrixModel) -> Self {
        let counters = CounterMap::compute(catalog, matrix);
        let headers = counters
            .entries()
            .iter()
            .map(|(parameter, count)| CounterHeader {
                parameter: parameter.clone(),
                key: control_key(parameter),
                count: *count,
            })
            .collect();

        let rows = matrix
            .to_rows()
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let position = index + 1;
                let cells = catalog
                    .names()
                    .map(|parameter| CellView {
                        parameter: parameter.to_string(),
                        control_id: format!("param_{position}_{}", control_key(parameter)),
                        checked: row.is_selected(parameter),
                    })
                    .collect();
                let extras = row
                    .selected
                    .iter()
                    .filter(|name| !catalog.contains(name))
                    .cloned()
                    .collect();
                RowView {
                    index,
                    input_name: format!("baca_adi_{position}"),
                    name: row.name.clone(),
                    placeholder: format!("Chimney {position} name..."),
                    cells,
                    extras,
                }
            })
            .collect();

        Self { headers, rows }
    }

    pub fn counter(&self, parameter: &str) -> Option<usize> {
        self.headers
            .iter()
            .find(|header| header.parameter == parameter)
            .map(|header| header.count)
    }

    pub fn diff(previous: &MatrixView, next: &MatrixView) -> Vec<ViewPatch> {
        let same_columns = previous.headers.len() == next.headers.len()
            && previous
                .headers
                .iter()
                .zip(&next.headers)
                .all(|(before, after)| before.parameter == after.parameter);
        if !same_columns {
            return vec![ViewPatch::ColumnsChanged];
        }

        let mut patches = Vec::new();
        for (before, after) in previous.rows.iter().zip(&next.rows) {
            if before.name != after.name {
                patches.push(ViewPatch::NameChanged {
                    row: after.index,
                    name: after.name.clone(),
                });
            }
            for (old_cell, new_cell) in before.cells.iter().zip(&after.cells) {
                if old_cell.checked != new_cell.checked {
                    patches.push(ViewPatch::CellChanged {
                        row: after.index,
                        parameter: new_cell.parameter.clone(),
                        checked: new_cell.checked,
                    });
                }
            }
        }

        let shared = previous.rows.len().min(next.rows.len());
        for row in (shared..previous.rows.len()).rev() {
            patches.push(ViewPatch::RowRemoved { row });
        }
        for row in shared..next.rows.len() {
            patches.push(ViewPatch::RowAdded { row });
        }

        for (before, after) in previous.headers.iter().zip(&next.headers) {
            if before.count != after.count {
                patches.push(ViewPatch::CounterChanged {
                    parameter: after.parameter.clone(),
                    count: after.count,
                });
            }
        }
        patches
    }
}
