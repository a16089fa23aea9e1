use super::{MatrixModel, ParameterCatalog};

/// Number of chimneys whose selection contains `parameter`.
pub fn count(matrix: &MatrixModel, parameter: &str) -> usize {
    matrix
        .to_rows()
        .iter()
        .filter(|row| row.is_selected(parameter))
        .count()
}

/// Per-parameter chimney counts in catalog order.
///
/// Always recomputed from the full matrix; callers rebuild it after each
/// mutation instead of patching individual entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterMap {
    entries: Vec<(String, usize)>,
}

impl CounterMap {
    pub fn compute(catalog: &ParameterCatalog, matrix: &MatrixModel) -> Self {
        let entries = catalog
            .names()
            .map(|name| (name.to_string(), count(matrix, name)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, parameter: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| name == parameter)
            .map(|(_, value)| *value)
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, value)| value).sum()
    }
}
