//! Conversion between the matrix and the flat chimney → parameters payload.
//!
//! On the wire the payload is a JSON object keyed by chimney name. Entry order
//! is significant (it becomes row order on load), so the payload keeps its
//! entries in a `Vec` and implements the map encoding by hand.

use super::{MatrixModel, ParameterCatalog};
use crate::domain::ChimneyRow;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Formatter;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChimneyAssignment {
    pub name: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionPayload {
    entries: Vec<ChimneyAssignment>,
}

impl SubmissionPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object-key semantics: a repeated name replaces the earlier entry's
    /// parameters and keeps the earlier position.
    pub fn insert(&mut self, name: impl Into<String>, parameters: Vec<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(existing) => existing.parameters = parameters,
            None => self.entries.push(ChimneyAssignment { name, parameters }),
        }
    }

    pub fn entries(&self) -> &[ChimneyAssignment] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.parameters.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<N, P> FromIterator<(N, P)> for SubmissionPayload
where
    N: Into<String>,
    P: IntoIterator,
    P::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (name, parameters) in iter {
            payload.insert(name, parameters.into_iter().map(Into::into).collect());
        }
        payload
    }
}

impl Serialize for SubmissionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.parameters)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SubmissionPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PayloadVisitor)
    }
}

struct PayloadVisitor;

impl<'de> Visitor<'de> for PayloadVisitor {
    type Value = SubmissionPayload;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("an object mapping chimney names to parameter lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut payload = SubmissionPayload::new();
        while let Some((name, parameters)) = access.next_entry::<String, Vec<String>>()? {
            payload.insert(name, parameters);
        }
        Ok(payload)
    }
}

/// Flattens the matrix into the submission payload.
///
/// Rows whose trimmed name is empty are skipped; other names are written as
/// they are, so a reload gives back the same rows.
/// Selected parameters come out in catalog order, followed by any names the
/// catalog does not know about in sorted order.
pub fn serialize(matrix: &MatrixModel, catalog: &ParameterCatalog) -> SubmissionPayload {
    let mut payload = SubmissionPayload::new();
    for (index, row) in matrix.to_rows().iter().enumerate() {
        if row.has_blank_name() {
            debug!(row = index, "skipping chimney without a name");
            continue;
        }
        payload.insert(row.name.clone(), ordered_selection(row, catalog));
    }
    payload
}

/// Rebuilds a matrix from a persisted payload, one row per entry.
///
/// Parameters missing from the catalog stay selected; they simply have no
/// checkbox to render.
pub fn deserialize(payload: &SubmissionPayload, catalog: &ParameterCatalog) -> MatrixModel {
    let rows = payload
        .entries()
        .iter()
        .map(|entry| {
            for parameter in &entry.parameters {
                if !catalog.contains(parameter) {
                    debug!(
                        chimney = %entry.name,
                        parameter = %parameter,
                        "retaining parameter missing from catalog"
                    );
                }
            }
            ChimneyRow::new(entry.name.clone()).with_selected(entry.parameters.iter().cloned())
        })
        .collect();
    MatrixModel::from_rows(rows)
}

fn ordered_selection(row: &ChimneyRow, catalog: &ParameterCatalog) -> Vec<String> {
    let known = catalog
        .names()
        .filter(|name| row.is_selected(name))
        .map(str::to_string);
    let unknown = row
        .selected
        .iter()
        .filter(|name| !catalog.contains(name))
        .cloned();
    known.chain(unknown).collect()
}
