//! Ordered, name-keyed parameter catalog.
//!
//! The catalog is built once from the host page and never mutated afterwards.
//! Parameter names are the matching key: a later entry whose name was already
//! seen is dropped, keeping the first occurrence and its position.

use crate::domain::Parameter;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

const NAME_KEYS: [&str; 3] = ["Parametre Adı", "ad", "isim"];
const METHOD_KEYS: [&str; 2] = ["Metot", "metot"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterCatalog {
    parameters: Vec<Parameter>,
}

impl ParameterCatalog {
    pub fn new<I>(parameters: I) -> Self
    where
        I: IntoIterator<Item = Parameter>,
    {
        let mut seen = BTreeSet::new();
        let mut kept = Vec::new();
        for parameter in parameters {
            if parameter.name.trim().is_empty() {
                debug!(id = %parameter.id, "skipping catalog entry without a name");
                continue;
            }
            if !seen.insert(parameter.name.clone()) {
                debug!(name = %parameter.name, "collapsing duplicate catalog entry");
                continue;
            }
            kept.push(parameter);
        }
        Self { parameters: kept }
    }

    /// Catalog made of bare names, as found in the creation page's datalist.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| Parameter::new(String::new(), name)),
        )
    }

    /// Builds the catalog from the page's `parameters-json` block.
    ///
    /// Rows may be plain strings or objects carrying `id`, a name under one of
    /// `Parametre Adı`, `ad` or `isim`, and an optional method under `Metot` or
    /// `metot`. Anything that is not an array yields an empty catalog.
    pub fn from_json(value: &Value) -> Self {
        let Some(rows) = value.as_array() else {
            if !value.is_null() {
                debug!("parameter block is not an array; using an empty catalog");
            }
            return Self::default();
        };
        Self::new(rows.iter().filter_map(parameter_from_json))
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|parameter| parameter.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters
            .iter()
            .position(|parameter| parameter.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name == name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

fn parameter_from_json(row: &Value) -> Option<Parameter> {
    match row {
        Value::String(name) => Some(Parameter::new(String::new(), name.clone())),
        Value::Object(fields) => {
            let text = |key: &str| {
                fields
                    .get(key)
                    .and_then(Value::as_str)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            };
            let name = NAME_KEYS
                .iter()
                .find_map(|key| text(*key))
                .unwrap_or_default();
            let method = METHOD_KEYS
                .iter()
                .find_map(|key| text(*key))
                .unwrap_or_default();
            let id = match fields.get("id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(id)) => id.to_string(),
                _ => String::new(),
            };
            Some(Parameter::new(id, name).with_method(method))
        }
        _ => None,
    }
}
