//! Data blocks embedded in the host page.
//!
//! Blocks arrive as raw text keyed by element id. A block that does not parse
//! as JSON is taken as a plain string, and a missing block falls back to an
//! empty value of the expected shape.

use crate::domain::{OlcumError, OlcumResult};
use crate::matrix::{ParameterCatalog, SubmissionPayload};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const PARAMETERS_BLOCK: &str = "parameters-json";
pub const CURRENT_DISTRICT_BLOCK: &str = "current-ilce-json";
pub const CHIMNEY_PARAMETERS_BLOCK: &str = "baca-parametreleri-json";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagePayload {
    blocks: BTreeMap<String, String>,
}

impl PagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, id: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(id, raw);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.blocks.insert(id.into(), raw.into());
    }

    /// Reads a JSON object of block id → content. String values are kept as
    /// raw block text; any other value is stored as its JSON encoding.
    pub fn load(path: &Path) -> OlcumResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            OlcumError::io_system(
                "IO.PAGE_READ",
                format!("failed to read page '{}': {}", path.display(), source),
            )
        })?;
        let blocks: BTreeMap<String, Value> = serde_json::from_str(&content).map_err(|source| {
            OlcumError::input_validation(
                "INPUT.PAGE_PARSE",
                format!("failed to parse page '{}': {}", path.display(), source),
            )
        })?;
        let mut page = Self::new();
        for (id, value) in blocks {
            let raw = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            page.insert(id, raw);
        }
        Ok(page)
    }

    pub fn raw(&self, id: &str) -> Option<&str> {
        self.blocks.get(id).map(String::as_str)
    }

    /// Parsed block content; text that is not JSON comes back as a string.
    pub fn block(&self, id: &str) -> Option<Value> {
        let raw = self.raw(id)?;
        Some(serde_json::from_str(raw).unwrap_or_else(|_| {
            debug!(block = id, "block is not JSON; using it as text");
            Value::String(raw.to_string())
        }))
    }

    pub fn catalog(&self) -> ParameterCatalog {
        let value = self
            .block(PARAMETERS_BLOCK)
            .unwrap_or_else(|| Value::Array(Vec::new()));
        ParameterCatalog::from_json(&value)
    }

    pub fn current_district(&self) -> String {
        match self.block(CURRENT_DISTRICT_BLOCK) {
            Some(Value::String(text)) => text,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Persisted chimney map. A block of the wrong shape is logged and read
    /// as an empty map so the editor still opens.
    pub fn chimney_parameters(&self) -> SubmissionPayload {
        let Some(value) = self.block(CHIMNEY_PARAMETERS_BLOCK) else {
            return SubmissionPayload::new();
        };
        match value {
            Value::Null => SubmissionPayload::new(),
            // A JSON string holding the encoded object, as some records store it.
            Value::String(text) if text.trim_start().starts_with('{') => {
                serde_json::from_str(&text).unwrap_or_else(|error| {
                    warn!(%error, "chimney parameter block is malformed");
                    SubmissionPayload::new()
                })
            }
            other => serde_json::from_value(other).unwrap_or_else(|error| {
                warn!(%error, "chimney parameter block is malformed");
                SubmissionPayload::new()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CHIMNEY_PARAMETERS_BLOCK, CURRENT_DISTRICT_BLOCK, PARAMETERS_BLOCK, PagePayload,
    };
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_blocks_fall_back_to_empty_values() {
        let page = PagePayload::new();

        assert!(page.catalog().is_empty());
        assert_eq!(page.current_district(), "");
        assert!(page.chimney_parameters().is_empty());
    }

    #[test]
    fn non_json_block_is_read_as_text() {
        let page = PagePayload::new().with_block(CURRENT_DISTRICT_BLOCK, "GEBZE");
        assert_eq!(page.current_district(), "GEBZE");

        let quoted = PagePayload::new().with_block(CURRENT_DISTRICT_BLOCK, "\"İZMİT\"");
        assert_eq!(quoted.current_district(), "İZMİT");
    }

    #[test]
    fn catalog_block_accepts_objects_and_strings() {
        let page = PagePayload::new().with_block(
            PARAMETERS_BLOCK,
            r#"[{"id":"1","Parametre Adı":"TOZ","Metot":"TS EN 13284-1"},
                {"id":"2","ad":"YG"},"TOC"]"#,
        );

        let catalog = page.catalog();

        assert_eq!(catalog.names().collect::<Vec<_>>(), ["TOZ", "YG", "TOC"]);
        assert_eq!(
            catalog.get("TOZ").map(|parameter| parameter.method.as_str()),
            Some("TS EN 13284-1")
        );
    }

    #[test]
    fn malformed_chimney_block_opens_an_empty_editor() {
        let page = PagePayload::new().with_block(CHIMNEY_PARAMETERS_BLOCK, "[1, 2]");
        assert!(page.chimney_parameters().is_empty());

        let page = PagePayload::new()
            .with_block(CHIMNEY_PARAMETERS_BLOCK, r#"{"B":["YG"],"A":["TOZ"]}"#);
        let names: Vec<_> = page
            .chimney_parameters()
            .entries()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn load_keeps_string_blocks_raw_and_encodes_the_rest() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("page.json");
        fs::write(
            &path,
            r#"{"parameters-json":["TOZ","YG"],"current-ilce-json":"GEBZE",
                "baca-parametreleri-json":{"Kazan":["TOZ"]}}"#,
        )
        .expect("page should be written");

        let page = PagePayload::load(&path).expect("page should load");

        assert_eq!(page.raw(PARAMETERS_BLOCK), Some(r#"["TOZ","YG"]"#));
        assert_eq!(page.current_district(), "GEBZE");
        assert_eq!(
            page.chimney_parameters().get("Kazan"),
            Some(["TOZ".to_string()].as_slice())
        );
    }
}
