use crate::domain::{OlcumError, OlcumResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "olcum.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub regions_path: PathBuf,
    pub create_target: String,
    pub edit_target: String,
    pub redirect_location: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("data/firma_olcum.json"),
            regions_path: PathBuf::from("data/ilceler.json"),
            create_target: "/api/olcum_olustur".to_string(),
            edit_target: "/firma_olcum/edit".to_string(),
            redirect_location: "/firma_olcum".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> OlcumResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            OlcumError::io_system(
                "IO.CONFIG_READ",
                format!("failed to read config '{}': {}", path.display(), source),
            )
        })?;
        serde_json::from_str(&content).map_err(|source| {
            OlcumError::input_validation(
                "INPUT.CONFIG_PARSE",
                format!("failed to parse config '{}': {}", path.display(), source),
            )
        })
    }

    /// Loads `path` when given; otherwise uses `olcum.json` in the working
    /// directory if present, falling back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> OlcumResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;
    use crate::domain::OlcumErrorCategory;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn partial_config_keeps_defaults_for_missing_keys() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("olcum.json");
        fs::write(&path, r#"{ "storePath": "records.json" }"#).expect("config should be written");

        let config = AppConfig::load(&path).expect("config should load");

        assert_eq!(config.store_path, PathBuf::from("records.json"));
        assert_eq!(config.create_target, AppConfig::default().create_target);
    }

    #[test]
    fn malformed_and_missing_configs_map_to_distinct_categories() {
        let temp = TempDir::new().expect("tempdir should be created");
        let bad = temp.path().join("bad.json");
        fs::write(&bad, "{ not json").expect("config should be written");

        let parse_error = AppConfig::load(&bad).expect_err("parse should fail");
        assert_eq!(
            parse_error.category(),
            OlcumErrorCategory::InputValidationError
        );

        let missing = AppConfig::load(&temp.path().join("missing.json"))
            .expect_err("read should fail");
        assert_eq!(missing.category(), OlcumErrorCategory::IoSystemError);
    }
}
