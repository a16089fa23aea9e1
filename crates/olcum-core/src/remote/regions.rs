use super::RegionDirectory;
use crate::domain::{OlcumError, OlcumResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const DISTRICT_PLACEHOLDER: &str = "Select district";

/// Region → district lookup backed by a JSON object of string arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticRegionDirectory {
    districts: BTreeMap<String, Vec<String>>,
}

impl StaticRegionDirectory {
    pub fn new(districts: BTreeMap<String, Vec<String>>) -> Self {
        Self { districts }
    }

    pub fn load(path: &Path) -> OlcumResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            OlcumError::io_system(
                "IO.REGIONS_READ",
                format!("failed to read regions '{}': {}", path.display(), source),
            )
        })?;
        let districts = serde_json::from_str(&content).map_err(|source| {
            OlcumError::input_validation(
                "INPUT.REGIONS_PARSE",
                format!("failed to parse regions '{}': {}", path.display(), source),
            )
        })?;
        Ok(Self::new(districts))
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.districts.keys().map(String::as_str)
    }
}

impl RegionDirectory for StaticRegionDirectory {
    fn districts(&self, region: &str) -> OlcumResult<Vec<String>> {
        self.districts.get(region).cloned().ok_or_else(|| {
            OlcumError::remote(
                "REMOTE.REGION_UNKNOWN",
                format!("no districts known for region '{region}'"),
            )
        })
    }
}

/// Dependent district selector driven by the selected region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistrictSelector {
    region: String,
    options: Vec<String>,
    selected: Option<String>,
}

impl DistrictSelector {
    /// Loads districts for `region` and preselects `current` when listed.
    ///
    /// A failed lookup leaves only the placeholder; the rest of the page keeps
    /// working.
    pub fn load(directory: &dyn RegionDirectory, region: &str, current: &str) -> Self {
        let mut selector = Self {
            region: region.to_string(),
            ..Self::default()
        };
        if region.is_empty() {
            return selector;
        }
        match directory.districts(region) {
            Ok(options) => {
                selector.selected = options.iter().find(|option| *option == current).cloned();
                selector.options = options;
            }
            Err(error) => warn!(region, %error, "district lookup failed"),
        }
        selector
    }

    /// Switching region clears the previous choice.
    pub fn change_region(&mut self, directory: &dyn RegionDirectory, region: &str) {
        *self = Self::load(directory, region, "");
    }

    pub fn select(&mut self, district: &str) -> bool {
        if self.options.iter().any(|option| option == district) {
            self.selected = Some(district.to_string());
            true
        } else {
            false
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{DistrictSelector, StaticRegionDirectory};
    use crate::domain::OlcumErrorCategory;
    use crate::remote::RegionDirectory;
    use std::collections::BTreeMap;

    fn directory() -> StaticRegionDirectory {
        let mut districts = BTreeMap::new();
        districts.insert(
            "KOCAELİ".to_string(),
            vec!["GEBZE".to_string(), "İZMİT".to_string()],
        );
        districts.insert("SAKARYA".to_string(), vec!["ADAPAZARI".to_string()]);
        StaticRegionDirectory::new(districts)
    }

    #[test]
    fn current_district_is_preselected() {
        let selector = DistrictSelector::load(&directory(), "KOCAELİ", "İZMİT");

        assert_eq!(selector.options(), ["GEBZE", "İZMİT"]);
        assert_eq!(selector.selected(), Some("İZMİT"));
    }

    #[test]
    fn changing_region_reloads_without_selection() {
        let directory = directory();
        let mut selector = DistrictSelector::load(&directory, "KOCAELİ", "GEBZE");

        selector.change_region(&directory, "SAKARYA");

        assert_eq!(selector.region(), "SAKARYA");
        assert_eq!(selector.options(), ["ADAPAZARI"]);
        assert_eq!(selector.selected(), None);
        assert!(selector.select("ADAPAZARI"));
        assert!(!selector.select("GEBZE"));
    }

    #[test]
    fn failed_lookup_degrades_to_placeholder_only() {
        let directory = directory();
        let error = directory.districts("ANKARA").expect_err("unknown region");
        assert_eq!(error.category(), OlcumErrorCategory::RemoteFailure);

        let selector = DistrictSelector::load(&directory, "ANKARA", "ÇANKAYA");
        assert!(selector.options().is_empty());
        assert_eq!(selector.selected(), None);
    }
}
