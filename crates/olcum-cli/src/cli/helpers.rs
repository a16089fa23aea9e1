use super::CliError;
use anyhow::Context;
use olcum_core::common::AppConfig;
use olcum_core::domain::{FormField, OlcumError};
use olcum_core::matrix::ParameterCatalog;
use olcum_core::page::{
    CHIMNEY_PARAMETERS_BLOCK, CURRENT_DISTRICT_BLOCK, PARAMETERS_BLOCK, PagePayload,
};
use olcum_core::remote::{JsonFileStore, MeasurementRecord, StaticRegionDirectory};
use olcum_core::wizard::BasicInfoForm;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Creation draft: the wizard's step-1 inputs plus the chimney rows to fill
/// in on step 2.
#[derive(Debug, Deserialize, Clone, Default)]
pub(super) struct Draft {
    #[serde(default)]
    pub(super) firma_adi: String,
    #[serde(default)]
    pub(super) olcum_kodu: String,
    #[serde(default)]
    pub(super) baca_sayisi: Value,
    #[serde(default)]
    pub(super) baslangic_tarihi: Option<String>,
    #[serde(default)]
    pub(super) bitis_tarihi: Option<String>,
    #[serde(default)]
    pub(super) personel: Vec<String>,
    #[serde(default)]
    pub(super) bacalar: Vec<DraftChimney>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub(super) struct DraftChimney {
    /// Keeps the generated "Chimney n" name when absent.
    #[serde(default)]
    pub(super) ad: Option<String>,
    #[serde(default)]
    pub(super) parametreler: Vec<String>,
}

impl Draft {
    /// Copies the draft onto `form`; timestamps only replace the prefilled
    /// window when the draft carries them.
    pub(super) fn fill(&self, form: &mut BasicInfoForm) {
        form.set(FormField::CompanyName, self.firma_adi.clone());
        form.set(FormField::MeasurementCode, self.olcum_kodu.clone());
        form.set(FormField::ChimneyCount, value_text(&self.baca_sayisi));
        if let Some(start) = &self.baslangic_tarihi {
            form.set(FormField::StartTime, start.clone());
        }
        if let Some(end) = &self.bitis_tarihi {
            form.set(FormField::EndTime, end.clone());
        }
        for person in &self.personel {
            form.check_personnel(person.clone());
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(super) fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    AppConfig::load_or_default(path).map_err(CliError::Domain)
}

pub(super) fn load_draft(path: &Path) -> Result<Draft, CliError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read draft '{}'", path.display()))?;
    serde_json::from_str::<Draft>(&content)
        .with_context(|| format!("failed to parse draft '{}'", path.display()))
        .map_err(CliError::from)
}

pub(super) fn open_store(config: &AppConfig) -> JsonFileStore {
    JsonFileStore::new(&config.store_path, config.redirect_location.clone())
}

pub(super) fn find_record(
    store: &JsonFileStore,
    measurement_code: &str,
) -> Result<MeasurementRecord, CliError> {
    store.find_by_code(measurement_code)?.ok_or_else(|| {
        CliError::Domain(OlcumError::input_validation(
            "INPUT.RECORD_NOT_FOUND",
            format!(
                "no measurement record with code '{}' in '{}'",
                measurement_code,
                store.path().display()
            ),
        ))
    })
}

/// Page payload for a stored record. The catalog comes from `page` when
/// given; otherwise it is made of the parameter names the record uses.
pub(super) fn record_page(
    record: &MeasurementRecord,
    page: Option<&Path>,
) -> Result<PagePayload, CliError> {
    let mut payload = match page {
        Some(path) => PagePayload::load(path)?,
        None => PagePayload::new().with_block(
            PARAMETERS_BLOCK,
            encode_json(&record_parameter_names(record))?,
        ),
    };
    payload.insert(CURRENT_DISTRICT_BLOCK, encode_json(&record.ilce)?);
    payload.insert(
        CHIMNEY_PARAMETERS_BLOCK,
        encode_json(&record.baca_parametreleri)?,
    );
    Ok(payload)
}

fn record_parameter_names(record: &MeasurementRecord) -> Vec<String> {
    let mut seen = BTreeSet::new();
    record
        .baca_parametreleri
        .entries()
        .iter()
        .flat_map(|entry| entry.parameters.iter())
        .filter(|name| seen.insert((*name).clone()))
        .cloned()
        .collect()
}

fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string(value)
        .context("failed to encode page block")
        .map_err(CliError::from)
}

/// Form fields the edit page posts for `record`.
pub(super) fn record_fields(record: &MeasurementRecord) -> Vec<(String, String)> {
    let mut fields = vec![
        ("id".to_string(), record.id.clone()),
        (
            FormField::CompanyName.key().to_string(),
            record.firma_adi.clone(),
        ),
        (
            FormField::MeasurementCode.key().to_string(),
            record.olcum_kodu.clone(),
        ),
        (
            FormField::StartTime.key().to_string(),
            record.baslangic_tarihi.clone(),
        ),
        (
            FormField::EndTime.key().to_string(),
            record.bitis_tarihi.clone(),
        ),
        ("il".to_string(), record.il.clone()),
        ("ilce".to_string(), record.ilce.clone()),
        (
            FormField::ChimneyCount.key().to_string(),
            record.baca_sayisi.clone(),
        ),
    ];
    fields.extend(
        record
            .personel
            .iter()
            .map(|person| ("personel".to_string(), person.clone())),
    );
    fields
}

pub(super) fn load_catalog(page: &Path) -> Result<ParameterCatalog, CliError> {
    Ok(PagePayload::load(page)?.catalog())
}

/// Region directory, or `None` when the file does not exist.
pub(super) fn load_regions(path: &Path) -> Result<Option<StaticRegionDirectory>, CliError> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(StaticRegionDirectory::load(path)?))
}

/// Parses `N=VALUE` with a one-based row number into a zero-based index.
pub(super) fn parse_row_assignment(
    text: &str,
    rows: usize,
) -> Result<(usize, String), CliError> {
    let (row, value) = text.split_once('=').ok_or_else(|| {
        CliError::Usage(format!("expected ROW=VALUE, got '{text}'"))
    })?;
    let row: usize = row
        .trim()
        .parse()
        .map_err(|_| CliError::Usage(format!("invalid row number in '{text}'")))?;
    if row == 0 || row > rows {
        return Err(CliError::Usage(format!(
            "row {row} is outside 1..={rows} in '{text}'"
        )));
    }
    Ok((row - 1, value.to_string()))
}
