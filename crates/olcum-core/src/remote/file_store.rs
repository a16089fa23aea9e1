//! JSON-file persistence endpoint.
//!
//! Records live in a single JSON array. Creation upserts by company name and
//! measurement code; edits address a record by its measurement code (or `id`
//! when the form carries one).

use super::{
    CHIMNEY_PARAMETERS_FIELD, MeasurementSubmission, PersistenceClient, RemoteResponse,
    RequestBody, SubmissionRequest,
};
use crate::common::clock::{format_seconds, unix_seconds};
use crate::domain::{FormField, OlcumError, OlcumResult};
use crate::matrix::SubmissionPayload;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub firma_adi: String,
    #[serde(default)]
    pub olcum_kodu: String,
    #[serde(default)]
    pub baslangic_tarihi: String,
    #[serde(default)]
    pub bitis_tarihi: String,
    #[serde(default)]
    pub il: String,
    #[serde(default)]
    pub ilce: String,
    #[serde(default)]
    pub personel: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub baca_sayisi: String,
    #[serde(default, deserialize_with = "chimney_map")]
    pub baca_parametreleri: SubmissionPayload,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub olusturma_tarihi: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub guncelleme_tarihi: String,
    /// Fields this tool does not interpret, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MeasurementRecord {
    fn from_submission(submission: &MeasurementSubmission) -> Self {
        Self {
            firma_adi: submission.firma_adi.clone(),
            olcum_kodu: submission.olcum_kodu.clone(),
            baslangic_tarihi: submission.baslangic_tarihi.clone(),
            bitis_tarihi: submission.bitis_tarihi.clone(),
            personel: submission.personel.clone(),
            baca_sayisi: submission.baca_sayisi.to_string(),
            baca_parametreleri: submission.baca_parametreleri.clone(),
            ..Self::default()
        }
    }

    /// Applies an edit form. Returns an error message for a malformed chimney
    /// payload; the record is left untouched in that case.
    fn apply_form(&mut self, fields: &[(String, String)]) -> Result<(), String> {
        let mut personnel = Vec::new();
        let mut staged = self.clone();
        for (key, value) in fields {
            match key.as_str() {
                "id" => {}
                "firma_adi" => staged.firma_adi = value.clone(),
                "olcum_kodu" => staged.olcum_kodu = value.clone(),
                "baslangic_tarihi" => staged.baslangic_tarihi = value.clone(),
                "bitis_tarihi" => staged.bitis_tarihi = value.clone(),
                "il" => staged.il = value.clone(),
                "ilce" => staged.ilce = value.clone(),
                "baca_sayisi" => staged.baca_sayisi = value.clone(),
                "personel" => personnel.push(value.clone()),
                CHIMNEY_PARAMETERS_FIELD => {
                    staged.baca_parametreleri = serde_json::from_str(value)
                        .map_err(|source| format!("invalid chimney payload: {source}"))?;
                }
                other => {
                    staged
                        .extra
                        .insert(other.to_string(), Value::String(value.clone()));
                }
            }
        }
        if !personnel.is_empty() {
            staged.personel = personnel;
        }
        *self = staged;
        Ok(())
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

// Older records hold `null` or the map JSON-encoded as a string.
fn chimney_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<SubmissionPayload, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(SubmissionPayload::new()),
        Value::String(text) if text.trim().is_empty() => Ok(SubmissionPayload::new()),
        Value::String(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
        other => SubmissionPayload::deserialize(other).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    redirect_location: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, redirect_location: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            redirect_location: redirect_location.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty store.
    pub fn load(&self) -> OlcumResult<Vec<MeasurementRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| {
            OlcumError::io_system(
                "IO.STORE_READ",
                format!("failed to read store '{}': {}", self.path.display(), source),
            )
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| {
            OlcumError::io_system(
                "IO.STORE_PARSE",
                format!("failed to parse store '{}': {}", self.path.display(), source),
            )
        })
    }

    pub fn find_by_code(&self, measurement_code: &str) -> OlcumResult<Option<MeasurementRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|record| record.olcum_kodu == measurement_code))
    }

    fn save(&self, records: &[MeasurementRecord]) -> OlcumResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| {
                OlcumError::io_system(
                    "IO.STORE_WRITE",
                    format!("failed to create '{}': {}", parent.display(), source),
                )
            })?;
        }
        let encoded = serde_json::to_string_pretty(records).map_err(|source| {
            OlcumError::internal("INTERNAL.STORE_ENCODE", source.to_string())
        })?;
        fs::write(&self.path, encoded + "\n").map_err(|source| {
            OlcumError::io_system(
                "IO.STORE_WRITE",
                format!("failed to write store '{}': {}", self.path.display(), source),
            )
        })
    }

    fn redirect(&self) -> RemoteResponse {
        RemoteResponse::Redirect {
            location: self.redirect_location.clone(),
        }
    }

    fn create(&self, submission: &MeasurementSubmission) -> OlcumResult<RemoteResponse> {
        if submission.firma_adi.trim().is_empty() || submission.olcum_kodu.trim().is_empty() {
            return Ok(RemoteResponse::RenderedError {
                body: format!(
                    "{} and {} are required",
                    FormField::CompanyName.key(),
                    FormField::MeasurementCode.key()
                ),
            });
        }

        let now = SystemTime::now();
        let mut records = self.load()?;
        let mut record = MeasurementRecord::from_submission(submission);
        record.olusturma_tarihi = format_seconds(now)?;

        let existing = records.iter().position(|existing| {
            existing.firma_adi == submission.firma_adi
                && existing.olcum_kodu == submission.olcum_kodu
        });
        match existing {
            Some(index) => {
                record.id = records[index].id.clone();
                records[index] = record;
                info!(code = %submission.olcum_kodu, "updated existing measurement record");
            }
            None => {
                record.id = format!("olcum-{}-{}", unix_seconds(now), records.len() + 1);
                records.push(record);
                info!(code = %submission.olcum_kodu, "created measurement record");
            }
        }
        self.save(&records)?;
        Ok(self.redirect())
    }

    fn update(&self, fields: &[(String, String)]) -> OlcumResult<RemoteResponse> {
        let lookup = |key: &str| {
            fields
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
        };
        let id = lookup("id").filter(|id| !id.is_empty());
        let code = lookup(FormField::MeasurementCode.key()).unwrap_or_default();

        let mut records = self.load()?;
        let Some(record) = records.iter_mut().find(|record| match id {
            Some(id) => record.id == id,
            None => record.olcum_kodu == code,
        }) else {
            warn!(code, "edit addressed an unknown measurement record");
            return Ok(RemoteResponse::Status {
                code: 404,
                body: format!("measurement record '{code}' not found"),
            });
        };

        if let Err(message) = record.apply_form(fields) {
            return Ok(RemoteResponse::RenderedError { body: message });
        }
        record.guncelleme_tarihi = format_seconds(SystemTime::now())?;
        info!(code = %record.olcum_kodu, "updated measurement record");
        self.save(&records)?;
        Ok(self.redirect())
    }
}

impl PersistenceClient for JsonFileStore {
    fn submit(&mut self, request: &SubmissionRequest) -> OlcumResult<RemoteResponse> {
        info!(
            method = %request.method,
            target = %request.target,
            store = %self.path.display(),
            "handling submission"
        );
        match &request.body {
            RequestBody::Json(submission) => self.create(submission),
            RequestBody::Form(fields) => self.update(fields),
        }
    }
}
