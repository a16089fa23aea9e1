pub mod errors;

pub use errors::{OlcumError, OlcumErrorCategory, OlcumResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

pub const MIN_CHIMNEYS: usize = 1;
pub const MAX_CHIMNEYS: usize = 20;

pub fn default_chimney_name(position: usize) -> String {
    format!("Chimney {position}")
}

pub fn chimney_count_in_range(count: usize) -> bool {
    (MIN_CHIMNEYS..=MAX_CHIMNEYS).contains(&count)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
}

impl Parameter {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            method: String::new(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChimneyRow {
    pub name: String,
    pub selected: BTreeSet<String>,
}

impl ChimneyRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selected: BTreeSet::new(),
        }
    }

    pub fn with_selected<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.extend(parameters.into_iter().map(Into::into));
        self
    }

    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    pub fn has_blank_name(&self) -> bool {
        self.trimmed_name().is_empty()
    }

    pub fn is_selected(&self, parameter: &str) -> bool {
        self.selected.contains(parameter)
    }
}

/// Required step-1 inputs, in the order they appear on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    CompanyName,
    MeasurementCode,
    ChimneyCount,
    StartTime,
    EndTime,
}

impl FormField {
    pub const REQUIRED: [FormField; 5] = [
        FormField::CompanyName,
        FormField::MeasurementCode,
        FormField::ChimneyCount,
        FormField::StartTime,
        FormField::EndTime,
    ];

    /// Persisted record key for the field.
    pub const fn key(self) -> &'static str {
        match self {
            Self::CompanyName => "firma_adi",
            Self::MeasurementCode => "olcum_kodu",
            Self::ChimneyCount => "baca_sayisi",
            Self::StartTime => "baslangic_tarihi",
            Self::EndTime => "bitis_tarihi",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CompanyName => "Company name",
            Self::MeasurementCode => "Measurement code",
            Self::ChimneyCount => "Chimney count",
            Self::StartTime => "Measurement start",
            Self::EndTime => "Measurement end",
        }
    }
}

impl Display for FormField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
