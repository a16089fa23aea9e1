//! Step gates for the creation wizard.
//!
//! The two steps report failures differently. Step 1 checks every required
//! field and flags each invalid one before looking at personnel. Step 2 walks
//! the chimney rows in order and stops at the first row that fails.

use super::form::{BasicInfoForm, FormData};
use crate::domain::{ChimneyRow, FormField, OlcumError, chimney_count_in_range};
use std::collections::BTreeSet;

pub const PERSONNEL_REQUIRED_MESSAGE: &str = "Please select at least one staff member.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step1Report {
    /// Required fields that are blank or malformed, in form order.
    pub invalid_fields: Vec<FormField>,
    /// Blocking message shown when no personnel is selected.
    pub blocking_message: Option<String>,
}

impl Step1Report {
    pub fn is_flagged(&self, field: FormField) -> bool {
        self.invalid_fields.contains(&field)
    }

    pub fn to_error(&self) -> OlcumError {
        if let Some(message) = &self.blocking_message {
            return OlcumError::input_validation("INPUT.STEP1_PERSONNEL", message.clone());
        }
        let labels: Vec<_> = self
            .invalid_fields
            .iter()
            .map(|field| field.label())
            .collect();
        OlcumError::input_validation(
            "INPUT.STEP1_REQUIRED",
            format!("Please fill in: {}.", labels.join(", ")),
        )
    }
}

pub fn validate_basic_info(form: &BasicInfoForm) -> Result<FormData, Step1Report> {
    let mut report = Step1Report::default();
    for field in FormField::REQUIRED {
        if form.value(field).trim().is_empty() {
            report.invalid_fields.push(field);
        }
    }

    let chimney_count = parse_chimney_count(&form.chimney_count);
    if chimney_count.is_none() && !report.is_flagged(FormField::ChimneyCount) {
        report.invalid_fields.push(FormField::ChimneyCount);
        report.invalid_fields.sort();
    }

    if form.personnel().is_empty() {
        report.blocking_message = Some(PERSONNEL_REQUIRED_MESSAGE.to_string());
    }

    match chimney_count {
        Some(chimney_count)
            if report.invalid_fields.is_empty() && report.blocking_message.is_none() =>
        {
            Ok(FormData {
                company_name: form.company_name.trim().to_string(),
                measurement_code: form.measurement_code.trim().to_string(),
                chimney_count,
                start_time: form.start_time.trim().to_string(),
                end_time: form.end_time.trim().to_string(),
                personnel: form.personnel().to_vec(),
            })
        }
        _ => Err(report),
    }
}

/// Integer in `1..=20`, surrounding whitespace ignored.
pub fn parse_chimney_count(text: &str) -> Option<usize> {
    text.trim()
        .parse::<usize>()
        .ok()
        .filter(|count| chimney_count_in_range(*count))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step2Failure {
    MissingName { row: usize },
    NoParameters { row: usize, label: String },
    DuplicateName { row: usize, name: String },
}

impl Step2Failure {
    /// Zero-based index of the offending row.
    pub fn row(&self) -> usize {
        match self {
            Self::MissingName { row }
            | Self::NoParameters { row, .. }
            | Self::DuplicateName { row, .. } => *row,
        }
    }

    pub fn name_flagged(&self) -> bool {
        matches!(self, Self::MissingName { .. } | Self::DuplicateName { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingName { row } => {
                format!("Please enter a name for chimney {}.", row + 1)
            }
            Self::NoParameters { label, .. } => {
                format!("Please select at least one parameter for '{label}'.")
            }
            Self::DuplicateName { name, .. } => {
                format!("Chimney name '{name}' is used more than once.")
            }
        }
    }

    pub fn to_error(&self) -> OlcumError {
        let placeholder = match self {
            Self::MissingName { .. } => "INPUT.STEP2_NAME",
            Self::NoParameters { .. } => "INPUT.STEP2_PARAMETERS",
            Self::DuplicateName { .. } => "INPUT.STEP2_DUPLICATE",
        };
        OlcumError::input_validation(placeholder, self.message())
    }
}

/// Checks rows in order and returns the first failure; later rows are not
/// inspected. A row needs a non-blank name and at least one parameter.
pub fn validate_rows(rows: &[ChimneyRow]) -> Result<(), Step2Failure> {
    for (row, chimney) in rows.iter().enumerate() {
        if chimney.has_blank_name() {
            return Err(Step2Failure::MissingName { row });
        }
        if chimney.selected.is_empty() {
            return Err(Step2Failure::NoParameters {
                row,
                label: chimney.trimmed_name().to_string(),
            });
        }
    }
    check_unique_names(rows)
}

/// Names are persisted as object keys, so two rows must not share a trimmed
/// name. Blank names are ignored here; they never reach the payload.
pub fn check_unique_names(rows: &[ChimneyRow]) -> Result<(), Step2Failure> {
    let mut seen = BTreeSet::new();
    for (row, chimney) in rows.iter().enumerate() {
        let name = chimney.trimmed_name();
        if !name.is_empty() && !seen.insert(name) {
            return Err(Step2Failure::DuplicateName {
                row,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
