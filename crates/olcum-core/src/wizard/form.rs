use crate::common::clock::default_measurement_window;
use crate::domain::{FormField, OlcumResult};
use std::time::SystemTime;

/// Step-1 inputs exactly as typed. Nothing is trimmed or parsed until the
/// operator tries to advance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasicInfoForm {
    pub company_name: String,
    pub measurement_code: String,
    pub chimney_count: String,
    pub start_time: String,
    pub end_time: String,
    personnel: Vec<String>,
}

impl BasicInfoForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty form with the measurement window prefilled to `now` .. `now + 1h`.
    pub fn with_default_window(now: SystemTime) -> OlcumResult<Self> {
        let (start_time, end_time) = default_measurement_window(now)?;
        Ok(Self {
            start_time,
            end_time,
            ..Self::default()
        })
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::CompanyName => &self.company_name,
            FormField::MeasurementCode => &self.measurement_code,
            FormField::ChimneyCount => &self.chimney_count,
            FormField::StartTime => &self.start_time,
            FormField::EndTime => &self.end_time,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::CompanyName => &mut self.company_name,
            FormField::MeasurementCode => &mut self.measurement_code,
            FormField::ChimneyCount => &mut self.chimney_count,
            FormField::StartTime => &mut self.start_time,
            FormField::EndTime => &mut self.end_time,
        };
        *slot = value.into();
    }

    /// Checking an already checked person is a no-op.
    pub fn check_personnel(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.personnel.contains(&name) {
            self.personnel.push(name);
        }
    }

    pub fn uncheck_personnel(&mut self, name: &str) {
        self.personnel.retain(|checked| checked != name);
    }

    pub fn personnel(&self) -> &[String] {
        &self.personnel
    }
}

/// Validated step-1 data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormData {
    pub company_name: String,
    pub measurement_code: String,
    pub chimney_count: usize,
    pub start_time: String,
    pub end_time: String,
    pub personnel: Vec<String>,
}

impl FormData {
    /// "company - code", shown above the chimney matrix.
    pub fn headline(&self) -> String {
        format!("{} - {}", self.company_name, self.measurement_code)
    }
}
