//! Boundary types for the collaborators the editor talks to: the persistence
//! endpoint that accepts submissions and the region → district lookup.

pub mod file_store;
pub mod regions;

pub use file_store::{JsonFileStore, MeasurementRecord};
pub use regions::{DISTRICT_PLACEHOLDER, DistrictSelector, StaticRegionDirectory};

use crate::domain::OlcumResult;
use crate::matrix::SubmissionPayload;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Form field carrying the JSON-encoded chimney payload on the edit page.
pub const CHIMNEY_PARAMETERS_FIELD: &str = "baca_parametreleri";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Post,
}

impl Display for RequestMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Creation-wizard body: the validated basic information plus the chimney map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementSubmission {
    pub firma_adi: String,
    pub olcum_kodu: String,
    pub baslangic_tarihi: String,
    pub bitis_tarihi: String,
    pub personel: Vec<String>,
    pub baca_sayisi: usize,
    pub baca_parametreleri: SubmissionPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Json(MeasurementSubmission),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub method: RequestMethod,
    pub target: String,
    pub body: RequestBody,
}

impl SubmissionRequest {
    pub fn json(target: impl Into<String>, submission: MeasurementSubmission) -> Self {
        Self {
            method: RequestMethod::Post,
            target: target.into(),
            body: RequestBody::Json(submission),
        }
    }

    pub fn form(target: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: RequestMethod::Post,
            target: target.into(),
            body: RequestBody::Form(fields),
        }
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str()),
            RequestBody::Json(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteResponse {
    /// Accepted; the client should navigate to `location`.
    Redirect { location: String },
    /// Rejected with a replacement page body.
    RenderedError { body: String },
    Status { code: u16, body: String },
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Redirect { .. } => true,
            Self::RenderedError { .. } => false,
            Self::Status { code, .. } => (200..300).contains(code),
        }
    }
}

/// Remote endpoint that persists measurement records.
///
/// `Err` is reserved for transport failures; a reachable endpoint that
/// refuses the submission answers with a non-success [`RemoteResponse`].
pub trait PersistenceClient {
    fn submit(&mut self, request: &SubmissionRequest) -> OlcumResult<RemoteResponse>;
}

pub trait RegionDirectory {
    /// Districts of `region`, in display order.
    fn districts(&self, region: &str) -> OlcumResult<Vec<String>>;
}
