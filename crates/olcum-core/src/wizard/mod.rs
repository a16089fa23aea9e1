//! Two-step creation wizard: basic information, then the chimney matrix.
//!
//! The matrix only exists while the wizard is on the chimney step (or waiting
//! for the submission to resolve). Stepping back parks it so a later advance
//! resumes with the operator's rows, resized to the new chimney count.

pub mod form;
pub mod validation;

pub use form::{BasicInfoForm, FormData};
pub use validation::{Step1Report, Step2Failure, validate_basic_info, validate_rows};

use crate::domain::{FormField, OlcumError, OlcumResult};
use crate::matrix::{CounterMap, MatrixModel, ParameterCatalog, serialize};
use crate::remote::{
    MeasurementSubmission, PersistenceClient, RemoteResponse, SubmissionRequest,
};
use crate::view::{ControlEvent, MatrixView, apply_event};
use tracing::{debug, info, warn};

pub const TOTAL_STEPS: usize = 2;
pub const CREATED_MESSAGE: &str = "Measurement created successfully!";
pub const SUBMIT_FAILED_MESSAGE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    BasicInfo,
    ChimneyMatrix,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WizardState {
    BasicInfo { parked: Option<MatrixModel> },
    ChimneyMatrix { data: FormData, matrix: MatrixModel },
    Submitting { data: FormData, matrix: MatrixModel },
    Submitted { location: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Step indicator and button visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardChrome {
    pub step: usize,
    pub total_steps: usize,
    pub progress_percent: u8,
    pub description: &'static str,
    pub show_previous: bool,
    pub show_next: bool,
    pub show_finish: bool,
    pub headline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    Submitted { location: Option<String> },
    /// The submission failed; the wizard is back on the chimney step with
    /// every input intact.
    Rejected {
        message: String,
        body: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct WizardController {
    catalog: ParameterCatalog,
    target: String,
    form: BasicInfoForm,
    state: WizardState,
    flagged_fields: Vec<FormField>,
    flagged_row: Option<usize>,
    notice: Option<Notice>,
}

impl WizardController {
    pub fn new(catalog: ParameterCatalog, target: impl Into<String>) -> Self {
        Self::with_form(catalog, target, BasicInfoForm::new())
    }

    pub fn with_form(
        catalog: ParameterCatalog,
        target: impl Into<String>,
        form: BasicInfoForm,
    ) -> Self {
        Self {
            catalog,
            target: target.into(),
            form,
            state: WizardState::BasicInfo { parked: None },
            flagged_fields: Vec::new(),
            flagged_row: None,
            notice: None,
        }
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn step(&self) -> WizardStep {
        match self.state {
            WizardState::BasicInfo { .. } => WizardStep::BasicInfo,
            WizardState::ChimneyMatrix { .. } => WizardStep::ChimneyMatrix,
            WizardState::Submitting { .. } => WizardStep::Submitting,
            WizardState::Submitted { .. } => WizardStep::Submitted,
        }
    }

    pub fn form(&self) -> &BasicInfoForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BasicInfoForm {
        &mut self.form
    }

    pub fn form_data(&self) -> Option<&FormData> {
        match &self.state {
            WizardState::ChimneyMatrix { data, .. } | WizardState::Submitting { data, .. } => {
                Some(data)
            }
            _ => None,
        }
    }

    pub fn matrix(&self) -> Option<&MatrixModel> {
        match &self.state {
            WizardState::ChimneyMatrix { matrix, .. } | WizardState::Submitting { matrix, .. } => {
                Some(matrix)
            }
            _ => None,
        }
    }

    pub fn counters(&self) -> Option<CounterMap> {
        self.matrix()
            .map(|matrix| CounterMap::compute(&self.catalog, matrix))
    }

    pub fn view(&self) -> Option<MatrixView> {
        self.matrix()
            .map(|matrix| MatrixView::render(&self.catalog, matrix))
    }

    pub fn flagged_fields(&self) -> &[FormField] {
        &self.flagged_fields
    }

    pub fn flagged_row(&self) -> Option<usize> {
        self.flagged_row
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn submit_control(&self) -> SubmitControl {
        match self.state {
            WizardState::Submitting { .. } => SubmitControl {
                enabled: false,
                label: "Submitting...",
            },
            _ => SubmitControl {
                enabled: true,
                label: "Finish",
            },
        }
    }

    pub fn chrome(&self) -> WizardChrome {
        let step = match self.step() {
            WizardStep::BasicInfo => 1,
            _ => 2,
        };
        WizardChrome {
            step,
            total_steps: TOTAL_STEPS,
            progress_percent: (step * 100 / TOTAL_STEPS) as u8,
            description: if step == 1 {
                "Basic information"
            } else {
                "Chimneys and parameters"
            },
            show_previous: step != 1,
            show_next: step != TOTAL_STEPS,
            show_finish: step == TOTAL_STEPS,
            headline: self.form_data().map(FormData::headline),
        }
    }

    /// Validates step 1 and moves to the chimney matrix. Outside the
    /// basic-information step this does nothing.
    pub fn advance(&mut self) -> Result<(), Step1Report> {
        let WizardState::BasicInfo { parked } = &mut self.state else {
            debug!("advance ignored outside basic information");
            return Ok(());
        };

        let data = match validate_basic_info(&self.form) {
            Ok(data) => data,
            Err(report) => {
                self.flagged_fields = report.invalid_fields.clone();
                self.notice = report.blocking_message.clone().map(Notice::Error);
                return Err(report);
            }
        };

        let mut matrix = parked.take().unwrap_or_default();
        if let Err(error) = matrix.resize(data.chimney_count) {
            warn!(%error, "validated chimney count was rejected by the matrix");
            *parked = Some(matrix);
            let report = Step1Report {
                invalid_fields: vec![FormField::ChimneyCount],
                blocking_message: None,
            };
            self.flagged_fields = report.invalid_fields.clone();
            return Err(report);
        }

        info!(
            company = %data.company_name,
            code = %data.measurement_code,
            chimneys = data.chimney_count,
            "advanced to chimney matrix"
        );
        self.flagged_fields.clear();
        self.notice = None;
        self.state = WizardState::ChimneyMatrix { data, matrix };
        Ok(())
    }

    /// Returns to basic information, keeping the matrix for the next advance.
    pub fn back(&mut self) -> bool {
        let state = std::mem::replace(&mut self.state, WizardState::BasicInfo { parked: None });
        match state {
            WizardState::ChimneyMatrix { matrix, .. } => {
                self.state = WizardState::BasicInfo {
                    parked: Some(matrix),
                };
                self.flagged_row = None;
                info!("returned to basic information");
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Applies a control event to the matrix. Only the chimney step accepts
    /// edits; elsewhere the event is ignored and `Ok(false)` returned.
    pub fn apply(&mut self, event: &ControlEvent) -> OlcumResult<bool> {
        match &mut self.state {
            WizardState::ChimneyMatrix { matrix, .. } => {
                apply_event(matrix, event).map_err(OlcumError::from)
            }
            _ => {
                debug!(?event, "matrix event ignored outside the chimney step");
                Ok(false)
            }
        }
    }

    /// Validates step 2 and enters the submitting state, returning the
    /// request to hand to the persistence endpoint.
    pub fn begin_finish(&mut self) -> OlcumResult<SubmissionRequest> {
        let WizardState::ChimneyMatrix { data, matrix } = &mut self.state else {
            return Err(OlcumError::input_validation(
                "INPUT.WIZARD_STEP",
                "The chimney step must be active to finish.",
            ));
        };

        if let Err(failure) = validate_rows(matrix.to_rows()) {
            self.flagged_row = Some(failure.row());
            let error = failure.to_error();
            self.notice = Some(Notice::Error(error.message().to_string()));
            return Err(error);
        }
        matrix.trim_names();

        let request = SubmissionRequest::json(
            self.target.clone(),
            MeasurementSubmission {
                firma_adi: data.company_name.clone(),
                olcum_kodu: data.measurement_code.clone(),
                baslangic_tarihi: data.start_time.clone(),
                bitis_tarihi: data.end_time.clone(),
                personel: data.personnel.clone(),
                baca_sayisi: matrix.len(),
                baca_parametreleri: serialize(matrix, &self.catalog),
            },
        );

        self.flagged_row = None;
        self.notice = None;
        let state = std::mem::replace(&mut self.state, WizardState::BasicInfo { parked: None });
        if let WizardState::ChimneyMatrix { data, matrix } = state {
            self.state = WizardState::Submitting { data, matrix };
        }
        info!(endpoint = %request.target, "submitting measurement");
        Ok(request)
    }

    /// Resolves a pending submission with the endpoint's answer.
    pub fn complete_submission(&mut self, response: OlcumResult<RemoteResponse>) -> FinishOutcome {
        let state = std::mem::replace(&mut self.state, WizardState::BasicInfo { parked: None });
        let WizardState::Submitting { data, matrix } = state else {
            self.state = state;
            return FinishOutcome::Rejected {
                message: "No submission is pending.".to_string(),
                body: None,
            };
        };

        let failure = match response {
            Ok(RemoteResponse::Redirect { location }) => {
                return self.mark_submitted(Some(location));
            }
            Ok(RemoteResponse::Status { code, .. }) if (200..300).contains(&code) => {
                return self.mark_submitted(None);
            }
            Ok(RemoteResponse::Status { code, .. }) => {
                warn!(code, "submission answered with an error status");
                FinishOutcome::Rejected {
                    message: format!("Server error ({code}). Please try again."),
                    body: None,
                }
            }
            Ok(RemoteResponse::RenderedError { body }) => {
                warn!("submission rejected with a rendered error page");
                FinishOutcome::Rejected {
                    message: "The server rejected the submission.".to_string(),
                    body: Some(body),
                }
            }
            Err(error) => {
                warn!(%error, "submission failed");
                FinishOutcome::Rejected {
                    message: SUBMIT_FAILED_MESSAGE.to_string(),
                    body: None,
                }
            }
        };

        if let FinishOutcome::Rejected { message, .. } = &failure {
            self.notice = Some(Notice::Error(message.clone()));
        }
        self.state = WizardState::ChimneyMatrix { data, matrix };
        failure
    }

    /// Validates, submits through `client` and resolves the result.
    pub fn finish(&mut self, client: &mut dyn PersistenceClient) -> OlcumResult<FinishOutcome> {
        let request = self.begin_finish()?;
        let response = client.submit(&request);
        Ok(self.complete_submission(response))
    }

    /// Starts a fresh record after a completed submission.
    pub fn reset(&mut self, form: BasicInfoForm) {
        self.form = form;
        self.state = WizardState::BasicInfo { parked: None };
        self.flagged_fields.clear();
        self.flagged_row = None;
        self.notice = None;
    }

    fn mark_submitted(&mut self, location: Option<String>) -> FinishOutcome {
        info!(location = ?location, "measurement submitted");
        self.notice = Some(Notice::Success(CREATED_MESSAGE.to_string()));
        self.state = WizardState::Submitted {
            location: location.clone(),
        };
        FinishOutcome::Submitted { location }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BasicInfoForm, FinishOutcome, Notice, WizardController, WizardStep,
    };
    use crate::domain::{FormField, OlcumError, OlcumResult};
    use crate::matrix::ParameterCatalog;
    use crate::remote::{PersistenceClient, RemoteResponse, RequestBody, SubmissionRequest};
    use crate::view::ControlEvent;

    struct ScriptedClient {
        responses: Vec<OlcumResult<RemoteResponse>>,
        requests: Vec<SubmissionRequest>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<OlcumResult<RemoteResponse>>) -> Self {
            Self {
                responses,
                requests: Vec::new(),
            }
        }
    }

    impl PersistenceClient for ScriptedClient {
        fn submit(&mut self, request: &SubmissionRequest) -> OlcumResult<RemoteResponse> {
            self.requests.push(request.clone());
            self.responses.remove(0)
        }
    }

    fn filled_form(count: &str) -> BasicInfoForm {
        let mut form = BasicInfoForm::new();
        form.set(FormField::CompanyName, "ACME");
        form.set(FormField::MeasurementCode, "AC-1");
        form.set(FormField::ChimneyCount, count);
        form.set(FormField::StartTime, "2025-08-07T09:00");
        form.set(FormField::EndTime, "2025-08-07T10:00");
        form.check_personnel("Ali Özkan");
        form
    }

    fn wizard(count: &str) -> WizardController {
        WizardController::with_form(
            ParameterCatalog::from_names(["CO", "NOx", "SO2"]),
            "/api/olcum_olustur",
            filled_form(count),
        )
    }

    fn toggle(wizard: &mut WizardController, row: usize, parameter: &str) {
        let event = ControlEvent::CellToggled {
            row,
            parameter: parameter.to_string(),
            checked: true,
        };
        wizard.apply(&event).expect("row should exist");
    }

    #[test]
    fn chrome_tracks_the_active_step() {
        let mut wizard = wizard("2");
        let first = wizard.chrome();
        assert_eq!((first.step, first.progress_percent), (1, 50));
        assert!(first.show_next && !first.show_previous && !first.show_finish);
        assert_eq!(first.headline, None);

        wizard.advance().expect("step 1 should pass");
        let second = wizard.chrome();
        assert_eq!((second.step, second.progress_percent), (2, 100));
        assert!(second.show_previous && second.show_finish && !second.show_next);
        assert_eq!(second.headline.as_deref(), Some("ACME - AC-1"));
    }

    #[test]
    fn missing_personnel_sets_a_blocking_notice() {
        let mut wizard = wizard("2");
        wizard.form_mut().uncheck_personnel("Ali Özkan");

        let report = wizard.advance().expect_err("personnel is required");

        assert!(report.invalid_fields.is_empty());
        assert!(matches!(wizard.notice(), Some(Notice::Error(_))));
        assert_eq!(wizard.step(), WizardStep::BasicInfo);
        assert!(wizard.matrix().is_none());
    }

    #[test]
    fn back_parks_the_matrix_and_advance_resizes_it() {
        let mut wizard = wizard("3");
        wizard.advance().expect("step 1 should pass");
        toggle(&mut wizard, 0, "CO");
        toggle(&mut wizard, 2, "SO2");

        assert!(wizard.back());
        assert_eq!(wizard.step(), WizardStep::BasicInfo);
        assert!(wizard.matrix().is_none());
        assert!(!wizard.back());

        wizard.form_mut().set(FormField::ChimneyCount, "2");
        wizard.advance().expect("step 1 should pass");

        let matrix = wizard.matrix().expect("matrix should exist");
        assert_eq!(matrix.len(), 2);
        assert!(matrix.to_rows()[0].is_selected("CO"));
        let counters = wizard.counters().expect("counters should exist");
        assert_eq!(counters.get("SO2"), Some(0));
    }

    #[test]
    fn events_outside_the_chimney_step_are_ignored() {
        let mut wizard = wizard("1");
        let event = ControlEvent::CellToggled {
            row: 0,
            parameter: "CO".to_string(),
            checked: true,
        };
        assert!(!wizard.apply(&event).expect("ignored events are not errors"));
        assert!(wizard.begin_finish().is_err());
    }

    #[test]
    fn successful_finish_submits_serialized_matrix() {
        let mut wizard = wizard("2");
        wizard.advance().expect("step 1 should pass");
        toggle(&mut wizard, 0, "SO2");
        toggle(&mut wizard, 0, "CO");
        toggle(&mut wizard, 1, "NOx");
        let mut client = ScriptedClient::new(vec![Ok(RemoteResponse::Redirect {
            location: "/firma_olcum".to_string(),
        })]);

        let outcome = wizard.finish(&mut client).expect("validation should pass");

        assert_eq!(
            outcome,
            FinishOutcome::Submitted {
                location: Some("/firma_olcum".to_string())
            }
        );
        assert_eq!(wizard.step(), WizardStep::Submitted);
        assert!(wizard.matrix().is_none());
        let RequestBody::Json(submission) = &client.requests[0].body else {
            panic!("wizard should submit JSON");
        };
        assert_eq!(submission.baca_sayisi, 2);
        assert_eq!(submission.personel, ["Ali Özkan"]);
        assert_eq!(
            serde_json::to_string(&submission.baca_parametreleri).expect("payload should encode"),
            r#"{"Chimney 1":["CO","SO2"],"Chimney 2":["NOx"]}"#
        );

        wizard.reset(BasicInfoForm::new());
        assert_eq!(wizard.step(), WizardStep::BasicInfo);
        assert!(wizard.notice().is_none());
    }

    #[test]
    fn pending_submission_disables_control_until_resolved() {
        let mut wizard = wizard("1");
        wizard.advance().expect("step 1 should pass");
        toggle(&mut wizard, 0, "CO");

        wizard.begin_finish().expect("validation should pass");
        assert_eq!(wizard.step(), WizardStep::Submitting);
        assert!(!wizard.submit_control().enabled);
        assert_eq!(wizard.submit_control().label, "Submitting...");
        assert!(wizard.matrix().is_some());
        let edit = ControlEvent::NameEdited {
            row: 0,
            value: "late edit".to_string(),
        };
        assert!(!wizard.apply(&edit).expect("ignored while submitting"));

        let outcome = wizard.complete_submission(Ok(RemoteResponse::Status {
            code: 503,
            body: String::new(),
        }));

        assert!(matches!(outcome, FinishOutcome::Rejected { .. }));
        assert_eq!(wizard.step(), WizardStep::ChimneyMatrix);
        assert!(wizard.submit_control().enabled);
        assert!(wizard.matrix().expect("matrix kept").to_rows()[0].is_selected("CO"));
        assert_eq!(wizard.form_data().map(|d| d.company_name.as_str()), Some("ACME"));
    }

    #[test]
    fn transport_failure_allows_resubmission() {
        let mut wizard = wizard("1");
        wizard.advance().expect("step 1 should pass");
        toggle(&mut wizard, 0, "NOx");
        let mut client = ScriptedClient::new(vec![
            Err(OlcumError::remote("REMOTE.UNREACHABLE", "connection refused")),
            Ok(RemoteResponse::RenderedError {
                body: "<h1>invalid</h1>".to_string(),
            }),
            Ok(RemoteResponse::Redirect {
                location: "/done".to_string(),
            }),
        ]);

        let first = wizard.finish(&mut client).expect("validation should pass");
        assert_eq!(
            first,
            FinishOutcome::Rejected {
                message: super::SUBMIT_FAILED_MESSAGE.to_string(),
                body: None
            }
        );
        let second = wizard.finish(&mut client).expect("validation should pass");
        assert!(matches!(
            second,
            FinishOutcome::Rejected { body: Some(ref body), .. } if body == "<h1>invalid</h1>"
        ));
        let third = wizard.finish(&mut client).expect("validation should pass");
        assert!(matches!(third, FinishOutcome::Submitted { .. }));
        assert_eq!(client.requests.len(), 3);
        assert_eq!(client.requests[0], client.requests[2]);
    }
}
