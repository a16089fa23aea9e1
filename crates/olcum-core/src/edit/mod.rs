//! Single-page editor for an existing measurement record.
//!
//! Shares the matrix, counters and serializer with the creation wizard. The
//! record's other inputs travel as plain form fields and are posted back
//! unchanged apart from the chimney count and the encoded chimney map.

use crate::domain::{FormField, OlcumError, OlcumResult};
use crate::matrix::{CounterMap, MatrixModel, ParameterCatalog, deserialize, serialize};
use crate::page::PagePayload;
use crate::remote::{
    CHIMNEY_PARAMETERS_FIELD, DistrictSelector, PersistenceClient, RegionDirectory,
    RemoteResponse, SubmissionRequest,
};
use crate::view::{ControlEvent, MatrixView, apply_event};
use crate::wizard::SubmitControl;
use crate::wizard::validation::{check_unique_names, parse_chimney_count};
use tracing::{debug, info, warn};

pub const CHIMNEY_COUNT_MESSAGE: &str = "Chimney count must be between 1 and 20.";
pub const UPDATE_FAILED_MESSAGE: &str = "An error occurred!";

const REGION_FIELD: &str = "il";
const DISTRICT_FIELD: &str = "ilce";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Navigate { location: Option<String> },
    /// The endpoint answered with a page to show instead of the editor.
    ReplaceView { body: String },
    /// The update failed; the editor stays as it was and can resubmit.
    Alert { message: String },
}

#[derive(Debug, Clone)]
pub struct EditSession {
    catalog: ParameterCatalog,
    target: String,
    fields: Vec<(String, String)>,
    matrix: MatrixModel,
    districts: DistrictSelector,
    current_district: String,
    submitting: bool,
}

impl EditSession {
    /// Opens the editor from the page blocks and the record's form fields.
    pub fn from_page(
        page: &PagePayload,
        fields: Vec<(String, String)>,
        target: impl Into<String>,
    ) -> Self {
        let catalog = page.catalog();
        let matrix = deserialize(&page.chimney_parameters(), &catalog);
        info!(
            chimneys = matrix.len(),
            parameters = catalog.len(),
            "opened measurement editor"
        );
        Self {
            catalog,
            target: target.into(),
            fields,
            matrix,
            districts: DistrictSelector::default(),
            current_district: page.current_district(),
            submitting: false,
        }
    }

    /// Loads the district options for the record's region, preselecting the
    /// page's current district.
    pub fn load_districts(&mut self, directory: &dyn RegionDirectory) {
        let region = self.field(REGION_FIELD).unwrap_or_default().to_string();
        self.districts = DistrictSelector::load(directory, &region, &self.current_district);
        if let Some(selected) = self.districts.selected().map(str::to_string) {
            self.set_field(DISTRICT_FIELD, selected);
        }
    }

    pub fn change_region(&mut self, directory: &dyn RegionDirectory, region: &str) {
        self.districts.change_region(directory, region);
        self.set_field(REGION_FIELD, region);
        self.set_field(DISTRICT_FIELD, "");
    }

    pub fn select_district(&mut self, district: &str) -> bool {
        let selected = self.districts.select(district);
        if selected {
            self.set_field(DISTRICT_FIELD, district);
        }
        selected
    }

    pub fn districts(&self) -> &DistrictSelector {
        &self.districts
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &MatrixModel {
        &self.matrix
    }

    pub fn counters(&self) -> CounterMap {
        CounterMap::compute(&self.catalog, &self.matrix)
    }

    pub fn view(&self) -> MatrixView {
        MatrixView::render(&self.catalog, &self.matrix)
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Replaces the first field named `key`, or appends it.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    /// Resizes the matrix to the typed chimney count. Invalid input, or an
    /// update still in flight, leaves the matrix untouched.
    pub fn apply_chimney_count(&mut self, text: &str) -> OlcumResult<()> {
        if self.submitting {
            debug!(text, "chimney count ignored while an update is pending");
            return Ok(());
        }
        let Some(count) = parse_chimney_count(text) else {
            return Err(OlcumError::input_validation(
                "INPUT.CHIMNEY_COUNT",
                CHIMNEY_COUNT_MESSAGE,
            ));
        };
        self.matrix.resize(count).map_err(OlcumError::from)?;
        self.set_field(FormField::ChimneyCount.key(), count.to_string());
        Ok(())
    }

    pub fn apply(&mut self, event: &ControlEvent) -> OlcumResult<bool> {
        if self.submitting {
            return Ok(false);
        }
        apply_event(&mut self.matrix, event).map_err(OlcumError::from)
    }

    pub fn submit_control(&self) -> SubmitControl {
        if self.submitting {
            SubmitControl {
                enabled: false,
                label: "Updating...",
            }
        } else {
            SubmitControl {
                enabled: true,
                label: "Update",
            }
        }
    }

    /// Builds the form request and disables the submit control.
    pub fn begin_submit(&mut self) -> OlcumResult<SubmissionRequest> {
        if self.submitting {
            return Err(OlcumError::input_validation(
                "INPUT.EDIT_PENDING",
                "An update is already in progress.",
            ));
        }
        if let Err(failure) = check_unique_names(self.matrix.to_rows()) {
            return Err(failure.to_error());
        }
        self.matrix.trim_names();

        let payload = serialize(&self.matrix, &self.catalog);
        let encoded = payload.to_json_string().map_err(|source| {
            OlcumError::internal("INTERNAL.PAYLOAD_ENCODE", source.to_string())
        })?;

        let mut fields: Vec<_> = self
            .fields
            .iter()
            .filter(|(name, _)| name != CHIMNEY_PARAMETERS_FIELD)
            .cloned()
            .collect();
        let count_key = FormField::ChimneyCount.key();
        let count = self.matrix.len().to_string();
        match fields.iter_mut().find(|(name, _)| name == count_key) {
            Some((_, value)) => *value = count,
            None => fields.push((count_key.to_string(), count)),
        }
        fields.push((CHIMNEY_PARAMETERS_FIELD.to_string(), encoded));

        self.submitting = true;
        info!(endpoint = %self.target, chimneys = payload.len(), "submitting measurement update");
        Ok(SubmissionRequest::form(self.target.clone(), fields))
    }

    pub fn complete_submit(&mut self, response: OlcumResult<RemoteResponse>) -> EditOutcome {
        self.submitting = false;
        match response {
            Ok(RemoteResponse::Redirect { location }) => {
                info!(%location, "measurement updated");
                EditOutcome::Navigate {
                    location: Some(location),
                }
            }
            Ok(RemoteResponse::Status { code, .. }) if (200..300).contains(&code) => {
                info!(code, "measurement updated");
                EditOutcome::Navigate { location: None }
            }
            Ok(RemoteResponse::RenderedError { body }) => {
                warn!("update answered with a rendered page");
                EditOutcome::ReplaceView { body }
            }
            Ok(RemoteResponse::Status { code, .. }) => {
                warn!(code, "update answered with an error status");
                EditOutcome::Alert {
                    message: UPDATE_FAILED_MESSAGE.to_string(),
                }
            }
            Err(error) => {
                warn!(%error, "update failed");
                EditOutcome::Alert {
                    message: UPDATE_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    pub fn submit(&mut self, client: &mut dyn PersistenceClient) -> OlcumResult<EditOutcome> {
        let request = self.begin_submit()?;
        let response = client.submit(&request);
        Ok(self.complete_submit(response))
    }
}

#[cfg(test)]
mod tests {
    use super::{CHIMNEY_COUNT_MESSAGE, EditOutcome, EditSession, UPDATE_FAILED_MESSAGE};
    use crate::domain::{OlcumError, OlcumErrorCategory};
    use crate::page::{
        CHIMNEY_PARAMETERS_BLOCK, CURRENT_DISTRICT_BLOCK, PARAMETERS_BLOCK, PagePayload,
    };
    use crate::remote::{RemoteResponse, StaticRegionDirectory};
    use crate::view::ControlEvent;
    use std::collections::BTreeMap;

    fn page() -> PagePayload {
        PagePayload::new()
            .with_block(PARAMETERS_BLOCK, r#"["TOZ","YG","TOC"]"#)
            .with_block(CURRENT_DISTRICT_BLOCK, "GEBZE")
            .with_block(
                CHIMNEY_PARAMETERS_BLOCK,
                r#"{"Kazan":["YG","TOZ"],"Fırın":["TOC","HF"]}"#,
            )
    }

    fn fields() -> Vec<(String, String)> {
        vec![
            ("firma_adi".to_string(), "ACME".to_string()),
            ("olcum_kodu".to_string(), "AC-7".to_string()),
            ("il".to_string(), "KOCAELİ".to_string()),
            ("baca_sayisi".to_string(), "2".to_string()),
        ]
    }

    fn session() -> EditSession {
        EditSession::from_page(&page(), fields(), "/firma_olcum/edit")
    }

    #[test]
    fn opens_with_persisted_rows_and_counts() {
        let session = session();

        let rows = session.matrix().to_rows();
        assert_eq!(rows[0].name, "Kazan");
        assert_eq!(rows[1].name, "Fırın");
        assert_eq!(session.counters().get("TOZ"), Some(1));
        assert_eq!(session.view().rows[1].extras, ["HF"]);
    }

    #[test]
    fn invalid_chimney_count_leaves_the_matrix_alone() {
        let mut session = session();

        for text in ["0", "21", "abc", ""] {
            let error = session.apply_chimney_count(text).expect_err("count invalid");
            assert_eq!(error.message(), CHIMNEY_COUNT_MESSAGE);
            assert_eq!(error.category(), OlcumErrorCategory::InputValidationError);
        }
        assert_eq!(session.matrix().len(), 2);

        session.apply_chimney_count("3").expect("count valid");
        assert_eq!(session.matrix().to_rows()[2].name, "Chimney 3");
        assert_eq!(session.field("baca_sayisi"), Some("3"));
    }

    #[test]
    fn submit_posts_fields_with_count_and_encoded_map() {
        let mut session = session();
        session.apply_chimney_count("3").expect("count valid");
        session
            .apply(&ControlEvent::NameEdited {
                row: 2,
                value: "  ".to_string(),
            })
            .expect("row exists");

        let request = session.begin_submit().expect("names are unique");

        assert!(!session.submit_control().enabled);
        assert_eq!(session.submit_control().label, "Updating...");
        assert_eq!(request.form_value("firma_adi"), Some("ACME"));
        assert_eq!(request.form_value("baca_sayisi"), Some("3"));
        assert_eq!(
            request.form_value("baca_parametreleri"),
            Some(r#"{"Kazan":["TOZ","YG"],"Fırın":["TOC","HF"]}"#)
        );

        let outcome = session.complete_submit(Ok(RemoteResponse::Redirect {
            location: "/firma_olcum".to_string(),
        }));
        assert_eq!(
            outcome,
            EditOutcome::Navigate {
                location: Some("/firma_olcum".to_string())
            }
        );
    }

    #[test]
    fn submit_trims_names_before_encoding() {
        let mut session = session();
        session
            .apply(&ControlEvent::NameEdited {
                row: 0,
                value: "  Kazan 2 ".to_string(),
            })
            .expect("row exists");

        let request = session.begin_submit().expect("names are unique");

        assert_eq!(
            request.form_value("baca_parametreleri"),
            Some(r#"{"Kazan 2":["TOZ","YG"],"Fırın":["TOC","HF"]}"#)
        );
        assert_eq!(session.matrix().to_rows()[0].name, "Kazan 2");
    }

    #[test]
    fn chimney_count_is_ignored_while_an_update_is_pending() {
        let mut session = session();
        session.begin_submit().expect("names are unique");

        session.apply_chimney_count("5").expect("pending count is a no-op");

        assert_eq!(session.matrix().len(), 2);
        assert_eq!(session.field("baca_sayisi"), Some("2"));

        session.complete_submit(Ok(RemoteResponse::Status {
            code: 500,
            body: String::new(),
        }));
        session.apply_chimney_count("5").expect("count valid");
        assert_eq!(session.matrix().len(), 5);
    }

    #[test]
    fn duplicate_names_are_rejected_before_sending() {
        let mut session = session();
        session
            .apply(&ControlEvent::NameEdited {
                row: 1,
                value: " Kazan".to_string(),
            })
            .expect("row exists");

        let error = session.begin_submit().expect_err("names collide");

        assert_eq!(error.placeholder(), "INPUT.STEP2_DUPLICATE");
        assert!(session.submit_control().enabled);
    }

    #[test]
    fn failures_alert_and_re_enable_while_rendered_errors_replace_the_view() {
        let mut session = session();

        session.begin_submit().expect("names are unique");
        let transport = session.complete_submit(Err(OlcumError::remote(
            "REMOTE.UNREACHABLE",
            "connection reset",
        )));
        assert_eq!(
            transport,
            EditOutcome::Alert {
                message: UPDATE_FAILED_MESSAGE.to_string()
            }
        );
        assert!(session.submit_control().enabled);

        session.begin_submit().expect("names are unique");
        let rendered = session.complete_submit(Ok(RemoteResponse::RenderedError {
            body: "<form>errors</form>".to_string(),
        }));
        assert_eq!(
            rendered,
            EditOutcome::ReplaceView {
                body: "<form>errors</form>".to_string()
            }
        );
    }

    #[test]
    fn district_selector_follows_region_field() {
        let mut districts = BTreeMap::new();
        districts.insert(
            "KOCAELİ".to_string(),
            vec!["GEBZE".to_string(), "İZMİT".to_string()],
        );
        districts.insert("SAKARYA".to_string(), vec!["SERDİVAN".to_string()]);
        let directory = StaticRegionDirectory::new(districts);
        let mut session = session();

        session.load_districts(&directory);
        assert_eq!(session.districts().selected(), Some("GEBZE"));
        assert_eq!(session.field("ilce"), Some("GEBZE"));

        session.change_region(&directory, "SAKARYA");
        assert_eq!(session.field("ilce"), Some(""));
        assert!(session.select_district("SERDİVAN"));
        assert_eq!(session.field("il"), Some("SAKARYA"));
        assert_eq!(session.field("ilce"), Some("SERDİVAN"));
    }
}
