use olcum_core::domain::{FormField, OlcumResult};
use olcum_core::matrix::{CounterMap, ParameterCatalog, count, serialize};
use olcum_core::remote::{
    JsonFileStore, PersistenceClient, RemoteResponse, RequestBody, SubmissionRequest,
};
use olcum_core::view::ControlEvent;
use olcum_core::wizard::{BasicInfoForm, FinishOutcome, Step2Failure, WizardController, WizardStep};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingClient {
    requests: Vec<SubmissionRequest>,
}

impl PersistenceClient for RecordingClient {
    fn submit(&mut self, request: &SubmissionRequest) -> OlcumResult<RemoteResponse> {
        self.requests.push(request.clone());
        Ok(RemoteResponse::Redirect {
            location: "/firma_olcum".to_string(),
        })
    }
}

fn form(count: &str) -> BasicInfoForm {
    let mut form = BasicInfoForm::new();
    form.set(FormField::CompanyName, "AKARE ÇELİK SANAYİ A.Ş.");
    form.set(FormField::MeasurementCode, "AKARE-2024-001");
    form.set(FormField::ChimneyCount, count);
    form.set(FormField::StartTime, "2025-08-07T09:00");
    form.set(FormField::EndTime, "2025-08-10T17:00");
    form.check_personnel("Ahmet Yılmaz");
    form
}

fn wizard(catalog: &[&str], form: BasicInfoForm) -> WizardController {
    WizardController::with_form(
        ParameterCatalog::from_names(catalog.iter().copied()),
        "/api/olcum_olustur",
        form,
    )
}

fn select(wizard: &mut WizardController, row: usize, parameter: &str) {
    wizard
        .apply(&ControlEvent::CellToggled {
            row,
            parameter: parameter.to_string(),
            checked: true,
        })
        .expect("row should exist");
}

#[test]
fn blank_company_name_keeps_the_wizard_on_step_one() {
    let mut form = form("3");
    form.set(FormField::CompanyName, "  ");
    let mut wizard = wizard(&["CO"], form);

    let report = wizard.advance().expect_err("company name is blank");

    assert_eq!(wizard.step(), WizardStep::BasicInfo);
    assert!(report.is_flagged(FormField::CompanyName));
    assert_eq!(wizard.flagged_fields(), [FormField::CompanyName]);
    assert!(wizard.matrix().is_none());
}

#[test]
fn second_row_without_parameters_stops_the_walk() {
    let mut wizard = wizard(&["CO", "NOx"], form("3"));
    wizard.advance().expect("step 1 should pass");
    select(&mut wizard, 0, "CO");
    wizard
        .apply(&ControlEvent::NameEdited {
            row: 2,
            value: String::new(),
        })
        .expect("row should exist");
    let mut client = RecordingClient::default();

    let error = wizard
        .finish(&mut client)
        .expect_err("row 2 has no parameters");

    assert_eq!(error.placeholder(), "INPUT.STEP2_PARAMETERS");
    assert!(error.message().contains("Chimney 2"));
    assert_eq!(wizard.flagged_row(), Some(1));
    assert_eq!(wizard.step(), WizardStep::ChimneyMatrix);
    assert!(client.requests.is_empty());
    let rows = wizard.matrix().expect("matrix should exist").to_rows();
    assert_eq!(
        olcum_core::wizard::validate_rows(rows),
        Err(Step2Failure::NoParameters {
            row: 1,
            label: "Chimney 2".to_string()
        })
    );
}

#[test]
fn two_chimney_scenario_serializes_and_counts() {
    let mut wizard = wizard(&["CO", "NOx", "SO2"], form("2"));
    wizard.advance().expect("step 1 should pass");
    select(&mut wizard, 0, "CO");
    select(&mut wizard, 1, "SO2");
    select(&mut wizard, 1, "CO");

    let matrix = wizard.matrix().expect("matrix should exist");
    let payload = serialize(matrix, wizard.catalog());
    assert_eq!(
        payload.to_json_string().expect("payload should encode"),
        r#"{"Chimney 1":["CO"],"Chimney 2":["CO","SO2"]}"#
    );
    assert_eq!(count(matrix, "CO"), 2);
    assert_eq!(count(matrix, "NOx"), 0);
    assert_eq!(count(matrix, "SO2"), 1);
    let counters: CounterMap = wizard.counters().expect("counters should exist");
    assert_eq!(
        counters.entries(),
        [
            ("CO".to_string(), 2),
            ("NOx".to_string(), 0),
            ("SO2".to_string(), 1)
        ]
    );

    let mut client = RecordingClient::default();
    let outcome = wizard.finish(&mut client).expect("step 2 should pass");

    assert!(matches!(outcome, FinishOutcome::Submitted { .. }));
    let RequestBody::Json(submission) = &client.requests[0].body else {
        panic!("creation posts JSON");
    };
    assert_eq!(submission.baca_parametreleri, payload);
    assert_eq!(submission.firma_adi, "AKARE ÇELİK SANAYİ A.Ş.");
}

#[test]
fn wizard_submission_lands_in_the_file_store() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut store = JsonFileStore::new(temp.path().join("olcum.json"), "/firma_olcum");
    let mut wizard = wizard(&["TOZ", "YG"], form("1"));
    wizard.advance().expect("step 1 should pass");
    wizard
        .apply(&ControlEvent::NameEdited {
            row: 0,
            value: " Ana Üretim Bacası ".to_string(),
        })
        .expect("row should exist");
    select(&mut wizard, 0, "YG");

    let outcome = wizard.finish(&mut store).expect("step 2 should pass");

    assert_eq!(
        outcome,
        FinishOutcome::Submitted {
            location: Some("/firma_olcum".to_string())
        }
    );
    let record = store
        .find_by_code("AKARE-2024-001")
        .expect("store should load")
        .expect("record should exist");
    assert_eq!(record.baca_sayisi, "1");
    assert_eq!(
        record.baca_parametreleri.get("Ana Üretim Bacası"),
        Some(["YG".to_string()].as_slice())
    );
    assert_eq!(record.personel, ["Ahmet Yılmaz"]);
}
