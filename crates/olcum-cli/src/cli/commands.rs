use super::CliError;
use super::helpers::*;
use olcum_core::common::AppConfig;
use olcum_core::domain::OlcumError;
use olcum_core::edit::{EditOutcome, EditSession};
use olcum_core::matrix::deserialize;
use olcum_core::remote::{DISTRICT_PLACEHOLDER, RegionDirectory};
use olcum_core::view::{ControlEvent, MatrixView, render_table};
use olcum_core::wizard::{BasicInfoForm, FinishOutcome, WizardController};
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(clap::Args)]
pub(super) struct CatalogArgs {
    /// Page payload JSON holding the `parameters-json` block
    #[arg(long)]
    page: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct CreateArgs {
    /// Page payload JSON holding the `parameters-json` block
    #[arg(long)]
    page: PathBuf,

    /// Draft JSON with the basic information and chimney rows
    #[arg(long)]
    draft: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct EditArgs {
    /// Measurement code of the record to edit
    #[arg(long)]
    code: String,

    /// Page payload JSON providing the parameter catalog
    #[arg(long)]
    page: Option<PathBuf>,

    /// New chimney count
    #[arg(long)]
    count: Option<String>,

    /// Rename a chimney, ROW=NAME (ROW is one-based)
    #[arg(long, value_name = "ROW=NAME")]
    rename: Vec<String>,

    /// Select a parameter on a chimney, ROW=PARAMETER
    #[arg(long, value_name = "ROW=PARAMETER")]
    select: Vec<String>,

    /// Clear a parameter on a chimney, ROW=PARAMETER
    #[arg(long, value_name = "ROW=PARAMETER")]
    clear: Vec<String>,

    /// Switch the record to another region
    #[arg(long)]
    region: Option<String>,

    /// Pick a district of the record's region
    #[arg(long)]
    district: Option<String>,

    /// Region → districts JSON, overriding the configuration
    #[arg(long)]
    regions: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ShowArgs {
    /// Measurement code of the record to show
    #[arg(long)]
    code: String,

    /// Page payload JSON providing the parameter catalog
    #[arg(long)]
    page: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct DistrictsArgs {
    /// Region name
    #[arg(long)]
    region: String,

    /// District to mark as selected
    #[arg(long)]
    current: Option<String>,

    /// Region → districts JSON, overriding the configuration
    #[arg(long)]
    regions: Option<PathBuf>,
}

pub(super) fn run_catalog_command(args: CatalogArgs) -> Result<i32, CliError> {
    let catalog = load_catalog(&args.page)?;
    for parameter in catalog.parameters() {
        if parameter.method.is_empty() {
            println!("{}", parameter.name);
        } else {
            println!("{}\t{}", parameter.name, parameter.method);
        }
    }
    println!("{} parameters", catalog.len());
    Ok(0)
}

pub(super) fn run_create_command(config: &AppConfig, args: CreateArgs) -> Result<i32, CliError> {
    let catalog = load_catalog(&args.page)?;
    let draft = load_draft(&args.draft)?;

    let mut form = BasicInfoForm::with_default_window(SystemTime::now())?;
    draft.fill(&mut form);
    let mut wizard = WizardController::with_form(catalog, config.create_target.clone(), form);
    wizard
        .advance()
        .map_err(|report| CliError::Domain(report.to_error()))?;

    let rows = wizard.matrix().map_or(0, |matrix| matrix.len());
    if draft.bacalar.len() > rows {
        return Err(CliError::Domain(OlcumError::input_validation(
            "INPUT.DRAFT_CHIMNEYS",
            format!(
                "draft lists {} chimneys but the chimney count is {}",
                draft.bacalar.len(),
                rows
            ),
        )));
    }
    for (row, chimney) in draft.bacalar.iter().enumerate() {
        if let Some(name) = &chimney.ad {
            wizard.apply(&ControlEvent::NameEdited {
                row,
                value: name.clone(),
            })?;
        }
        for parameter in &chimney.parametreler {
            wizard.apply(&ControlEvent::CellToggled {
                row,
                parameter: parameter.clone(),
                checked: true,
            })?;
        }
    }

    let table = wizard.view().map(|view| render_table(&view));
    let headline = wizard.chrome().headline.unwrap_or_default();
    let mut store = open_store(config);
    match wizard.finish(&mut store)? {
        FinishOutcome::Submitted { location } => {
            println!("Created measurement {headline}");
            if let Some(table) = table {
                print!("{table}");
            }
            if let Some(location) = location {
                println!("Redirect: {location}");
            }
            Ok(0)
        }
        FinishOutcome::Rejected { message, body } => Err(CliError::Domain(OlcumError::remote(
            "REMOTE.REJECTED",
            match body {
                Some(body) => format!("{message} {body}"),
                None => message,
            },
        ))),
    }
}

pub(super) fn run_edit_command(config: &AppConfig, args: EditArgs) -> Result<i32, CliError> {
    let mut store = open_store(config);
    let record = find_record(&store, &args.code)?;
    let page = record_page(&record, args.page.as_deref())?;
    let mut session =
        EditSession::from_page(&page, record_fields(&record), config.edit_target.clone());

    let regions_path = args.regions.unwrap_or_else(|| config.regions_path.clone());
    if let Some(directory) = load_regions(&regions_path)? {
        session.load_districts(&directory);
        if let Some(region) = &args.region {
            session.change_region(&directory, region);
        }
    } else if args.region.is_some() || args.district.is_some() {
        return Err(CliError::Usage(format!(
            "region and district changes need a regions file; '{}' does not exist",
            regions_path.display()
        )));
    }
    if let Some(district) = &args.district {
        if !session.select_district(district) {
            return Err(CliError::Usage(format!(
                "district '{}' is not listed for region '{}'",
                district,
                session.districts().region()
            )));
        }
    }

    if let Some(count) = &args.count {
        session.apply_chimney_count(count)?;
    }
    for rename in &args.rename {
        let (row, value) = parse_row_assignment(rename, session.matrix().len())?;
        session.apply(&ControlEvent::NameEdited { row, value })?;
    }
    for (specs, checked) in [(&args.select, true), (&args.clear, false)] {
        for spec in specs {
            let (row, parameter) = parse_row_assignment(spec, session.matrix().len())?;
            session.apply(&ControlEvent::CellToggled {
                row,
                parameter,
                checked,
            })?;
        }
    }

    match session.submit(&mut store)? {
        EditOutcome::Navigate { location } => {
            println!("Updated measurement {}", args.code);
            print!("{}", render_table(&session.view()));
            if let Some(location) = location {
                println!("Redirect: {location}");
            }
            Ok(0)
        }
        EditOutcome::ReplaceView { body } => Err(CliError::Domain(OlcumError::remote(
            "REMOTE.RENDERED_ERROR",
            body,
        ))),
        EditOutcome::Alert { message } => Err(CliError::Domain(OlcumError::remote(
            "REMOTE.UPDATE_FAILED",
            message,
        ))),
    }
}

pub(super) fn run_show_command(config: &AppConfig, args: ShowArgs) -> Result<i32, CliError> {
    let store = open_store(config);
    let record = find_record(&store, &args.code)?;
    let page = record_page(&record, args.page.as_deref())?;
    let catalog = page.catalog();
    let matrix = deserialize(&page.chimney_parameters(), &catalog);

    println!("{} - {}", record.firma_adi, record.olcum_kodu);
    if !record.baslangic_tarihi.is_empty() || !record.bitis_tarihi.is_empty() {
        println!("{} .. {}", record.baslangic_tarihi, record.bitis_tarihi);
    }
    if !record.personel.is_empty() {
        println!("Personnel: {}", record.personel.join(", "));
    }
    print!("{}", render_table(&MatrixView::render(&catalog, &matrix)));
    Ok(0)
}

pub(super) fn run_districts_command(
    config: &AppConfig,
    args: DistrictsArgs,
) -> Result<i32, CliError> {
    let regions_path = args.regions.unwrap_or_else(|| config.regions_path.clone());
    let directory = load_regions(&regions_path)?.ok_or_else(|| {
        CliError::Usage(format!(
            "regions file '{}' does not exist",
            regions_path.display()
        ))
    })?;
    let districts = directory.districts(&args.region)?;

    println!("{DISTRICT_PLACEHOLDER}");
    for district in districts {
        let marker = if args.current.as_deref() == Some(district.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {district}");
    }
    Ok(0)
}
