use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use water_report::config::AppConfig;
use water_report::domain::entities::mapping::Fixture;
use water_report::infra::export::html::HtmlExporter;
use water_report::infra::sqlite::repo::SqliteSlotStore;
use water_report::usecase::ports::exporter::ReportExporter;
use water_report::usecase::ports::store::SlotStore;
use water_report::usecase::services::import_service::ImportService;
use water_report::usecase::services::overrides::OverrideStore;
use water_report::usecase::services::report_service::{prepare, ReportMeta, ReportService};

#[derive(Parser)]
#[command(name = "water-report")]
#[command(about = "Builds water-fixture installation reports from survey sheets")]
#[command(version)]
struct Cli {
    /// SQLite file holding the imported data and edits
    #[arg(long, env = "WATER_REPORT_DB", global = true)]
    db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, env = "WATER_REPORT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a csv or spreadsheet, replacing the previous data set
    Import {
        file: PathBuf,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        property: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        zip: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Show resolved columns and the reconciled units
    Preview,
    /// Toggle a column whose values are appended to every note
    SelectColumn { name: String },
    /// Toggle a snippet appended to one unit's note
    SelectCell { unit: String, text: String },
    /// Override a unit's note; an empty text clears the note
    Note {
        unit: String,
        text: Option<String>,
        /// Drop the override and show the compiled note again
        #[arg(long, conflicts_with = "text")]
        reset: bool,
    },
    /// Override one fixture value of a unit
    Install {
        unit: String,
        /// kitchen, bathroom, shower or toilet
        fixture: String,
        value: String,
    },
    /// Rename a unit; an empty name deletes it
    Rename { from: String, to: String },
    /// Delete a unit from the report
    Delete { unit: String },
    /// Add a unit by hand
    Add { unit: String },
    /// Write the print-ready report
    Export { out: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let db_path = config.resolve_db_path(cli.db.clone())?;
    let slots: Arc<dyn SlotStore> = Arc::new(SqliteSlotStore::new(&db_path));
    slots.init()?;
    tracing::debug!(db = %db_path.display(), "slot store ready");

    match cli.command {
        Commands::Import {
            file,
            customer,
            property,
            address,
            city,
            state,
            zip,
            date,
        } => {
            let summary = ImportService::new(slots.clone()).import_file(&file)?;

            let mut meta = ReportMeta::load(slots.as_ref());
            let fields = [
                (customer, &mut meta.customer.customer_name),
                (property, &mut meta.customer.property_name),
                (address, &mut meta.customer.address),
                (city, &mut meta.customer.city),
                (state, &mut meta.customer.state),
                (zip, &mut meta.customer.zip),
                (date, &mut meta.customer.date),
            ];
            for (value, field) in fields {
                if let Some(value) = value {
                    *field = value;
                }
            }
            meta.save(slots.as_ref())?;

            println!(
                "imported {} rows, {} columns from {}",
                summary.row_count,
                summary.columns.len(),
                file.display()
            );
        }
        Commands::Preview => cmd_preview(&slots, &config),
        Commands::SelectColumn { name } => {
            let service = ImportService::new(slots.clone());
            let mut selection = service.load_selection();
            let selected = selection.toggle_column(&name);
            service.save_selection(&selection)?;
            println!("{name}: {}", if selected { "selected" } else { "unselected" });
        }
        Commands::SelectCell { unit, text } => {
            let service = ImportService::new(slots.clone());
            let mut selection = service.load_selection();
            let selected = selection.toggle_cell(&unit, &text);
            service.save_selection(&selection)?;
            println!("{unit}: {}", if selected { "selected" } else { "unselected" });
        }
        Commands::Note { unit, text, reset } => {
            let mut overrides = load_overrides(&slots, &config);
            if reset {
                overrides.clear_note(&unit)?;
            } else {
                overrides.set_note(&unit, text.as_deref().unwrap_or(""))?;
            }
        }
        Commands::Install {
            unit,
            fixture,
            value,
        } => {
            let fixture = Fixture::parse(&fixture)
                .ok_or_else(|| anyhow!("unknown fixture: {fixture}"))?;
            load_overrides(&slots, &config).set_installation(&unit, fixture, &value)?;
        }
        Commands::Rename { from, to } => {
            load_overrides(&slots, &config).rename_unit(&from, &to)?;
        }
        Commands::Delete { unit } => {
            load_overrides(&slots, &config).delete_unit(&unit)?;
        }
        Commands::Add { unit } => {
            load_overrides(&slots, &config).add_unit(&unit)?;
        }
        Commands::Export { out } => {
            let document = {
                let table = ImportService::new(slots.clone()).load_table();
                if table.is_empty() {
                    return Err(anyhow!("nothing imported yet"));
                }
                let prepared = prepare(&table, &config.role_synonyms());
                let overrides = OverrideStore::load(slots.clone());
                let selection = ImportService::new(slots.clone()).load_selection();
                let options = config.report_options();
                let meta = ReportMeta::load(slots.as_ref());
                ReportService::new(&prepared, &overrides, &selection, &options).build_document(&meta)
            };

            let file = File::create(&out)
                .with_context(|| format!("failed to create report: {}", out.display()))?;
            let mut writer = BufWriter::new(file);
            HtmlExporter::new(config.layout.clone()).export(&document, &mut writer)?;
            println!("wrote {}", out.display());
        }
    }

    Ok(())
}

/// Override store that knows the imported units, so edits keep unit ids
/// unique.
fn load_overrides(slots: &Arc<dyn SlotStore>, config: &AppConfig) -> OverrideStore {
    let table = ImportService::new(slots.clone()).load_table();
    let prepared = prepare(&table, &config.role_synonyms());
    OverrideStore::load(slots.clone()).with_imported_units(prepared.unit_ids())
}

fn cmd_preview(slots: &Arc<dyn SlotStore>, config: &AppConfig) {
    let import = ImportService::new(slots.clone());
    let table = import.load_table();
    if table.is_empty() {
        println!("nothing imported yet");
        return;
    }

    let prepared = prepare(&table, &config.role_synonyms());
    let overrides = OverrideStore::load(slots.clone());
    let selection = import.load_selection();
    let options = config.report_options();
    let service = ReportService::new(&prepared, &overrides, &selection, &options);

    println!("columns:");
    for (role, column) in prepared.mapping.iter() {
        println!("  {:<18} {column}", role.as_str());
    }
    if !selection.selected_notes_columns.is_empty() {
        println!("selected: {}", selection.selected_notes_columns.join(", "));
    }

    println!();
    for row in service.detail_rows() {
        let marker = if row.added { "+" } else { " " };
        println!(
            "{marker}{:<10} {:<14} {:<14} {:<14} {:<8} {}",
            row.unit, row.kitchen, row.bathroom, row.shower, row.toilet, row.note
        );
    }

    let remarks: Vec<_> = prepared
        .units
        .iter()
        .filter(|unit| !unit.remarks.is_empty())
        .collect();
    if !remarks.is_empty() {
        println!();
        println!("sheet notes:");
        for unit in remarks {
            println!("  {:<10} {}", unit.unit_id, unit.remarks);
        }
    }
}
