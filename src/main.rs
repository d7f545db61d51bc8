// Entry point and interactive CLI flow.
//
// - Option [1] loads the location catalog and the submitted reports.
// - Option [2] previews metrics for counters typed in by hand.
// - Option [3] shows which locations have reported for a given week.
// - Option [4] builds the weekly workbook and a JSON summary.
use chrono::{Local, NaiveDate};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;
use weekly_ops_report::config::ReportConfig;
use weekly_ops_report::types::{InputField, Location, ReportFields, WeeklyReport};
use weekly_ops_report::{loader, metrics, output, reports, util, workbook};

#[derive(Parser)]
#[command(name = "weekly_ops_report")]
#[command(about = "Build the weekly multi-location operations workbook", long_about = None)]
struct Cli {
    /// Submitted weekly reports (.csv or .json)
    #[arg(long, default_value = "reports.csv")]
    reports: PathBuf,

    /// Location catalog (.csv or .json)
    #[arg(long, default_value = "locations.csv")]
    locations: PathBuf,

    /// Optional JSON file mapping states to rollup groups
    #[arg(long)]
    groups: Option<PathBuf>,

    /// Directory the workbook and summary are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

// Loaded input lives here so reports can be generated repeatedly without
// re-reading the files.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    locations: Vec<Location>,
    reports: Option<Vec<WeeklyReport>>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn prompt_date(label: &str) -> Option<NaiveDate> {
    loop {
        let input = prompt(label);
        if input.is_empty() {
            return None;
        }
        match util::parse_date_safe(Some(&input)) {
            Some(d) => return Some(d),
            None => println!("Invalid date. Use YYYY-MM-DD or leave blank."),
        }
    }
}

fn handle_load(cli: &Cli) {
    let locations = match loader::load_locations(&cli.locations) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to load locations: {}\n", e);
            return;
        }
    };
    match loader::load_reports(&cli.reports) {
        Ok((data, load_report)) => {
            println!(
                "Loaded {} locations and {} reports ({} rows read).",
                util::format_int(locations.len()),
                util::format_int(load_report.loaded_rows),
                util::format_int(load_report.total_rows)
            );
            if load_report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to missing location or week.",
                    util::format_int(load_report.skipped_rows)
                );
            }
            println!();
            let mut state = state();
            state.locations = locations;
            state.reports = Some(data);
        }
        Err(e) => eprintln!("Failed to load reports: {}\n", e),
    }
}

fn handle_preview() {
    println!("Enter this week's counters (blank counts as 0).");
    let mut fields = ReportFields::default();
    for field in InputField::ALL {
        let label = field.metric().label();
        fields.set(field, prompt(&format!("{}: ", label)));
    }
    println!();
    output::preview_metrics(&metrics::preview_rows(&fields));
}

fn handle_availability() {
    let state = state();
    let Some(data) = state.reports.as_ref() else {
        println!("Error: No data loaded. Please load the files first (option 1).\n");
        return;
    };
    let today = Local::now().date_naive();
    println!("Recent weeks:");
    for (start, _) in util::last_four_weeks(today) {
        println!("  {}  ({})", start, util::week_label(start));
    }
    let Some(week_start) = prompt_date("Week start (YYYY-MM-DD): ") else {
        return;
    };
    println!("\nReport Availability: {}\n", util::week_label(week_start));
    let rows = reports::report_availability(data, &state.locations, week_start);
    output::preview_table_rows(&rows, rows.len());
}

fn handle_generate(cli: &Cli, config: &ReportConfig) {
    let (locations, data) = {
        let state = state();
        (state.locations.clone(), state.reports.clone())
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the files first (option 1).\n");
        return;
    };

    let from = prompt_date("From week ending (YYYY-MM-DD, blank for all): ");
    let to = prompt_date("To week ending (YYYY-MM-DD, blank for all): ");
    let selected = reports::select_weeks(&data, from, to);

    let buckets = match reports::aggregate(&selected, &locations, config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Cannot build report: {}\n", e);
            return;
        }
    };
    let doc = workbook::build_workbook(&buckets);
    if doc.is_empty() {
        println!("No reports for the selected range.\n");
        return;
    }

    let today = Local::now().date_naive();
    match output::write_workbook(&cli.out_dir, today, &doc) {
        Ok(path) => println!("Workbook saved to {}\n", path.display()),
        Err(e) => {
            eprintln!("Write error: {}\n", e);
            return;
        }
    }

    let summary = reports::summarize(&buckets);
    if let Err(e) = output::write_json(&cli.out_dir.join("summary.json"), &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Weekly Summary (summary.json):\n");
    output::preview_table_rows(&summary, summary.len());
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.groups {
        Some(path) => match ReportConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load group configuration: {}", e);
                std::process::exit(1);
            }
        },
        None => ReportConfig::default(),
    };

    loop {
        println!("Weekly Operations Report");
        println!("[1] Load data");
        println!("[2] Preview metrics");
        println!("[3] Check availability");
        println!("[4] Generate workbook");
        println!("[5] Exit\n");
        match prompt("Enter choice: ").as_str() {
            "1" => handle_load(&cli),
            "2" => handle_preview(),
            "3" => handle_availability(),
            "4" => handle_generate(&cli, &config),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}
