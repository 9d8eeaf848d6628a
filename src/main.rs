// Interactive entry point.
//
// - Option [1] loads every export from the configured data directory and
//   prints what was found.
// - Option [2] builds the dashboard, writes the chart CSVs and the JSON
//   summary, and previews each report on the console.
// After generating, the user can go back to the menu or exit.
//
// Usage: roadsafe-report [config.json]
use once_cell::sync::Lazy;
use roadsafe_report::config::AppConfig;
use roadsafe_report::loader::{self, Dataset};
use roadsafe_report::output;
use roadsafe_report::reports::{self, DashboardSummary};
use roadsafe_report::util;
use roadsafe_report::{logging, Result};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::error;

// Loaded once, reused for as many dashboard builds as the user asks for.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Dataset>,
}

/// `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// `true` for Y, `false` for N; re-prompts on anything else.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(cfg: &AppConfig) {
    match loader::load_dataset(&cfg.data_dir) {
        Ok((data, report)) => {
            println!(
                "Loading exports from {}... ({} rows loaded)",
                cfg.data_dir.display(),
                util::format_int(report.total_rows() as u64)
            );
            for c in &report.collections {
                match &c.path {
                    Some(p) => println!(
                        "  {:<13} {:>8} rows  ({})",
                        c.name,
                        util::format_int(c.rows as u64),
                        p.display()
                    ),
                    None => println!("  {:<13} {:>8}", c.name, "missing"),
                }
            }
            if report.parse_errors() > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(report.parse_errors() as u64)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(data);
        }
        Err(e) => {
            error!(error = %e, "load failed");
            eprintln!("Failed to load exports: {}\n", e);
        }
    }
}

fn write_reports(summary: &DashboardSummary, out: &Path) -> Result<()> {
    std::fs::create_dir_all(out)?;
    output::write_csv(&out.join("trend_monthly.csv"), &summary.monthly_trend)?;
    output::write_csv(&out.join("schools_by_province.csv"), &summary.schools_by_province.rows)?;
    output::write_csv(&out.join("publics_by_city.csv"), &summary.publics_by_city.rows)?;
    output::write_csv(&out.join("budget_by_event.csv"), &summary.budget_by_event.rows)?;
    output::write_csv(&out.join("event_types.csv"), &summary.event_types)?;
    output::write_csv(&out.join("budget_utilization.csv"), &summary.budget_utilization.rows)?;
    output::write_json(&out.join("dashboard_summary.json"), summary)?;
    Ok(())
}

fn print_summary(summary: &DashboardSummary, cfg: &AppConfig) {
    let s = &summary.stats;
    println!("Headline");
    println!(
        "  Schools: {} ({} educated, {})",
        util::format_int(s.total_schools as u64),
        util::format_int(s.educated_schools as u64),
        util::format_pct(&s.school_coverage_pct)
    );
    println!(
        "  Public entities: {} ({} educated)",
        util::format_int(s.total_publics as u64),
        util::format_int(s.educated_publics as u64)
    );
    println!(
        "  Events: {} ({} attendees)",
        util::format_int(s.total_events as u64),
        util::format_int(s.total_attendees)
    );
    println!(
        "  Accidents: {} ({} deaths, {} injured)\n",
        util::format_int(s.total_accidents as u64),
        util::format_int(s.total_deaths),
        util::format_int(s.total_injured)
    );

    let rows = cfg.preview_rows;
    let trend_title = format!("Accident Trend (last {} months)", cfg.trend_months);
    output::preview_table(&trend_title, &summary.monthly_trend, rows);
    output::preview_table("Schools by Province", &summary.schools_by_province.rows, rows);
    output::preview_table("Public Entities by City", &summary.publics_by_city.rows, rows);
    output::preview_table("Budget by Event", &summary.budget_by_event.rows, rows);
    output::preview_table("Event Types", &summary.event_types, rows);
    output::preview_table("Budget Utilization", &summary.budget_utilization.rows, rows);

    let p = &summary.priority;
    println!("Education Priority Matrix");
    println!("({})", p.caption());
    println!("  {}\n", p.counts_line());

    println!("Next Month Recommendations");
    for line in summary.recommendations.summary_lines() {
        println!("  - {}", line);
    }
    println!();
}

fn handle_generate(cfg: &AppConfig) {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the exports first (option 1).\n");
        return;
    };

    println!("Building dashboard...\n");
    let summary = reports::build_dashboard(&data, cfg);
    match write_reports(&summary, &cfg.output_dir) {
        Ok(()) => println!("Outputs saved to {}\n", cfg.output_dir.display()),
        Err(e) => {
            error!(error = %e, "writing reports failed");
            eprintln!("Write error: {}\n", e);
        }
    }
    print_summary(&summary, cfg);
}

fn main() {
    logging::init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => match AppConfig::from_file(Path::new(&path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to read config {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => AppConfig::default(),
    };

    loop {
        println!("Road Safety Education Dashboard");
        println!("[1] Load datasets");
        println!("[2] Generate dashboard\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&cfg),
            "2" => {
                println!();
                handle_generate(&cfg);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
