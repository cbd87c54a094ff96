// Entry point and high-level CLI flow.
//
// - Option [1] loads the claims CSV and computes the full summary.
// - Option [2] writes pivot tables and KPIs for the current selection.
// - Option [3] replaces the active filters.
// - Option [4] prints month-over-month trends for a chosen metric.
// - Option [5] sorts one pivot table by a column (repeat to toggle).
use chrono::NaiveDate;
use clap::Parser;
use claims_report::{
    consolidate_trends, loader, output, sort_pivot, Dashboard, FilterSpec, Metric, ReportConfig,
    SortState,
};
use num_format::Locale;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Parser, Debug)]
#[command(name = "claims_report", version, about = "Insurance claims pivot and trend reports")]
struct Cli {
    /// Claims CSV to load with option [1].
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML file overriding field names, dimensions and formatting.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for generated CSV/JSON files.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

// Loaded once, reused across menu actions.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    dashboard: Option<Dashboard>,
    sort_states: HashMap<String, SortState>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask for a numbered option out of `items`; `None` on anything invalid.
fn pick<'a>(title: &str, items: &'a [String]) -> Option<&'a String> {
    println!("{}", title);
    for (i, item) in items.iter().enumerate() {
        println!("[{}] {}", i + 1, item);
    }
    let n: usize = read_choice().parse().ok()?;
    items.get(n.checked_sub(1)?)
}

fn handle_load(cli: &Cli, cfg: &ReportConfig, locale: &Locale) {
    let path = match &cli.file {
        Some(p) => p.clone(),
        None => PathBuf::from(read_line("Path to claims CSV: ")),
    };
    let loaded = loader::read_rows(&path)
        .and_then(|(rows, report)| Ok((Dashboard::load(rows, cfg.clone())?, report)));
    match loaded {
        Ok((dashboard, report)) => {
            let processed = dashboard.processed();
            println!(
                "Processing dataset... ({} rows loaded, {} registered)",
                claims_report::util::format_int(processed.total_records(), locale),
                claims_report::util::format_int(dashboard.base().len(), locale)
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped because they could not be read.",
                    claims_report::util::format_int(report.parse_errors, locale)
                );
            }
            println!();
            output::preview_kpis(&dashboard.full_summary().kpis);
            let mut st = state();
            st.dashboard = Some(dashboard);
            st.sort_states.clear();
        }
        Err(e) => eprintln!("Failed to load file: {}\n", e),
    }
}

fn handle_generate_reports(out_dir: &Path, locale: &Locale) {
    let st = state();
    let Some(dashboard) = st.dashboard.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let current = dashboard.current();

    if let Err(e) = std::fs::create_dir_all(out_dir) {
        eprintln!("Write error: {}", e);
        return;
    }
    println!("Generating reports...");
    if !current.spec.is_unrestricted() {
        println!("(Filtered: {} of {} claims)", current.filtered.len(), dashboard.base().len());
    }
    println!();
    output::preview_kpis(&current.summary.kpis);
    if let Err(e) = output::write_json(&out_dir.join("kpis.json"), &current.summary.kpis) {
        eprintln!("Write error: {}", e);
    }
    if current.summary.pivots.is_empty() {
        println!("(no claims match the current filters)\n");
        return;
    }
    for table in &current.summary.pivots.tables {
        let file = out_dir.join(format!("pivot_{}.csv", output::file_stem(table.dimension())));
        if let Err(e) = output::write_pivot_csv(&file, table) {
            eprintln!("Write error: {}", e);
        }
        println!("Pivot: {}", table.dimension());
        output::preview_pivot(table, 5, locale);
        println!("(Full table exported to {})\n", file.display());
    }
}

fn parse_date_input(prompt: &str) -> Option<NaiveDate> {
    loop {
        let s = read_line(prompt);
        if s.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => return Some(d),
            Err(_) => println!("Invalid date. Use YYYY-MM-DD or leave blank."),
        }
    }
}

fn handle_filters() {
    let mut st = state();
    let Some(dashboard) = st.dashboard.as_mut() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    let mut spec = FilterSpec {
        date_from: parse_date_input("Date from (YYYY-MM-DD, blank = any): "),
        date_to: parse_date_input("Date to (YYYY-MM-DD, blank = any): "),
        ..FilterSpec::default()
    };
    for (dim, values) in dashboard.filter_options() {
        println!("{}: {}", dim, values.join(" | "));
        let picked: BTreeSet<String> = read_line("  values (comma separated, blank = all): ")
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        spec.categorical.insert(dim.clone(), picked);
    }

    match dashboard.apply_filters(spec) {
        Ok(cur) => {
            println!("{} claims match.\n", cur.filtered.len());
            output::preview_kpis(&cur.summary.kpis);
        }
        Err(e) => eprintln!("Failed to apply filters: {}\n", e),
    }
}

fn handle_trends(out_dir: &Path, locale: &Locale) {
    let st = state();
    let Some(dashboard) = st.dashboard.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let metrics = [Metric::Count, Metric::Claim, Metric::Settled];
    let names: Vec<String> = metrics.iter().map(|m| m.to_string()).collect();
    let Some(name) = pick("Metric:", &names) else {
        println!("Invalid choice.\n");
        return;
    };
    let metric = Metric::parse(name).unwrap_or(Metric::Count);

    let cfg = dashboard.config();
    let trends = consolidate_trends(
        &dashboard.current().filtered,
        metric,
        &cfg.trend_categories,
        cfg.trend_top_n,
    );
    println!("\nMonth-over-Month Trend Analysis ({})\n", metric);
    for category in &cfg.trend_categories {
        match trends.get(category) {
            Some(t) if !t.points.is_empty() => {
                println!("Monthly Trend: {}", category);
                println!("{}\n", output::render_trend(t, locale));
            }
            _ => {}
        }
    }
    if let Err(e) = output::write_json(&out_dir.join("trends.json"), &trends) {
        eprintln!("Write error: {}", e);
    }
}

fn handle_sort(locale: &Locale) {
    let mut st = state();
    let AppState { dashboard, sort_states } = &mut *st;
    let Some(dashboard) = dashboard.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let pivots = &dashboard.current().summary.pivots;
    let dims: Vec<String> = pivots.dimensions().iter().map(|d| d.to_string()).collect();
    let Some(dim) = pick("Pivot table:", &dims) else {
        println!("Invalid choice.\n");
        return;
    };
    let columns = pivots.get(dim).map(|t| t.columns.clone()).unwrap_or_default();
    let Some(column) = pick("Sort by column:", &columns) else {
        println!("Invalid choice.\n");
        return;
    };
    let next = sort_states.get(dim).cloned().unwrap_or_default().toggle(column);
    let sorted = match sort_pivot(pivots, dim, &next) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}\n", e);
            return;
        }
    };
    if let Some(dir) = next.direction {
        println!("\n{} sorted by {} ({:?})", dim, column, dir);
    }
    output::preview_pivot(&sorted, usize::MAX, locale);
    sort_states.insert(dim.clone(), next);
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let cfg = match &cli.config {
        Some(path) => match ReportConfig::from_path(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => ReportConfig::default(),
    };
    let locale = match cfg.number_locale() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            std::process::exit(2);
        }
    };

    loop {
        println!("Claims Report");
        println!("[1] Load the file");
        println!("[2] Generate Reports");
        println!("[3] Set Filters");
        println!("[4] Trend Analysis");
        println!("[5] Sort a Pivot Table");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&cli, &cfg, &locale),
            "2" => {
                println!();
                handle_generate_reports(&cli.out_dir, &locale);
            }
            "3" => handle_filters(),
            "4" => handle_trends(&cli.out_dir, &locale),
            "5" => handle_sort(&locale),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}
