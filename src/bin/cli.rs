//! mobmetrics CLI - Run location, home, contact and metric analysis on a
//! trace file.
//!
//! Usage:
//!   mobmetrics-cli locations <trace> [--output <file>]
//!   mobmetrics-cli homes <trace> [--output <file>]
//!   mobmetrics-cli contacts <trace> [--radius <r>] [--output <file>]
//!   mobmetrics-cli metric <KIND> <trace> [--output <file>]
//!   mobmetrics-cli bins <KIND> <trace>
//!
//! Output format follows the extension of `--output` (.csv, .txt, .json).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use mobmetrics::io::{read_trace, write_records, write_table, PreprocessOptions};
use mobmetrics::metrics::extract;
use mobmetrics::{
    detect_contacts, find_homes, find_locations, stats, AnalysisConfig, DistanceType,
    MetricInputs, MetricKind, MetricTable, Result, Trace,
};

#[derive(Parser)]
#[command(name = "mobmetrics-cli")]
#[command(
    about = "Mobility trace analysis: stay locations, homes, contacts and metrics",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct CommonArgs {
    /// Trace file (.csv, .txt, .tsv or .json)
    trace: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file for the result table (.csv, .txt or .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Distance formula: euclidean or haversine
    #[arg(long)]
    dist_type: Option<DistanceType>,

    /// Maximum stay-location radius
    #[arg(long)]
    max_distance: Option<f64>,

    /// Minimum geo-location duration in minutes
    #[arg(long)]
    pause_threshold: Option<f64>,

    /// Contact radius
    #[arg(long)]
    radius: Option<f64>,

    /// Sort the trace by (id, timestamp) after loading
    #[arg(long)]
    sort: bool,

    /// Shift timestamps so the trace starts at zero
    #[arg(long)]
    zero_base: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Label stay-locations and geo-locations
    Locations(CommonArgs),

    /// Detect the home location of every node
    Homes(CommonArgs),

    /// Detect contacts between nodes
    Contacts(CommonArgs),

    /// Extract a single metric (TRVD, RADG, VISO, VIST, TRVT, INCO, CODU)
    Metric {
        kind: MetricKind,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Freedman-Diaconis binning of a metric's value column
    Bins {
        kind: MetricKind,

        #[command(flatten)]
        common: CommonArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let outcome = match &cli.command {
        Commands::Locations(common) => run_locations(common),
        Commands::Homes(common) => run_homes(common),
        Commands::Contacts(common) => run_contacts(common),
        Commands::Metric { kind, common } => run_metric(*kind, common),
        Commands::Bins { kind, common } => run_bins(*kind, common),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Merge the config file (if any) with command line overrides.
fn load_config(common: &CommonArgs) -> Result<AnalysisConfig> {
    let mut config = match &common.config {
        Some(path) => AnalysisConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => AnalysisConfig::default(),
    };

    if let Some(dist_type) = common.dist_type {
        config.locations.dist_type = dist_type;
        config.contacts.dist_type = dist_type;
    }
    if let Some(max_distance) = common.max_distance {
        config.locations.max_distance = max_distance;
    }
    if let Some(pause_threshold) = common.pause_threshold {
        config.locations.pause_threshold = pause_threshold;
    }
    if let Some(radius) = common.radius {
        config.contacts.radius = radius;
    }

    config.validate()?;
    Ok(config)
}

fn load_trace(common: &CommonArgs) -> Result<Trace> {
    let options = PreprocessOptions {
        sort: common.sort,
        zero_base: common.zero_base,
    };
    read_trace(&common.trace, &options)
}

fn header(title: &str, path: &Path) {
    println!("\n{}", "=".repeat(60));
    println!("{}: {}", title, path.display());
    println!("{}", "=".repeat(60));
}

fn run_locations(common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    let trace = load_trace(common)?;
    header("Locations", &common.trace);

    let result = find_locations(&trace, &config.locations)?;
    let geo_points = result.trace_loc.iter().filter(|p| p.gl).count();

    println!("  Nodes: {}", trace.node_ids().len());
    println!("  Points: {} ({} in geo-locations)", result.trace_loc.len(), geo_points);
    println!("  Geo-locations: {}", result.sl_centers.len());

    if let Some(output) = &common.output {
        write_records(output, &result.trace_loc)?;
        let centers = output.with_file_name(format!(
            "{}_centers.{}",
            output.file_stem().and_then(|s| s.to_str()).unwrap_or("trace"),
            output.extension().and_then(|e| e.to_str()).unwrap_or("csv")
        ));
        write_records(&centers, &result.sl_centers)?;
    }

    Ok(())
}

fn run_homes(common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    let trace = load_trace(common)?;
    header("Homes", &common.trace);

    let result = find_locations(&trace, &config.locations)?;
    let homes = find_homes(&result.trace_loc);

    for home in &homes {
        println!(
            "  Node {}: sl {} at ({:.6}, {:.6}), dwell {:.0}s",
            home.id, home.home_location, home.x, home.y, home.dwell_time
        );
    }

    if let Some(output) = &common.output {
        write_records(output, &homes)?;
    }

    Ok(())
}

fn run_contacts(common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    let trace = load_trace(common)?;
    header("Contacts", &common.trace);

    let contacts = detect_contacts(&trace, &config.contacts)?;
    let mut pairs: Vec<(i64, i64)> = contacts.iter().map(|c| c.pair()).collect();
    pairs.sort_unstable();
    pairs.dedup();

    println!("  Contacts: {}", contacts.len());
    println!("  Distinct pairs: {}", pairs.len());

    if let Some(output) = &common.output {
        write_records(output, &contacts)?;
    }

    Ok(())
}

/// Compute a metric, deriving only the tables it needs.
fn compute_metric(kind: MetricKind, common: &CommonArgs) -> Result<MetricTable> {
    let config = load_config(common)?;
    let trace = load_trace(common)?;

    match kind {
        MetricKind::IntercontactTime | MetricKind::ContactDuration => {
            let contacts = detect_contacts(&trace, &config.contacts)?;
            let inputs = MetricInputs::new(config.contacts.dist_type).with_contacts(&contacts);
            extract(kind, &inputs)
        }
        _ => {
            let result = find_locations(&trace, &config.locations)?;
            let inputs = MetricInputs::new(config.locations.dist_type)
                .with_trace(&trace)
                .with_trace_loc(&result.trace_loc);
            extract(kind, &inputs)
        }
    }
}

fn run_metric(kind: MetricKind, common: &CommonArgs) -> Result<()> {
    header(kind.name(), &common.trace);
    let table = compute_metric(kind, common)?;

    println!("  Records: {}", table.len());
    let values = table.values();
    if !values.is_empty() {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        println!("  Mean {}: {:.3}", kind.value_column(), mean);
    }

    if let Some(output) = &common.output {
        write_table(output, &table)?;
    }

    Ok(())
}

fn run_bins(kind: MetricKind, common: &CommonArgs) -> Result<()> {
    header(&format!("{} bins", kind.name()), &common.trace);
    let table = compute_metric(kind, common)?;
    let values = table.values();

    println!("  Values: {}", values.len());
    if let Some(iqr) = stats::iqr(&values) {
        println!("  IQR: {:.3}", iqr);
    }
    println!("  Bin width: {:.3}", stats::freedman_diaconis_width(&values));
    println!("  Bin count: {}", stats::freedman_diaconis_bins(&values));

    Ok(())
}
