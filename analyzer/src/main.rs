use anyhow::{bail, Context};
use celltracecore::geodesy::{BoundingBox, Coordinate};
use celltracecore::traffic::{apply_coordinates, unique_tower_addresses, Tower};
use clap::Parser;
use dotenv::dotenv;
use generator::sample::{build_sample_dataset, SampleConfig};
use geocode::{resolve_addresses, Credentials, Geocoder, GoogleGeocoder, OpenCellIdClient};
use ingest::{versioned_output_path, TrafficTable};
use mapview::TrafficMap;
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::{AnalysisResult, Runner};

mod generator;
mod geocode;
mod ingest;
mod mapview;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Cell traffic correlation driver")]
struct Args {
    /// Traffic export to analyze (CSV)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Subscriber address to geocode
    #[arg(long)]
    address: Option<String>,
    /// Subscriber position as lat,lon (skips geocoding)
    #[arg(long)]
    position: Option<String>,
    /// Screening distance threshold in meters
    #[arg(long)]
    max_distance: Option<f64>,
    /// First hour of the screening window
    #[arg(long)]
    hour_start: Option<u32>,
    /// Hour the screening window ends before
    #[arg(long)]
    hour_end: Option<u32>,
    /// Sector arc half-width in degrees
    #[arg(long)]
    arc: Option<f64>,
    /// Render the interactive map to this file
    #[arg(long)]
    map: Option<PathBuf>,
    /// List catalog towers in an area of this size (km^2) around the subscriber
    #[arg(long)]
    towers_area: Option<f64>,
    /// Run the pipeline on a synthetic dataset and exit
    #[arg(long, default_value_t = false)]
    offline: bool,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    // CLI flags override the file.
    if let Some(address) = &args.address {
        config.subscriber_address = Some(address.clone());
    }
    if let Some(position) = &args.position {
        config.subscriber_position = Some(position.clone());
    }
    if let Some(meters) = args.max_distance {
        config.max_distance_m = meters;
    }
    if let Some(hour) = args.hour_start {
        config.hour_start = hour;
    }
    if let Some(hour) = args.hour_end {
        config.hour_end = hour;
    }
    if let Some(degrees) = args.arc {
        config.sector_arc_deg = degrees;
    }

    if args.offline {
        return run_offline(&args, &config);
    }

    let input = args
        .input
        .clone()
        .context("--input is required unless running --offline")?;
    let credentials =
        Credentials::from_env().context("API credentials missing, cannot reach external services")?;
    let geocoder = GoogleGeocoder::new(credentials.geocoding_key.clone());

    let subscriber = subscriber_coordinate(&config, &geocoder)?;

    let table = TrafficTable::read(&input, &config.columns, config.skip_rows)?;
    let addresses = unique_tower_addresses(&table.records);
    println!("{} base stations in the export", addresses.len());

    let book = resolve_addresses(&geocoder, &addresses);
    let unresolved: Vec<&String> = book
        .iter()
        .filter_map(|(address, coord)| coord.is_none().then_some(address))
        .collect();
    if !unresolved.is_empty() {
        println!("{} addresses left unresolved:", unresolved.len());
        for address in unresolved {
            println!("  {}", address);
        }
    }

    let mut records = table.records.clone();
    apply_coordinates(&mut records, &book);

    let runner = Runner::new(config.clone());
    let result = runner.execute(records, subscriber)?;

    let output = versioned_output_path(&input);
    table.write_enriched(&output, &result.records)?;
    println!("Enriched export -> {}", output.display());

    print_summary(&result);

    if let Some(map_path) = &args.map {
        save_map(map_path, &config, subscriber, &result)?;
        println!("Map -> {}", map_path.display());
    }

    if let Some(area) = args.towers_area {
        let catalog = OpenCellIdClient::new(credentials.tower_db_key.clone());
        let bbox = BoundingBox::from_center_area(subscriber, area)?;
        let towers = catalog.query_towers(&bbox)?;
        println!("{} Stations Found", towers.len());
        println!("{}", Tower::table_header());
        for tower in &towers {
            println!("{}", tower);
        }

        // Reverse-geocode the catalog hits so the operator sees street
        // addresses, not bare coordinates.
        let mut seen = BTreeSet::new();
        for tower in &towers {
            match geocoder.reverse(tower.coord) {
                Ok(Some(address)) => {
                    if seen.insert(address.clone()) {
                        println!("  {} -> {}", tower.cell_id, address);
                    }
                }
                Ok(None) => {}
                Err(err) => log::warn!("reverse geocoding {} failed: {}", tower.coord, err),
            }
        }
    }

    Ok(())
}

fn subscriber_coordinate(
    config: &WorkflowConfig,
    geocoder: &impl Geocoder,
) -> anyhow::Result<Coordinate> {
    if let Some(position) = &config.subscriber_position {
        return Ok(Coordinate::parse(position)?);
    }
    if let Some(address) = &config.subscriber_address {
        let coord = geocoder
            .resolve(address)
            .with_context(|| format!("geocoding subscriber address {address:?}"))?;
        return coord.with_context(|| format!("no coordinates for subscriber address {address:?}"));
    }
    bail!("subscriber location required: pass --address or --position")
}

fn run_offline(args: &Args, config: &WorkflowConfig) -> anyhow::Result<()> {
    let sample = SampleConfig::default();
    let (subscriber, records) = build_sample_dataset(&sample)?;

    let runner = Runner::new(config.clone());
    let result = runner.execute(records, subscriber)?;

    println!(
        "Offline run -> in-range {}, screened {}, days {}, towers {}",
        result.in_range_count,
        result.matched.len(),
        result.daily_counts.len(),
        result.tower_counts.len()
    );
    print_summary(&result);

    let report = format!(
        "in_range={} screened={} days={} merged={}\n",
        result.in_range_count,
        result.matched.len(),
        result.daily_counts.len(),
        result.merged_addresses
    );
    let report_path = PathBuf::from("data/offline_summary.log");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(report_path)?;
    file.write_all(report.as_bytes())?;

    if let Some(map_path) = &args.map {
        save_map(map_path, config, subscriber, &result)?;
        println!("Map -> {}", map_path.display());
    }

    Ok(())
}

fn save_map(
    path: &PathBuf,
    config: &WorkflowConfig,
    subscriber: Coordinate,
    result: &AnalysisResult,
) -> anyhow::Result<()> {
    let mut map = TrafficMap::new(subscriber, config.map_zoom, config.wedge_radius_m);
    map.add_subscriber_marker(
        subscriber,
        config.subscriber_address.as_deref().unwrap_or("subscriber"),
    );
    map.add_traffic(&result.matched, &result.tower_counts, config.sector_arc_deg);
    map.save(path)
}

fn print_summary(result: &AnalysisResult) {
    if result.merged_addresses > 0 {
        println!("{} near-duplicate addresses merged", result.merged_addresses);
    }
    println!("Connections by day:");
    for count in &result.daily_counts {
        println!("  {} -> {}", count.day, count.connections);
    }
    println!("Connections by tower:");
    for count in &result.tower_counts {
        println!("  {} -> {}", count.address, count.connections);
    }
}
