use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pmr_core::config::TrackingConfig;
use pmr_core::driver::TaxiAssignment;
use pmr_core::error::PmrError;
use pmr_core::geo::{distance_km, within_radius_km, GeoPoint};
use pmr_core::invoice::InvoiceRecord;
use pmr_core::places::PlaceDirectory;
use pmr_core::pricing::{compute_invoice, TripChargeRequest};
use pmr_core::taxi::{TaxiLeg, TaxiSimulator};
use pmr_core::tracking::{PersistCadence, TrackingError, TrackingRun};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod sink;

use sink::JsonLinesSink;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pmr",
    about = "PMR assistance trip-cost and taxi tracking tools",
    long_about = "Compute assistance invoices, measure distances between GPS points,\n\
                  and replay a taxi ride the way the live tracking screen does."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the invoice for a booking
    Invoice {
        /// PMR assistance was requested
        #[arg(long)]
        assistance: bool,
        /// Number of transport legs in the itinerary
        #[arg(long, default_value_t = 1)]
        legs: u32,
        /// The itinerary mixes transport modes
        #[arg(long)]
        multimodal: bool,
        /// Departure label
        #[arg(long = "from")]
        origin: String,
        /// Arrival label
        #[arg(long = "to")]
        destination: String,
        /// Also print the invoice row that would be stored
        #[arg(long)]
        draft: bool,
        /// Seed for the invoice number suffix
        #[arg(long, env = "PMR_SEED")]
        seed: Option<u64>,
    },
    /// Great-circle distance between two points
    Distance {
        #[arg(allow_negative_numbers = true)]
        from_lat: f64,
        #[arg(allow_negative_numbers = true)]
        from_lng: f64,
        #[arg(allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(allow_negative_numbers = true)]
        to_lng: f64,
        /// Report whether the points are within this radius
        #[arg(long)]
        within_km: Option<f64>,
    },
    /// Replay a taxi leg and print persisted snapshots as JSON lines
    Track {
        /// Departure label (known places resolve to GPS points)
        #[arg(long = "from")]
        origin: String,
        /// Arrival label
        #[arg(long = "to")]
        destination: String,
        /// Planned duration of the leg in minutes
        #[arg(long)]
        eta: Option<f64>,
        /// Planned distance of the leg in kilometres
        #[arg(long)]
        distance_km: Option<f64>,
        /// JSON tracking configuration file
        #[arg(long, env = "PMR_TRACKING_CONFIG")]
        config: Option<PathBuf>,
        /// Pace ticks on the configured wall-clock interval
        #[arg(long)]
        realtime: bool,
        /// Seed for the generated vehicle and driver
        #[arg(long, env = "PMR_SEED")]
        seed: Option<u64>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] PmrError),
    #[error(transparent)]
    Tracking(#[from] TrackingError),
    #[error("failed to read {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

// ── helpers ────────────────────────────────────────────────────────

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<TrackingConfig, CliError> {
    let Some(path) = path else {
        return Ok(TrackingConfig::default());
    };
    let raw = std::fs::read_to_string(&path).map_err(|source| CliError::Config {
        path: path.clone(),
        source,
    })?;
    let config = TrackingConfig::from_json_str(&raw)?;
    tracing::info!(path = %path.display(), "loaded tracking config");
    Ok(config)
}

// ── commands ───────────────────────────────────────────────────────

fn invoice(request: TripChargeRequest, draft: bool, seed: Option<u64>) -> Result<(), CliError> {
    let breakdown = compute_invoice(&request);
    print_json(&breakdown)?;
    if !breakdown.is_billable() {
        tracing::info!("no assistance requested, invoice would not be stored");
        return Ok(());
    }
    if draft {
        let record = InvoiceRecord::draft(&breakdown, chrono::Utc::now(), &mut rng(seed));
        print_json(&record)?;
    }
    Ok(())
}

fn distance(a: (f64, f64), b: (f64, f64), within_km: Option<f64>) -> Result<(), CliError> {
    let a = GeoPoint::new(a.0, a.1)?;
    let b = GeoPoint::new(b.0, b.1)?;
    let km = distance_km(&a, &b);
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{km:.3} km")?;
    if let Some(radius) = within_km {
        writeln!(stdout, "within {radius} km: {}", within_radius_km(&a, &b, radius))?;
    }
    Ok(())
}

async fn track(
    leg: TaxiLeg,
    config: TrackingConfig,
    realtime: bool,
    seed: Option<u64>,
) -> Result<(), CliError> {
    let simulator = TaxiSimulator::from_config(&config)?;
    let places = PlaceDirectory::default();

    let assignment = TaxiAssignment::generate(&mut rng(seed));
    tracing::info!(
        plate = %assignment.vehicle.plate,
        model = %assignment.vehicle.model,
        driver = %format!("{} {}", assignment.driver.first_name, assignment.driver.last_name),
        "taxi assigned"
    );

    let session = simulator.start_for_leg(&leg, &places)?;
    let mut run = TrackingRun::new(
        simulator,
        PersistCadence::every(config.persist_every_ticks),
        session,
    );
    let mut sink = JsonLinesSink::new(io::stdout());

    if realtime {
        let period = Duration::from_millis(config.simulation.tick_interval_ms());
        let mut interval = tokio::time::interval(period);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;
        while !run.is_finished() {
            interval.tick().await;
            run.step(&mut sink)?;
        }
    } else {
        run.run_to_arrival(&mut sink)?;
    }

    tracing::info!(
        snapshots = sink.written(),
        ticks = run.session().ticks_elapsed(),
        "tracking finished"
    );
    Ok(())
}

async fn dispatch(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Invoice {
            assistance,
            legs,
            multimodal,
            origin,
            destination,
            draft,
            seed,
        } => {
            let request =
                TripChargeRequest::new(assistance, legs, multimodal, origin, destination)?;
            invoice(request, draft, seed)
        }
        Commands::Distance {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
            within_km,
        } => distance((from_lat, from_lng), (to_lat, to_lng), within_km),
        Commands::Track {
            origin,
            destination,
            eta,
            distance_km,
            config,
            realtime,
            seed,
        } => {
            let config = load_config(config)?;
            let mut leg = TaxiLeg::new(origin, destination);
            if let Some(eta) = eta {
                leg = leg.with_duration_minutes(eta);
            }
            if let Some(km) = distance_km {
                leg = leg.with_distance_km(km);
            }
            track(leg, config, realtime, seed).await
        }
    }
}

// ── main ───────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pmr_cli=info,pmr_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "command failed");
            ExitCode::FAILURE
        }
    }
}
