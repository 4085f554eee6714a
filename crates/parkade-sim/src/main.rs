use std::process;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parkade::{
    AdmissionError, CardPaymentProcessor, CostStrategy, Floor, LotService, ParkingLot,
    PremiumCost, Spot, SpotType, StandardCost, StrategyKind, Ticket, UnknownStrategy, Vehicle,
    VehicleType,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pricing {
    Standard,
    Premium,
}

impl Pricing {
    fn build(self) -> Arc<dyn CostStrategy> {
        match self {
            Pricing::Standard => Arc::new(StandardCost::default()),
            Pricing::Premium => Arc::new(PremiumCost::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SimConfig {
    vehicles: usize,
    strategy: StrategyKind,
    pricing: Pricing,
    hold: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            vehicles: 10,
            strategy: StrategyKind::Nearest,
            pricing: Pricing::Standard,
            hold: Duration::from_millis(500),
        }
    }
}

/// Honours RUST_LOG, else PARKADE_LOG as a level; LOG_FORMAT=json for JSON lines.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("PARKADE_LOG").as_deref() {
            Ok("trace") => "trace",
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("parkade={level},parkade_sim={level}"))
    };

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("Usage: parkade-sim [--vehicles <n>] [--strategy nearest|random] [--pricing standard|premium] [--hold-ms <ms>]");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --vehicles <n>   Vehicles in the concurrent run [default: 10]");
            eprintln!("  --strategy <s>   Spot strategy: nearest or random [default: nearest]");
            eprintln!("  --pricing <p>    Pricing: standard or premium [default: standard]");
            eprintln!("  --hold-ms <ms>   Time parked before exiting [default: 500]");
            process::exit(2);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<SimConfig, String> {
    let mut config = SimConfig::default();

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--vehicles" => {
                let raw = next_value(args, &mut i, flag)?;
                config.vehicles = raw
                    .parse()
                    .map_err(|_| format!("invalid vehicle count '{raw}'"))?;
            }
            "--strategy" => {
                config.strategy = next_value(args, &mut i, flag)?
                    .parse()
                    .map_err(|e: UnknownStrategy| e.to_string())?;
            }
            "--pricing" => {
                config.pricing = match next_value(args, &mut i, flag)? {
                    "standard" => Pricing::Standard,
                    "premium" => Pricing::Premium,
                    other => {
                        return Err(format!(
                            "invalid pricing '{other}', expected 'standard' or 'premium'"
                        ));
                    }
                };
            }
            "--hold-ms" => {
                let raw = next_value(args, &mut i, flag)?;
                let ms: u64 = raw
                    .parse()
                    .map_err(|_| format!("invalid hold time '{raw}'"))?;
                config.hold = Duration::from_millis(ms);
            }
            "--help" | "-h" => return Err(String::new()),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(config)
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Two floors, five spots: F1 small/medium/large, F2 small/large.
fn build_lot() -> anyhow::Result<ParkingLot> {
    let lot = ParkingLot::new()
        .with_floor(
            Floor::new("F1")
                .with_spot(Spot::new("F1-S1", SpotType::Small))
                .with_spot(Spot::new("F1-S2", SpotType::Medium))
                .with_spot(Spot::new("F1-S3", SpotType::Large)),
        )?
        .with_floor(
            Floor::new("F2")
                .with_spot(Spot::new("F2-S1", SpotType::Small))
                .with_spot(Spot::new("F2-S2", SpotType::Large)),
        )?;
    Ok(lot)
}

fn build_service(config: &SimConfig) -> anyhow::Result<LotService> {
    Ok(LotService::new(build_lot()?)
        .with_strategy(config.strategy.build())
        .with_billing(Arc::new(CardPaymentProcessor::new()), config.pricing.build()))
}

async fn release_all(service: &LotService, tickets: &[Ticket]) {
    for ticket in tickets {
        match service.unpark(&ticket.id.to_string()).await {
            Ok(receipt) => info!(
                plate = %receipt.ticket.vehicle.license_plate(),
                amount = %receipt.amount,
                "Released"
            ),
            Err(e) => warn!(ticket = %ticket.id, error = %e, "Release failed"),
        }
    }
}

async fn run_sequential(config: &SimConfig) -> anyhow::Result<()> {
    info!("Sequential parking");
    let service = build_service(config)?;
    service.show_status();

    let vehicles = [
        Vehicle::car("KA-01-1234"),
        Vehicle::new("KA-99-8888", VehicleType::Truck),
        Vehicle::car("KA-05-5678"),
        Vehicle::new("KA-09-0001", VehicleType::Bus),
    ];

    let mut tickets = Vec::new();
    for vehicle in &vehicles {
        match service.park(vehicle).await {
            Ok(ticket) => tickets.push(ticket),
            Err(e) => warn!(plate = %vehicle.license_plate(), error = %e, "Parking failed"),
        }
    }

    tokio::time::sleep(config.hold).await;
    release_all(&service, &tickets).await;
    Ok(())
}

/// Failed admissions by cause.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    no_space: usize,
    lost_races: usize,
    rejected: usize,
}

impl Tally {
    fn record(&mut self, error: &AdmissionError) {
        match error {
            AdmissionError::NoCandidate => self.no_space += 1,
            AdmissionError::RetriesExhausted { .. } => self.lost_races += 1,
            AdmissionError::UnknownSpot(_) | AdmissionError::DuplicateTicket(_) => {
                error!(error = %error, "Admission rejected by lot integrity check");
                self.rejected += 1;
            }
        }
    }
}

async fn run_concurrent(config: &SimConfig) -> anyhow::Result<()> {
    let service = Arc::new(build_service(config)?);
    info!(
        vehicles = config.vehicles,
        spots = service.lot().capacity(),
        strategy = %config.strategy,
        "Concurrent parking"
    );

    let tasks = (0..config.vehicles).map(|i| {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            let vehicle_type = if i % 3 == 0 {
                VehicleType::Truck
            } else {
                VehicleType::Car
            };
            let vehicle = Vehicle::new(format!("KA-{:02}-{:04}", i / 2, i * 100), vehicle_type);
            let outcome = service.park(&vehicle).await;
            if let Err(ref e) = outcome {
                warn!(plate = %vehicle.license_plate(), error = %e, "Parking failed");
            }
            outcome
        })
    });

    let mut tickets = Vec::new();
    let mut tally = Tally::default();
    for joined in join_all(tasks).await {
        match joined? {
            Ok(ticket) => tickets.push(ticket),
            Err(e) => tally.record(&e),
        }
    }

    info!(
        parked = tickets.len(),
        no_space = tally.no_space,
        lost_races = tally.lost_races,
        rejected = tally.rejected,
        total = config.vehicles,
        "Concurrent run finished"
    );

    let status = service.show_status();
    println!("{}", serde_json::to_string_pretty(&status)?);

    tokio::time::sleep(config.hold).await;
    release_all(&service, &tickets).await;
    Ok(())
}

async fn run(config: SimConfig) -> anyhow::Result<()> {
    run_sequential(&config).await?;
    run_concurrent(&config).await?;
    info!("Simulation complete");
    Ok(())
}
