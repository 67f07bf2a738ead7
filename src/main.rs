use clap::{Parser, Subcommand};
use radio_tuner::band::FrequencyBand;
use radio_tuner::channel::PlaybackChannel;
use radio_tuner::config::RadioConfig;
use radio_tuner::headless::{CommandLog, MemoryChannel};
use radio_tuner::player::AudioOutput;
use radio_tuner::status::StatusSnapshot;
use radio_tuner::{Tuner, TunerError};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "radio_tuner", about = "Analog radio tuner simulator", version)]
struct Cli {
    /// Station config file (default: <config dir>/radio_tuner/stations.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Run without an audio device; channel commands are only logged
    #[arg(long, global = true)]
    headless: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered stations
    Stations,
    /// Tune to one or more frequencies in turn
    Tune {
        /// Frequencies in MHz
        #[arg(required = true)]
        frequencies: Vec<String>,
        /// Seconds to keep playing after the last tune
        #[arg(long, default_value = "0")]
        hold: f64,
    },
    /// Read one frequency per line from stdin
    Listen,
    /// Scrub the dial between two frequencies
    Sweep {
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        /// Dial step in MHz
        #[arg(long, default_value = "0.025")]
        step: f64,
        /// Pause between steps in milliseconds
        #[arg(long, default_value = "100")]
        interval_ms: u64,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radio_tuner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config.or_else(RadioConfig::default_path) {
        Some(p) => p,
        None => fail("no config file given and no default config directory"),
    };
    let config = RadioConfig::load(&config_path).unwrap_or_else(|e| fail(e));
    let catalog = config.build_catalog().unwrap_or_else(|e| fail(e));
    if catalog.is_empty() {
        fail(TunerError::EmptyCatalog);
    }
    for w in catalog.spacing_warnings(&config.tuning.curve) {
        warn!(
            "Station distance too low between {} and {}: {:.2} MHz (want at least {:.2})",
            w.lower, w.upper, w.distance, w.minimum
        );
    }

    if let Commands::Stations = cli.command {
        for s in catalog.stations() {
            println!(
                "{:>6.1} MHz  {:<28} [{}] on air at {:.1}s",
                s.frequency(),
                s.name(),
                s.length_display(),
                s.broadcast_offset_ms() / 1000.0
            );
        }
        return;
    }

    let noise = config.noise_path();
    if cli.headless {
        let log = CommandLog::new();
        let tuner = Tuner::new(
            catalog,
            config.tuning,
            &noise,
            MemoryChannel::new("noise", log.clone()),
            MemoryChannel::new("station", log.clone()),
        )
        .unwrap_or_else(|e| fail(e));
        run(&tuner, config.band, cli.command);
        info!(commands = log.len(), "headless session finished");
    } else {
        let output = AudioOutput::open().unwrap_or_else(|e| fail(e));
        let noise_channel = output.channel("noise").unwrap_or_else(|e| fail(e));
        let station_channel = output.channel("station").unwrap_or_else(|e| fail(e));
        let tuner = Tuner::new(catalog, config.tuning, &noise, noise_channel, station_channel)
            .unwrap_or_else(|e| fail(e));
        run(&tuner, config.band, cli.command);
    }
}

fn run<C: PlaybackChannel>(tuner: &Tuner<C>, band: FrequencyBand, command: Commands) {
    info!(
        "On air since {}",
        tuner.clock().started_at().format("%Y-%m-%d %H:%M:%S")
    );

    match command {
        Commands::Stations => {}
        Commands::Tune { frequencies, hold } => {
            let hold = hold_duration(hold).unwrap_or_else(|e| fail(e));
            for input in &frequencies {
                request(tuner, &band, input);
            }
            if !hold.is_zero() {
                std::thread::sleep(hold);
            }
        }
        Commands::Listen => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => request(tuner, &band, &line),
                    Err(e) => {
                        warn!("Stopped reading input: {}", e);
                        break;
                    }
                }
            }
        }
        Commands::Sweep {
            from,
            to,
            step,
            interval_ms,
        } => {
            let from = band.validate(from).unwrap_or_else(|e| fail(e));
            let to = band.validate(to).unwrap_or_else(|e| fail(e));
            if !(step.is_finite() && step > 0.0) {
                fail("sweep step must be a positive number");
            }
            let steps = ((to - from).abs() / step).floor() as usize;
            let direction = if to >= from { 1.0 } else { -1.0 };
            for i in 0..=steps {
                let frequency = from + direction * step * i as f64;
                match tuner.set_frequency(frequency) {
                    Ok(status) => print_status(&status),
                    Err(e) => warn!("Tune to {:.3} failed: {}", frequency, e),
                }
                std::thread::sleep(Duration::from_millis(interval_ms));
            }
        }
    }
}

/// Handle one dial request. Bad input is logged and ignored; the current
/// status is printed either way.
fn request<C: PlaybackChannel>(tuner: &Tuner<C>, band: &FrequencyBand, input: &str) {
    let status = match band.parse(input) {
        Ok(frequency) => tuner.set_frequency(frequency).unwrap_or_else(|e| {
            warn!("Tune to {} failed: {}", frequency, e);
            tuner.status()
        }),
        Err(e) => {
            warn!("Bad frequency: {}", e);
            tuner.status()
        }
    };
    print_status(&status);
}

fn hold_duration(seconds: f64) -> Result<Duration, &'static str> {
    if !(seconds.is_finite() && seconds >= 0.0) {
        return Err("hold must be a non-negative number of seconds");
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| "hold is too long")
}

fn print_status(status: &StatusSnapshot) {
    match serde_json::to_string(status) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}
