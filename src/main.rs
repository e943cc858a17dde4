//! gestural: play material classifications as sound.
//!
//! Reads classifier output (JSON lines or a seeded simulator), turns it into
//! gesture control, and drives the first working backend: a MIDI output
//! port, else the built-in synthesizer.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gestural::audio::{AudioEngine, AudioHost};
use gestural::backend::{BackendPreference, BackendSelector};
use gestural::classify::{Classifier, JsonLinesClassifier, SimulatedClassifier};
use gestural::config::InstrumentConfig;
use gestural::gesture::GestureControlState;
use gestural::midi::{MidiTransport, MidirTransport};
use gestural::pipeline::{ClassificationLoop, InstrumentContext};
use gestural::Result;

#[derive(Parser, Debug)]
#[command(author, version, about = "Material-classification-driven instrument", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.gestural/config.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "gestural=trace". RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Which output backends to try.
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendPreference>,

    /// Preferred MIDI output port (substring match).
    #[arg(long, global = true)]
    midi_device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play classifications read as JSON lines.
    Run {
        /// Input file, or "-" for stdin.
        #[arg(short, long, default_value = "-")]
        input: String,
    },
    /// Play classifications from the seeded simulator.
    Simulate {
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many classifications (runs until Ctrl-C otherwise).
        #[arg(long)]
        cycles: Option<usize>,
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// List MIDI output ports.
    Ports,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref());
    let file_level = loaded.as_ref().ok().map(|c| c.log_level.clone());
    init_tracing(cli.log_level.as_deref().or(file_level.as_deref()));

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("could not read config: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if cli.midi_device.is_some() {
        config.midi_device = cli.midi_device.clone();
    }

    let outcome = match cli.command {
        Commands::Ports => {
            list_ports();
            Ok(())
        }
        Commands::Run { input } => open_input(&input).and_then(|reader| {
            play(&config, JsonLinesClassifier::new(reader))
        }),
        Commands::Simulate {
            seed,
            cycles,
            interval_ms,
        } => {
            if let Some(seed) = seed {
                config.simulator.seed = seed;
            }
            if let Some(interval_ms) = interval_ms {
                config.simulator.interval_ms = interval_ms;
            }
            play(&config, SimulatedClassifier::new(&config.simulator, cycles))
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// An explicit path must load; the default path is optional.
fn load_config(path: Option<&Path>) -> Result<InstrumentConfig> {
    match path {
        Some(path) => InstrumentConfig::load_from(path),
        None => Ok(InstrumentConfig::load().unwrap_or_default()),
    }
}

fn open_input(input: &str) -> Result<Box<dyn BufRead + Send>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input)?;
    Ok(Box::new(BufReader::new(file)))
}

fn list_ports() {
    let ports = MidirTransport::list_ports();
    if ports.is_empty() {
        println!("no MIDI output ports");
        return;
    }
    for (i, name) in ports.iter().enumerate() {
        println!("{i}: {name}");
    }
}

fn play<C>(config: &InstrumentConfig, classifier: C) -> Result<()>
where
    C: Classifier + 'static,
{
    let mut selector = BackendSelector::new();
    let preferred = config.midi_device.as_deref();
    let volume = config.volume;
    let backend = selector.select(
        config.backend,
        || -> Result<Box<dyn MidiTransport>> { Ok(Box::new(MidirTransport::connect(preferred)?)) },
        || -> Result<Box<dyn AudioHost>> {
            let mut engine = AudioEngine::new()?;
            engine.set_volume(volume)?;
            Ok(Box::new(engine))
        },
    )?;

    let state = GestureControlState::new(config.material_change_threshold);
    let mut ctx = InstrumentContext::new(state, backend, selector.state().clone());
    ctx.resume();

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
            warn!("could not install Ctrl-C handler: {e}");
        }
    }

    info!(backend = ctx.backend_state().status_label(), "listening for classifications");
    let mut classification = ClassificationLoop::spawn(classifier)?;
    let summary = classification.run(&mut ctx, &stop);
    ctx.shutdown();
    info!(cycles = summary.cycles, end = ?summary.end, "done");
    Ok(())
}
