//! Sitstand Sensor Agent CLI
//!
//! Tracks sitting vs. standing from a motion-sample stream.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sitstand_sensor_agent::{
    collector::{replay::read_samples, sensors_available, Pace, ReplayCollector, StdinCollector},
    config::Config,
    core::{format_mm_ss, Posture, Session, SessionError},
    export::FileExporter,
    history::ActivityHistory,
    VERSION,
};

#[derive(Parser)]
#[command(name = "sitstand-sensor")]
#[command(version = VERSION)]
#[command(about = "Posture tracking from handheld motion sensors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track posture live from line-delimited JSON samples on stdin
    Track {
        /// Record the stream for export under this activity label
        #[arg(long)]
        record: Option<String>,
    },

    /// Run the engine over a recorded sample file
    Replay {
        /// Recording to replay (bare sample array or export document)
        file: PathBuf,

        /// Re-export the replayed stream under this activity label
        #[arg(long)]
        record: Option<String>,

        /// Sleep between samples according to their recorded timestamps
        #[arg(long)]
        recorded_pace: bool,
    },

    /// Print statistics about a recorded sample file
    Analyze {
        /// Recording to analyze
        file: PathBuf,
    },

    /// Show configuration and today's activity totals
    Status,

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Track { record } => cmd_track(record),
        Commands::Replay {
            file,
            record,
            recorded_pace,
        } => cmd_replay(&file, record, recorded_pace),
        Commands::Analyze { file } => cmd_analyze(&file),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    }
}

fn cmd_track(record: Option<String>) {
    println!("Sitstand Sensor Agent v{VERSION}");
    println!();

    if !sensors_available() {
        eprintln!("Error: No sample source available.");
        std::process::exit(1);
    }

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let mut session = Session::new(config.session.clone());
    println!("Starting measurement...");
    println!("  Window size: {} samples", config.session.window_size);
    println!(
        "  Thresholds: motion {}, vertical {}, secondary {:?} {}",
        config.session.classifier.motion_threshold,
        config.session.classifier.vertical_threshold,
        config.session.classifier.secondary_axis,
        config.session.classifier.secondary_threshold,
    );
    println!("  Location: {}", config.session.location);
    println!("  Session ID: {}", session.id());

    if let Err(e) = session.start_measuring(Utc::now().timestamp_millis() as u64) {
        eprintln!("Error starting measurement: {e}");
        std::process::exit(1);
    }

    if let Some(label) = record {
        println!("  Recording under label: {label}");
        session.start_recording(Some(label));
    }

    println!();
    println!("Reading samples from stdin. Press Ctrl+C to stop.");
    println!();

    let mut collector = StdinCollector::new();
    let receiver = collector.receiver().clone();
    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {e}");
        std::process::exit(1);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    let mut last_display = std::time::Instant::now();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(sample) => match session.ingest(sample) {
                Ok(_) => {}
                Err(e @ SessionError::MalformedSample { .. }) => {
                    eprintln!("Warning: {e}");
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                }
            },
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                println!("Sample stream ended.");
                break;
            }
        }

        // Read-only display refresh: formats committed values only.
        if last_display.elapsed() >= Duration::from_secs(1) {
            println!(
                "[{}] {} | Sitzend {} | Stehend {}",
                session.elapsed_time(),
                session.current_posture(),
                session.sitting_time(),
                session.standing_time(),
            );
            last_display = std::time::Instant::now();
        }
    }

    collector.stop();
    finish_session(&mut session, &config);
}

fn cmd_replay(file: &PathBuf, record: Option<String>, recorded_pace: bool) {
    let config = Config::load().unwrap_or_default();

    let pace = if recorded_pace { Pace::Recorded } else { Pace::Full };
    let mut collector = match ReplayCollector::from_file(file, pace) {
        Ok(collector) => collector,
        Err(e) => {
            eprintln!("Error reading {file:?}: {e}");
            std::process::exit(1);
        }
    };

    println!("Replaying {} samples from {:?}", collector.remaining(), file);
    println!();

    let mut session = Session::new(config.session.clone());

    let receiver = collector.receiver().clone();
    if let Err(e) = collector.start() {
        eprintln!("Error starting replay: {e}");
        std::process::exit(1);
    }

    let mut started = false;
    let mut last_label: Option<&'static str> = None;

    for sample in receiver.iter() {
        if !started {
            // Anchor the clock to the recording's own timeline.
            if let Err(e) = session.start_measuring(sample.timestamp) {
                eprintln!("Error starting measurement: {e}");
                std::process::exit(1);
            }
            if let Some(label) = record.clone() {
                session.start_recording(Some(label));
            }
            started = true;
        }

        match session.ingest(sample) {
            Ok(_) => {
                let label = session.current_posture();
                if last_label != Some(label) {
                    println!("[{}] {}", session.elapsed_time(), label);
                    last_label = Some(label);
                }
            }
            Err(e @ SessionError::MalformedSample { .. }) => {
                eprintln!("Warning: {e}");
            }
            Err(e) => {
                eprintln!("Error: {e}");
            }
        }
    }

    if !started {
        println!("Recording contains no samples.");
        return;
    }

    finish_session(&mut session, &config);
}

/// Stop recording and measuring, persist history, print the summary.
fn finish_session(session: &mut Session, config: &Config) {
    println!();
    println!("Stopping measurement...");

    if session.is_recording() {
        let mut exporter = FileExporter::new(config.export_path.clone());
        match session.stop_recording(&mut exporter) {
            Ok(Some(path)) => println!("Exported recording to {path:?}"),
            Ok(None) => println!("Recording buffer was empty, nothing exported."),
            Err(e) => eprintln!("Warning: {e} (recorded samples kept in memory)"),
        }
    }

    if let Err(e) = session.stop_measuring() {
        eprintln!("Warning: {e}");
    }

    match ActivityHistory::load(config.history_path()) {
        Ok(mut history) => {
            history.record_today(session.sitting_seconds(), session.standing_seconds());
            if let Err(e) = history.save() {
                eprintln!("Warning: Could not save activity history: {e}");
            }
        }
        Err(e) => eprintln!("Warning: Could not load activity history: {e}"),
    }

    println!();
    println!("{}", session.summary());
}

fn cmd_analyze(file: &PathBuf) {
    let config = Config::load().unwrap_or_default();

    let samples = match read_samples(file) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("Error reading {file:?}: {e}");
            std::process::exit(1);
        }
    };

    if samples.is_empty() {
        println!("Recording contains no samples.");
        return;
    }

    let first_ts = samples[0].timestamp;
    let last_ts = samples.last().map(|s| s.timestamp).unwrap_or(first_ts);
    let duration_secs = last_ts.saturating_sub(first_ts) as f64 / 1000.0;

    let mut abs_sums = (0.0, 0.0, 0.0);
    let mut gravity_count = 0usize;
    for sample in &samples {
        if let Some(g) = sample.gravity {
            abs_sums.0 += g.x.abs();
            abs_sums.1 += g.y.abs();
            abs_sums.2 += g.z.abs();
            gravity_count += 1;
        }
    }

    // Run the recording through the engine to get posture/motion ratios.
    let mut session = Session::new(config.session.clone());
    if let Err(e) = session.start_measuring(first_ts) {
        eprintln!("Error starting measurement: {e}");
        std::process::exit(1);
    }

    let mut standing = 0usize;
    let mut moving = 0usize;
    let mut classified = 0usize;
    for sample in &samples {
        if let Ok(result) = session.ingest(sample.clone()) {
            classified += 1;
            if result.posture == Posture::Standing {
                standing += 1;
            }
            if result.moving {
                moving += 1;
            }
        }
    }

    println!("Analysis of {file:?}");
    println!("-----------------------------------");
    println!("Samples: {}", samples.len());
    println!(
        "Malformed (no gravity): {}",
        samples.len() - gravity_count
    );
    println!("Duration: {duration_secs:.1} s");
    if gravity_count > 0 {
        println!(
            "Mean |gravity|: x {:.2}  y {:.2}  z {:.2} m/s²",
            abs_sums.0 / gravity_count as f64,
            abs_sums.1 / gravity_count as f64,
            abs_sums.2 / gravity_count as f64,
        );
    }
    if classified > 0 {
        println!(
            "Standing: {:.1}%  Moving: {:.1}%",
            100.0 * standing as f64 / classified as f64,
            100.0 * moving as f64 / classified as f64,
        );
    }
    println!(
        "Time split: Sitzend {} | Stehend {}",
        session.sitting_time(),
        session.standing_time()
    );
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Sitstand Sensor Agent Status");
    println!("============================");
    println!();
    println!(
        "Sample source available: {}",
        if sensors_available() { "yes" } else { "no" }
    );
    println!();
    println!("Configuration:");
    println!("  Window size: {} samples", config.session.window_size);
    println!(
        "  Export buffer capacity: {} samples",
        config.session.export_capacity
    );
    println!(
        "  Thresholds: motion {}, vertical {}, secondary {:?} {}",
        config.session.classifier.motion_threshold,
        config.session.classifier.vertical_threshold,
        config.session.classifier.secondary_axis,
        config.session.classifier.secondary_threshold,
    );
    println!("  Export path: {:?}", config.export_path);
    println!();

    match ActivityHistory::load(config.history_path()) {
        Ok(history) => {
            let today = history.today();
            println!("Today's activity:");
            println!("  Sitzend: {}", format_mm_ss(today.sitting_secs));
            println!("  Stehend: {}", format_mm_ss(today.standing_secs));
            println!("  Days on record: {}", history.len());
        }
        Err(e) => println!("No activity history available: {e}"),
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
