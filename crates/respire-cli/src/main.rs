use anyhow::Context as _;
use clap::{Parser, Subcommand};
use respire_core::{
    read_records, write_records, BodySource, BreathDetector, DetectorConfig, ReplaySource,
    SampleRecord, Session, SyntheticSource,
};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "respire", about = "Breath detection from recorded or synthetic chest-height samples")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON-lines sample log through the detector
    Replay {
        log: PathBuf,
        /// Detector config TOML; defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the detector against a synthetic breather
    Simulate {
        /// Breathing rate of the synthetic body
        #[arg(long, default_value_t = 6.0)]
        bpm: f32,
        #[arg(long, default_value_t = 60.0)]
        secs: f32,
        #[arg(long, default_value_t = 30.0)]
        tick_hz: f32,
        /// Per-tick probability of losing tracking
        #[arg(long, default_value_t = 0.0)]
        dropout: f32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a synthetic sample log for later replay
    Record {
        #[arg(long, default_value_t = 6.0)]
        bpm: f32,
        #[arg(long, default_value_t = 60.0)]
        secs: f32,
        #[arg(long, default_value_t = 30.0)]
        tick_hz: f32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the default detector configuration as TOML
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Replay { log, config } => replay(&log, config.as_deref()),
        Command::Simulate {
            bpm,
            secs,
            tick_hz,
            dropout,
            seed,
            config,
        } => simulate(bpm, secs, tick_hz, dropout, seed, config.as_deref()),
        Command::Record {
            bpm,
            secs,
            tick_hz,
            seed,
            out,
        } => record(bpm, secs, tick_hz, seed, &out),
        Command::InitConfig => {
            print!("{}", DetectorConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<DetectorConfig> {
    match path {
        Some(p) => DetectorConfig::from_path(p)
            .with_context(|| format!("loading config from {}", p.display())),
        None => Ok(DetectorConfig::default()),
    }
}

fn synthetic(bpm: f32, tick_hz: f32, seed: Option<u64>) -> SyntheticSource {
    match seed {
        Some(s) => SyntheticSource::seeded(bpm, tick_hz, s),
        None => SyntheticSource::new(bpm, tick_hz),
    }
}

fn report_cycles(detector: &BreathDetector, last_reported: &mut f32) {
    let cycle = detector.last_cycle_secs();
    if cycle != *last_reported {
        *last_reported = cycle;
        println!(
            "cycle {}: {:.2}s (avg {:.2}s)",
            detector.total_cycles(),
            cycle,
            detector.avg_cycle_secs()
        );
    }
}

fn replay(log: &std::path::Path, config: Option<&std::path::Path>) -> anyhow::Result<()> {
    let cfg = load_config(config)?;
    let file = File::open(log).with_context(|| format!("opening {}", log.display()))?;
    let records = read_records(file)?;
    log::info!("replaying {} records from {}", records.len(), log.display());

    let mut session = Session::with_config(cfg, ReplaySource::new(records))?;
    let mut last_reported = 0.0f32;
    while let Some(dt) = session.source_mut().peek_dt() {
        session.tick(dt);
        report_cycles(session.detector(), &mut last_reported);
    }

    println!("{}", serde_json::to_string_pretty(&session.summary())?);
    Ok(())
}

fn simulate(
    bpm: f32,
    secs: f32,
    tick_hz: f32,
    dropout: f32,
    seed: Option<u64>,
    config: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let cfg = load_config(config)?;
    let source = synthetic(bpm, tick_hz, seed).with_dropout(dropout);
    let dt = source.tick_dt();
    let ticks = (secs * tick_hz) as u64;

    let mut session = Session::with_config(cfg, source)?;
    let mut last_reported = 0.0f32;
    for _ in 0..ticks {
        session.tick(dt);
        report_cycles(session.detector(), &mut last_reported);
    }

    println!("{}", serde_json::to_string_pretty(&session.summary())?);
    Ok(())
}

fn record(
    bpm: f32,
    secs: f32,
    tick_hz: f32,
    seed: Option<u64>,
    out: &std::path::Path,
) -> anyhow::Result<()> {
    let mut source = synthetic(bpm, tick_hz, seed);
    let dt = source.tick_dt();
    let ticks = (secs * tick_hz) as u64;

    let records: Vec<SampleRecord> = (0..ticks)
        .map(|seq| SampleRecord {
            seq,
            dt,
            value: source.try_sample(),
            lean: None,
        })
        .collect();

    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    write_records(&mut file, &records)?;
    log::info!("wrote {} records to {}", records.len(), out.display());
    Ok(())
}
