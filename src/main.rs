use anyhow::{Context, Result};
use clap::Parser;
use crema_rs::controller::ScaleController;
use crema_rs::system::SessionConfig;
use log::{info, warn};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

/// Replay captured scale notifications and print the live reading as JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Session config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Capture file with `<device name>,<hex payload>` lines, or `-` for stdin
    input: String,
}

impl Args {
    fn session_config(&self) -> Result<SessionConfig> {
        match &self.config {
            Some(path) => SessionConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display())),
            None => Ok(SessionConfig::default()),
        }
    }
}

/// One captured notification: `<device name>,<hex payload>`.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (name, payload) = line.rsplit_once(',')?;
    Some((name.trim(), payload.trim()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.session_config()?;
    let input = args.input;
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = std::fs::File::open(&input).with_context(|| format!("opening {input}"))?;
        Box::new(BufReader::new(file))
    };

    let controller = ScaleController::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut frames = 0usize;
    let mut applied = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", index + 1))?;
        let Some((device, payload)) = parse_line(&line) else {
            continue;
        };

        let connected = controller.connected_device().map(|profile| profile.name);
        if connected != Some(device) {
            if let Err(e) = controller.connect(device) {
                warn!("line {}: {}", index + 1, e);
                continue;
            }
        }

        frames += 1;
        if controller.on_notification(device, payload) {
            applied += 1;
            serde_json::to_writer(&mut out, &controller.current_reading())?;
            writeln!(out)?;
        }
    }

    controller.disconnect();
    info!("Replayed {} frames, {} updated the reading", frames, applied);
    for event in controller.recent_events() {
        info!("event: {:?}", event);
    }
    Ok(())
}
