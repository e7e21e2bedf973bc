use clap::Parser;
use std::io::{self, Write};

use voltgrab::{
    acquire, available_devices, drain, AcquireConfig, FlushConfig, RecordStream, SampleChannel,
    DEFAULT_BAUD_RATE,
};

#[derive(Parser)]
#[command(name = "voltgrab")]
#[command(version)]
#[command(about = "Grab timestamped samples from a serial measurement device")]
#[command(
    long_about = "Reads line-delimited samples from a serial measurement device, drains any \
stale backlog, skips a warm-up window and writes each remaining sample to stdout prefixed \
with a wall-clock timestamp."
)]
struct Args {
    /// Serial device to read from
    #[arg(short = 'i', long, default_value = "/dev/cu.wchusbserial1410")]
    device: String,

    /// Number of leading samples to skip (warm-up window)
    #[arg(short, long, default_value_t = 500)]
    skip: u64,

    /// Total number of samples to acquire, warm-up included
    #[arg(short = 'n', long, default_value_t = 30_000)]
    samples: u64,

    /// List available serial devices and exit
    #[arg(short, long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if args.list {
        match available_devices() {
            Ok(devices) => {
                for device in devices {
                    println!("{device}");
                }
            }
            Err(e) => {
                log::error!("Cannot list serial devices: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = grab(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn grab(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("voltgrab data grabber");

    let mut channel = SampleChannel::open(&args.device, DEFAULT_BAUD_RATE)?;
    log::info!("Connected to {}", args.device);

    // The device may have been streaming since power-on; find the live edge
    // before counting samples.
    let discarded = drain(&mut channel, &FlushConfig::default())?;
    log::info!("Drained {discarded} stale bytes");

    let mut stream = RecordStream::new(channel);
    let config = AcquireConfig {
        skip: args.skip,
        total: args.samples,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = acquire(&mut stream, &config, &mut out)?;
    out.flush()?;

    // Best effort: a read failure mid-acquisition does not invalidate the
    // samples already written.
    if let Some(e) = stream.take_error() {
        log::warn!("Error reading data: {e}");
    }
    log::info!(
        "Acquired {} samples ({} skipped as warm-up)",
        summary.emitted,
        summary.seen.saturating_sub(summary.emitted)
    );

    Ok(())
}
