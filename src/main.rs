//! Waveformdata - generate binary waveform data from raw audio
//!
//! Entry point for the command line tool. Reads headerless interleaved f32le
//! audio (for example `ffmpeg -i song.mp3 -f f32le -`) and writes a
//! peaks.js compatible `.dat` file.

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use tracing::info;
use waveformdata::inspect::inspect;
use waveformdata::raw_input::FrameReader;
use waveformdata::{BitDepth, Pipeline, ResetPolicy, StreamLayout, WaveformConfig};

#[derive(Parser, Debug)]
#[command(name = "waveformdata", about, disable_version_flag = true)]
struct Cli {
    /// Show version and build date
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a waveform data file from raw f32le audio
    Generate(GenerateArgs),
    /// Print the header of a waveform data file
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Raw interleaved f32le input, or '-' for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Input sample rate in Hz
    #[arg(short = 'r', long)]
    rate: u32,

    /// Input channel count
    #[arg(short = 'c', long)]
    channels: usize,

    /// Window length in seconds (0.01 to 100)
    #[arg(short = 'l', long)]
    length: Option<f64>,

    /// Store one point per channel instead of the channel average
    #[arg(long)]
    split_channels: bool,

    /// Bits per stored value (8 or 16)
    #[arg(short = 'b', long)]
    bits: Option<u8>,

    /// Start each window at zero instead of tracking true extrema
    #[arg(long)]
    zero_anchored: bool,

    /// JSON config file; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file (omit to only compute and report windows)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Frames read per block
    #[arg(long, default_value_t = 4096)]
    block_frames: usize,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Waveform data file
    file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays usable for reports
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waveformdata=info".parse()?)
                .add_directive("waveformdata_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!(
            "waveformdata {} (built {})",
            waveformdata::VERSION,
            waveformdata::BUILD_DATE
        );
        return Ok(());
    }

    match cli.command {
        Some(Command::Generate(args)) => generate(args),
        Some(Command::Inspect(args)) => inspect_file(args),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Merge config file values with command line overrides
fn build_config(args: &GenerateArgs) -> Result<WaveformConfig> {
    let mut config = match &args.config {
        Some(path) => WaveformConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => WaveformConfig::default(),
    };

    if let Some(length) = args.length {
        config.window_secs = length;
    }
    if args.split_channels {
        config.split_channels = true;
    }
    if let Some(bits) = args.bits {
        config.bits = BitDepth::try_from(bits)?;
    }
    if args.zero_anchored {
        config.reset_policy = ResetPolicy::ZeroAnchored;
    }
    if args.output.is_some() {
        config.output = args.output.clone();
    }

    config.validate()?;
    Ok(config)
}

fn generate(args: GenerateArgs) -> Result<()> {
    let config = build_config(&args)?;
    let layout = StreamLayout::new(args.channels, args.rate);

    let input: Box<dyn Read> = if args.input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open input {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    let output = config.output.clone();
    let mut pipeline = Pipeline::new(config);
    pipeline
        .configure(layout)
        .context("Failed to set up waveform output")?;

    let mut reader = FrameReader::new(input, args.channels, args.block_frames)?;
    while let Some(block) = reader.next_block()? {
        pipeline.push_interleaved(block)?;
    }

    let summary = pipeline.finalize()?;
    info!(
        windows = summary.windows,
        frames = summary.frames,
        bytes = summary.bytes_written,
        "Generation complete"
    );

    let duration = summary.frames as f64 / args.rate as f64;
    match output {
        Some(path) => println!(
            "Wrote {} data points ({:.2}s of audio) to {}",
            summary.windows,
            duration,
            path.display()
        ),
        None => println!(
            "Computed {} data points ({:.2}s of audio), no output file",
            summary.windows, duration
        ),
    }
    Ok(())
}

fn inspect_file(args: InspectArgs) -> Result<()> {
    let report = inspect(&args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File:              {}", args.file.display());
    println!("Version:           {}", report.version);
    println!("Bits:              {}", report.bits);
    println!("Sample rate:       {} Hz", report.sample_rate);
    println!("Samples per pixel: {}", report.samples_per_pixel);
    println!("Data points:       {}", report.data_points);
    println!("Channels:          {}", report.channels);
    println!("Duration:          {:.2}s", report.duration_secs);
    println!(
        "Payload:           {} / {} bytes{}",
        report.data_bytes,
        report.expected_data_bytes,
        if report.complete { "" } else { " (INCOMPLETE)" }
    );
    Ok(())
}
