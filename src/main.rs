//! Command-line front end for the ZX81 cassette player.
//!
//! Renders `.P` programs to WAV files (optionally paced in real time), checks and
//! inspects images, and produces calibration tones.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zxk7::pulse::{Pacer, PulseEngine, RealtimePacer, Unpaced, WavOutputLine};
use zxk7::sender::TapeSender;
use zxk7::status::{LogDisplay, NoIndicator};
use zxk7::storage::{find_program_files, load_program, FsStorage};
use zxk7::tape_image::{export, list_program};
use zxk7::{PlayerConfig, ProgramName, TapeImage};

#[derive(Parser)]
#[command(name = "zxk7")]
#[command(about = "Play ZX81 .P programs as cassette audio", version)]
struct Args {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a program to a WAV file
    Send {
        /// Program image (.P)
        file: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        wav: PathBuf,

        /// Program name sent ahead of the image (overrides the configuration)
        #[arg(short, long)]
        name: Option<String>,

        /// Pace output at the real tape rate instead of rendering at full speed
        #[arg(long)]
        realtime: bool,
    },

    /// Validate program images
    Check {
        /// Program images (.P)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the program files in a directory
    List {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Print the BASIC listing of a program
    Inspect {
        /// Program image (.P)
        file: PathBuf,
    },

    /// Print a program as a C byte array
    Export {
        /// Program image (.P)
        file: PathBuf,
    },

    /// Render a steady run of 0 or 1 bits for timing checks
    Calibrate {
        /// Bit value to repeat (0 or 1)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=1))]
        bit: u8,

        /// Number of bytes to send
        #[arg(long, default_value_t = 256)]
        count: usize,

        /// Output WAV file
        #[arg(short, long)]
        wav: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => PlayerConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PlayerConfig::default(),
    };

    match args.command {
        Command::Send {
            file,
            wav,
            name,
            realtime,
        } => send(&config, &file, &wav, name.as_deref(), realtime),
        Command::Check { files } => check(&files),
        Command::List { dir } => list(&dir),
        Command::Inspect { file } => inspect(&file),
        Command::Export { file } => {
            let image = read_image(&file)?;
            print!("{}", export::c_array(&image));
            Ok(())
        }
        Command::Calibrate { bit, count, wav } => calibrate(&config, bit == 1, count, &wav),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "zxk7=debug" } else { "zxk7=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}

fn read_image(path: &Path) -> Result<TapeImage> {
    let raw = load_program(&mut FsStorage, path_str(path)?)?;
    TapeImage::from_vec(raw).with_context(|| format!("{} is not a valid .P image", path.display()))
}

fn start_engine(config: &PlayerConfig, wav: &Path, realtime: bool) -> Result<PulseEngine> {
    let line = WavOutputLine::create(wav, config)
        .with_context(|| format!("creating {}", wav.display()))?;
    let pacer: Box<dyn Pacer> = if realtime {
        let divider = zxk7::pulse::ClockDivider::new(config.system_clock_hz, config.tick_hz)?;
        Box::new(RealtimePacer::new(&divider))
    } else {
        Box::new(Unpaced)
    };
    Ok(PulseEngine::start(config, Box::new(line), pacer)?)
}

fn send(
    config: &PlayerConfig,
    file: &Path,
    wav: &Path,
    name: Option<&str>,
    realtime: bool,
) -> Result<()> {
    let name = ProgramName::from_ascii(name.unwrap_or(&config.program_name))?;
    // a rejected image must not leave a WAV file behind
    let image = read_image(file)?;
    let engine = start_engine(config, wav, realtime)?;

    info!(bytes = image.effective_length(), "sending {}", file.display());
    TapeSender::new(&engine, config).send(&name, &image, &mut LogDisplay, &mut NoIndicator);
    let stats = engine.stats();
    engine.shutdown()?;

    info!(
        bytes = stats.bytes_shifted,
        ticks = stats.ticks_emitted,
        "wrote {}",
        wav.display()
    );
    Ok(())
}

fn check(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for file in files {
        match read_image(file) {
            Ok(image) => println!("{}: ok, {} bytes", file.display(), image.effective_length()),
            Err(e) => {
                println!("{}: {:#}", file.display(), e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} images invalid", files.len());
    }
    Ok(())
}

fn list(dir: &Path) -> Result<()> {
    let files = find_program_files(dir)?;
    for (i, file) in files.iter().enumerate() {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{:>2}  {}", i + 1, name);
    }
    Ok(())
}

fn inspect(file: &Path) -> Result<()> {
    let image = read_image(file)?;
    for line in list_program(&image)? {
        println!("{line}");
    }
    Ok(())
}

fn calibrate(config: &PlayerConfig, bit: bool, count: usize, wav: &Path) -> Result<()> {
    let engine = start_engine(config, wav, false)?;
    TapeSender::new(&engine, config).calibrate(bit, count);
    engine.shutdown()?;
    info!(bit = bit as u8, count, "wrote {}", wav.display());
    Ok(())
}
