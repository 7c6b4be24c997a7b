use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harmonic_model::audio::{self, AudioError};
use harmonic_model::config::{self, AnalysisSettings};
use harmonic_model::model::{self, ModelError, WindowType};

/// Harmonic analysis and resynthesis of monophonic audio
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config.toml in the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resynthesize the harmonic component of a WAV file
    Synth(SynthArgs),

    /// Print the per-frame f0 and harmonic track of a WAV file as JSON
    Analyze(AnalyzeArgs),
}

/// Resynthesize the harmonic component of a WAV file
#[derive(Parser)]
struct SynthArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: String,

    /// Output WAV file (defaults to <output_dir>/<name>_harmonic.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    overrides: ModelOverrides,
}

/// Print the per-frame f0 and harmonic track of a WAV file as JSON
#[derive(Parser)]
struct AnalyzeArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: String,

    /// Write the JSON to a file instead of the console
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    overrides: ModelOverrides,
}

/// Command line overrides for the [analysis] section of the configuration
#[derive(Args)]
struct ModelOverrides {
    /// Analysis window (rectangular, hann, hamming, blackman, blackmanharris)
    #[arg(long)]
    window: Option<WindowType>,

    /// Analysis window size in samples (odd)
    #[arg(long)]
    window_size: Option<usize>,

    /// FFT size (at least 512)
    #[arg(long)]
    fft_size: Option<usize>,

    /// Peak detection threshold (dB)
    #[arg(long, allow_hyphen_values = true)]
    threshold: Option<f64>,

    /// Maximum number of harmonics
    #[arg(long)]
    harmonics: Option<usize>,

    /// Minimum f0 (Hz)
    #[arg(long)]
    min_f0: Option<f64>,

    /// Maximum f0 (Hz)
    #[arg(long)]
    max_f0: Option<f64>,

    /// Maximum two-way mismatch error accepted for an f0
    #[arg(long)]
    f0_error: Option<f64>,

    /// Maximum relative deviation of a harmonic
    #[arg(long)]
    max_deviation: Option<f64>,
}

impl ModelOverrides {
    fn apply(&self, settings: &mut AnalysisSettings) {
        if let Some(window) = self.window {
            settings.window = window;
        }
        if let Some(size) = self.window_size {
            settings.window_size = size;
        }
        if let Some(size) = self.fft_size {
            settings.fft_size = size;
        }
        if let Some(threshold) = self.threshold {
            settings.threshold_db = threshold;
        }
        if let Some(harmonics) = self.harmonics {
            settings.max_harmonics = harmonics;
        }
        if let Some(f0) = self.min_f0 {
            settings.min_f0 = f0;
        }
        if let Some(f0) = self.max_f0 {
            settings.max_f0 = f0;
        }
        if let Some(error) = self.f0_error {
            settings.f0_error_threshold = error;
        }
        if let Some(deviation) = self.max_deviation {
            settings.max_harmonic_deviation = deviation;
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harmonic_model=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Reads a WAV file and downmixes it, with a clear error for missing files
fn load_mono(wav_file: &str) -> Result<(Vec<f32>, u32), AudioError> {
    let wav_path = Path::new(wav_file);
    if !wav_path.exists() {
        return Err(AudioError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("WAV file not found: {}", wav_file),
        )));
    }

    let wav_data = audio::read_wav_file(wav_path)?;
    if wav_data.channels > 1 {
        tracing::info!(
            channels = wav_data.channels,
            "downmixing multi-channel input to mono"
        );
    }
    Ok((wav_data.to_mono()?, wav_data.sample_rate))
}

/// Default output path: <output_dir>/<stem>_harmonic.wav
fn default_output_path(output_dir: &Path, wav_file: &str) -> PathBuf {
    let stem = Path::new(wav_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}_harmonic.wav", stem))
}

fn run_synth_command(
    args: &SynthArgs,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (samples, sample_rate) = load_mono(&args.wav_file)?;

    let mut settings = config.analysis.clone();
    args.overrides.apply(&mut settings);
    let params = settings.to_params(sample_rate);

    let output = model::resynthesize(&samples, &params)?;

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => {
            let dir = config::ensure_output_dir(Path::new(&config.common.output_dir))?;
            default_output_path(&dir, &args.wav_file)
        }
    };
    audio::write_wav_file(&output_path, &output, sample_rate)?;

    println!("Wrote harmonic component to {}", output_path.display());
    Ok(())
}

fn run_analyze_command(
    args: &AnalyzeArgs,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (samples, sample_rate) = load_mono(&args.wav_file)?;

    let mut settings = config.analysis.clone();
    args.overrides.apply(&mut settings);
    let params = settings.to_params(sample_rate);

    let frames = model::analyze(&samples, &params)?;
    let json = serde_json::to_string_pretty(&frames)?;

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json.as_bytes())?;
            println!("Wrote {} frames to {}", frames.len(), path.display());
        }
        None => {
            // Output directly to console, just the JSON
            io::stdout().write_all(json.as_bytes())?;
        }
    }

    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };

    match &cli.command {
        Commands::Synth(args) => run_synth_command(args, &config)?,
        Commands::Analyze(args) => run_analyze_command(args, &config)?,
    }

    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(err) => {
            eprintln!("\nERROR: {}\n", err);
            match err.downcast_ref::<AudioError>() {
                Some(AudioError::Io(ref io_err)) if io_err.kind() == io::ErrorKind::NotFound => {
                    eprintln!("Please check that:");
                    eprintln!("1. The file path is correct");
                    eprintln!("2. The file exists");
                    eprintln!("3. You have permission to read the file");
                }
                Some(AudioError::WavParse(_)) => {
                    eprintln!("Supported WAV formats: {}.", audio::SUPPORTED_FORMATS);
                }
                _ => {}
            }
            if let Some(ModelError::InvalidParameter(_)) = err.downcast_ref::<ModelError>() {
                eprintln!("Check the [analysis] section of config.toml or the command line overrides.");
            }
            process::exit(1);
        }
    }
}
