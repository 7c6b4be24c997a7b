use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::model::window::generate_window;
use crate::model::{ModelParams, WindowType};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "config.toml";

/// Configuration shared by the CLI and library callers
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Common configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    /// Directory where resynthesized files are written
    pub output_dir: String,
}

/// Harmonic model settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub window: WindowType,
    /// Analysis window length (odd)
    pub window_size: usize,
    pub fft_size: usize,
    /// Peak detection threshold in dB
    pub threshold_db: f64,
    pub max_harmonics: usize,
    pub min_f0: f64,
    pub max_f0: f64,
    pub f0_error_threshold: f64,
    /// Relative deviation allowed when binding harmonics
    pub max_harmonic_deviation: f64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        CommonConfig {
            output_dir: "output".to_string(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            window: WindowType::Hamming,
            window_size: 1025,
            fft_size: 2048,
            threshold_db: -90.0,
            max_harmonics: 30,
            min_f0: 100.0,
            max_f0: 500.0,
            f0_error_threshold: 5.0,
            max_harmonic_deviation: 0.2,
        }
    }
}

impl AnalysisSettings {
    /// Builds model parameters for a signal sampled at `sample_rate`.
    ///
    /// The parameters are not validated here; the model validates them
    /// before processing.
    pub fn to_params(&self, sample_rate: u32) -> ModelParams {
        ModelParams {
            sample_rate,
            window: generate_window(self.window, self.window_size),
            fft_size: self.fft_size,
            threshold_db: self.threshold_db,
            max_harmonics: self.max_harmonics,
            min_f0: self.min_f0,
            max_f0: self.max_f0,
            f0_error_threshold: self.f0_error_threshold,
            max_harmonic_deviation: self.max_harmonic_deviation,
        }
    }
}

/// Load configuration from config.toml
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    load_config_from(Path::new(CONFIG_FILE))
}

/// Load configuration from a specific file, falling back to defaults when it
/// doesn't exist
pub fn load_config_from(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    match File::open(path) {
        Ok(mut file) => {
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            let config = toml::from_str(&contents)?;
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        Err(_) => {
            // If file doesn't exist, return default config
            Ok(Config::default())
        }
    }
}

/// Ensure the output directory exists
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf, std::io::Error> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}
