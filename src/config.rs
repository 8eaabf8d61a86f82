//! Configuration structures for dictionary learning
//!
//! Hyperparameters, problem sizes and the driver's data/output settings are read
//! from a single JSON file. Every field is optional; missing fields take the
//! reference defaults (64 basis functions of 8×8 pixels learned from ten
//! 512×512 images over 2000 iterations).
//!
//! # Example
//!
//! ```json
//! {
//!   "data": { "folder": "images", "image_count": 10 },
//!   "training": {
//!     "basis_function_count": 64,
//!     "patch_size": 8,
//!     "sample_count": 100,
//!     "iteration_count": 2000,
//!     "seed": 42,
//!     "hyperparameters": { "step": 1.0, "ista_step": 0.1 }
//!   },
//!   "output": { "image_path": "basisfunctions.png" }
//! }
//! ```

use crate::error::{Result, SparseCodingError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_STEP: f64 = 1.0;
pub const DEFAULT_ISTA_STEP: f64 = 0.1;
pub const DEFAULT_NOISE_VARIANCE: f64 = 0.1;
pub const DEFAULT_TOLERANCE: f64 = 0.1;
pub const DEFAULT_MAX_ISTA_ITERATIONS: usize = 500;

/// Step sizes and thresholds of the training loop.
///
/// * `step` - Dictionary learning rate
/// * `ista_step` - Gradient step of the inner ISTA loop
/// * `noise_variance` - Shrinkage strength and clamp-to-zero threshold
/// * `tolerance` - Inner loop convergence threshold on the code norm change
/// * `max_ista_iterations` - Hard cap on inner rounds per sample column
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub step: f64,
    pub ista_step: f64,
    pub noise_variance: f64,
    pub tolerance: f64,
    pub max_ista_iterations: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            ista_step: DEFAULT_ISTA_STEP,
            noise_variance: DEFAULT_NOISE_VARIANCE,
            tolerance: DEFAULT_TOLERANCE,
            max_ista_iterations: DEFAULT_MAX_ISTA_ITERATIONS,
        }
    }
}

impl Hyperparameters {
    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() {
            return Err(SparseCodingError::invalid_config("step must be finite"));
        }

        if !(self.ista_step.is_finite() && self.ista_step > 0.0) {
            return Err(SparseCodingError::invalid_config(
                "ista_step must be positive and finite",
            ));
        }

        if !(self.noise_variance.is_finite() && self.noise_variance >= 0.0) {
            return Err(SparseCodingError::invalid_config(
                "noise_variance must be non-negative and finite",
            ));
        }

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SparseCodingError::invalid_config(
                "tolerance must be positive and finite",
            ));
        }

        if self.max_ista_iterations == 0 {
            return Err(SparseCodingError::invalid_config(
                "max_ista_iterations must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Problem sizes and hyperparameters for one training run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of dictionary columns.
    pub basis_function_count: usize,
    /// Side length of the square patches.
    pub patch_size: usize,
    /// Patches drawn per iteration.
    pub sample_count: usize,
    /// Outer iterations.
    pub iteration_count: usize,
    /// Fixed seed; `None` seeds from the clock.
    pub seed: Option<u64>,
    pub hyperparameters: Hyperparameters,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            basis_function_count: 64,
            patch_size: 8,
            sample_count: 100,
            iteration_count: 2000,
            seed: None,
            hyperparameters: Hyperparameters::default(),
        }
    }
}

impl TrainingConfig {
    /// Dimension of a flattened patch (`patch_size²`).
    pub fn patch_dim(&self) -> usize {
        self.patch_size * self.patch_size
    }

    pub fn validate(&self) -> Result<()> {
        if self.basis_function_count == 0 {
            return Err(SparseCodingError::invalid_config(
                "basis_function_count must be at least 1",
            ));
        }

        if self.patch_size == 0 {
            return Err(SparseCodingError::invalid_config(
                "patch_size must be at least 1",
            ));
        }

        if self.sample_count == 0 {
            return Err(SparseCodingError::invalid_config(
                "sample_count must be at least 1",
            ));
        }

        self.hyperparameters.validate()
    }
}

/// Where the driver finds its CSV images.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub folder: PathBuf,
    pub image_prefix: String,
    pub image_count: usize,
    pub image_rows: usize,
    pub image_cols: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("images"),
            image_prefix: "image".to_string(),
            image_count: 10,
            image_rows: 512,
            image_cols: 512,
        }
    }
}

/// Where and how the driver writes the learned basis functions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub image_path: PathBuf,
    /// Side length of the resized mosaic in pixels.
    pub display_size: u32,
    /// Pixels between tiles.
    pub border: usize,
    /// Write a snapshot mosaic every N iterations (disabled when absent).
    pub snapshot_every: Option<usize>,
    pub snapshot_dir: PathBuf,
    /// Log progress every N iterations.
    pub log_every: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("basisfunctions.png"),
            display_size: 350,
            border: 1,
            snapshot_every: None,
            snapshot_dir: PathBuf::from("snapshots"),
            log_every: 100,
        }
    }
}

/// Complete configuration of the `sparse_coding` binary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub output: OutputConfig,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;

        if self.data.image_count == 0 {
            return Err(SparseCodingError::invalid_config(
                "image_count must be at least 1",
            ));
        }

        let patch = self.training.patch_size;
        if patch > self.data.image_rows || patch > self.data.image_cols {
            return Err(SparseCodingError::PatchTooLarge {
                patch_size: patch,
                rows: self.data.image_rows,
                cols: self.data.image_cols,
            });
        }

        if self.output.display_size == 0 {
            return Err(SparseCodingError::invalid_config(
                "display_size must be at least 1",
            ));
        }

        if self.output.snapshot_every == Some(0) {
            return Err(SparseCodingError::invalid_config(
                "snapshot_every must be at least 1",
            ));
        }

        if self.output.log_every == 0 {
            return Err(SparseCodingError::invalid_config(
                "log_every must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Loads a run configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into a `RunConfig` and validates it.
///
/// # Examples
///
/// ```no_run
/// use sparse_coding::config::load_config;
///
/// let cfg = load_config("config/sparse_coding.json").unwrap();
/// assert_eq!(cfg.training.patch_size, 8);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RunConfig> {
    let contents = fs::read_to_string(path)?;
    let config: RunConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
