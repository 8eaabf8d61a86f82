//! Dictionary training loop
//!
//! One iteration:
//!
//! 1. sample a batch of patches from one random image,
//! 2. infer sparse codes for the batch with ISTA against the current dictionary,
//! 3. compute the reconstruction error `patches - D · codes`,
//! 4. average the outer products `error_j · code_jᵀ` over the batch,
//! 5. step the dictionary along that average and renormalize its columns.
//!
//! Iterations run strictly in sequence; the dictionary is only read while codes
//! are inferred and only written during the update.

use crate::config::{Hyperparameters, TrainingConfig};
use crate::data::ImageCollection;
use crate::dictionary::Dictionary;
use crate::error::{Result, SparseCodingError};
use crate::sampler::PatchSampler;
use crate::solver::{Ista, SparseSolver};
use crate::utils::SimpleRng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Display delay handed to observers after every iteration but the last.
pub const DISPLAY_DELAY: Duration = Duration::from_millis(100);

/// Diagnostics of one training iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    /// Zero-based iteration index since the trainer was created.
    pub iteration: usize,
    /// Image the batch was drawn from.
    pub image_index: usize,
    /// Mean squared reconstruction error of the batch before the update.
    pub reconstruction_error: f64,
    /// Fraction of sparse coefficients that are exactly zero.
    pub sparsity: f64,
    /// ISTA rounds summed over the batch.
    pub ista_iterations: usize,
    /// Columns whose ISTA loop hit the iteration cap.
    pub capped_columns: usize,
}

/// Read-only view of the trainer handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct IterationSnapshot<'a> {
    pub dictionary: &'a Dictionary,
    pub stats: IterationStats,
    /// How long an interactive display may wait; zero on the final iteration.
    pub display_delay: Duration,
    /// True for the last iteration of the current `train` call.
    pub is_final: bool,
}

/// Receives a snapshot after every training iteration.
///
/// Observers cannot influence training.
pub trait TrainingObserver {
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>);
}

/// Observer that ignores every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TrainingObserver for NoopObserver {
    fn on_iteration(&mut self, _snapshot: &IterationSnapshot<'_>) {}
}

impl<F> TrainingObserver for F
where
    F: FnMut(&IterationSnapshot<'_>),
{
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>) {
        self(snapshot)
    }
}

/// Learns a dictionary from a fixed image collection.
///
/// # Example
///
/// ```
/// use ndarray::Array2;
/// use sparse_coding::config::TrainingConfig;
/// use sparse_coding::data::ImageCollection;
/// use sparse_coding::trainer::{DictionaryTrainer, NoopObserver};
/// use sparse_coding::utils::SimpleRng;
///
/// let images = ImageCollection::new(vec![Array2::from_elem((16, 16), 0.5)]).unwrap();
/// let config = TrainingConfig {
///     basis_function_count: 4,
///     patch_size: 4,
///     sample_count: 8,
///     ..TrainingConfig::default()
/// };
///
/// let mut trainer = DictionaryTrainer::new(images, &config, SimpleRng::new(7)).unwrap();
/// let dictionary = trainer.train(3, &mut NoopObserver).unwrap();
/// assert_eq!(dictionary.matrix().dim(), (16, 4));
/// ```
#[derive(Debug, Clone)]
pub struct DictionaryTrainer {
    images: ImageCollection,
    dictionary: Dictionary,
    sampler: PatchSampler,
    hyperparameters: Hyperparameters,
    rng: SimpleRng,
    iterations_done: usize,
}

impl DictionaryTrainer {
    /// Validate the configuration and initialize a random dictionary from `rng`.
    pub fn new(
        images: ImageCollection,
        config: &TrainingConfig,
        mut rng: SimpleRng,
    ) -> Result<Self> {
        config.validate()?;

        let (rows, cols) = images.image_dim();
        if config.patch_size > rows || config.patch_size > cols {
            return Err(SparseCodingError::PatchTooLarge {
                patch_size: config.patch_size,
                rows,
                cols,
            });
        }

        let dictionary =
            Dictionary::random(config.patch_size, config.basis_function_count, &mut rng)?;

        Ok(Self {
            images,
            dictionary,
            sampler: PatchSampler::new(config.patch_size, config.sample_count),
            hyperparameters: config.hyperparameters.clone(),
            rng,
            iterations_done: 0,
        })
    }

    /// Replace the step sizes and noise variance for subsequent iterations.
    pub fn set_parameters(
        &mut self,
        step: f64,
        ista_step: f64,
        noise_variance: f64,
    ) -> Result<()> {
        let updated = Hyperparameters {
            step,
            ista_step,
            noise_variance,
            ..self.hyperparameters.clone()
        };
        updated.validate()?;
        self.hyperparameters = updated;
        Ok(())
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn sampler(&self) -> &PatchSampler {
        &self.sampler
    }

    /// Iterations completed so far.
    pub fn iterations_done(&self) -> usize {
        self.iterations_done
    }

    fn solver(&self) -> Ista {
        let h = &self.hyperparameters;
        Ista::new(h.ista_step, h.noise_variance, h.tolerance, h.max_ista_iterations)
    }

    /// Run a single training iteration.
    pub fn step_once(&mut self) -> Result<IterationStats> {
        let batch = self.sampler.sample(&self.images, &mut self.rng)?;
        let codes = self.solver().solve(batch.patches.view(), self.dictionary.view())?;

        let error = &batch.patches - &self.dictionary.reconstruct(codes.codes());
        let reconstruction_error =
            error.iter().map(|e| e * e).sum::<f64>() / error.len() as f64;

        // Σ_j error_j · code_jᵀ, written as one matrix product.
        let gradient = error.dot(&codes.codes().t()) / batch.len() as f64;
        self.dictionary.apply_gradient(self.hyperparameters.step, &gradient)?;

        let stats = IterationStats {
            iteration: self.iterations_done,
            image_index: batch.image_index,
            reconstruction_error,
            sparsity: codes.sparsity(),
            ista_iterations: codes.total_iterations(),
            capped_columns: codes.capped_count(),
        };
        self.iterations_done += 1;

        if stats.capped_columns > 0 {
            warn!(
                iteration = stats.iteration,
                capped = stats.capped_columns,
                max = self.hyperparameters.max_ista_iterations,
                "ISTA hit its iteration cap"
            );
        }
        debug!(
            iteration = stats.iteration,
            image = stats.image_index,
            error = stats.reconstruction_error,
            sparsity = stats.sparsity,
            ista_iterations = stats.ista_iterations,
            "iteration done"
        );

        Ok(stats)
    }

    /// Run `iteration_count` iterations, reporting each to `observer`, and
    /// return the final dictionary.
    pub fn train(
        &mut self,
        iteration_count: usize,
        observer: &mut dyn TrainingObserver,
    ) -> Result<Dictionary> {
        info!(
            iterations = iteration_count,
            basis_functions = self.dictionary.basis_function_count(),
            patch_size = self.sampler.patch_size(),
            samples = self.sampler.sample_count(),
            images = self.images.len(),
            "training dictionary"
        );

        for i in 0..iteration_count {
            let stats = self.step_once()?;
            let is_final = i + 1 == iteration_count;

            observer.on_iteration(&IterationSnapshot {
                dictionary: &self.dictionary,
                stats,
                display_delay: if is_final { Duration::ZERO } else { DISPLAY_DELAY },
                is_final,
            });
        }

        info!(iterations = self.iterations_done, "training finished");
        Ok(self.dictionary.clone())
    }
}
