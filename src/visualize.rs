//! Rendering basis functions as an image
//!
//! Each basis function is reshaped to a `patch_size × patch_size` tile, min-max
//! normalized to [0, 1] and placed in a square grid separated by a fixed border.
//! The mosaic is converted to 8 bits (× 255), resized with nearest-neighbour
//! sampling and written as PNG.
//!
//! The observers here stand in for an interactive window: `SnapshotWriter`
//! persists the mosaic periodically and `ProgressLogger` reports statistics.

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::trainer::{IterationSnapshot, TrainingObserver};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use ndarray::{s, Array2};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Pixels between neighbouring tiles.
pub const BORDER: usize = 1;
/// Side length of the resized mosaic.
pub const DISPLAY_SIZE: u32 = 350;

/// Number of tiles per grid side for `count` basis functions.
pub fn tiles_per_side(count: usize) -> usize {
    let mut n = (count as f64).sqrt() as usize;
    while n * n < count {
        n += 1;
    }
    n.max(1)
}

/// Reshape one basis function into a tile in image orientation: tile pixel
/// `(r, c)` is entry `c * patch_size + r`.
pub fn basis_tile(dictionary: &Dictionary, index: usize) -> Array2<f64> {
    let p = dictionary.patch_size();
    let column = dictionary.basis_function(index);
    Array2::from_shape_fn((p, p), |(r, c)| column[c * p + r])
}

/// Rescale a tile to [0, 1]; constant tiles become all zeros.
pub fn normalize_tile(tile: &mut Array2<f64>) {
    let min = tile.iter().copied().fold(f64::INFINITY, f64::min);
    let max = tile.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range > 0.0 && range.is_finite() {
        tile.mapv_inplace(|v| (v - min) / range);
    } else {
        tile.fill(0.0);
    }
}

/// Tile every basis function into a square mosaic with values in [0, 1].
///
/// Basis function `j` goes to grid row `j / n`, grid column `j % n`, where
/// `n = tiles_per_side(count)`. The mosaic side is `border + n * (patch_size + border)`.
pub fn render_mosaic(dictionary: &Dictionary, border: usize) -> Array2<f64> {
    let p = dictionary.patch_size();
    let count = dictionary.basis_function_count();
    let n = tiles_per_side(count);
    let side = border + n * (p + border);

    let mut mosaic = Array2::<f64>::zeros((side, side));
    for j in 0..count {
        let mut tile = basis_tile(dictionary, j);
        normalize_tile(&mut tile);

        let top = border + (j / n) * (p + border);
        let left = border + (j % n) * (p + border);
        mosaic
            .slice_mut(s![top..top + p, left..left + p])
            .assign(&tile);
    }

    mosaic
}

/// Convert [0, 1] intensities to 8-bit grayscale (× 255, clamped).
pub fn to_gray8(values: &Array2<f64>) -> GrayImage {
    let (rows, cols) = values.dim();
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = values[[y as usize, x as usize]] * 255.0;
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Nearest-neighbour resize to `size × size`.
pub fn resize_nearest(image: &GrayImage, size: u32) -> GrayImage {
    imageops::resize(image, size, size, FilterType::Nearest)
}

/// Render, convert, resize and write the dictionary as a PNG.
pub fn save_dictionary_png(
    dictionary: &Dictionary,
    path: impl AsRef<Path>,
    border: usize,
    size: u32,
) -> Result<()> {
    let mosaic = render_mosaic(dictionary, border);
    let image = resize_nearest(&to_gray8(&mosaic), size);
    image.save(path.as_ref())?;
    Ok(())
}

/// Writes a mosaic PNG every `every` iterations and after the final one.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    every: usize,
    border: usize,
    size: u32,
    written: Vec<PathBuf>,
}

impl SnapshotWriter {
    /// Create the output directory and the writer.
    pub fn new(dir: impl Into<PathBuf>, every: usize, border: usize, size: u32) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            every: every.max(1),
            border,
            size,
            written: Vec::new(),
        })
    }

    /// Files written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("snapshot_{:05}.png", iteration))
    }
}

impl TrainingObserver for SnapshotWriter {
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>) {
        let done = snapshot.stats.iteration + 1;
        if done % self.every != 0 && !snapshot.is_final {
            return;
        }

        let path = self.path_for(done);
        match save_dictionary_png(snapshot.dictionary, &path, self.border, self.size) {
            Ok(()) => self.written.push(path),
            Err(e) => warn!(path = %path.display(), error = %e, "could not write snapshot"),
        }
    }
}

/// Logs iteration statistics every `every` iterations and on the final one.
#[derive(Debug, Clone, Copy)]
pub struct ProgressLogger {
    every: usize,
}

impl ProgressLogger {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl TrainingObserver for ProgressLogger {
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>) {
        let stats = &snapshot.stats;
        if (stats.iteration + 1) % self.every == 0 || snapshot.is_final {
            info!(
                iteration = stats.iteration + 1,
                error = stats.reconstruction_error,
                sparsity = stats.sparsity,
                ista_iterations = stats.ista_iterations,
                "training progress"
            );
        }
    }
}

/// Fans one snapshot out to several observers.
pub struct Observers<'a>(pub Vec<&'a mut dyn TrainingObserver>);

impl TrainingObserver for Observers<'_> {
    fn on_iteration(&mut self, snapshot: &IterationSnapshot<'_>) {
        for observer in self.0.iter_mut() {
            observer.on_iteration(snapshot);
        }
    }
}
