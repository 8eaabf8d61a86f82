//! Random patch sampling
//!
//! Each call picks one image uniformly at random and cuts `sample_count` square
//! windows out of it at uniformly random offsets. Offsets range over every
//! position where the window fits, both borders included, and may repeat.

use crate::data::{Image, ImageCollection};
use crate::error::{Result, SparseCodingError};
use crate::utils::SimpleRng;
use ndarray::{s, Array1, Array2};

/// One iteration's worth of flattened patches.
///
/// `patches` is `patch_size² × sample_count`; column `j` was cut at
/// `offsets[j]` (top-left `(row, col)`) of image `image_index`.
#[derive(Debug, Clone)]
pub struct PatchBatch {
    pub patches: Array2<f64>,
    pub image_index: usize,
    pub offsets: Vec<(usize, usize)>,
}

impl PatchBatch {
    /// Number of patches (columns).
    pub fn len(&self) -> usize {
        self.patches.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.ncols() == 0
    }
}

/// Draws batches of square patches from an image collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSampler {
    patch_size: usize,
    sample_count: usize,
}

impl PatchSampler {
    pub fn new(patch_size: usize, sample_count: usize) -> Self {
        Self {
            patch_size,
            sample_count,
        }
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Length of one flattened patch.
    pub fn patch_dim(&self) -> usize {
        self.patch_size * self.patch_size
    }

    /// Draw a batch from one randomly chosen image.
    pub fn sample(&self, images: &ImageCollection, rng: &mut SimpleRng) -> Result<PatchBatch> {
        let image_index = rng.gen_usize(images.len());
        let image = images
            .get(image_index)
            .ok_or(SparseCodingError::EmptyCollection)?;

        let (rows, cols) = image.dim();
        let p = self.patch_size;
        if p == 0 {
            return Err(SparseCodingError::invalid_config(
                "patch_size must be at least 1",
            ));
        }
        if p > rows || p > cols {
            return Err(SparseCodingError::PatchTooLarge {
                patch_size: p,
                rows,
                cols,
            });
        }

        let last_row = rows - p;
        let last_col = cols - p;

        let mut patches = Array2::<f64>::zeros((self.patch_dim(), self.sample_count));
        let mut offsets = Vec::with_capacity(self.sample_count);

        for mut column in patches.columns_mut() {
            let row = rng.gen_usize_inclusive(last_row);
            let col = rng.gen_usize_inclusive(last_col);

            column.assign(&extract_patch(image, row, col, p));
            offsets.push((row, col));
        }

        Ok(PatchBatch {
            patches,
            image_index,
            offsets,
        })
    }
}

/// Cut the `patch_size × patch_size` window at `(row, col)` and flatten it
/// column-major: entry `c * patch_size + r` is pixel `(row + r, col + c)`.
///
/// # Panics
///
/// Panics if the window extends past the image.
pub fn extract_patch(image: &Image, row: usize, col: usize, patch_size: usize) -> Array1<f64> {
    let window = image.slice(s![row..row + patch_size, col..col + patch_size]);
    window.t().iter().copied().collect()
}
