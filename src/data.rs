//! Image data: loading grayscale images from CSV and holding them for training
//!
//! Each CSV file holds one image, one pixel row per line and comma-separated
//! intensities. Files are parsed completely and checked against the declared
//! shape before anything reaches the trainer.

use crate::error::{Result, SparseCodingError};
use ndarray::Array2;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A grayscale image (`rows × cols` intensities).
pub type Image = Array2<f64>;

/// Non-empty, immutable set of equally sized images.
#[derive(Debug, Clone)]
pub struct ImageCollection {
    images: Vec<Image>,
}

impl ImageCollection {
    /// Build a collection, checking that it is non-empty and that every image
    /// has the dimensions of the first one.
    pub fn new(images: Vec<Image>) -> Result<Self> {
        let first = images.first().ok_or(SparseCodingError::EmptyCollection)?;
        let dim = first.dim();

        for (index, image) in images.iter().enumerate().skip(1) {
            if image.dim() != dim {
                return Err(SparseCodingError::dimension_mismatch(
                    format!("image {}", index),
                    format!("{}x{}", dim.0, dim.1),
                    format!("{}x{}", image.nrows(), image.ncols()),
                ));
            }
        }

        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Shared `(rows, cols)` of the images.
    pub fn image_dim(&self) -> (usize, usize) {
        self.images[0].dim()
    }

    pub fn get(&self, index: usize) -> Option<&Image> {
        self.images.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Image> {
        self.images.iter()
    }
}

/// Parse a `rows × cols` matrix from comma-separated text.
///
/// Blank lines are skipped. Whitespace around fields is ignored.
pub fn parse_csv_matrix(text: &str, rows: usize, cols: usize) -> Result<Array2<f64>> {
    let mut values = Vec::with_capacity(rows * cols);
    let mut row_count = 0usize;

    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        row_count += 1;
        if row_count > rows {
            return Err(SparseCodingError::dimension_mismatch(
                "csv rows",
                rows,
                format!("more than {}", rows),
            ));
        }

        let mut field_count = 0usize;
        for (col_idx, field) in line.split(',').enumerate() {
            let field = field.trim();
            let value: f64 = field.parse().map_err(|_| SparseCodingError::Parse {
                line: line_idx + 1,
                column: col_idx + 1,
                value: field.to_string(),
            })?;
            values.push(value);
            field_count += 1;
        }

        if field_count != cols {
            return Err(SparseCodingError::dimension_mismatch(
                format!("csv line {}", line_idx + 1),
                format!("{} fields", cols),
                format!("{} fields", field_count),
            ));
        }
    }

    if row_count != rows {
        return Err(SparseCodingError::dimension_mismatch(
            "csv rows",
            rows,
            row_count,
        ));
    }

    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| SparseCodingError::dimension_mismatch("csv matrix", rows * cols, e))
}

/// Read and parse a CSV matrix file.
pub fn load_csv_matrix(path: impl AsRef<Path>, rows: usize, cols: usize) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let matrix = parse_csv_matrix(&contents, rows, cols)?;
    debug!(path = %path.display(), rows, cols, "loaded image");
    Ok(matrix)
}

/// Path of image `index`: `{folder}/{prefix}{index}.csv`.
pub fn image_path(folder: &Path, prefix: &str, index: usize) -> PathBuf {
    folder.join(format!("{}{}.csv", prefix, index))
}

/// Load `count` images named `{prefix}0.csv` … from `folder`.
pub fn load_image_collection(
    folder: impl AsRef<Path>,
    prefix: &str,
    count: usize,
    rows: usize,
    cols: usize,
) -> Result<ImageCollection> {
    let folder = folder.as_ref();
    let images = (0..count)
        .map(|i| load_csv_matrix(image_path(folder, prefix, i), rows, cols))
        .collect::<Result<Vec<_>>>()?;
    ImageCollection::new(images)
}
