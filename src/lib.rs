//! Sparse Coding Library
//!
//! Learns a dictionary of image-patch basis functions by alternating sparse code
//! inference (ISTA) with a gradient step on the dictionary.
//!
//! # Modules
//!
//! - `dictionary`: Unit-norm basis function matrix (init, normalization, update)
//! - `sampler`: Random patch extraction from an image collection
//! - `solver`: SparseSolver trait and the ISTA implementation
//! - `trainer`: The outer training loop and its observer interface
//! - `data`: CSV image loading and the image collection
//! - `visualize`: Mosaic rendering and PNG export
//! - `config`: Training and run configuration
//! - `error`: Crate error type
//! - `utils`: Shared utilities (RNG, vector helpers)

pub mod config;
pub mod data;
pub mod dictionary;
pub mod error;
pub mod sampler;
pub mod solver;
pub mod trainer;
pub mod utils;
pub mod visualize;

pub use error::{Result, SparseCodingError};
