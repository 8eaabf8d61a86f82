//! Shared utilities
//!
//! Random number generation and small vector helpers used across the
//! dictionary, solver and trainer.

pub mod linalg;
pub mod rng;

pub use linalg::{all_finite, l2_norm};
pub use rng::SimpleRng;
