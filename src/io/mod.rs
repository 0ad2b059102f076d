//! File I/O: particle lists in, PPM images and JSON trees out
//!
//! Author: Moroya Sakamoto

mod json;
mod particles;
mod ppm;

pub use json::{load_json, save_json};
pub use particles::load_particles;
pub use ppm::{write_ppm, Image};

use crate::types::TreeError;
use thiserror::Error;

/// File I/O errors
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Building the tree from the parsed input failed
    #[error("tree build failed: {0}")]
    Build(#[from] TreeError),
}
