//! JSON save/load for blob trees
//!
//! Human-readable serialization of a built tree, cached boxes and bounds
//! included, so a loaded tree is query-ready without a rebuild.
//!
//! Author: Moroya Sakamoto

use super::IoError;
use crate::types::BlobTree;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Save a tree as pretty-printed JSON
pub fn save_json(tree: &BlobTree, path: impl AsRef<Path>) -> Result<(), IoError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, tree)?;
    Ok(())
}

/// Load a tree from JSON
pub fn load_json(path: impl AsRef<Path>) -> Result<BlobTree, IoError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
