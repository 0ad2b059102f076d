//! Particle input reader
//!
//! Line-oriented ASCII, one `x y z` triple per line. Blank and malformed
//! lines are skipped rather than failing the whole file.
//!
//! Author: Moroya Sakamoto

use super::IoError;
use glam::DVec3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read particle centers from a file
pub fn load_particles(path: impl AsRef<Path>) -> Result<Vec<DVec3>, IoError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut centers = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace().map(str::parse::<f64>);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z))) => centers.push(DVec3::new(x, y, z)),
            _ => continue,
        }
    }
    Ok(centers)
}
