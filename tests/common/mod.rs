//! Common test helpers for blobtree integration tests
//!
//! Author: Moroya Sakamoto

use blobtree::prelude::*;

/// Single unit-energy blob at the origin with support radius 2
pub fn single_blob() -> BlobTree {
    BlobTree::from_points(&[DVec3::ZERO], 2.0).unwrap()
}

/// Two overlapping blobs on the x axis, the scenario with a known midpoint
/// intensity of 0.34375 above the iso-level
pub fn twin_blobs() -> BlobTree {
    let centers = [DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)];
    BlobTree::from_points(&centers, 2.0).unwrap()
}

/// Uniform grid of `nx * ny * nz` centers with the given spacing
pub fn grid_centers(nx: usize, ny: usize, nz: usize, spacing: f64) -> Vec<DVec3> {
    let mut centers = Vec::with_capacity(nx * ny * nz);
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                centers.push(DVec3::new(
                    x as f64 * spacing,
                    y as f64 * spacing,
                    z as f64 * spacing,
                ));
            }
        }
    }
    centers
}

/// Sample points spread across and outside a blob's support
pub fn probe_points() -> Vec<DVec3> {
    vec![
        DVec3::ZERO,
        DVec3::new(0.5, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.5),
        DVec3::new(1.5, -0.5, 0.3),
        DVec3::new(-1.9, 0.1, 0.0),
        DVec3::new(3.0, 3.0, 3.0),
        DVec3::new(-10.0, 0.0, 0.0),
    ]
}
