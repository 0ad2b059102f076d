//! # blobtree
//!
//! Blob tree renderer with segment tracing.
//!
//! Renders implicit surfaces defined by a hierarchy of compactly supported
//! point primitives combined by sum blending. Three ray marchers share the
//! same field interface:
//!
//! - classic sphere tracing with the global Lipschitz bound,
//! - enhanced sphere tracing with overstep and backtrack,
//! - segment tracing, which derives a local Lipschitz bound over exactly
//!   the segment about to be stepped and takes far fewer field evaluations.
//!
//! ## Example
//!
//! ```rust
//! use blobtree::prelude::*;
//!
//! let centers = vec![DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)];
//! let tree = BlobTree::from_points(&centers, 2.0).unwrap();
//!
//! let ray = Ray::new(DVec3::new(0.0, -10.0, 0.0), DVec3::new(0.0, 1.0, 0.0));
//! let result = segment_trace(&tree, &ray);
//! assert!(result.hit);
//! ```
//!
//! Author: Moroya Sakamoto

#![warn(missing_docs)]

pub mod bvh;
pub mod eval;
pub mod io;
pub mod march;
pub mod primitives;
pub mod render;
pub mod types;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::bvh::build_hierarchy;
    pub use crate::eval::{gradient, intensity, segment_lipschitz};
    pub use crate::io::{load_json, load_particles, save_json, write_ppm, Image, IoError};
    pub use crate::march::{
        enhanced_sphere_trace, segment_trace, sphere_trace, trace, TraceMethod, TraceResult,
    };
    pub use crate::render::{render, Camera, RenderOutput, Scene};
    pub use crate::types::{
        orthonormal_basis, Aabb, BlobNode, BlobTree, Ray, Segment, TreeError, EPSILON,
    };
    pub use glam::DVec3;
}

// Re-exports for convenience
pub use render::{render, Scene};
pub use types::{BlobNode, BlobTree};
