//! Core types for the blob tree
//!
//! Defines the field node tree, the bounding volume primitives and the
//! segment type used by segment-local Lipschitz queries.
//!
//! Author: Moroya Sakamoto

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Numeric guard shared by finite-difference gradients, the slab
/// intersection and the minimum marching step
pub const EPSILON: f64 = 1e-3;

/// Errors raised while building or marching a blob tree
#[derive(Error, Debug)]
pub enum TreeError {
    /// Primitive radius must be positive and finite
    #[error("invalid primitive radius: {radius}")]
    InvalidRadius {
        /// Offending radius value
        radius: f64,
    },

    /// Primitive center or energy is not finite
    #[error("non-finite primitive parameters")]
    NonFinite,

    /// No primitives to build a tree from
    #[error("cannot build a blob tree from an empty primitive list")]
    Empty,

    /// The field has a zero Lipschitz bound, so no safe step can be derived
    #[error("field has a zero Lipschitz bound")]
    ZeroLipschitz,
}

/// Returns a vector orthogonal to `u`
///
/// Swaps the two components of largest magnitude, negates one and zeroes
/// the third, which keeps the construction numerically stable.
fn orthogonal(u: DVec3) -> DVec3 {
    let a = u.abs();
    let (mut i, mut j) = (0usize, 1usize);
    if a.x > a.y {
        if a.z > a.y {
            j = 2;
        }
    } else {
        i = 1;
        j = 2;
        if a.x > a.z {
            j = 0;
        }
    }
    let mut v = [0.0; 3];
    v[i] = u[j];
    v[j] = -u[i];
    DVec3::from_array(v)
}

/// Complete a unit vector `n` into an orthonormal basis
///
/// Returns `(x, y)` such that `(x, y, n)` is right-handed, provided `n` is
/// normalized.
pub fn orthonormal_basis(n: DVec3) -> (DVec3, DVec3) {
    let x = orthogonal(n).normalize();
    let y = n.cross(x).normalize();
    (x, y)
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl Aabb {
    /// Create a box from its two corners, `min <= max` componentwise
    #[inline]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Aabb { min, max }
    }

    /// Smallest box enclosing both boxes
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Strict interior test; points exactly on a face report outside
    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpgt(self.min).all() && p.cmplt(self.max).all()
    }

    /// Box-box overlap test
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.min.x >= other.max.x
            || self.min.y >= other.max.y
            || self.min.z >= other.max.z
            || self.max.x <= other.min.x
            || self.max.y <= other.min.y
            || self.max.z <= other.min.z)
    }

    /// Diagonal vector `max - min`
    #[inline]
    pub fn diagonal(&self) -> DVec3 {
        self.max - self.min
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Indexed corner access: `0` is the minimum corner, anything else the
    /// maximum
    #[inline]
    pub fn corner(&self, i: usize) -> DVec3 {
        if i == 0 {
            self.min
        } else {
            self.max
        }
    }

    /// Slab intersection with a ray, returning the entry and exit depths
    ///
    /// Direction components within `epsilon` of zero are treated as parallel
    /// to their slab. Depths are seeded at ±1e16, so a ray starting inside
    /// the box reports a negative entry depth rather than clipping to zero.
    pub fn intersect_ray(&self, ray: &Ray, epsilon: f64) -> Option<(f64, f64)> {
        let mut tmin = -1e16;
        let mut tmax = 1e16;

        for axis in 0..3 {
            let p = ray.origin[axis];
            let d = ray.direction[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if d < -epsilon {
                let t = (lo - p) / d;
                if t < tmin {
                    return None;
                }
                if t <= tmax {
                    tmax = t;
                }
                let t = (hi - p) / d;
                if t >= tmin {
                    if t > tmax {
                        return None;
                    }
                    tmin = t;
                }
            } else if d > epsilon {
                let t = (hi - p) / d;
                if t < tmin {
                    return None;
                }
                if t <= tmax {
                    tmax = t;
                }
                let t = (lo - p) / d;
                if t >= tmin {
                    if t > tmax {
                        return None;
                    }
                    tmin = t;
                }
            } else if p < lo || p > hi {
                return None;
            }
        }

        Some((tmin, tmax))
    }
}

/// Ray with an origin and a direction
///
/// The direction is assumed normalized by callers; depths returned by the
/// marchers are only metric under that assumption.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin
    pub origin: DVec3,
    /// Ray direction (normalized by callers)
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray
    #[inline]
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Ray { origin, direction }
    }

    /// Point along the ray at depth `t`
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Line segment between two endpoints
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// First endpoint
    pub a: DVec3,
    /// Second endpoint
    pub b: DVec3,
}

impl Segment {
    /// Create a new segment
    #[inline]
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Segment { a, b }
    }

    /// Tight bounding box of the segment
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.a.min(self.b), self.a.max(self.b))
    }

    /// Separating-axis overlap test against a box
    ///
    /// Checks the three face axes and the three cross-product axes. The box
    /// extent is taken as its full diagonal, which makes the test
    /// conservative: it may report an overlap for a nearby segment but never
    /// misses a true one, so Lipschitz pruning stays correct.
    pub fn overlaps_box(&self, bbox: &Aabb) -> bool {
        let ba = bbox.diagonal();
        let d = (self.b - self.a) * 0.5;
        let c = (self.a + self.b) * 0.5;
        let cc = c - bbox.center();
        let fd = d.abs();

        if cc.x.abs() > ba.x + fd.x {
            return false;
        }
        if cc.y.abs() > ba.y + fd.y {
            return false;
        }
        if cc.z.abs() > ba.z + fd.z {
            return false;
        }

        if (d.y * cc.z - d.z * cc.y).abs() > ba.y * fd.z + ba.z * fd.y {
            return false;
        }
        if (d.z * cc.x - d.x * cc.z).abs() > ba.x * fd.z + ba.z * fd.x {
            return false;
        }
        if (d.x * cc.y - d.y * cc.x).abs() > ba.x * fd.y + ba.y * fd.x {
            return false;
        }

        true
    }
}

/// A node of the blob tree
///
/// The tree is a closed sum type: point primitives at the leaves, binary sum
/// blends at the inner nodes. Every node caches the bounding box of its
/// support and the global Lipschitz bound of its field, both fixed at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BlobNode {
    /// Point primitive with a compactly supported cubic falloff
    Point {
        /// Field center
        center: DVec3,
        /// Support radius; the field is exactly zero beyond it
        radius: f64,
        /// Field strength, may be negative
        energy: f64,
        /// Cached support box `[center - r, center + r]`
        aabb: Aabb,
        /// Cached global Lipschitz bound `1.72 |energy| / radius`
        lipschitz: f64,
    },

    /// Binary sum of two child fields
    Blend {
        /// First child
        left: Box<BlobNode>,
        /// Second child
        right: Box<BlobNode>,
        /// Cached union of the children's boxes
        aabb: Aabb,
        /// Cached sum of the children's bounds
        lipschitz: f64,
    },
}

impl BlobNode {
    /// Create a point primitive
    ///
    /// Rejects degenerate geometry: the radius must be positive and finite,
    /// the center and energy finite.
    pub fn point(center: DVec3, radius: f64, energy: f64) -> Result<Self, TreeError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(TreeError::InvalidRadius { radius });
        }
        if !center.is_finite() || !energy.is_finite() {
            return Err(TreeError::NonFinite);
        }

        let half = DVec3::splat(radius);
        Ok(BlobNode::Point {
            center,
            radius,
            energy,
            aabb: Aabb::new(center - half, center + half),
            lipschitz: crate::primitives::falloff_k(energy, radius),
        })
    }

    /// Blend two nodes into a binary sum
    pub fn blend(left: BlobNode, right: BlobNode) -> Self {
        let aabb = left.aabb().union(&right.aabb());
        let lipschitz = left.lipschitz() + right.lipschitz();
        BlobNode::Blend {
            left: Box::new(left),
            right: Box::new(right),
            aabb,
            lipschitz,
        }
    }

    /// Bounding box enclosing the support of this subtree's field
    #[inline]
    pub fn aabb(&self) -> Aabb {
        match self {
            BlobNode::Point { aabb, .. } | BlobNode::Blend { aabb, .. } => *aabb,
        }
    }

    /// Global Lipschitz bound of this subtree's field
    #[inline]
    pub fn lipschitz(&self) -> f64 {
        match self {
            BlobNode::Point { lipschitz, .. } | BlobNode::Blend { lipschitz, .. } => *lipschitz,
        }
    }

    /// Total node count of the subtree
    pub fn node_count(&self) -> u32 {
        match self {
            BlobNode::Point { .. } => 1,
            BlobNode::Blend { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Number of leaf primitives in the subtree
    pub fn primitive_count(&self) -> u32 {
        match self {
            BlobNode::Point { .. } => 1,
            BlobNode::Blend { left, right, .. } => {
                left.primitive_count() + right.primitive_count()
            }
        }
    }

    /// Height of the subtree; a lone primitive has depth 1
    pub fn depth(&self) -> u32 {
        match self {
            BlobNode::Point { .. } => 1,
            BlobNode::Blend { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Blob tree - top-level container owning the root node
///
/// The tree is immutable once built and all queries are pure, so a tree can
/// be shared freely across render workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobTree {
    /// Root node
    pub root: BlobNode,
}

impl BlobTree {
    /// Create a tree from a root node
    pub fn new(root: BlobNode) -> Self {
        BlobTree { root }
    }

    /// Build a tree from particle centers with a uniform radius
    ///
    /// Each center becomes a point primitive with energy 1.0; the leaves are
    /// organized into a balanced blend hierarchy. An empty list is rejected,
    /// so a built tree always has at least one primitive.
    pub fn from_points(centers: &[DVec3], radius: f64) -> Result<Self, TreeError> {
        let mut leaves = Vec::with_capacity(centers.len());
        for &center in centers {
            leaves.push(BlobNode::point(center, radius, 1.0)?);
        }
        match crate::bvh::build_hierarchy(leaves) {
            Some(root) => Ok(BlobTree::new(root)),
            None => Err(TreeError::Empty),
        }
    }

    /// Build a tree from a particle file, one `x y z` triple per line
    pub fn from_particle_file(
        path: impl AsRef<Path>,
        radius: f64,
    ) -> Result<Self, crate::io::IoError> {
        let centers = crate::io::load_particles(path)?;
        Ok(BlobTree::from_points(&centers, radius)?)
    }

    /// Field intensity relative to the 0.5 iso-level; the surface is at 0
    #[inline]
    pub fn intensity(&self, p: DVec3) -> f64 {
        crate::eval::intensity(&self.root, p) - 0.5
    }

    /// Field gradient at `p`
    #[inline]
    pub fn gradient(&self, p: DVec3) -> DVec3 {
        crate::eval::gradient(&self.root, p)
    }

    /// Global Lipschitz bound of the field
    #[inline]
    pub fn k(&self) -> f64 {
        self.root.lipschitz()
    }

    /// Lipschitz bound of the field restricted to the segment `s`
    ///
    /// Never larger than `k()`, and exactly zero when the segment cannot
    /// reach the field's support.
    #[inline]
    pub fn k_segment(&self, s: &Segment) -> f64 {
        crate::eval::segment_lipschitz(&self.root, s)
    }

    /// Bounding box of the whole field
    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.root.aabb()
    }

    /// Total node count
    pub fn node_count(&self) -> u32 {
        self.root.node_count()
    }

    /// Number of leaf primitives
    pub fn primitive_count(&self) -> u32 {
        self.root.primitive_count()
    }

    /// Tree height
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains_strict() {
        let aabb = Aabb::new(DVec3::new(-1.0, -1.0, -1.0), DVec3::new(1.0, 1.0, 1.0));
        assert!(aabb.contains(DVec3::ZERO));
        assert!(!aabb.contains(DVec3::new(2.0, 0.0, 0.0)));
        // Points exactly on a face are outside
        assert!(!aabb.contains(DVec3::new(1.0, 0.0, 0.0)));
        assert!(!aabb.contains(DVec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_union() {
        let a = Aabb::new(DVec3::new(-1.0, 0.0, 0.0), DVec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(DVec3::new(0.0, -2.0, 0.0), DVec3::new(3.0, 1.0, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(u.max, DVec3::new(3.0, 1.0, 2.0));
        assert_eq!(u.corner(0), u.min);
        assert_eq!(u.corner(1), u.max);
        assert_eq!(u.center(), (u.min + u.max) * 0.5);
        assert_eq!(u.diagonal(), u.max - u.min);
    }

    #[test]
    fn test_aabb_overlaps() {
        let a = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let b = Aabb::new(DVec3::splat(0.5), DVec3::splat(2.0));
        let c = Aabb::new(DVec3::splat(1.5), DVec3::splat(2.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        // Face contact does not count as overlap
        let d = Aabb::new(DVec3::new(1.0, -1.0, -1.0), DVec3::new(2.0, 1.0, 1.0));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_aabb_ray_intersection() {
        let aabb = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let ray = Ray::new(DVec3::new(0.0, -5.0, 0.0), DVec3::new(0.0, 1.0, 0.0));
        let (tmin, tmax) = aabb.intersect_ray(&ray, EPSILON).expect("should intersect");
        assert!((tmin - 4.0).abs() < 1e-12);
        assert!((tmax - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_aabb_ray_miss() {
        let aabb = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let ray = Ray::new(DVec3::new(10.0, -5.0, 0.0), DVec3::new(0.0, 1.0, 0.0));
        assert!(aabb.intersect_ray(&ray, EPSILON).is_none());
    }

    #[test]
    fn test_aabb_ray_from_inside() {
        let aabb = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 1.0, 0.0));
        let (tmin, tmax) = aabb.intersect_ray(&ray, EPSILON).expect("should intersect");
        assert!(tmin < 0.0);
        assert!((tmax - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_aabb() {
        let s = Segment::new(DVec3::new(1.0, -2.0, 3.0), DVec3::new(-1.0, 4.0, 0.0));
        let bbox = s.aabb();
        assert_eq!(bbox.min, DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bbox.max, DVec3::new(1.0, 4.0, 3.0));
    }

    #[test]
    fn test_segment_box_overlap() {
        let bbox = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let through = Segment::new(DVec3::new(-3.0, 0.0, 0.0), DVec3::new(3.0, 0.0, 0.0));
        let far = Segment::new(DVec3::new(5.0, 0.0, 0.0), DVec3::new(6.0, 0.0, 0.0));
        let diagonal_miss = Segment::new(DVec3::new(8.0, 8.0, 0.0), DVec3::new(9.0, 7.0, 0.0));
        assert!(through.overlaps_box(&bbox));
        assert!(!far.overlaps_box(&bbox));
        assert!(!diagonal_miss.overlaps_box(&bbox));
    }

    #[test]
    fn test_orthonormal_basis() {
        let dirs = [
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(1.0, 2.0, 3.0).normalize(),
        ];
        for n in dirs {
            let (x, y) = orthonormal_basis(n);
            assert!((x.length() - 1.0).abs() < 1e-12);
            assert!((y.length() - 1.0).abs() < 1e-12);
            assert!(x.dot(y).abs() < 1e-12);
            assert!(x.dot(n).abs() < 1e-12);
            assert!(y.dot(n).abs() < 1e-12);
            // Right-handed: x cross y recovers n
            assert!((x.cross(y) - n).length() < 1e-12);
        }
    }

    #[test]
    fn test_point_construction() {
        let p = BlobNode::point(DVec3::ZERO, 2.0, 1.0).unwrap();
        assert_eq!(p.aabb().min, DVec3::splat(-2.0));
        assert_eq!(p.aabb().max, DVec3::splat(2.0));
        assert!((p.lipschitz() - 0.86).abs() < 1e-12);
        assert_eq!(p.node_count(), 1);
        assert_eq!(p.depth(), 1);
    }

    #[test]
    fn test_point_rejects_degenerate() {
        assert!(matches!(
            BlobNode::point(DVec3::ZERO, 0.0, 1.0),
            Err(TreeError::InvalidRadius { .. })
        ));
        assert!(matches!(
            BlobNode::point(DVec3::ZERO, -1.0, 1.0),
            Err(TreeError::InvalidRadius { .. })
        ));
        assert!(matches!(
            BlobNode::point(DVec3::new(f64::NAN, 0.0, 0.0), 1.0, 1.0),
            Err(TreeError::NonFinite)
        ));
        assert!(matches!(
            BlobNode::point(DVec3::ZERO, 1.0, f64::INFINITY),
            Err(TreeError::NonFinite)
        ));
    }

    #[test]
    fn test_blend_caches_union_and_sum() {
        let a = BlobNode::point(DVec3::new(-1.0, 0.0, 0.0), 2.0, 1.0).unwrap();
        let b = BlobNode::point(DVec3::new(1.0, 0.0, 0.0), 2.0, 1.0).unwrap();
        let ka = a.lipschitz();
        let kb = b.lipschitz();
        let blend = BlobNode::blend(a, b);
        assert_eq!(blend.aabb().min, DVec3::new(-3.0, -2.0, -2.0));
        assert_eq!(blend.aabb().max, DVec3::new(3.0, 2.0, 2.0));
        assert!((blend.lipschitz() - (ka + kb)).abs() < 1e-12);
        assert_eq!(blend.node_count(), 3);
        assert_eq!(blend.primitive_count(), 2);
        assert_eq!(blend.depth(), 2);
    }

    #[test]
    fn test_tree_rejects_empty() {
        assert!(matches!(
            BlobTree::from_points(&[], 2.0),
            Err(TreeError::Empty)
        ));
    }

    #[test]
    fn test_tree_iso_offset() {
        let tree = BlobTree::from_points(&[DVec3::ZERO], 2.0).unwrap();
        // Raw field is 1 at the center, the public query subtracts 0.5
        assert!((tree.intensity(DVec3::ZERO) - 0.5).abs() < 1e-12);
        // Far outside the support the query sits at the ambient -0.5
        assert!((tree.intensity(DVec3::new(50.0, 0.0, 0.0)) + 0.5).abs() < 1e-12);
    }
}
