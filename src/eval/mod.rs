//! Field evaluation over the blob tree
//!
//! Free functions matching on the node enum. The hot paths prune on the
//! cached bounding boxes before recursing, which is exact because every
//! node's field has compact support inside its box.
//!
//! Author: Moroya Sakamoto

use crate::primitives::{falloff, falloff_segment_k};
use crate::types::{BlobNode, Segment, EPSILON};
use glam::DVec3;

/// Field intensity of a subtree at a point
///
/// Exactly zero outside the node's bounding box.
#[inline]
pub fn intensity(node: &BlobNode, p: DVec3) -> f64 {
    match node {
        BlobNode::Point {
            center,
            radius,
            energy,
            aabb,
            ..
        } => {
            if !aabb.contains(p) {
                return 0.0;
            }
            let delta = p - *center;
            *energy * falloff(delta.dot(delta), radius * radius)
        }
        BlobNode::Blend {
            left, right, aabb, ..
        } => {
            if !aabb.contains(p) {
                return 0.0;
            }
            intensity(left, p) + intensity(right, p)
        }
    }
}

/// Field gradient of a subtree at a point
///
/// A blend sums its children's gradients, pruned on the blend box; a
/// primitive falls back to centered finite differences of its intensity.
pub fn gradient(node: &BlobNode, p: DVec3) -> DVec3 {
    match node {
        BlobNode::Point { .. } => finite_difference_gradient(node, p),
        BlobNode::Blend {
            left, right, aabb, ..
        } => {
            if !aabb.contains(p) {
                return DVec3::ZERO;
            }
            gradient(left, p) + gradient(right, p)
        }
    }
}

/// Centered finite differences of `intensity` with step `EPSILON`
fn finite_difference_gradient(node: &BlobNode, p: DVec3) -> DVec3 {
    let ex = DVec3::new(EPSILON, 0.0, 0.0);
    let ey = DVec3::new(0.0, EPSILON, 0.0);
    let ez = DVec3::new(0.0, 0.0, EPSILON);

    DVec3::new(
        intensity(node, p + ex) - intensity(node, p - ex),
        intensity(node, p + ey) - intensity(node, p - ey),
        intensity(node, p + ez) - intensity(node, p - ez),
    ) / (2.0 * EPSILON)
}

/// Lipschitz bound of a subtree's field restricted to a segment
///
/// Zero when the segment cannot reach the node's support; otherwise blends
/// sum their children's bounds, each child pruning independently. The
/// result never exceeds the node's global `lipschitz()`.
pub fn segment_lipschitz(node: &BlobNode, s: &Segment) -> f64 {
    match node {
        BlobNode::Point {
            center,
            radius,
            energy,
            aabb,
            ..
        } => {
            if !s.overlaps_box(aabb) {
                return 0.0;
            }
            point_segment_k(*center, *radius, *energy, s)
        }
        BlobNode::Blend {
            left, right, aabb, ..
        } => {
            if !aabb.overlaps(&s.aabb()) {
                return 0.0;
            }
            segment_lipschitz(left, s) + segment_lipschitz(right, s)
        }
    }
}

/// Piecewise directional bound for a point primitive over a segment
///
/// Classifies where the perpendicular foot from the center lands (before,
/// past or on the segment), bounds the profile slope over the squared
/// distances reached, then attenuates by the projection of the gradient
/// direction onto the segment axis.
fn point_segment_k(c: DVec3, r: f64, e: f64, s: &Segment) -> f64 {
    let axis = (s.b - s.a).normalize();
    let l = (c - s.a).dot(axis);

    let kk = if l < 0.0 {
        falloff_segment_k(
            (c - s.a).length_squared(),
            (c - s.b).length_squared(),
            r,
            e,
        )
    } else if (s.b - s.a).length() < l {
        falloff_segment_k(
            (c - s.b).length_squared(),
            (c - s.a).length_squared(),
            r,
            e,
        )
    } else {
        let dd = (c - s.a).length_squared() - l * l;
        falloff_segment_k(
            dd,
            (c - s.a).length_squared().max((c - s.b).length_squared()),
            r,
            e,
        )
    };

    let grad = axis
        .dot((c - s.a).normalize())
        .abs()
        .max(axis.dot((c - s.b).normalize()).abs());
    kk * grad
}
