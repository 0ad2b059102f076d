//! Bounding volume hierarchy construction
//!
//! Reorganizes a flat list of leaf primitives into a balanced binary blend
//! tree using spatial median splits along the longest box axis.
//!
//! Author: Moroya Sakamoto

use crate::types::BlobNode;
use glam::DVec3;

/// Build a blend hierarchy over `leaves`
///
/// Returns `None` for an empty list. The leaf multiset is preserved, so the
/// root's global Lipschitz bound is the sum over the leaves and its box the
/// union of theirs.
pub fn build_hierarchy(leaves: Vec<BlobNode>) -> Option<BlobNode> {
    if leaves.is_empty() {
        return None;
    }
    Some(build_recursive(leaves))
}

fn build_recursive(mut nodes: Vec<BlobNode>) -> BlobNode {
    if nodes.len() == 1 {
        return nodes.remove(0);
    }

    // Bounding box over the whole range
    let mut bbox = nodes[0].aabb();
    for node in &nodes[1..] {
        bbox = bbox.union(&node.aabb());
    }

    // Cut the most stretched axis in the middle
    let axis = max_axis(bbox.diagonal());
    let cut = (bbox.min[axis] + bbox.max[axis]) / 2.0;

    let (mut left, mut right): (Vec<BlobNode>, Vec<BlobNode>) = nodes
        .into_iter()
        .partition(|node| node.aabb().center()[axis] < cut);

    // Degenerate split: everything landed on one side, fall back to the
    // arithmetic middle
    if left.is_empty() || right.is_empty() {
        left.append(&mut right);
        let mid = left.len() / 2;
        right = left.split_off(mid);
    }

    BlobNode::blend(build_recursive(left), build_recursive(right))
}

/// Index of the largest component, ties broken toward the smaller index
fn max_axis(d: DVec3) -> usize {
    if d.x >= d.y {
        if d.x >= d.z {
            0
        } else {
            2
        }
    } else if d.y >= d.z {
        1
    } else {
        2
    }
}
