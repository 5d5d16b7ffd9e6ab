//! Nesting of loops into faces.
//!
//! Loops are ranked by area; each loop's parent is the smallest larger loop
//! that fully contains it without crossing it. Even depths are outer
//! boundaries (CCW), odd depths are holes (CW) attached to their nearest
//! even-depth ancestor.

use crate::geometry::utils_2d;
use crate::sketch::profile::{Face, Loop};
use tracing::{trace, warn};

/// Containment tree over a loop set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentTree {
    pub parent: Vec<Option<usize>>,
    pub depth: Vec<usize>,
}

/// True if every point of `inner` lies inside or on `outer`, and the two
/// rings do not cross.
pub fn loop_contains_loop(outer: &Loop, inner: &Loop, tolerance: f64) -> bool {
    if !utils_2d::bounds_contain(outer.bounds(), inner.bounds(), tolerance) {
        return false;
    }
    inner
        .polygon
        .iter()
        .all(|&p| utils_2d::point_in_or_on_polygon(p, &outer.polygon, tolerance))
        && !utils_2d::polygons_intersect(&outer.polygon, &inner.polygon)
}

/// Build the containment tree: the parent of a loop is the smallest-area
/// loop with strictly larger area that contains it.
pub fn containment_tree(loops: &[Loop], tolerance: f64) -> ContainmentTree {
    let n = loops.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| loops[b].area().total_cmp(&loops[a].area()));

    let mut parent: Vec<Option<usize>> = vec![None; n];
    for &i in &order {
        let mut best: Option<usize> = None;
        for j in 0..n {
            if j == i || loops[j].area() <= loops[i].area() {
                continue;
            }
            if best.is_some_and(|b| loops[b].area() <= loops[j].area()) {
                continue;
            }
            if loop_contains_loop(&loops[j], &loops[i], tolerance) {
                best = Some(j);
            }
        }
        trace!("Loop {} (area {:.6}) parent {:?}", i, loops[i].area(), best);
        parent[i] = best;
    }

    // Parents always have strictly larger area, so walking the sorted order
    // assigns each parent's depth before its children.
    let mut depth = vec![0usize; n];
    for &i in &order {
        if let Some(p) = parent[i] {
            depth[i] = depth[p] + 1;
        }
    }

    ContainmentTree { parent, depth }
}

/// Faces built from a loop set, plus the holes that had nowhere to go.
#[derive(Debug, Clone, Default)]
pub struct FaceHierarchy {
    pub faces: Vec<Face>,
    /// Odd-depth loops without an even-depth ancestor.
    pub orphans: Vec<Loop>,
}

/// Nest `loops` into faces, forcing orientation by depth parity.
pub fn resolve_faces(mut loops: Vec<Loop>, tolerance: f64) -> FaceHierarchy {
    let tree = containment_tree(&loops, tolerance);
    let n = loops.len();

    for (lp, &depth) in loops.iter_mut().zip(&tree.depth) {
        lp.orient(depth % 2 == 0);
    }

    // Face slot per even-depth loop, in loop order.
    let mut face_of: Vec<Option<usize>> = vec![None; n];
    let mut faces: Vec<Face> = Vec::new();
    for i in 0..n {
        if tree.depth[i] % 2 == 0 {
            face_of[i] = Some(faces.len());
            faces.push(Face::new(loops[i].clone()));
        }
    }

    let mut orphans = Vec::new();
    for i in 0..n {
        if tree.depth[i] % 2 == 0 {
            continue;
        }
        match even_ancestor(&tree, i) {
            Some(a) => {
                if let Some(slot) = face_of[a] {
                    faces[slot].inner_loops.push(loops[i].clone());
                }
            }
            None => {
                warn!("Dropping hole loop {} with no even-depth ancestor", i);
                orphans.push(loops[i].clone());
            }
        }
    }

    FaceHierarchy { faces, orphans }
}

/// Nearest even-depth ancestor of `index`, bounded by the loop count.
fn even_ancestor(tree: &ContainmentTree, index: usize) -> Option<usize> {
    let mut current = tree.parent[index];
    let mut hops = 0;
    while let Some(p) = current {
        if tree.depth[p] % 2 == 0 {
            return Some(p);
        }
        hops += 1;
        if hops > tree.parent.len() {
            return None;
        }
        current = tree.parent[p];
    }
    None
}
