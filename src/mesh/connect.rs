//! Facet and cell adjacency.
//!
//! Each adjacency slot (one per corner) is keyed by the sorted vertices of the
//! shared sub-element: an edge for facets, a triangle for tetrahedra. Sorting
//! the keys groups matching slots; a group of exactly two slots is an interior
//! connection, anything else (boundary or non-manifold) stays unconnected.

use rayon::prelude::*;

use super::host::Polytopes;

/// Adjacency of facets across their edges.
pub(crate) fn facet_adjacency(facets: &Polytopes) -> Vec<Option<usize>> {
    let offsets = facets.offsets();
    let mut keyed: Vec<([usize; 2], usize)> = Vec::with_capacity(offsets[offsets.len() - 1]);

    for f in 0..facets.nb() {
        let verts = facets.get(f);
        let n = verts.len();
        for k in 0..n {
            let a = verts[k];
            let b = verts[(k + 1) % n];
            keyed.push(([a.min(b), a.max(b)], offsets[f] + k));
        }
    }

    pair_slots(keyed, offsets)
}

/// Adjacency of tetrahedral cells across their faces.
///
/// Slot `k` of a tetrahedron is the face opposite its vertex `k`. Cells that
/// are not tetrahedra get no neighbours.
pub(crate) fn cell_adjacency(cells: &Polytopes) -> Vec<Option<usize>> {
    let offsets = cells.offsets();
    let mut keyed: Vec<([usize; 3], usize)> = Vec::with_capacity(offsets[offsets.len() - 1]);

    for c in 0..cells.nb() {
        let verts = cells.get(c);
        if verts.len() != 4 {
            continue;
        }
        for k in 0..4 {
            let mut face = [verts[(k + 1) % 4], verts[(k + 2) % 4], verts[(k + 3) % 4]];
            face.sort_unstable();
            keyed.push((face, offsets[c] + k));
        }
    }

    pair_slots(keyed, offsets)
}

fn pair_slots<K>(mut keyed: Vec<(K, usize)>, offsets: &[usize]) -> Vec<Option<usize>>
where
    K: Ord + Eq + Send,
{
    let num_slots = offsets[offsets.len() - 1];
    let mut adjacent = vec![None; num_slots];

    keyed.par_sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut start = 0;
    while start < keyed.len() {
        let mut end = start + 1;
        while end < keyed.len() && keyed[end].0 == keyed[start].0 {
            end += 1;
        }
        if end - start == 2 {
            let (slot_a, slot_b) = (keyed[start].1, keyed[start + 1].1);
            adjacent[slot_a] = Some(owner(offsets, slot_b));
            adjacent[slot_b] = Some(owner(offsets, slot_a));
        }
        start = end;
    }

    adjacent
}

/// Element owning a corner slot.
#[inline]
fn owner(offsets: &[usize], slot: usize) -> usize {
    // offsets is sorted; the owner is the last element starting at or before slot.
    offsets.partition_point(|&o| o <= slot) - 1
}

#[cfg(test)]
mod tests {
    use crate::mesh::HostMesh;

    fn two_triangles() -> HostMesh {
        let mut mesh = HostMesh::new();
        mesh.facets.add(&[0, 1, 2]);
        mesh.facets.add(&[2, 1, 3]);
        mesh
    }

    #[test]
    fn test_facet_adjacency() {
        let mut mesh = two_triangles();
        mesh.connect();

        // Edge (1, 2) is corner 1 of facet 0 and corner 0 of facet 1.
        assert_eq!(mesh.facets.adjacent(0, 1), Some(1));
        assert_eq!(mesh.facets.adjacent(1, 0), Some(0));
        assert_eq!(mesh.facets.adjacent(0, 0), None);
        assert_eq!(mesh.facets.adjacent(1, 2), None);
    }

    #[test]
    fn test_adjacency_dropped_on_edit() {
        let mut mesh = two_triangles();
        mesh.connect();
        assert!(mesh.facets.is_connected());
        mesh.facets.set_vertex(1, 2, 4);
        assert!(!mesh.facets.is_connected());
        assert_eq!(mesh.facets.adjacent(0, 1), None);
    }

    #[test]
    fn test_cell_adjacency() {
        let mut mesh = HostMesh::new();
        mesh.cells.add(&[0, 1, 2, 3]);
        mesh.cells.add(&[1, 2, 3, 4]);
        mesh.connect();

        // Face (1, 2, 3) is opposite vertex 0 in cell 0 and vertex 4 in cell 1.
        assert_eq!(mesh.cells.adjacent(0, 0), Some(1));
        assert_eq!(mesh.cells.adjacent(1, 3), Some(0));
        for k in 1..4 {
            assert_eq!(mesh.cells.adjacent(0, k), None);
        }
    }

    #[test]
    fn test_non_manifold_edge_unconnected() {
        let mut mesh = two_triangles();
        mesh.facets.add(&[1, 2, 5]);
        mesh.connect();
        assert_eq!(mesh.facets.adjacent(0, 1), None);
        assert_eq!(mesh.facets.adjacent(2, 0), None);
    }
}
