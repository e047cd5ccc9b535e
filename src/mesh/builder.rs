//! Mesh construction utilities.
//!
//! This module provides functions for building host meshes from the
//! index lists commonly found in mesh file formats.

use nalgebra::Point3;

use super::host::HostMesh;
use crate::error::{BridgeError, ElementKind, Result};

/// Build a surface mesh from vertices and triangles.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `triangles` - List of triangles, each as [v0, v1, v2] indices
///
/// # Returns
/// A connected host mesh, or an error if an index is out of range.
///
/// # Example
/// ```
/// use meshbridge::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.vertices.nb(), 3);
/// assert_eq!(mesh.facets.nb(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], triangles: &[[usize; 3]]) -> Result<HostMesh> {
    build(vertices, triangles, &[])
}

/// Build a volume mesh from vertices and tetrahedra, with optional boundary
/// triangles.
///
/// # Example
/// ```
/// use meshbridge::mesh::build_from_tetrahedra;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let mesh = build_from_tetrahedra(&vertices, &[[0, 1, 2, 3]], &[]).unwrap();
/// assert_eq!(mesh.cells.nb(), 1);
/// ```
pub fn build_from_tetrahedra(
    vertices: &[Point3<f64>],
    tetrahedra: &[[usize; 4]],
    boundary: &[[usize; 3]],
) -> Result<HostMesh> {
    build(vertices, boundary, tetrahedra)
}

fn build(
    vertices: &[Point3<f64>],
    triangles: &[[usize; 3]],
    tetrahedra: &[[usize; 4]],
) -> Result<HostMesh> {
    check_indices(ElementKind::Facet, triangles.iter().map(|t| &t[..]), vertices.len())?;
    check_indices(ElementKind::Cell, tetrahedra.iter().map(|t| &t[..]), vertices.len())?;

    let mut mesh = HostMesh::new();
    for &p in vertices {
        mesh.vertices.add_vertex(p);
    }
    for t in triangles {
        mesh.facets.add(t);
    }
    for t in tetrahedra {
        mesh.cells.add(t);
    }
    mesh.connect();
    Ok(mesh)
}

fn check_indices<'a>(
    collection: ElementKind,
    elements: impl Iterator<Item = &'a [usize]>,
    num_vertices: usize,
) -> Result<()> {
    for (element, verts) in elements.enumerate() {
        if let Some(&vertex) = verts.iter().find(|&&v| v >= num_vertices) {
            return Err(BridgeError::InvalidVertexIndex {
                collection,
                element,
                vertex,
            });
        }
    }
    Ok(())
}

/// Collect the triangles of a tetrahedral mesh that belong to a single cell.
///
/// Triangles are oriented so that their normal points out of the owning
/// tetrahedron when the tetrahedron has positive volume.
pub fn boundary_triangles(tetrahedra: &[[usize; 4]]) -> Vec<[usize; 3]> {
    use std::collections::HashMap;

    // Faces opposite each vertex, oriented outwards for a positively oriented tet.
    const FACES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

    let mut count: HashMap<[usize; 3], ([usize; 3], usize)> = HashMap::new();
    for tet in tetrahedra {
        for face in &FACES {
            let tri = [tet[face[0]], tet[face[1]], tet[face[2]]];
            let mut key = tri;
            key.sort_unstable();
            count.entry(key).or_insert((tri, 0)).1 += 1;
        }
    }

    let mut boundary: Vec<[usize; 3]> = count
        .into_values()
        .filter(|&(_, n)| n == 1)
        .map(|(tri, _)| tri)
        .collect();
    boundary.sort_unstable();
    boundary
}
