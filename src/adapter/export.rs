//! Host to kernel.

use super::AttributeNames;
use crate::error::{BridgeError, ElementKind, Result};
use crate::kernel::{to_kernel_index, FieldKind, Kernel, KernelHandle, KernelKind, MeshSize};
use crate::mesh::{AttributeSource, HostMesh};

/// Neutral value of the companion field before any sizing is applied.
const NEUTRAL_FIELD: f64 = 1.0;

/// Resolve an optional attribute name to its values.
///
/// A named attribute that does not exist is an error; no name yields `None`.
fn tag_source<'m>(
    mesh: &'m impl AttributeSource,
    kind: ElementKind,
    name: Option<&str>,
) -> Result<Option<&'m [i32]>> {
    match name {
        None => Ok(None),
        Some(name) => mesh
            .read_int_attribute(kind, name)
            .map(Some)
            .ok_or_else(|| BridgeError::missing_attribute(name, kind)),
    }
}

#[inline]
fn tag(tags: Option<&[i32]>, i: usize) -> i32 {
    tags.map_or(0, |t| t[i])
}

/// Copy `mesh` into a new kernel allocation of the given kind.
///
/// Attribute names are resolved before anything is allocated, so a missing
/// attribute fails with [`BridgeError::AttributeNotFound`] without touching
/// the kernel. Tetrahedra are only exported for [`KernelKind::Volume`]; a
/// surface export of a mesh with cells ignores them. The companion field is
/// declared scalar and filled with `1.0`. If the kernel rejects the result,
/// [`BridgeError::InvalidMeshForKernel`] is returned and the allocation is
/// freed.
///
/// # Panics
/// Panics if a facet is not a triangle or a cell is not a tetrahedron.
pub fn export<'k, K: Kernel + ?Sized>(
    kernel: &'k K,
    mesh: &HostMesh,
    kind: KernelKind,
    names: &AttributeNames,
) -> Result<KernelHandle<'k, K>> {
    let with_cells = kind == KernelKind::Volume;

    let edge_tags = tag_source(mesh, ElementKind::Edge, names.edge.as_deref())?;
    let facet_tags = tag_source(mesh, ElementKind::Facet, names.facet.as_deref())?;
    let cell_tags = if with_cells {
        tag_source(mesh, ElementKind::Cell, names.cell.as_deref())?
    } else {
        None
    };

    assert!(mesh.facets.are_simplices(), "facets must be triangles");
    assert!(mesh.cells.are_simplices(), "cells must be tetrahedra");

    if !with_cells && mesh.cells.nb() > 0 {
        log::warn!(
            "surface export ignores {} cells of the input mesh",
            mesh.cells.nb()
        );
    }

    let mut handle = KernelHandle::new(kernel, kind);
    let size = MeshSize {
        vertices: mesh.vertices.nb(),
        edges: mesh.edges.nb(),
        triangles: mesh.facets.nb(),
        tetrahedra: if with_cells { mesh.cells.nb() } else { 0 },
    };
    kernel.set_mesh_size(handle.data_mut(), size)?;

    let data = handle.data_mut();
    let km = data.mesh_mut();
    for (v, p) in mesh.vertices.points().iter().enumerate() {
        let point = km.point_mut(to_kernel_index(v));
        point.c = [p.x, p.y, p.z];
        point.tag = 0;
    }
    for (e, [a, b]) in mesh.edges.iter().enumerate() {
        let edge = km.edge_mut(to_kernel_index(e));
        edge.a = to_kernel_index(a);
        edge.b = to_kernel_index(b);
        edge.tag = tag(edge_tags, e);
    }
    for (f, verts) in mesh.facets.iter().enumerate() {
        let tria = km.tria_mut(to_kernel_index(f));
        for (k, &v) in verts.iter().enumerate() {
            tria.v[k] = to_kernel_index(v);
        }
        tria.tag = tag(facet_tags, f);
    }
    if with_cells {
        for (c, verts) in mesh.cells.iter().enumerate() {
            let tetra = km.tetra_mut(to_kernel_index(c));
            for (k, &v) in verts.iter().enumerate() {
                tetra.v[k] = to_kernel_index(v);
            }
            tetra.tag = tag(cell_tags, c);
        }
    }

    kernel.set_sol_size(handle.data_mut(), size.vertices, FieldKind::Scalar)?;
    handle.data_mut().sol_mut().fill(NEUTRAL_FIELD);

    kernel.check_mesh_data(handle.data())?;

    if with_cells {
        kernel.set_hand_given_mesh(handle.data_mut());
    }

    log::debug!(
        "exported {} vertices, {} edges, {} triangles, {} tetrahedra to {} {} mesh",
        size.vertices,
        size.edges,
        size.triangles,
        size.tetrahedra,
        kernel.name(),
        kind
    );
    Ok(handle)
}
