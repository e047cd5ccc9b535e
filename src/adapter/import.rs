//! Kernel to host.

use nalgebra::Point3;

use super::AttributeNames;
use crate::error::{ElementKind, Result};
use crate::kernel::{from_kernel_index, Kernel, KernelHandle, KernelMesh};
use crate::mesh::{AttributeSink, HostMesh};

/// Host index of kernel vertex `j`.
///
/// # Panics
/// Panics if `j` is not in `1..=np`.
#[inline]
fn host_vertex(j: usize, np: usize) -> usize {
    assert!(j <= np, "kernel vertex index {j} exceeds point count {np}");
    from_kernel_index(j)
}

/// Build a new host mesh from the kernel mesh held by `handle`.
///
/// Counts come from the kernel arrays; every index is shifted back to zero
/// based. For each named attribute the reference tags are written to the
/// matching collection, creating or overwriting it. Adjacency is rebuilt
/// before returning.
///
/// # Panics
/// Panics if an element references a kernel vertex outside `1..=np`.
pub fn import<K: Kernel + ?Sized>(
    handle: &KernelHandle<'_, K>,
    names: &AttributeNames,
) -> Result<HostMesh> {
    let km = handle.mesh();
    let mut mesh = to_host(km);

    if let Some(name) = &names.edge {
        let tags = (1..=km.nb_edges()).map(|i| km.edge(i).tag).collect();
        mesh.write_int_attribute(ElementKind::Edge, name, tags)?;
    }
    if let Some(name) = &names.facet {
        let tags = (1..=km.nb_triangles()).map(|i| km.tria(i).tag).collect();
        mesh.write_int_attribute(ElementKind::Facet, name, tags)?;
    }
    if let Some(name) = &names.cell {
        let tags = (1..=km.nb_tetrahedra()).map(|i| km.tetra(i).tag).collect();
        mesh.write_int_attribute(ElementKind::Cell, name, tags)?;
    }

    mesh.connect();
    log::debug!(
        "imported {} vertices, {} edges, {} facets, {} cells from {}",
        mesh.vertices.nb(),
        mesh.edges.nb(),
        mesh.facets.nb(),
        mesh.cells.nb(),
        handle.kernel().name()
    );
    Ok(mesh)
}

fn to_host(km: &KernelMesh) -> HostMesh {
    let np = km.nb_points();
    let mut mesh = HostMesh::new();

    mesh.vertices.create_vertices(np);
    for v in 0..np {
        let [x, y, z] = km.point(v + 1).c;
        mesh.vertices.set_point(v, Point3::new(x, y, z));
    }

    mesh.edges.create_edges(km.nb_edges());
    for e in 0..km.nb_edges() {
        let edge = km.edge(e + 1);
        mesh.edges.set_vertex(e, 0, host_vertex(edge.a, np));
        mesh.edges.set_vertex(e, 1, host_vertex(edge.b, np));
    }

    mesh.facets.create_simplices(km.nb_triangles());
    for f in 0..km.nb_triangles() {
        for (k, &j) in km.tria(f + 1).v.iter().enumerate() {
            mesh.facets.set_vertex(f, k, host_vertex(j, np));
        }
    }

    mesh.cells.create_simplices(km.nb_tetrahedra());
    for c in 0..km.nb_tetrahedra() {
        for (k, &j) in km.tetra(c + 1).v.iter().enumerate() {
            mesh.cells.set_vertex(c, k, host_vertex(j, np));
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::export;
    use crate::adapter::fixtures::{create_tet_surface, create_tetrahedron, create_two_tets};
    use crate::kernel::testing::CountingKernel;
    use crate::kernel::KernelKind;
    use crate::mesh::AttributeSource;

    #[test]
    fn test_round_trip_identity() {
        let kernel = CountingKernel::new();
        for (mesh, kind) in [
            (create_tet_surface(), KernelKind::Surface),
            (create_tetrahedron(), KernelKind::Volume),
            (create_two_tets(), KernelKind::Volume),
        ] {
            let names = AttributeNames::default();
            let handle = export(&kernel, &mesh, kind, &names).unwrap();
            let back = import(&handle, &names).unwrap();
            handle.release();

            assert_eq!(back.vertices.points(), mesh.vertices.points());
            assert_eq!(back.edges.nb(), mesh.edges.nb());
            assert!(back.edges.iter().eq(mesh.edges.iter()));
            assert!(back.facets.iter().eq(mesh.facets.iter()));
            assert!(back.cells.iter().eq(mesh.cells.iter()));
            assert!(back.facets.is_connected());
            assert!(back.cells.is_connected());
        }
        assert!(kernel.balanced());
    }

    #[test]
    fn test_attribute_round_trip() {
        let kernel = CountingKernel::new();
        let mut mesh = create_two_tets();
        mesh.write_int_attribute(ElementKind::Cell, "region", vec![-3, 7])
            .unwrap();
        let bc: Vec<i32> = (0..mesh.facets.nb() as i32).collect();
        mesh.write_int_attribute(ElementKind::Facet, "bc", bc.clone())
            .unwrap();

        let names = AttributeNames::default().with_facet("bc").with_cell("region");
        let handle = export(&kernel, &mesh, KernelKind::Volume, &names).unwrap();
        let back = import(&handle, &names).unwrap();

        assert_eq!(back.read_int_attribute(ElementKind::Cell, "region"), Some(&[-3, 7][..]));
        assert_eq!(back.read_int_attribute(ElementKind::Facet, "bc"), Some(&bc[..]));
        assert!(back.read_int_attribute(ElementKind::Edge, "bc").is_none());
    }

    #[test]
    fn test_single_tetrahedron_scenario() {
        let kernel = CountingKernel::new();
        let mesh = create_tetrahedron();

        // Exported without a cell name, imported with one: every tag is 0.
        let handle = export(&kernel, &mesh, KernelKind::Volume, &AttributeNames::default()).unwrap();
        let back = import(&handle, &AttributeNames::default().with_cell("region")).unwrap();
        drop(handle);

        assert_eq!(back.vertices.nb(), 4);
        assert_eq!(back.facets.nb(), 4);
        assert_eq!(back.cells.nb(), 1);
        assert_eq!(back.cells.get(0), &[0, 1, 2, 3]);
        assert_eq!(back.read_int_attribute(ElementKind::Cell, "region"), Some(&[0][..]));
        assert!((0..4).all(|k| back.cells.adjacent(0, k).is_none()));
        assert!(kernel.balanced());
    }

    #[test]
    #[should_panic(expected = "exceeds point count")]
    fn test_out_of_range_vertex_panics() {
        let kernel = CountingKernel::new();
        let mesh = create_tet_surface();
        let mut handle =
            export(&kernel, &mesh, KernelKind::Surface, &AttributeNames::default()).unwrap();
        handle.data_mut().mesh_mut().tria_mut(1).v[0] = 9;
        let _ = import(&handle, &AttributeNames::default());
    }
}
