//! # Meshbridge
//!
//! A bidirectional adapter between a zero-indexed host mesh model and a
//! one-indexed tetrahedral remeshing kernel.
//!
//! Meshbridge moves meshes into the kernel's storage, configures its
//! tunables from a validated set of options, runs one of its entry points
//! and reads the result back, carrying element tags and per-vertex fields
//! across in both directions.
//!
//! ## Features
//!
//! - **Host mesh model**: vertices, edges, polygonal facets and polyhedral
//!   cells, each with named integer and float attributes
//! - **Kernel adapter**: index translation, tag transfer and scoped ownership
//!   of the kernel allocation
//! - **Operations**: surface remeshing, volume remeshing and level-set
//!   extraction, plus a round-trip self-test
//! - **File formats**: Medit `.mesh` and PLY
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshbridge::prelude::*;
//!
//! let mesh = meshbridge::io::load("part.mesh").unwrap();
//!
//! let kernel = ReferenceKernel::new();
//! let options = RemeshOptions::default()
//!     .with_size_bounds(0.01, 0.5)
//!     .with_cell_attribute("region");
//! let remeshed = Remesher::new(&kernel).remesh_volume(&mesh, &options).unwrap();
//!
//! meshbridge::io::save(&remeshed, "part.out.mesh").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use meshbridge::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.vertices.nb(), 4);
//! assert_eq!(mesh.facets.nb(), 4);
//!
//! // Every edge of a closed surface has a neighbour across it.
//! assert!((0..4).all(|f| (0..3).all(|k| mesh.facets.adjacent(f, k).is_some())));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod algo;
pub mod error;
pub mod io;
pub mod kernel;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use meshbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapter::AttributeNames;
    pub use crate::algo::progress::Progress;
    pub use crate::algo::remesh::{RemeshOptions, Remesher, SizingMode};
    pub use crate::error::{BridgeError, ElementKind, Result};
    pub use crate::kernel::{Kernel, KernelKind, KernelStatus, ReferenceKernel};
    pub use crate::mesh::{
        boundary_triangles, build_from_tetrahedra, build_from_triangles, AttributeSink,
        AttributeSource, HostMesh,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let tets = [[0, 1, 2, 3]];
        let mesh = build_from_tetrahedra(&vertices, &tets, &boundary_triangles(&tets)).unwrap();

        assert_eq!(mesh.vertices.nb(), 4);
        assert_eq!(mesh.facets.nb(), 4);
        assert_eq!(mesh.cells.nb(), 1);
        assert!(mesh.facets.are_simplices());
        assert!(mesh.cells.are_simplices());

        let kernel = ReferenceKernel::new();
        let out = Remesher::new(&kernel)
            .round_trip_selftest(&mesh, KernelKind::Volume)
            .unwrap();
        assert_eq!(out.vertices.points(), mesh.vertices.points());
        assert!(out.cells.iter().eq(mesh.cells.iter()));
    }
}
