//! Conversion between a [`HostMesh`](crate::mesh::HostMesh) and kernel
//! storage.
//!
//! [`export`] copies vertices, edges, triangles and (for volume meshes)
//! tetrahedra into a freshly allocated kernel mesh, shifting every index by
//! one and copying the requested integer attributes into the reference tags.
//! [`import`] performs the inverse and rebuilds adjacency on the result.
//!
//! ```
//! use meshbridge::adapter::{export, import, AttributeNames};
//! use meshbridge::kernel::{KernelKind, ReferenceKernel};
//! use meshbridge::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//!
//! let kernel = ReferenceKernel::new();
//! let names = AttributeNames::default();
//! let handle = export(&kernel, &mesh, KernelKind::Surface, &names).unwrap();
//! assert_eq!(handle.mesh().tria(1).v, [1, 2, 3]);
//!
//! let back = import(&handle, &names).unwrap();
//! assert_eq!(back.facets.get(0), &[0, 1, 2]);
//! ```

mod export;
mod import;

pub use export::export;
pub use import::import;

/// Names of the integer attributes mapped onto kernel reference tags.
///
/// `None` means no attribute is copied: tags are exported as `0` and nothing
/// is written back on import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeNames {
    /// Edge attribute.
    pub edge: Option<String>,
    /// Facet (triangle) attribute.
    pub facet: Option<String>,
    /// Cell (tetrahedron) attribute.
    pub cell: Option<String>,
}

impl AttributeNames {
    /// Map the edge attribute `name`.
    pub fn with_edge(mut self, name: impl Into<String>) -> Self {
        self.edge = Some(name.into());
        self
    }

    /// Map the facet attribute `name`.
    pub fn with_facet(mut self, name: impl Into<String>) -> Self {
        self.facet = Some(name.into());
        self
    }

    /// Map the cell attribute `name`.
    pub fn with_cell(mut self, name: impl Into<String>) -> Self {
        self.cell = Some(name.into());
        self
    }
}
