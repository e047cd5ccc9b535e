//! Host mesh data structures.
//!
//! This module provides the caller-side mesh representation consumed and
//! produced by the kernel adapter.
//!
//! # Overview
//!
//! The primary type is [`HostMesh`]: four zero-indexed collections (vertices,
//! edges, facets, cells), each with its own [`AttributeStore`] of named
//! attributes. Facets and cells are general polygons / polyhedra; only
//! triangles and tetrahedra can cross into the kernel.
//!
//! # Construction
//!
//! ```
//! use meshbridge::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert!(mesh.facets.are_simplices());
//! ```

mod attributes;
mod builder;
mod connect;
mod host;

pub use attributes::{
    AttributeSink, AttributeSource, AttributeStore, FloatAttribute, TENSOR_COMPONENTS,
};
pub use builder::{boundary_triangles, build_from_tetrahedra, build_from_triangles};
pub use host::{Edges, HostMesh, Polytopes, Vertices};

pub use crate::error::ElementKind;
