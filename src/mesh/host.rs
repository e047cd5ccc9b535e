//! Host mesh data structure.
//!
//! [`HostMesh`] is the caller-side, zero-indexed, dynamically sized mesh: a
//! vertex collection plus edges, facets and cells. Facets and cells are stored
//! as generic polygons / polyhedra (a flat corner array with offsets) so that
//! meshes with quads or hexahedra can be represented; only simplicial facets
//! and cells can be handed to the kernel.
//!
//! Each collection owns an [`AttributeStore`]. Adjacency between facets
//! (across edges) and cells (across triangular faces) is derived data rebuilt
//! by [`HostMesh::connect`] and dropped whenever connectivity is edited.

use nalgebra::Point3;

use super::attributes::{AttributeSink, AttributeSource, AttributeStore, FloatAttribute};
use super::connect;
use crate::error::{ElementKind, Result};

/// The vertex collection: 3D points plus attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertices {
    points: Vec<Point3<f64>>,
    attributes: AttributeStore,
}

impl Vertices {
    /// Number of vertices.
    #[inline]
    pub fn nb(&self) -> usize {
        self.points.len()
    }

    /// Coordinate dimension; always 3.
    #[inline]
    pub fn dimension(&self) -> usize {
        3
    }

    /// Position of vertex `v`.
    #[inline]
    pub fn point(&self, v: usize) -> &Point3<f64> {
        &self.points[v]
    }

    /// Move vertex `v`.
    #[inline]
    pub fn set_point(&mut self, v: usize, p: Point3<f64>) {
        self.points[v] = p;
    }

    /// All vertex positions.
    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Create `n` vertices at the origin. Returns the index of the first one.
    pub fn create_vertices(&mut self, n: usize) -> usize {
        let first = self.points.len();
        self.points.resize(first + n, Point3::origin());
        self.attributes.resize(self.points.len());
        first
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, p: Point3<f64>) -> usize {
        self.points.push(p);
        self.attributes.resize(self.points.len());
        self.points.len() - 1
    }

    /// Vertex attributes.
    #[inline]
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Mutable vertex attributes.
    #[inline]
    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }
}

/// The edge collection: vertex pairs plus attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edges {
    vertices: Vec<[usize; 2]>,
    attributes: AttributeStore,
}

impl Edges {
    /// Number of edges.
    #[inline]
    pub fn nb(&self) -> usize {
        self.vertices.len()
    }

    /// The `k`-th vertex (0 or 1) of edge `e`.
    #[inline]
    pub fn vertex(&self, e: usize, k: usize) -> usize {
        self.vertices[e][k]
    }

    /// Set the `k`-th vertex of edge `e`.
    #[inline]
    pub fn set_vertex(&mut self, e: usize, k: usize, v: usize) {
        self.vertices[e][k] = v;
    }

    /// Both vertices of edge `e`.
    #[inline]
    pub fn get(&self, e: usize) -> [usize; 2] {
        self.vertices[e]
    }

    /// Create `n` edges with zeroed vertices. Returns the index of the first one.
    pub fn create_edges(&mut self, n: usize) -> usize {
        let first = self.vertices.len();
        self.vertices.resize(first + n, [0, 0]);
        self.attributes.resize(self.vertices.len());
        first
    }

    /// Append an edge and return its index.
    pub fn add_edge(&mut self, v0: usize, v1: usize) -> usize {
        self.vertices.push([v0, v1]);
        self.attributes.resize(self.vertices.len());
        self.vertices.len() - 1
    }

    /// Iterate over all edges.
    pub fn iter(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        self.vertices.iter().copied()
    }

    /// Edge attributes.
    #[inline]
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Mutable edge attributes.
    #[inline]
    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }
}

/// A collection of polygons (facets) or polyhedra (cells).
///
/// Elements are stored as a flat corner list; element `e` owns the corners
/// `offsets[e]..offsets[e + 1]`. The simplex size is 3 for facets and 4 for
/// cells. Adjacency has one slot per corner: for facets, slot `k` is the
/// neighbour across the edge `(k, k + 1)`; for tetrahedral cells, slot `k` is
/// the neighbour across the face opposite vertex `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polytopes {
    kind: ElementKind,
    corners: Vec<usize>,
    offsets: Vec<usize>,
    adjacent: Vec<Option<usize>>,
    attributes: AttributeStore,
}

impl Polytopes {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            corners: Vec::new(),
            offsets: vec![0],
            adjacent: Vec::new(),
            attributes: AttributeStore::default(),
        }
    }

    /// The collection kind (facets or cells).
    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Number of vertices of a simplex in this collection.
    #[inline]
    pub fn simplex_size(&self) -> usize {
        match self.kind {
            ElementKind::Cell => 4,
            _ => 3,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn nb(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of vertices of element `e`.
    #[inline]
    pub fn nb_vertices(&self, e: usize) -> usize {
        self.offsets[e + 1] - self.offsets[e]
    }

    /// The `k`-th vertex of element `e`.
    #[inline]
    pub fn vertex(&self, e: usize, k: usize) -> usize {
        debug_assert!(k < self.nb_vertices(e));
        self.corners[self.offsets[e] + k]
    }

    /// Set the `k`-th vertex of element `e`.
    #[inline]
    pub fn set_vertex(&mut self, e: usize, k: usize, v: usize) {
        debug_assert!(k < self.nb_vertices(e));
        self.corners[self.offsets[e] + k] = v;
        self.adjacent.clear();
    }

    /// All vertices of element `e`.
    #[inline]
    pub fn get(&self, e: usize) -> &[usize] {
        &self.corners[self.offsets[e]..self.offsets[e + 1]]
    }

    /// Iterate over all elements.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.offsets
            .windows(2)
            .map(move |w| &self.corners[w[0]..w[1]])
    }

    /// Create `n` simplices (triangles or tetrahedra) with zeroed vertices.
    /// Returns the index of the first one.
    pub fn create_simplices(&mut self, n: usize) -> usize {
        let first = self.nb();
        let size = self.simplex_size();
        self.corners.resize(self.corners.len() + n * size, 0);
        for _ in 0..n {
            let last = self.offsets[self.offsets.len() - 1];
            self.offsets.push(last + size);
        }
        self.adjacent.clear();
        self.attributes.resize(self.nb());
        first
    }

    /// Append an element with arbitrary vertex count and return its index.
    pub fn add(&mut self, vertices: &[usize]) -> usize {
        self.corners.extend_from_slice(vertices);
        self.offsets.push(self.corners.len());
        self.adjacent.clear();
        self.attributes.resize(self.nb());
        self.nb() - 1
    }

    /// Whether every element is a simplex (triangle for facets, tetrahedron
    /// for cells).
    pub fn are_simplices(&self) -> bool {
        let size = self.simplex_size();
        self.offsets.windows(2).all(|w| w[1] - w[0] == size)
    }

    /// Whether adjacency is up to date.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.adjacent.len() == self.corners.len()
    }

    /// The neighbour of element `e` through its local slot `k`, if any.
    ///
    /// Returns `None` on the boundary and when adjacency has not been built.
    #[inline]
    pub fn adjacent(&self, e: usize, k: usize) -> Option<usize> {
        if !self.is_connected() {
            return None;
        }
        self.adjacent[self.offsets[e] + k]
    }

    /// Element attributes.
    #[inline]
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Mutable element attributes.
    #[inline]
    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    pub(crate) fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub(crate) fn set_adjacency(&mut self, adjacent: Vec<Option<usize>>) {
        debug_assert_eq!(adjacent.len(), self.corners.len());
        self.adjacent = adjacent;
    }

    fn clear(&mut self) {
        self.corners.clear();
        self.offsets.truncate(1);
        self.adjacent.clear();
        self.attributes.clear();
    }
}

/// A zero-indexed mesh with vertices, edges, facets and cells.
#[derive(Debug, Clone, PartialEq)]
pub struct HostMesh {
    /// Vertex positions and per-vertex attributes.
    pub vertices: Vertices,
    /// Edges and per-edge attributes.
    pub edges: Edges,
    /// Facets (polygons) and per-facet attributes.
    pub facets: Polytopes,
    /// Cells (polyhedra) and per-cell attributes.
    pub cells: Polytopes,
}

impl Default for HostMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vertices::default(),
            edges: Edges::default(),
            facets: Polytopes::new(ElementKind::Facet),
            cells: Polytopes::new(ElementKind::Cell),
        }
    }

    /// Remove every element and attribute.
    pub fn clear(&mut self) {
        self.vertices = Vertices::default();
        self.edges = Edges::default();
        self.facets.clear();
        self.cells.clear();
    }

    /// Whether the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.nb() == 0
    }

    /// Number of elements in a collection.
    pub fn nb(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Vertex => self.vertices.nb(),
            ElementKind::Edge => self.edges.nb(),
            ElementKind::Facet => self.facets.nb(),
            ElementKind::Cell => self.cells.nb(),
        }
    }

    /// Attributes of a collection.
    pub fn attributes(&self, kind: ElementKind) -> &AttributeStore {
        match kind {
            ElementKind::Vertex => self.vertices.attributes(),
            ElementKind::Edge => self.edges.attributes(),
            ElementKind::Facet => self.facets.attributes(),
            ElementKind::Cell => self.cells.attributes(),
        }
    }

    /// Mutable attributes of a collection.
    pub fn attributes_mut(&mut self, kind: ElementKind) -> &mut AttributeStore {
        match kind {
            ElementKind::Vertex => self.vertices.attributes_mut(),
            ElementKind::Edge => self.edges.attributes_mut(),
            ElementKind::Facet => self.facets.attributes_mut(),
            ElementKind::Cell => self.cells.attributes_mut(),
        }
    }

    /// Rebuild facet-to-facet and cell-to-cell adjacency.
    pub fn connect(&mut self) {
        let facet_adjacency = connect::facet_adjacency(&self.facets);
        self.facets.set_adjacency(facet_adjacency);
        let cell_adjacency = connect::cell_adjacency(&self.cells);
        self.cells.set_adjacency(cell_adjacency);
    }

    /// Compute the axis-aligned bounding box.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.vertices.points().iter();
        let first = iter.next()?;
        let mut min = *first;
        let mut max = *first;
        for p in iter {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }
}

impl AttributeSource for HostMesh {
    fn element_count(&self, kind: ElementKind) -> usize {
        self.nb(kind)
    }

    fn read_int_attribute(&self, kind: ElementKind, name: &str) -> Option<&[i32]> {
        self.attributes(kind).int(name)
    }

    fn read_vertex_field(&self, name: &str) -> Option<&FloatAttribute> {
        self.vertices.attributes().float(name)
    }
}

impl AttributeSink for HostMesh {
    fn write_int_attribute(
        &mut self,
        kind: ElementKind,
        name: &str,
        values: Vec<i32>,
    ) -> Result<()> {
        self.attributes_mut(kind).set_int(kind, name, values)
    }

    fn write_vertex_field(&mut self, name: &str, dimension: usize, values: Vec<f64>) -> Result<()> {
        self.vertices
            .attributes_mut()
            .set_float(ElementKind::Vertex, name, dimension, values)
    }
}
