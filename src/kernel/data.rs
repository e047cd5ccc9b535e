//! Kernel-side storage: one-based element arrays, the companion field and
//! the tunables.
//!
//! Slot 0 of every array is allocated but never used, so that kernel index
//! `i` addresses `array[i]` directly.

use std::collections::BTreeMap;

use super::{
    CallResult, DParam, FieldKind, IParam, KernelCallError, KernelKind, MeshSize,
};

/// A kernel point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KernelPoint {
    /// Coordinates.
    pub c: [f64; 3],
    /// Reference tag.
    pub tag: i32,
}

/// A kernel edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelEdge {
    /// First vertex (one-based).
    pub a: usize,
    /// Second vertex (one-based).
    pub b: usize,
    /// Reference tag.
    pub tag: i32,
}

/// A kernel triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelTria {
    /// Vertices (one-based).
    pub v: [usize; 3],
    /// Reference tag.
    pub tag: i32,
}

/// A kernel tetrahedron.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelTetra {
    /// Vertices (one-based).
    pub v: [usize; 4],
    /// Reference tag.
    pub tag: i32,
}

#[inline]
fn slot(i: usize, n: usize, what: &str) -> usize {
    assert!(i >= 1 && i <= n, "{what} index {i} out of range 1..={n}");
    i
}

/// One-based mesh arrays with capacity declared once.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelMesh {
    point: Vec<KernelPoint>,
    edge: Vec<KernelEdge>,
    tria: Vec<KernelTria>,
    tetra: Vec<KernelTetra>,
    declared: bool,
}

impl Default for KernelMesh {
    fn default() -> Self {
        Self {
            point: vec![KernelPoint::default()],
            edge: vec![KernelEdge::default()],
            tria: vec![KernelTria::default()],
            tetra: vec![KernelTetra::default()],
            declared: false,
        }
    }
}

impl KernelMesh {
    /// Coordinate dimension; always 3.
    #[inline]
    pub fn dim(&self) -> usize {
        3
    }

    /// Number of points.
    #[inline]
    pub fn nb_points(&self) -> usize {
        self.point.len() - 1
    }

    /// Number of edges.
    #[inline]
    pub fn nb_edges(&self) -> usize {
        self.edge.len() - 1
    }

    /// Number of triangles.
    #[inline]
    pub fn nb_triangles(&self) -> usize {
        self.tria.len() - 1
    }

    /// Number of tetrahedra.
    #[inline]
    pub fn nb_tetrahedra(&self) -> usize {
        self.tetra.len() - 1
    }

    /// Whether sizes have been declared.
    #[inline]
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    /// Point `i` (one-based).
    #[inline]
    pub fn point(&self, i: usize) -> &KernelPoint {
        &self.point[slot(i, self.nb_points(), "point")]
    }

    /// Mutable point `i` (one-based).
    #[inline]
    pub fn point_mut(&mut self, i: usize) -> &mut KernelPoint {
        let i = slot(i, self.nb_points(), "point");
        &mut self.point[i]
    }

    /// Edge `i` (one-based).
    #[inline]
    pub fn edge(&self, i: usize) -> &KernelEdge {
        &self.edge[slot(i, self.nb_edges(), "edge")]
    }

    /// Mutable edge `i` (one-based).
    #[inline]
    pub fn edge_mut(&mut self, i: usize) -> &mut KernelEdge {
        let i = slot(i, self.nb_edges(), "edge");
        &mut self.edge[i]
    }

    /// Triangle `i` (one-based).
    #[inline]
    pub fn tria(&self, i: usize) -> &KernelTria {
        &self.tria[slot(i, self.nb_triangles(), "triangle")]
    }

    /// Mutable triangle `i` (one-based).
    #[inline]
    pub fn tria_mut(&mut self, i: usize) -> &mut KernelTria {
        let i = slot(i, self.nb_triangles(), "triangle");
        &mut self.tria[i]
    }

    /// Tetrahedron `i` (one-based).
    #[inline]
    pub fn tetra(&self, i: usize) -> &KernelTetra {
        &self.tetra[slot(i, self.nb_tetrahedra(), "tetrahedron")]
    }

    /// Mutable tetrahedron `i` (one-based).
    #[inline]
    pub fn tetra_mut(&mut self, i: usize) -> &mut KernelTetra {
        let i = slot(i, self.nb_tetrahedra(), "tetrahedron");
        &mut self.tetra[i]
    }

    /// Append a point; kernel-internal growth. Returns its one-based index.
    pub(crate) fn push_point(&mut self, c: [f64; 3], tag: i32) -> usize {
        self.point.push(KernelPoint { c, tag });
        self.nb_points()
    }

    /// Append a triangle; kernel-internal growth. Returns its one-based index.
    pub(crate) fn push_tria(&mut self, v: [usize; 3], tag: i32) -> usize {
        self.tria.push(KernelTria { v, tag });
        self.nb_triangles()
    }

    fn declare(&mut self, size: MeshSize) {
        self.point = vec![KernelPoint::default(); size.vertices + 1];
        self.edge = vec![KernelEdge::default(); size.edges + 1];
        self.tria = vec![KernelTria::default(); size.triangles + 1];
        self.tetra = vec![KernelTetra::default(); size.tetrahedra + 1];
        self.declared = true;
    }
}

/// One-based per-vertex field of scalars or tensors.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSol {
    kind: FieldKind,
    np: usize,
    m: Vec<f64>,
}

impl Default for KernelSol {
    fn default() -> Self {
        Self {
            kind: FieldKind::Scalar,
            np: 0,
            m: vec![0.0],
        }
    }
}

impl KernelSol {
    /// Scalar or tensor.
    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of vertices carrying a value; 0 means "no field".
    #[inline]
    pub fn np(&self) -> usize {
        self.np
    }

    /// Components per vertex.
    #[inline]
    pub fn size(&self) -> usize {
        self.kind.components()
    }

    /// Value of vertex `i` (one-based).
    #[inline]
    pub fn value(&self, i: usize) -> &[f64] {
        let i = slot(i, self.np, "field");
        let s = self.size();
        &self.m[i * s..(i + 1) * s]
    }

    /// Mutable value of vertex `i` (one-based).
    #[inline]
    pub fn value_mut(&mut self, i: usize) -> &mut [f64] {
        let i = slot(i, self.np, "field");
        let s = self.size();
        &mut self.m[i * s..(i + 1) * s]
    }

    /// Set the scalar value of vertex `i` (one-based).
    #[inline]
    pub fn set_scalar(&mut self, i: usize, value: f64) {
        debug_assert_eq!(self.kind, FieldKind::Scalar);
        self.value_mut(i)[0] = value;
    }

    /// Fill every declared entry with the same value.
    pub fn fill(&mut self, value: f64) {
        let s = self.size();
        for x in &mut self.m[s..] {
            *x = value;
        }
    }

    /// Append a vertex value; kernel-internal growth.
    pub(crate) fn push(&mut self, value: &[f64]) {
        debug_assert_eq!(value.len(), self.size());
        self.m.extend_from_slice(value);
        self.np += 1;
    }

    fn declare(&mut self, np: usize, kind: FieldKind) {
        self.kind = kind;
        self.np = np;
        self.m = vec![0.0; (np + 1) * kind.components()];
    }
}

/// Tunables set through [`super::Kernel::set_iparameter`] and
/// [`super::Kernel::set_dparameter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelParams {
    ints: BTreeMap<IParam, i32>,
    reals: BTreeMap<DParam, f64>,
}

impl KernelParams {
    /// Integer tunable, if set.
    pub fn int(&self, param: IParam) -> Option<i32> {
        self.ints.get(&param).copied()
    }

    /// Integer tunable interpreted as a flag; unset means off.
    pub fn flag(&self, param: IParam) -> bool {
        self.int(param).is_some_and(|v| v != 0)
    }

    /// Floating-point tunable, if set.
    pub fn real(&self, param: DParam) -> Option<f64> {
        self.reals.get(&param).copied()
    }

    /// Set an integer tunable.
    pub fn set_int(&mut self, param: IParam, value: i32) {
        self.ints.insert(param, value);
    }

    /// Set a floating-point tunable.
    pub fn set_real(&mut self, param: DParam, value: f64) {
        self.reals.insert(param, value);
    }
}

/// Everything the kernel owns for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelData {
    kind: KernelKind,
    mesh: KernelMesh,
    sol: KernelSol,
    params: KernelParams,
    hand_given: bool,
}

impl KernelData {
    /// An empty, undeclared mesh and field.
    pub fn new(kind: KernelKind) -> Self {
        Self {
            kind,
            mesh: KernelMesh::default(),
            sol: KernelSol::default(),
            params: KernelParams::default(),
            hand_given: false,
        }
    }

    /// Surface or volume.
    #[inline]
    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    /// The mesh arrays.
    #[inline]
    pub fn mesh(&self) -> &KernelMesh {
        &self.mesh
    }

    /// Mutable mesh arrays.
    #[inline]
    pub fn mesh_mut(&mut self) -> &mut KernelMesh {
        &mut self.mesh
    }

    /// The companion field.
    #[inline]
    pub fn sol(&self) -> &KernelSol {
        &self.sol
    }

    /// Mutable companion field.
    #[inline]
    pub fn sol_mut(&mut self) -> &mut KernelSol {
        &mut self.sol
    }

    /// Mesh and field together, for kernels that update both.
    #[inline]
    pub fn mesh_and_sol_mut(&mut self) -> (&mut KernelMesh, &mut KernelSol) {
        (&mut self.mesh, &mut self.sol)
    }

    /// The tunables.
    #[inline]
    pub fn params(&self) -> &KernelParams {
        &self.params
    }

    /// Mutable tunables.
    #[inline]
    pub fn params_mut(&mut self) -> &mut KernelParams {
        &mut self.params
    }

    /// Whether the mesh was filled directly.
    #[inline]
    pub fn is_hand_given(&self) -> bool {
        self.hand_given
    }

    pub(crate) fn set_hand_given(&mut self, hand_given: bool) {
        self.hand_given = hand_given;
    }

    pub(crate) fn params_mut_for(
        &mut self,
        param: IParam,
    ) -> Result<&mut KernelParams, KernelCallError> {
        if param.is_volume_only() && self.kind == KernelKind::Surface {
            return Err(KernelCallError::new(
                "set_iparameter",
                format!("{param:?} is not available for surface meshes"),
            ));
        }
        Ok(&mut self.params)
    }

    pub(crate) fn declare_mesh(&mut self, size: MeshSize) -> CallResult {
        if self.mesh.is_declared() {
            return Err(KernelCallError::new("set_mesh_size", "mesh size already declared"));
        }
        if self.kind == KernelKind::Surface && size.tetrahedra > 0 {
            return Err(KernelCallError::new(
                "set_mesh_size",
                "surface meshes cannot hold tetrahedra",
            ));
        }
        self.mesh.declare(size);
        Ok(())
    }

    pub(crate) fn declare_sol(&mut self, vertices: usize, kind: FieldKind) -> CallResult {
        if vertices != 0 && vertices != self.mesh.nb_points() {
            return Err(KernelCallError::new(
                "set_sol_size",
                format!(
                    "field declared for {vertices} vertices but mesh has {}",
                    self.mesh.nb_points()
                ),
            ));
        }
        self.sol.declare(vertices, kind);
        Ok(())
    }

    /// Mesh/field agreement and element sanity.
    pub(crate) fn check_consistency(&self) -> CallResult {
        const CALL: &str = "check_mesh_data";
        let mesh = &self.mesh;
        let np = mesh.nb_points();

        if !mesh.is_declared() {
            return Err(KernelCallError::new(CALL, "mesh size was never declared"));
        }
        if self.sol.np() != 0 && self.sol.np() != np {
            return Err(KernelCallError::new(
                CALL,
                format!("field has {} values but mesh has {np} vertices", self.sol.np()),
            ));
        }

        let in_range = |v: usize| v >= 1 && v <= np;
        for i in 1..=mesh.nb_edges() {
            let e = mesh.edge(i);
            if !in_range(e.a) || !in_range(e.b) || e.a == e.b {
                return Err(KernelCallError::new(CALL, format!("edge {i} is invalid")));
            }
        }
        for i in 1..=mesh.nb_triangles() {
            if !valid_simplex(&mesh.tria(i).v, np) {
                return Err(KernelCallError::new(CALL, format!("triangle {i} is invalid")));
            }
        }
        for i in 1..=mesh.nb_tetrahedra() {
            if !valid_simplex(&mesh.tetra(i).v, np) {
                return Err(KernelCallError::new(
                    CALL,
                    format!("tetrahedron {i} is invalid"),
                ));
            }
        }
        Ok(())
    }
}

fn valid_simplex(v: &[usize], np: usize) -> bool {
    v.iter().all(|&i| i >= 1 && i <= np)
        && v.iter()
            .enumerate()
            .all(|(k, a)| v[k + 1..].iter().all(|b| a != b))
}
