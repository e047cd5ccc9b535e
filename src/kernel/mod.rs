//! The remeshing kernel boundary.
//!
//! The kernel is an opaque library driven through a fixed, C-like call
//! sequence: allocate a mesh and its companion field, declare their sizes,
//! fill the one-based element arrays, set tunables keyed by a fixed
//! enumeration, run a consistency check, invoke an entry point that returns a
//! status code, read the arrays back, and free everything.
//!
//! [`Kernel`] is that call sequence as a trait. The storage-level calls have
//! provided implementations operating on [`KernelData`]; an implementation
//! only has to supply the three entry points. [`ReferenceKernel`] is the
//! pure-Rust implementation shipped with the crate.
//!
//! Ownership of a [`KernelData`] is always held by a [`KernelHandle`], which
//! returns it to [`Kernel::free`] exactly once.

mod data;
mod handle;
pub mod index;
mod levelset;
mod reference;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

use thiserror::Error;

pub use data::{
    KernelData, KernelEdge, KernelMesh, KernelParams, KernelPoint, KernelSol, KernelTetra,
    KernelTria,
};
pub use handle::KernelHandle;
pub use index::{from_kernel_index, to_kernel_index};
pub use levelset::{ISO_REF, LS_INSIDE_REF, LS_OUTSIDE_REF};
pub use reference::ReferenceKernel;

/// Which family of kernel entry points a mesh is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// Triangulated surfaces (no tetrahedra).
    Surface,
    /// Tetrahedral volumes with optional boundary triangles and edges.
    Volume,
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelKind::Surface => f.write_str("surface"),
            KernelKind::Volume => f.write_str("volume"),
        }
    }
}

/// Status code returned by the kernel entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelStatus {
    /// The operation completed.
    Success,
    /// The operation stopped early; the mesh is conforming but not remeshed.
    LowFailure,
    /// The operation failed; the mesh must not be used.
    StrongFailure,
}

impl KernelStatus {
    /// Whether the status signals success.
    #[inline]
    pub fn is_success(self) -> bool {
        self == KernelStatus::Success
    }

    /// The numeric code of the status.
    pub fn code(self) -> i32 {
        match self {
            KernelStatus::Success => 0,
            KernelStatus::LowFailure => 1,
            KernelStatus::StrongFailure => 2,
        }
    }
}

impl fmt::Display for KernelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KernelStatus::Success => "success",
            KernelStatus::LowFailure => "low failure",
            KernelStatus::StrongFailure => "strong failure",
        };
        write!(f, "{} ({})", self.code(), name)
    }
}

/// Representation of the companion field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// One value per vertex.
    Scalar,
    /// A symmetric 3x3 tensor per vertex, stored as six components.
    Tensor,
}

impl FieldKind {
    /// Number of components per vertex.
    #[inline]
    pub fn components(self) -> usize {
        match self {
            FieldKind::Scalar => 1,
            FieldKind::Tensor => 6,
        }
    }
}

/// Element counts declared once per kernel mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshSize {
    /// Number of points.
    pub vertices: usize,
    /// Number of edges.
    pub edges: usize,
    /// Number of triangles.
    pub triangles: usize,
    /// Number of tetrahedra (must be 0 for surface meshes).
    pub tetrahedra: usize,
}

/// Integer tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IParam {
    /// Sharp-feature detection on (1) or off (0).
    Angle,
    /// Disable point insertion and collapse.
    NoInsert,
    /// Disable edge and face swaps.
    NoSwap,
    /// Disable point relocation.
    NoMove,
    /// Disable surface modifications (volume only).
    NoSurf,
    /// Mesh optimisation at constant size (volume only).
    Optim,
    /// Strong mesh optimisation for LES computations (volume only).
    OptimLes,
    /// Preserve open boundaries inside the volume (volume only).
    Opnbdy,
    /// Level-set discretisation mode.
    Iso,
}

impl IParam {
    /// Whether the parameter only exists for volume meshes.
    pub fn is_volume_only(self) -> bool {
        matches!(
            self,
            IParam::NoSurf | IParam::Optim | IParam::OptimLes | IParam::Opnbdy
        )
    }
}

/// Floating-point tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DParam {
    /// Dihedral threshold for sharp-feature detection, in degrees.
    AngleDetection,
    /// Minimal edge size.
    Hmin,
    /// Maximal edge size.
    Hmax,
    /// Uniform edge size.
    Hsiz,
    /// Hausdorff distance bound.
    Hausd,
    /// Size gradation.
    Hgrad,
    /// Level-set threshold.
    Ls,
}

/// A storage-level kernel call was refused.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{call}: {reason}")]
pub struct KernelCallError {
    /// The call that failed.
    pub call: &'static str,
    /// Why it failed.
    pub reason: String,
}

impl KernelCallError {
    pub(crate) fn new(call: &'static str, reason: impl Into<String>) -> Self {
        Self {
            call,
            reason: reason.into(),
        }
    }
}

/// Result of a storage-level kernel call.
pub type CallResult = std::result::Result<(), KernelCallError>;

/// The kernel API.
///
/// Methods take `&self`: a kernel is a stateless library, all per-operation
/// state lives in the [`KernelData`] owned by a [`KernelHandle`].
pub trait Kernel {
    /// A short name used in log messages.
    fn name(&self) -> &str {
        "kernel"
    }

    /// Allocate an empty mesh and companion field.
    fn alloc(&self, kind: KernelKind) -> KernelData {
        KernelData::new(kind)
    }

    /// Free a mesh and companion field previously returned by [`Kernel::alloc`].
    fn free(&self, data: KernelData) {
        drop(data);
    }

    /// Declare the element counts. May only be called once per allocation.
    fn set_mesh_size(&self, data: &mut KernelData, size: MeshSize) -> CallResult {
        data.declare_mesh(size)
    }

    /// Declare the companion field. `vertices` must be 0 or the mesh vertex count.
    fn set_sol_size(&self, data: &mut KernelData, vertices: usize, kind: FieldKind) -> CallResult {
        data.declare_sol(vertices, kind)
    }

    /// Set an integer tunable.
    fn set_iparameter(&self, data: &mut KernelData, param: IParam, value: i32) -> CallResult {
        data.params_mut_for(param)?.set_int(param, value);
        Ok(())
    }

    /// Set a floating-point tunable.
    fn set_dparameter(&self, data: &mut KernelData, param: DParam, value: f64) -> CallResult {
        data.params_mut().set_real(param, value);
        Ok(())
    }

    /// Verify that mesh and field are consistent.
    fn check_mesh_data(&self, data: &KernelData) -> CallResult {
        data.check_consistency()
    }

    /// Mark the mesh as filled directly rather than through per-element calls.
    fn set_hand_given_mesh(&self, data: &mut KernelData) {
        data.set_hand_given(true);
    }

    /// Remesh a surface mesh.
    fn remesh_surface(&self, data: &mut KernelData) -> KernelStatus;

    /// Remesh a volume mesh.
    fn remesh_volume(&self, data: &mut KernelData) -> KernelStatus;

    /// Discretise the level set carried by the companion field.
    fn remesh_levelset(&self, data: &mut KernelData) -> KernelStatus;
}
