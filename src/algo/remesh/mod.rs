//! Remeshing and level-set extraction through a [`Kernel`].
//!
//! A [`Remesher`] runs every operation through the same sequence:
//!
//! 1. **Validate** the [`RemeshOptions`] against the input mesh
//! 2. **Export** the mesh into a fresh kernel allocation
//! 3. **Configure** the kernel tunables and companion field
//! 4. **Invoke** the kernel entry point and check its status
//! 5. **Import** the result into a new [`HostMesh`]
//! 6. **Release** the kernel allocation
//!
//! Validation runs before anything is allocated. The allocation is returned
//! to the kernel on every path, and the output mesh is only produced on
//! success.
//!
//! # Example
//!
//! ```
//! use meshbridge::algo::remesh::{RemeshOptions, Remesher};
//! use meshbridge::kernel::ReferenceKernel;
//! use meshbridge::mesh::{boundary_triangles, build_from_tetrahedra};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let tets = [[0, 1, 2, 3]];
//! let mesh = build_from_tetrahedra(&vertices, &tets, &boundary_triangles(&tets)).unwrap();
//!
//! let kernel = ReferenceKernel::new();
//! let options = RemeshOptions::default().with_size_bounds(0.1, 1.0);
//! let out = Remesher::new(&kernel).remesh_volume(&mesh, &options).unwrap();
//! assert_eq!(out.cells.nb(), 1);
//! ```

pub mod options;

use std::fmt;

pub use options::{Operators, RemeshOptions, SizingMode, ValidatedOptions, VolumeModes};

use super::progress::Progress;
use crate::adapter::{export, import, AttributeNames};
use crate::error::{BridgeError, ElementKind, Result};
use crate::kernel::{
    to_kernel_index, DParam, FieldKind, IParam, Kernel, KernelData, KernelHandle, KernelKind,
    KernelStatus,
};
use crate::mesh::{AttributeSink, AttributeSource, FloatAttribute, HostMesh};

/// The kernel operations a [`Remesher`] can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Triangle surface remeshing.
    Surface,
    /// Tetrahedral volume remeshing.
    Volume,
    /// Level-set discretisation in a tetrahedral mesh.
    LevelSet,
}

impl Operation {
    /// The kernel mesh kind the operation works on.
    pub fn kernel_kind(self) -> KernelKind {
        match self {
            Operation::Surface => KernelKind::Surface,
            Operation::Volume | Operation::LevelSet => KernelKind::Volume,
        }
    }

    /// Name of the kernel entry point.
    pub fn entry_point(self) -> &'static str {
        match self {
            Operation::Surface => "remesh_surface",
            Operation::Volume => "remesh_volume",
            Operation::LevelSet => "remesh_levelset",
        }
    }

    fn invoke<K: Kernel + ?Sized>(self, kernel: &K, data: &mut KernelData) -> KernelStatus {
        match self {
            Operation::Surface => kernel.remesh_surface(data),
            Operation::Volume => kernel.remesh_volume(data),
            Operation::LevelSet => kernel.remesh_levelset(data),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Surface => "surface remesh",
            Operation::Volume => "volume remesh",
            Operation::LevelSet => "level-set extraction",
        })
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Options validated, nothing allocated yet.
    Created,
    /// The mesh lives in a kernel allocation.
    Exported,
    /// Tunables and field are set.
    Configured,
    /// The entry point returned.
    KernelInvoked,
    /// The result was copied into a host mesh.
    Imported,
    /// The kernel allocation was returned.
    Released,
    /// The run stopped with an error.
    Failed,
}

impl Stage {
    const STEPS: usize = 5;

    fn step(self) -> usize {
        match self {
            Stage::Created => 0,
            Stage::Exported => 1,
            Stage::Configured => 2,
            Stage::KernelInvoked => 3,
            Stage::Imported => 4,
            Stage::Released | Stage::Failed => 5,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Created => "created",
            Stage::Exported => "exported",
            Stage::Configured => "configured",
            Stage::KernelInvoked => "kernel invoked",
            Stage::Imported => "imported",
            Stage::Released => "released",
            Stage::Failed => "failed",
        })
    }
}

struct Tracker<'p> {
    operation: Operation,
    progress: Option<&'p Progress>,
}

impl Tracker<'_> {
    fn enter(&self, stage: Stage) {
        log::debug!("{}: {}", self.operation, stage);
        if let Some(progress) = self.progress {
            progress.report(stage.step(), Stage::STEPS, &format!("{}: {}", self.operation, stage));
        }
    }
}

/// Runs remeshing operations through a kernel.
pub struct Remesher<'a, K: Kernel + ?Sized> {
    kernel: &'a K,
    progress: Option<&'a Progress>,
}

impl<'a, K: Kernel + ?Sized> Remesher<'a, K> {
    /// Create a remesher driving `kernel`.
    pub fn new(kernel: &'a K) -> Self {
        Self {
            kernel,
            progress: None,
        }
    }

    /// Report each stage to `progress`.
    pub fn with_progress(mut self, progress: &'a Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Remesh a closed triangulated surface.
    ///
    /// Cells of the input are ignored.
    pub fn remesh_surface(&self, mesh: &HostMesh, options: &RemeshOptions) -> Result<HostMesh> {
        self.run(Operation::Surface, mesh, options)
    }

    /// Remesh a tetrahedral volume.
    pub fn remesh_volume(&self, mesh: &HostMesh, options: &RemeshOptions) -> Result<HostMesh> {
        self.run(Operation::Volume, mesh, options)
    }

    /// Discretise the level set `ls_attribute = ls_value` into a tetrahedral
    /// mesh.
    ///
    /// `options.level_set` must be set. The output carries the resulting
    /// field under `ls_attribute`.
    pub fn extract_levelset(&self, mesh: &HostMesh, options: &RemeshOptions) -> Result<HostMesh> {
        self.run(Operation::LevelSet, mesh, options)
    }

    /// Export `mesh` and import it straight back, without invoking the
    /// kernel.
    ///
    /// Useful to check that a mesh survives the conversion unchanged.
    pub fn round_trip_selftest(&self, mesh: &HostMesh, kind: KernelKind) -> Result<HostMesh> {
        let names = AttributeNames::default();
        let handle = export(self.kernel, mesh, kind, &names)?;
        let out = import(&handle, &names)?;
        handle.release();
        log::info!(
            "round trip through {} {} mesh: {} vertices, {} facets, {} cells",
            self.kernel.name(),
            kind,
            out.vertices.nb(),
            out.facets.nb(),
            out.cells.nb()
        );
        Ok(out)
    }

    fn run(&self, operation: Operation, mesh: &HostMesh, options: &RemeshOptions) -> Result<HostMesh> {
        let validated = options.validate(mesh)?;
        match (operation, validated.is_level_set()) {
            (Operation::LevelSet, false) => {
                return Err(BridgeError::InvalidOptionCombination(
                    "level-set extraction requires level_set".into(),
                ))
            }
            (Operation::Surface | Operation::Volume, true) => {
                return Err(BridgeError::InvalidOptionCombination(format!(
                    "level_set is set; {operation} cannot extract a level set"
                )))
            }
            _ => {}
        }

        let tracker = Tracker {
            operation,
            progress: self.progress,
        };
        tracker.enter(Stage::Created);
        let result = self.execute(operation, mesh, &validated, &tracker);
        match &result {
            Ok(out) => log::info!(
                "{} done: {} vertices, {} facets, {} cells",
                operation,
                out.vertices.nb(),
                out.facets.nb(),
                out.cells.nb()
            ),
            Err(err) => {
                tracker.enter(Stage::Failed);
                log::error!("{} failed: {}", operation, err);
            }
        }
        result
    }

    fn execute(
        &self,
        operation: Operation,
        mesh: &HostMesh,
        options: &ValidatedOptions,
        tracker: &Tracker<'_>,
    ) -> Result<HostMesh> {
        let kernel = self.kernel;
        let mut handle = export(kernel, mesh, operation.kernel_kind(), &options.attributes)?;
        tracker.enter(Stage::Exported);

        configure(kernel, &mut handle, mesh, options)?;
        tracker.enter(Stage::Configured);

        let status = operation.invoke(kernel, handle.data_mut());
        tracker.enter(Stage::KernelInvoked);
        if !status.is_success() {
            return Err(BridgeError::KernelOperationFailed {
                operation: operation.entry_point(),
                status,
            });
        }

        let mut out = import(&handle, &options.attributes)?;
        if let SizingMode::LevelSet { attribute, .. } = &options.sizing {
            let sol = handle.sol();
            let values = (1..=sol.np()).map(|i| sol.value(i)[0]).collect();
            out.write_vertex_field(attribute, 1, values)?;
        }
        tracker.enter(Stage::Imported);

        handle.release();
        tracker.enter(Stage::Released);
        Ok(out)
    }
}

fn refused(err: impl fmt::Display) -> BridgeError {
    BridgeError::InvalidOptionCombination(format!("kernel refused option: {err}"))
}

/// Set tunables and fill the companion field.
fn configure<K: Kernel + ?Sized>(
    kernel: &K,
    handle: &mut KernelHandle<'_, K>,
    mesh: &HostMesh,
    options: &ValidatedOptions,
) -> Result<()> {
    let data = handle.data_mut();
    let volume = data.kind() == KernelKind::Volume;
    let np = mesh.vertices.nb();
    let dparam = |data: &mut KernelData, p, v| kernel.set_dparameter(data, p, v).map_err(refused);
    let iparam = |data: &mut KernelData, p, on: bool| {
        kernel.set_iparameter(data, p, i32::from(on)).map_err(refused)
    };

    dparam(data, DParam::AngleDetection, options.angle_value)?;
    if options.field == FieldKind::Tensor {
        kernel.set_sol_size(data, 0, FieldKind::Tensor)?;
    }
    match &options.sizing {
        SizingMode::Bounds { hmin, hmax } | SizingMode::Metric { hmin, hmax, .. } => {
            dparam(data, DParam::Hmin, *hmin)?;
            dparam(data, DParam::Hmax, *hmax)?;
        }
        SizingMode::Uniform(hsiz) => {
            kernel.set_sol_size(data, 0, options.field)?;
            dparam(data, DParam::Hsiz, *hsiz)?;
        }
        SizingMode::LevelSet { .. } => {}
    }
    dparam(data, DParam::Hausd, options.hausd)?;
    dparam(data, DParam::Hgrad, options.hgrad)?;

    let ops = options.operators;
    iparam(data, IParam::Angle, options.angle_detection)?;
    iparam(data, IParam::NoSwap, !ops.swap)?;
    iparam(data, IParam::NoInsert, !ops.insert)?;
    iparam(data, IParam::NoMove, !ops.move_vertices)?;
    if volume {
        let modes = options.volume_modes;
        iparam(data, IParam::NoSurf, !ops.surface)?;
        iparam(data, IParam::Opnbdy, modes.opnbdy)?;
        iparam(data, IParam::Optim, modes.optim)?;
        iparam(data, IParam::OptimLes, modes.optim_les)?;
    }

    match &options.sizing {
        SizingMode::Metric { attribute, .. } => {
            let field = vertex_field(mesh, attribute)?;
            kernel.set_sol_size(data, np, options.field)?;
            fill_metric(data, field, options.field);
        }
        SizingMode::LevelSet { attribute, value } => {
            let field = vertex_field(mesh, attribute)?;
            kernel.set_sol_size(data, np, FieldKind::Scalar)?;
            let sol = data.sol_mut();
            for v in 0..np {
                sol.set_scalar(to_kernel_index(v), field.get(v)[0]);
            }
            iparam(data, IParam::Iso, true)?;
            dparam(data, DParam::Ls, *value)?;
        }
        SizingMode::Bounds { .. } | SizingMode::Uniform(_) => {}
    }
    Ok(())
}

fn vertex_field<'m>(mesh: &'m HostMesh, name: &str) -> Result<&'m FloatAttribute> {
    mesh.read_vertex_field(name)
        .ok_or_else(|| BridgeError::missing_attribute(name, ElementKind::Vertex))
}

/// Copy a size field into the kernel. A scalar size `h` becomes the
/// isotropic tensor `diag(1/h^2)` when the kernel expects tensors.
fn fill_metric(data: &mut KernelData, field: &FloatAttribute, kind: FieldKind) {
    let sol = data.sol_mut();
    for v in 0..sol.np() {
        let src = field.get(v);
        let dst = sol.value_mut(to_kernel_index(v));
        match (kind, src.len()) {
            (FieldKind::Tensor, 1) => {
                let d = 1.0 / (src[0] * src[0]);
                dst.copy_from_slice(&[d, 0.0, 0.0, d, 0.0, d]);
            }
            _ => dst.copy_from_slice(src),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::adapter::fixtures::{create_tet_surface, create_tetrahedron, create_two_tets};
    use crate::kernel::testing::CountingKernel;
    use crate::kernel::{ISO_REF, LS_OUTSIDE_REF};

    fn with_field(mut mesh: HostMesh, name: &str, values: Vec<f64>) -> HostMesh {
        mesh.write_vertex_field(name, 1, values).unwrap();
        mesh
    }

    #[test]
    fn test_surface_remesh() {
        let kernel = CountingKernel::new();
        let mesh = create_tet_surface();
        let out = Remesher::new(&kernel)
            .remesh_surface(&mesh, &RemeshOptions::default())
            .unwrap();
        assert_eq!(out.vertices.points(), mesh.vertices.points());
        assert_eq!(out.facets.nb(), 4);
        assert_eq!(kernel.invocations(), 1);
        assert!(kernel.balanced());
        assert_eq!(kernel.dparam(DParam::Hmin), Some(0.01));
        assert_eq!(kernel.dparam(DParam::Hmax), Some(2.0));
        assert_eq!(kernel.iparam(IParam::Angle), Some(1));
        assert_eq!(kernel.iparam(IParam::Optim), None);
    }

    #[test]
    fn test_volume_remesh_sets_volume_params() {
        let kernel = CountingKernel::new();
        let mesh = create_two_tets();
        let options = RemeshOptions::default()
            .with_nosurf(true)
            .with_volume_modes(true, false, true);
        let out = Remesher::new(&kernel).remesh_volume(&mesh, &options).unwrap();
        assert_eq!(out.cells.nb(), 2);
        assert_eq!(kernel.iparam(IParam::NoSurf), Some(1));
        assert_eq!(kernel.iparam(IParam::Optim), Some(1));
        assert_eq!(kernel.iparam(IParam::OptimLes), Some(0));
        assert_eq!(kernel.iparam(IParam::Opnbdy), Some(1));
        assert!(kernel.balanced());
    }

    #[test]
    fn test_uniform_size_empties_field() {
        let kernel = CountingKernel::with_status(KernelStatus::Success);
        let mesh = create_tetrahedron();
        let options = RemeshOptions::default().with_uniform_size(0.3);
        Remesher::new(&kernel).remesh_volume(&mesh, &options).unwrap();
        assert_eq!(kernel.dparam(DParam::Hsiz), Some(0.3));
        assert_eq!(kernel.dparam(DParam::Hmin), None);
    }

    #[test]
    fn test_metric_is_copied() {
        let kernel = CountingKernel::new();
        let mesh = with_field(create_tetrahedron(), "h", vec![0.1, 0.2, 0.3, 0.4]);
        let options = RemeshOptions::default().with_metric("h");
        let validated = options.validate(&mesh).unwrap();

        let mut handle = export(&kernel, &mesh, KernelKind::Volume, &validated.attributes).unwrap();
        configure(&kernel, &mut handle, &mesh, &validated).unwrap();
        let sol = handle.sol();
        assert_eq!(sol.np(), 4);
        assert_eq!(sol.value(3), &[0.3]);
    }

    #[test]
    fn test_scalar_metric_becomes_tensor() {
        let kernel = CountingKernel::new();
        let mesh = with_field(create_tetrahedron(), "h", vec![0.5; 4]);
        let options = RemeshOptions::default().with_metric("h").with_anisotropy(true);
        let validated = options.validate(&mesh).unwrap();

        let mut handle = export(&kernel, &mesh, KernelKind::Volume, &validated.attributes).unwrap();
        configure(&kernel, &mut handle, &mesh, &validated).unwrap();
        assert_eq!(handle.sol().kind(), FieldKind::Tensor);
        assert_eq!(handle.sol().value(1), &[4.0, 0.0, 0.0, 4.0, 0.0, 4.0]);
        assert_eq!(kernel.remesh_volume(handle.data_mut()), KernelStatus::Success);
    }

    #[test]
    fn test_level_set_extraction() {
        let kernel = CountingKernel::new();
        let mut mesh = with_field(create_tetrahedron(), "phi", vec![-1.0, 1.0, 1.0, 1.0]);
        let options = RemeshOptions::default()
            .with_level_set("phi", 0.0)
            .with_facet_attribute("ref")
            .with_cell_attribute("region");
        mesh.write_int_attribute(ElementKind::Facet, "ref", vec![1; 4])
            .unwrap();
        mesh.write_int_attribute(ElementKind::Cell, "region", vec![0])
            .unwrap();

        let out = Remesher::new(&kernel).extract_levelset(&mesh, &options).unwrap();

        assert_eq!(out.vertices.nb(), 7);
        assert_eq!(out.facets.nb(), 5);
        let refs = out.read_int_attribute(ElementKind::Facet, "ref").unwrap();
        assert_eq!(refs, &[1, 1, 1, 1, ISO_REF]);
        let region = out.read_int_attribute(ElementKind::Cell, "region").unwrap();
        assert_eq!(region, &[LS_OUTSIDE_REF]);
        let phi = out.read_vertex_field("phi").unwrap();
        assert_eq!(phi.values().len(), 7);
        assert_eq!(phi.get(0), &[-1.0]);
        assert!(phi.values()[4..].iter().all(|v| v.abs() < 1e-12));
        assert!(kernel.balanced());
    }

    #[test]
    fn test_level_set_forces_operator_flags() {
        let kernel = CountingKernel::new();
        let mesh = with_field(create_tetrahedron(), "phi", vec![-1.0, 1.0, 1.0, 1.0]);
        let options = RemeshOptions::default().with_level_set("phi", 0.25);
        Remesher::new(&kernel).extract_levelset(&mesh, &options).unwrap();

        assert_eq!(kernel.iparam(IParam::NoInsert), Some(1));
        assert_eq!(kernel.iparam(IParam::NoMove), Some(1));
        assert_eq!(kernel.iparam(IParam::NoSurf), Some(1));
        assert_eq!(kernel.iparam(IParam::Iso), Some(1));
        assert_eq!(kernel.dparam(DParam::Ls), Some(0.25));
    }

    #[test]
    fn test_operation_mode_mismatch() {
        let kernel = CountingKernel::new();
        let mesh = with_field(create_tetrahedron(), "phi", vec![-1.0, 1.0, 1.0, 1.0]);
        let remesher = Remesher::new(&kernel);

        let ls = RemeshOptions::default().with_level_set("phi", 0.0);
        assert!(matches!(
            remesher.remesh_volume(&mesh, &ls),
            Err(BridgeError::InvalidOptionCombination(_))
        ));
        assert!(matches!(
            remesher.extract_levelset(&mesh, &RemeshOptions::default()),
            Err(BridgeError::InvalidOptionCombination(_))
        ));
        assert_eq!(kernel.allocs(), 0);
    }

    #[test]
    fn test_invalid_options_never_allocate() {
        let kernel = CountingKernel::new();
        let mesh = create_tetrahedron();
        let remesher = Remesher::new(&kernel);
        let bad = [
            RemeshOptions::default().with_metric("missing"),
            RemeshOptions::default().with_size_bounds(1.0, 0.1),
            RemeshOptions::default()
                .with_level_set("phi", 0.0)
                .with_uniform_size(0.2),
        ];
        for options in &bad {
            assert!(remesher.remesh_volume(&mesh, options).is_err());
        }
        assert_eq!(kernel.allocs(), 0);
        assert_eq!(kernel.invocations(), 0);
    }

    #[test]
    fn test_release_on_every_failure() {
        let mesh = create_tetrahedron();
        let options = RemeshOptions::default();

        // Missing tag attribute: rejected before allocation.
        let kernel = CountingKernel::new();
        let err = Remesher::new(&kernel)
            .remesh_volume(&mesh, &options.clone().with_cell_attribute("nope"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::AttributeNotFound { .. }));
        assert_eq!(kernel.allocs(), 0);

        // Consistency check.
        let kernel = CountingKernel::failing_check();
        let err = Remesher::new(&kernel).remesh_volume(&mesh, &options).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidMeshForKernel { .. }));
        assert_eq!((kernel.allocs(), kernel.frees()), (1, 1));

        // Configuration.
        let kernel = CountingKernel::failing_parameters();
        let err = Remesher::new(&kernel).remesh_volume(&mesh, &options).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOptionCombination(_)));
        assert_eq!(kernel.invocations(), 0);
        assert_eq!((kernel.allocs(), kernel.frees()), (1, 1));

        // Kernel status.
        let kernel = CountingKernel::with_status(KernelStatus::LowFailure);
        let err = Remesher::new(&kernel).remesh_volume(&mesh, &options).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::KernelOperationFailed {
                operation: "remesh_volume",
                status: KernelStatus::LowFailure
            }
        ));
        assert_eq!((kernel.allocs(), kernel.frees()), (1, 1));
    }

    #[test]
    fn test_missing_metric_at_configure_releases() {
        let kernel = CountingKernel::new();
        let sized = with_field(create_tetrahedron(), "h", vec![0.1; 4]);
        let validated = RemeshOptions::default().with_metric("h").validate(&sized).unwrap();
        assert!(matches!(validated.sizing, SizingMode::Metric { .. }));

        // Same topology, but the size field is gone by the time it is copied.
        let bare = create_tetrahedron();
        {
            let mut handle = export(&kernel, &bare, KernelKind::Volume, &validated.attributes).unwrap();
            let err = configure(&kernel, &mut handle, &bare, &validated).unwrap_err();
            assert!(matches!(
                err,
                BridgeError::AttributeNotFound { ref name, collection: ElementKind::Vertex } if name == "h"
            ));
        }
        assert_eq!(kernel.allocs(), 1);
        assert!(kernel.balanced());
        assert_eq!(kernel.invocations(), 0);
    }

    #[test]
    fn test_round_trip_selftest() {
        let kernel = CountingKernel::new();
        let mesh = create_two_tets();
        let out = Remesher::new(&kernel)
            .round_trip_selftest(&mesh, KernelKind::Volume)
            .unwrap();
        assert_eq!(out.vertices.points(), mesh.vertices.points());
        assert!(out.cells.iter().eq(mesh.cells.iter()));
        assert!(out.facets.iter().eq(mesh.facets.iter()));
        assert_eq!(kernel.invocations(), 0);
        assert!(kernel.balanced());
    }

    #[test]
    fn test_progress_stages() {
        let kernel = CountingKernel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |step, total, _| sink.lock().unwrap().push((step, total)));

        Remesher::new(&kernel)
            .with_progress(&progress)
            .remesh_surface(&create_tet_surface(), &RemeshOptions::default())
            .unwrap();
        let steps: Vec<usize> = seen.lock().unwrap().iter().map(|&(s, _)| s).collect();
        assert_eq!(steps, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_progress_reports_failure() {
        let kernel = CountingKernel::with_status(KernelStatus::StrongFailure);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |_, _, msg| sink.lock().unwrap().push(msg.to_string()));

        let result = Remesher::new(&kernel)
            .with_progress(&progress)
            .remesh_surface(&create_tet_surface(), &RemeshOptions::default());
        assert!(result.is_err());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().map(String::as_str), Some("surface remesh: failed"));
        assert!(kernel.balanced());
    }
}
