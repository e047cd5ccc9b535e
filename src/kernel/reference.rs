//! Pure-Rust kernel.
//!
//! Remeshing is a conforming pass-through: the geometry is kept and the call
//! succeeds when the mesh, field and tunables satisfy the kernel contracts.
//! Level-set discretisation is implemented for real by marching tetrahedra.

use nalgebra::Matrix3;

use super::{
    levelset, DParam, FieldKind, IParam, Kernel, KernelData, KernelKind, KernelSol, KernelStatus,
};

/// The kernel shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernel;

impl ReferenceKernel {
    /// Create the kernel.
    pub fn new() -> Self {
        Self
    }

    fn run(
        &self,
        operation: &str,
        data: &mut KernelData,
        body: impl FnOnce(&mut KernelData) -> Result<(), String>,
    ) -> KernelStatus {
        match body(data) {
            Ok(()) => {
                let mesh = data.mesh();
                log::debug!(
                    "{}: {} done ({} points, {} triangles, {} tetrahedra)",
                    self.name(),
                    operation,
                    mesh.nb_points(),
                    mesh.nb_triangles(),
                    mesh.nb_tetrahedra()
                );
                KernelStatus::Success
            }
            Err(reason) => {
                log::error!("{}: {} failed: {}", self.name(), operation, reason);
                KernelStatus::StrongFailure
            }
        }
    }
}

fn expect_kind(data: &KernelData, kind: KernelKind) -> Result<(), String> {
    if data.kind() != kind {
        return Err(format!("expected a {} mesh, got a {} mesh", kind, data.kind()));
    }
    Ok(())
}

fn check_params(data: &KernelData) -> Result<(), String> {
    let params = data.params();
    let real = |p| params.real(p);

    if let Some(hmin) = real(DParam::Hmin) {
        if !(hmin > 0.0) {
            return Err(format!("hmin must be positive, got {hmin}"));
        }
    }
    if let (Some(hmin), Some(hmax)) = (real(DParam::Hmin), real(DParam::Hmax)) {
        if hmax < hmin {
            return Err(format!("hmax ({hmax}) is smaller than hmin ({hmin})"));
        }
    }
    if let Some(hsiz) = real(DParam::Hsiz) {
        if !(hsiz > 0.0) {
            return Err(format!("hsiz must be positive, got {hsiz}"));
        }
    }
    if let Some(hausd) = real(DParam::Hausd) {
        if !(hausd > 0.0) {
            return Err(format!("hausd must be positive, got {hausd}"));
        }
    }
    if let Some(hgrad) = real(DParam::Hgrad) {
        if hgrad != -1.0 && !(hgrad >= 1.0) {
            return Err(format!("hgrad must be at least 1 or -1, got {hgrad}"));
        }
    }
    if let Some(angle) = real(DParam::AngleDetection) {
        if !(0.0..=180.0).contains(&angle) {
            return Err(format!("angle detection must lie in [0, 180], got {angle}"));
        }
    }
    Ok(())
}

/// A size field must be positive: scalars strictly, tensors definite.
fn check_metric(sol: &KernelSol) -> Result<(), String> {
    for i in 1..=sol.np() {
        let m = sol.value(i);
        let ok = match sol.kind() {
            FieldKind::Scalar => m[0].is_finite() && m[0] > 0.0,
            FieldKind::Tensor => Matrix3::new(
                m[0], m[1], m[2], //
                m[1], m[3], m[4], //
                m[2], m[4], m[5],
            )
            .cholesky()
            .is_some(),
        };
        if !ok {
            return Err(format!("metric at vertex {i} is not positive"));
        }
    }
    Ok(())
}

impl Kernel for ReferenceKernel {
    fn name(&self) -> &str {
        "reference"
    }

    fn remesh_surface(&self, data: &mut KernelData) -> KernelStatus {
        self.run("surface remesh", data, |data| {
            expect_kind(data, KernelKind::Surface)?;
            check_params(data)?;
            data.check_consistency().map_err(|e| e.to_string())?;
            check_metric(data.sol())
        })
    }

    fn remesh_volume(&self, data: &mut KernelData) -> KernelStatus {
        self.run("volume remesh", data, |data| {
            expect_kind(data, KernelKind::Volume)?;
            check_params(data)?;
            if !data.is_hand_given() {
                data.check_consistency().map_err(|e| e.to_string())?;
            }
            if data.mesh().nb_tetrahedra() == 0 {
                return Err("mesh has no tetrahedra".to_string());
            }
            check_metric(data.sol())
        })
    }

    fn remesh_levelset(&self, data: &mut KernelData) -> KernelStatus {
        self.run("level-set discretisation", data, |data| {
            expect_kind(data, KernelKind::Volume)?;
            if !data.params().flag(IParam::Iso) {
                return Err("level-set mode is not enabled".to_string());
            }
            check_params(data)?;
            let (np, ne) = (data.mesh().nb_points(), data.mesh().nb_tetrahedra());
            let sol = data.sol();
            if sol.kind() != FieldKind::Scalar || sol.np() != np {
                return Err(format!(
                    "level set needs one scalar per vertex ({np}), got {} values",
                    sol.np()
                ));
            }
            if ne == 0 {
                return Err("mesh has no tetrahedra".to_string());
            }
            let iso = data.params().real(DParam::Ls).unwrap_or(0.0);
            let (mesh, sol) = data.mesh_and_sol_mut();
            let n = levelset::discretize(mesh, sol, iso);
            log::debug!("level set {iso}: {n} iso-surface triangles");
            Ok(())
        })
    }
}
