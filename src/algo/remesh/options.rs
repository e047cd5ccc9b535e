//! Remeshing options and their validation.
//!
//! [`RemeshOptions`] is the flat, user-facing parameter set. Before anything
//! is allocated in the kernel it is resolved by [`RemeshOptions::validate`]
//! into [`ValidatedOptions`], where the mutually exclusive ways of
//! prescribing the mesh size collapse into a single [`SizingMode`].

use crate::adapter::AttributeNames;
use crate::error::{BridgeError, ElementKind, Result};
use crate::kernel::FieldKind;
use crate::mesh::{AttributeSource, TENSOR_COMPONENTS};

/// Options for surface remeshing, volume remeshing and level-set extraction.
///
/// Sizes are absolute (in mesh units).
///
/// # Example
///
/// ```
/// use meshbridge::algo::remesh::RemeshOptions;
///
/// let options = RemeshOptions::default()
///     .with_size_bounds(0.05, 0.5)
///     .with_hausd(0.001)
///     .with_noswap(true);
/// assert_eq!(options.hmax, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RemeshOptions {
    /// Detect sharp features.
    pub angle_detection: bool,
    /// Dihedral angle threshold for sharp features, in degrees.
    pub angle_value: f64,
    /// Maximal Hausdorff distance between input and output surfaces.
    pub hausd: f64,
    /// Uniform target edge size; `0` means use `hmin` / `hmax`.
    pub hsiz: f64,
    /// Minimal edge size.
    pub hmin: f64,
    /// Maximal edge size.
    pub hmax: f64,
    /// Maximal ratio between the sizes of adjacent edges.
    pub hgrad: f64,
    /// Use a tensor (anisotropic) size field.
    pub enable_anisotropy: bool,
    /// Disable point insertion and collapse.
    pub noinsert: bool,
    /// Disable edge and face swaps.
    pub noswap: bool,
    /// Disable point relocation.
    pub nomove: bool,
    /// Disable surface modifications (volume only).
    pub nosurf: bool,
    /// Optimise the mesh at constant size (volume only).
    pub optim: bool,
    /// Strong optimisation for LES computations (volume only).
    pub optim_les: bool,
    /// Preserve open boundaries inside the volume (volume only).
    pub opnbdy: bool,
    /// Per-vertex size field.
    pub metric_attribute: Option<String>,
    /// Extract the level set of `ls_attribute` instead of remeshing.
    pub level_set: bool,
    /// Per-vertex scalar field whose level set is extracted.
    pub ls_attribute: Option<String>,
    /// Level-set threshold.
    pub ls_value: f64,
    /// Integer edge attribute carried through as reference tags.
    pub edge_attribute: Option<String>,
    /// Integer facet attribute carried through as reference tags.
    pub facet_attribute: Option<String>,
    /// Integer cell attribute carried through as reference tags.
    pub cell_attribute: Option<String>,
}

impl Default for RemeshOptions {
    fn default() -> Self {
        Self {
            angle_detection: true,
            angle_value: 45.0,
            hausd: 0.01,
            hsiz: 0.0,
            hmin: 0.01,
            hmax: 2.0,
            hgrad: 1.105171,
            enable_anisotropy: false,
            noinsert: false,
            noswap: false,
            nomove: false,
            nosurf: false,
            optim: false,
            optim_les: false,
            opnbdy: false,
            metric_attribute: None,
            level_set: false,
            ls_attribute: None,
            ls_value: 0.0,
            edge_attribute: None,
            facet_attribute: None,
            cell_attribute: None,
        }
    }
}

impl RemeshOptions {
    /// Set sharp-feature detection and its angle threshold (degrees).
    pub fn with_angle_detection(mut self, enabled: bool, angle: f64) -> Self {
        self.angle_detection = enabled;
        self.angle_value = angle;
        self
    }

    /// Set the Hausdorff distance bound.
    pub fn with_hausd(mut self, hausd: f64) -> Self {
        self.hausd = hausd;
        self
    }

    /// Request a uniform edge size.
    pub fn with_uniform_size(mut self, hsiz: f64) -> Self {
        self.hsiz = hsiz;
        self
    }

    /// Set the minimal and maximal edge sizes.
    pub fn with_size_bounds(mut self, hmin: f64, hmax: f64) -> Self {
        self.hmin = hmin;
        self.hmax = hmax;
        self
    }

    /// Set the gradation.
    pub fn with_hgrad(mut self, hgrad: f64) -> Self {
        self.hgrad = hgrad;
        self
    }

    /// Use a tensor size field.
    pub fn with_anisotropy(mut self, enabled: bool) -> Self {
        self.enable_anisotropy = enabled;
        self
    }

    /// Disable point insertion and collapse.
    pub fn with_noinsert(mut self, noinsert: bool) -> Self {
        self.noinsert = noinsert;
        self
    }

    /// Disable swaps.
    pub fn with_noswap(mut self, noswap: bool) -> Self {
        self.noswap = noswap;
        self
    }

    /// Disable point relocation.
    pub fn with_nomove(mut self, nomove: bool) -> Self {
        self.nomove = nomove;
        self
    }

    /// Disable surface modifications (volume only).
    pub fn with_nosurf(mut self, nosurf: bool) -> Self {
        self.nosurf = nosurf;
        self
    }

    /// Set the volume-only optimisation modes.
    pub fn with_volume_modes(mut self, optim: bool, optim_les: bool, opnbdy: bool) -> Self {
        self.optim = optim;
        self.optim_les = optim_les;
        self.opnbdy = opnbdy;
        self
    }

    /// Drive sizes from the vertex attribute `name`.
    pub fn with_metric(mut self, name: impl Into<String>) -> Self {
        self.metric_attribute = Some(name.into());
        self
    }

    /// Extract the level set `name = value`.
    pub fn with_level_set(mut self, name: impl Into<String>, value: f64) -> Self {
        self.level_set = true;
        self.ls_attribute = Some(name.into());
        self.ls_value = value;
        self
    }

    /// Carry the integer edge attribute `name` through the kernel.
    pub fn with_edge_attribute(mut self, name: impl Into<String>) -> Self {
        self.edge_attribute = Some(name.into());
        self
    }

    /// Carry the integer facet attribute `name` through the kernel.
    pub fn with_facet_attribute(mut self, name: impl Into<String>) -> Self {
        self.facet_attribute = Some(name.into());
        self
    }

    /// Carry the integer cell attribute `name` through the kernel.
    pub fn with_cell_attribute(mut self, name: impl Into<String>) -> Self {
        self.cell_attribute = Some(name.into());
        self
    }

    /// The attribute names mapped onto reference tags.
    pub fn attribute_names(&self) -> AttributeNames {
        AttributeNames {
            edge: self.edge_attribute.clone(),
            facet: self.facet_attribute.clone(),
            cell: self.cell_attribute.clone(),
        }
    }

    /// Check the options against `mesh` and resolve the sizing mode.
    ///
    /// Only reads the mesh; never touches a kernel.
    pub fn validate(&self, mesh: &impl AttributeSource) -> Result<ValidatedOptions> {
        self.check_numbers()?;

        let (sizing, field) = if self.level_set {
            self.resolve_level_set(mesh)?
        } else if let Some(name) = &self.metric_attribute {
            self.resolve_metric(mesh, name)?
        } else {
            let field = if self.enable_anisotropy {
                FieldKind::Tensor
            } else {
                FieldKind::Scalar
            };
            let sizing = if self.hsiz != 0.0 {
                SizingMode::Uniform(self.hsiz)
            } else {
                SizingMode::Bounds {
                    hmin: self.hmin,
                    hmax: self.hmax,
                }
            };
            (sizing, field)
        };

        let operators = if self.level_set {
            Operators {
                insert: false,
                swap: !self.noswap,
                move_vertices: false,
                surface: false,
            }
        } else {
            Operators {
                insert: !self.noinsert,
                swap: !self.noswap,
                move_vertices: !self.nomove,
                surface: !self.nosurf,
            }
        };

        Ok(ValidatedOptions {
            sizing,
            field,
            operators,
            volume_modes: VolumeModes {
                optim: self.optim,
                optim_les: self.optim_les,
                opnbdy: self.opnbdy,
            },
            angle_detection: self.angle_detection,
            angle_value: self.angle_value,
            hausd: self.hausd,
            hgrad: self.hgrad,
            attributes: self.attribute_names(),
        })
    }

    fn check_numbers(&self) -> Result<()> {
        if !(self.hmin > 0.0) {
            return Err(BridgeError::invalid_param("hmin", self.hmin, "must be positive"));
        }
        if !(self.hmax >= self.hmin) {
            return Err(BridgeError::invalid_param(
                "hmax",
                self.hmax,
                "must not be smaller than hmin",
            ));
        }
        if !(self.hausd > 0.0) {
            return Err(BridgeError::invalid_param("hausd", self.hausd, "must be positive"));
        }
        if self.hgrad != -1.0 && !(self.hgrad >= 1.0) {
            return Err(BridgeError::invalid_param(
                "hgrad",
                self.hgrad,
                "must be at least 1, or -1 to disable gradation",
            ));
        }
        if !(self.hsiz >= 0.0) {
            return Err(BridgeError::invalid_param("hsiz", self.hsiz, "must not be negative"));
        }
        if !(0.0..=180.0).contains(&self.angle_value) {
            return Err(BridgeError::invalid_param(
                "angle_value",
                self.angle_value,
                "must lie in [0, 180] degrees",
            ));
        }
        Ok(())
    }

    fn resolve_level_set(&self, mesh: &impl AttributeSource) -> Result<(SizingMode, FieldKind)> {
        if self.metric_attribute.is_some() {
            return Err(BridgeError::InvalidOptionCombination(
                "a metric attribute cannot be combined with level-set extraction".into(),
            ));
        }
        if self.hsiz != 0.0 {
            return Err(BridgeError::InvalidOptionCombination(
                "a uniform size (hsiz) cannot be combined with level-set extraction".into(),
            ));
        }
        if self.enable_anisotropy {
            return Err(BridgeError::InvalidOptionCombination(
                "level-set extraction needs a scalar field, not anisotropy".into(),
            ));
        }
        let Some(name) = &self.ls_attribute else {
            return Err(BridgeError::InvalidOptionCombination(
                "level-set extraction needs ls_attribute".into(),
            ));
        };
        let field = mesh
            .read_vertex_field(name)
            .ok_or_else(|| BridgeError::missing_attribute(name, ElementKind::Vertex))?;
        if !field.is_scalar() {
            return Err(BridgeError::InvalidOptionCombination(format!(
                "level-set attribute '{name}' has {} components, expected 1",
                field.dimension()
            )));
        }
        let sizing = SizingMode::LevelSet {
            attribute: name.clone(),
            value: self.ls_value,
        };
        Ok((sizing, FieldKind::Scalar))
    }

    fn resolve_metric(
        &self,
        mesh: &impl AttributeSource,
        name: &str,
    ) -> Result<(SizingMode, FieldKind)> {
        let field = mesh
            .read_vertex_field(name)
            .ok_or_else(|| BridgeError::missing_attribute(name, ElementKind::Vertex))?;
        let kind = match (field.dimension(), self.enable_anisotropy) {
            (1, false) => FieldKind::Scalar,
            (1, true) | (TENSOR_COMPONENTS, true) => FieldKind::Tensor,
            (dim, aniso) => {
                return Err(BridgeError::InvalidOptionCombination(format!(
                    "metric attribute '{name}' has {dim} components, expected {}",
                    if aniso { "1 or 6" } else { "1 (6 requires anisotropy)" }
                )));
            }
        };
        if self.hsiz != 0.0 {
            log::warn!("hsiz = {} ignored: sizes come from '{}'", self.hsiz, name);
        }
        let sizing = SizingMode::Metric {
            attribute: name.to_string(),
            hmin: self.hmin,
            hmax: self.hmax,
        };
        Ok((sizing, kind))
    }
}

/// How target edge sizes are prescribed. Exactly one mode applies per run.
#[derive(Debug, Clone, PartialEq)]
pub enum SizingMode {
    /// Sizes bounded by `hmin` / `hmax`, adapted to the geometry.
    Bounds {
        /// Minimal edge size.
        hmin: f64,
        /// Maximal edge size.
        hmax: f64,
    },
    /// A single target size everywhere; the companion field is emptied.
    Uniform(f64),
    /// Sizes read from a per-vertex attribute, clamped to `hmin` / `hmax`.
    Metric {
        /// Vertex attribute holding the size field.
        attribute: String,
        /// Minimal edge size.
        hmin: f64,
        /// Maximal edge size.
        hmax: f64,
    },
    /// Discretise `attribute = value` into the mesh.
    LevelSet {
        /// Vertex attribute holding the scalar field.
        attribute: String,
        /// Threshold.
        value: f64,
    },
}

/// Which local mesh modifications the kernel may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operators {
    /// Point insertion and collapse.
    pub insert: bool,
    /// Edge and face swaps.
    pub swap: bool,
    /// Point relocation.
    pub move_vertices: bool,
    /// Surface modifications (volume meshes).
    pub surface: bool,
}

/// Volume-only optimisation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeModes {
    /// Optimise at constant size.
    pub optim: bool,
    /// Strong optimisation for LES computations.
    pub optim_les: bool,
    /// Preserve open boundaries.
    pub opnbdy: bool,
}

/// Options checked against a mesh, ready to be handed to the kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOptions {
    /// The resolved sizing mode.
    pub sizing: SizingMode,
    /// Representation of the companion field.
    pub field: FieldKind,
    /// Permitted operators.
    pub operators: Operators,
    /// Volume-only switches, ignored for surfaces.
    pub volume_modes: VolumeModes,
    /// Sharp-feature detection.
    pub angle_detection: bool,
    /// Sharp-feature threshold, degrees.
    pub angle_value: f64,
    /// Hausdorff bound.
    pub hausd: f64,
    /// Gradation.
    pub hgrad: f64,
    /// Attributes mapped onto reference tags.
    pub attributes: AttributeNames,
}

impl ValidatedOptions {
    /// Whether this is a level-set extraction.
    pub fn is_level_set(&self) -> bool {
        matches!(self.sizing, SizingMode::LevelSet { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::fixtures::create_tetrahedron;
    use crate::mesh::{AttributeSink, HostMesh};

    fn mesh_with_fields() -> HostMesh {
        let mut mesh = create_tetrahedron();
        mesh.write_vertex_field("h", 1, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        mesh.write_vertex_field("phi", 1, vec![-1.0, 1.0, 1.0, 1.0])
            .unwrap();
        mesh.write_vertex_field("m", TENSOR_COMPONENTS, vec![1.0; 24])
            .unwrap();
        mesh
    }

    #[test]
    fn test_defaults() {
        let opts = RemeshOptions::default();
        assert!(opts.angle_detection);
        assert_eq!(opts.angle_value, 45.0);
        assert_eq!(opts.hausd, 0.01);
        assert_eq!(opts.hsiz, 0.0);
        assert_eq!(opts.hmin, 0.01);
        assert_eq!(opts.hmax, 2.0);
        assert_eq!(opts.hgrad, 1.105171);
        assert!(opts.metric_attribute.is_none());
        assert!(!opts.level_set);

        let v = opts.validate(&mesh_with_fields()).unwrap();
        assert_eq!(v.sizing, SizingMode::Bounds { hmin: 0.01, hmax: 2.0 });
        assert_eq!(v.field, FieldKind::Scalar);
        assert!(v.operators.insert && v.operators.swap && v.operators.move_vertices);
    }

    #[test]
    fn test_uniform() {
        let v = RemeshOptions::default()
            .with_uniform_size(0.25)
            .validate(&mesh_with_fields())
            .unwrap();
        assert_eq!(v.sizing, SizingMode::Uniform(0.25));
    }

    #[test]
    fn test_metric_overrides_hsiz() {
        let v = RemeshOptions::default()
            .with_uniform_size(0.25)
            .with_metric("h")
            .validate(&mesh_with_fields())
            .unwrap();
        assert!(matches!(v.sizing, SizingMode::Metric { ref attribute, .. } if attribute == "h"));
    }

    #[test]
    fn test_missing_metric() {
        let err = RemeshOptions::default()
            .with_metric("nope")
            .validate(&mesh_with_fields())
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::AttributeNotFound { collection: ElementKind::Vertex, .. }
        ));
    }

    #[test]
    fn test_metric_dimension() {
        let mesh = mesh_with_fields();
        let err = RemeshOptions::default()
            .with_metric("m")
            .validate(&mesh)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOptionCombination(_)));

        let v = RemeshOptions::default()
            .with_metric("m")
            .with_anisotropy(true)
            .validate(&mesh)
            .unwrap();
        assert_eq!(v.field, FieldKind::Tensor);

        let v = RemeshOptions::default()
            .with_metric("h")
            .with_anisotropy(true)
            .validate(&mesh)
            .unwrap();
        assert_eq!(v.field, FieldKind::Tensor);
    }

    #[test]
    fn test_level_set_forces_operators_off() {
        let v = RemeshOptions::default()
            .with_level_set("phi", 0.0)
            .validate(&mesh_with_fields())
            .unwrap();
        assert!(v.is_level_set());
        assert!(!v.operators.insert);
        assert!(!v.operators.move_vertices);
        assert!(!v.operators.surface);
        assert!(v.operators.swap);
    }

    #[test]
    fn test_level_set_exclusions() {
        let mesh = mesh_with_fields();
        let base = RemeshOptions::default().with_level_set("phi", 0.0);

        for opts in [
            base.clone().with_uniform_size(0.1),
            base.clone().with_metric("h"),
            base.clone().with_anisotropy(true),
            RemeshOptions {
                level_set: true,
                ..RemeshOptions::default()
            },
        ] {
            let err = opts.validate(&mesh).unwrap_err();
            assert!(matches!(err, BridgeError::InvalidOptionCombination(_)), "{err}");
        }

        let err = RemeshOptions::default()
            .with_level_set("nope", 0.0)
            .validate(&mesh)
            .unwrap_err();
        assert!(matches!(err, BridgeError::AttributeNotFound { .. }));
    }

    #[test]
    fn test_numeric_checks() {
        let mesh = mesh_with_fields();
        let bad = [
            RemeshOptions::default().with_size_bounds(0.0, 1.0),
            RemeshOptions::default().with_size_bounds(1.0, 0.5),
            RemeshOptions::default().with_hausd(0.0),
            RemeshOptions::default().with_hgrad(0.5),
            RemeshOptions::default().with_uniform_size(-1.0),
            RemeshOptions::default().with_angle_detection(true, 190.0),
            RemeshOptions::default().with_size_bounds(f64::NAN, 1.0),
        ];
        for opts in bad {
            let err = opts.validate(&mesh).unwrap_err();
            assert!(matches!(err, BridgeError::InvalidParameter { .. }), "{err}");
        }
        assert!(RemeshOptions::default().with_hgrad(-1.0).validate(&mesh).is_ok());
    }

    #[test]
    fn test_attribute_names() {
        let names = RemeshOptions::default()
            .with_edge_attribute("ridge")
            .with_cell_attribute("region")
            .attribute_names();
        assert_eq!(names.edge.as_deref(), Some("ridge"));
        assert_eq!(names.facet, None);
        assert_eq!(names.cell.as_deref(), Some("region"));
    }
}
