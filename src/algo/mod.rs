//! Mesh processing operations backed by a remeshing kernel.
//!
//! - **Remeshing**: surface and volume remeshing driven by size bounds, a
//!   uniform size or a per-vertex metric
//! - **Level sets**: discretisation of a scalar vertex field's iso-surface
//! - **Progress**: stage-by-stage reporting for callers

pub mod progress;
pub mod remesh;
