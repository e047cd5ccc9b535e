//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Medit | `.mesh` | ✓ | ✓ | Kernel-native; carries tetrahedra and `ref` tags |
//! | PLY | `.ply` | ✓ | ✓ | Surfaces only; scalar properties as attributes |
//!
//! # Usage
//!
//! ```no_run
//! use meshbridge::io::{load, save};
//!
//! let mesh = load("part.mesh").unwrap();
//! save(&mesh, "part.ply").unwrap();
//! ```

pub mod medit;
pub mod ply;

use std::path::Path;

use crate::error::{BridgeError, Result};
use crate::mesh::HostMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Medit ASCII format (`.mesh`).
    Medit,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "mesh" => Some(Format::Medit),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| BridgeError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file, choosing the format by extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<HostMesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Medit => medit::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh to a file, choosing the format by extension.
pub fn save<P: AsRef<Path>>(mesh: &HostMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Medit => medit::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}
