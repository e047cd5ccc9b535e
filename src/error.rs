//! Error types for meshbridge.
//!
//! This module defines all error types used throughout the library. Every
//! caller-facing operation returns [`Result`]; contract violations by the
//! caller (non-simplicial input where simplices are mandated, out-of-range
//! kernel indices) are programming errors and panic instead.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::kernel::{KernelCallError, KernelStatus};

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// The element collections of a host mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Mesh vertices.
    Vertex,
    /// Mesh edges.
    Edge,
    /// Mesh facets (triangles after export).
    Facet,
    /// Mesh cells (tetrahedra after export).
    Cell,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Vertex => "vertices",
            ElementKind::Edge => "edges",
            ElementKind::Facet => "facets",
            ElementKind::Cell => "cells",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while bridging meshes to and from the kernel.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A named attribute is missing on the collection that must carry it.
    #[error("attribute '{name}' is not defined on {collection}")]
    AttributeNotFound {
        /// The attribute name.
        name: String,
        /// The collection that was searched.
        collection: ElementKind,
    },

    /// The exported mesh failed the kernel's consistency check.
    #[error("mesh rejected by kernel: {reason}")]
    InvalidMeshForKernel {
        /// What the kernel complained about.
        reason: String,
    },

    /// Mutually exclusive options were requested together.
    #[error("invalid option combination: {0}")]
    InvalidOptionCombination(String),

    /// A kernel entry point returned a non-success status.
    #[error("kernel operation '{operation}' failed with status {status}")]
    KernelOperationFailed {
        /// The entry point that was invoked.
        operation: &'static str,
        /// The status it returned.
        status: KernelStatus,
    },

    /// An attribute was written with the wrong number of values.
    #[error("attribute '{name}' on {collection} expects {expected} values, got {found}")]
    AttributeLength {
        /// The attribute name.
        name: String,
        /// The collection the attribute lives on.
        collection: ElementKind,
        /// Number of values expected (elements times dimension).
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// An element references an invalid vertex index.
    #[error("{collection} element {element} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The collection holding the element.
        collection: ElementKind,
        /// The element index.
        element: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl BridgeError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        BridgeError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an attribute-not-found error.
    pub fn missing_attribute(name: &str, collection: ElementKind) -> Self {
        BridgeError::AttributeNotFound {
            name: name.to_string(),
            collection,
        }
    }
}

impl From<KernelCallError> for BridgeError {
    fn from(err: KernelCallError) -> Self {
        BridgeError::InvalidMeshForKernel {
            reason: err.to_string(),
        }
    }
}
