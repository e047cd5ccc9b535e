//! Index conversion between the host and the kernel.
//!
//! The host numbers elements from 0, the kernel from 1. Every conversion of a
//! vertex, edge, triangle or tetrahedron index in either direction goes
//! through this pair.

/// Convert a zero-based host index to a one-based kernel index.
#[inline]
pub const fn to_kernel_index(i: usize) -> usize {
    i + 1
}

/// Convert a one-based kernel index to a zero-based host index.
///
/// # Panics
/// Panics on 0, which is never a valid kernel index.
#[inline]
pub fn from_kernel_index(j: usize) -> usize {
    assert!(j != 0, "kernel indices start at 1");
    j - 1
}
