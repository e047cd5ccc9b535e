//! Scoped ownership of kernel allocations.

use super::{Kernel, KernelData, KernelKind, KernelMesh, KernelSol};

/// Owns one kernel mesh and its companion field for the duration of an
/// operation.
///
/// The allocation is obtained from [`Kernel::alloc`] on construction and
/// handed back to [`Kernel::free`] exactly once: either by
/// [`KernelHandle::release`] or, on every other exit path (early `?` returns
/// included), when the handle is dropped. Handles are neither `Clone` nor
/// shareable between operations.
pub struct KernelHandle<'k, K: Kernel + ?Sized> {
    kernel: &'k K,
    data: Option<KernelData>,
}

impl<'k, K: Kernel + ?Sized> KernelHandle<'k, K> {
    /// Allocate a mesh and field of the given kind.
    pub fn new(kernel: &'k K, kind: KernelKind) -> Self {
        log::debug!("{}: allocating {} mesh", kernel.name(), kind);
        Self {
            kernel,
            data: Some(kernel.alloc(kind)),
        }
    }

    /// The kernel this handle was allocated from.
    #[inline]
    pub fn kernel(&self) -> &'k K {
        self.kernel
    }

    /// Surface or volume.
    #[inline]
    pub fn kind(&self) -> KernelKind {
        self.data().kind()
    }

    /// The owned kernel data.
    #[inline]
    pub fn data(&self) -> &KernelData {
        match &self.data {
            Some(data) => data,
            None => unreachable!("kernel data accessed after release"),
        }
    }

    /// The owned kernel data, mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut KernelData {
        match &mut self.data {
            Some(data) => data,
            None => unreachable!("kernel data accessed after release"),
        }
    }

    /// The kernel mesh.
    #[inline]
    pub fn mesh(&self) -> &KernelMesh {
        self.data().mesh()
    }

    /// The companion field.
    #[inline]
    pub fn sol(&self) -> &KernelSol {
        self.data().sol()
    }

    /// Return the allocation to the kernel now.
    pub fn release(mut self) {
        self.free();
    }

    fn free(&mut self) {
        if let Some(data) = self.data.take() {
            log::debug!("{}: freeing {} mesh", self.kernel.name(), data.kind());
            self.kernel.free(data);
        }
    }
}

impl<K: Kernel + ?Sized> Drop for KernelHandle<'_, K> {
    fn drop(&mut self) {
        self.free();
    }
}

impl<K: Kernel + ?Sized> std::fmt::Debug for KernelHandle<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelHandle")
            .field("kernel", &self.kernel.name())
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::testing::CountingKernel;

    #[test]
    fn test_drop_frees_once() {
        let kernel = CountingKernel::new();
        {
            let handle = KernelHandle::new(&kernel, KernelKind::Volume);
            assert_eq!(handle.kind(), KernelKind::Volume);
            assert_eq!(kernel.allocs(), 1);
            assert_eq!(kernel.frees(), 0);
        }
        assert_eq!(kernel.frees(), 1);
    }

    #[test]
    fn test_release_frees_once() {
        let kernel = CountingKernel::new();
        let handle = KernelHandle::new(&kernel, KernelKind::Surface);
        handle.release();
        assert_eq!(kernel.allocs(), 1);
        assert_eq!(kernel.frees(), 1);
    }

    #[test]
    fn test_early_return_frees() {
        fn fails(kernel: &CountingKernel) -> Result<(), &'static str> {
            let handle = KernelHandle::new(kernel, KernelKind::Volume);
            if handle.mesh().nb_points() == 0 {
                return Err("empty mesh");
            }
            Ok(())
        }

        let kernel = CountingKernel::new();
        assert!(fails(&kernel).is_err());
        assert!(kernel.balanced());
    }
}
