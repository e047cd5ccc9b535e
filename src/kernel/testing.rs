//! An instrumented kernel for tests.

use std::cell::{Cell, RefCell};

use super::{
    CallResult, DParam, IParam, Kernel, KernelCallError, KernelData, KernelKind, KernelStatus,
    ReferenceKernel,
};

/// Wraps [`ReferenceKernel`], counting allocations, frees and entry-point
/// invocations, recording tunables, and optionally forcing failures.
#[derive(Debug, Default)]
pub(crate) struct CountingKernel {
    inner: ReferenceKernel,
    allocs: Cell<usize>,
    frees: Cell<usize>,
    invocations: Cell<usize>,
    fail_check: Cell<bool>,
    fail_params: Cell<bool>,
    forced_status: Cell<Option<KernelStatus>>,
    iparams: RefCell<Vec<(IParam, i32)>>,
    dparams: RefCell<Vec<(DParam, f64)>>,
}

impl CountingKernel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every consistency check fail.
    pub(crate) fn failing_check() -> Self {
        let kernel = Self::new();
        kernel.fail_check.set(true);
        kernel
    }

    /// Make every tunable call fail.
    pub(crate) fn failing_parameters() -> Self {
        let kernel = Self::new();
        kernel.fail_params.set(true);
        kernel
    }

    /// Make every entry point return `status` without running.
    pub(crate) fn with_status(status: KernelStatus) -> Self {
        let kernel = Self::new();
        kernel.forced_status.set(Some(status));
        kernel
    }

    pub(crate) fn allocs(&self) -> usize {
        self.allocs.get()
    }

    pub(crate) fn frees(&self) -> usize {
        self.frees.get()
    }

    pub(crate) fn invocations(&self) -> usize {
        self.invocations.get()
    }

    pub(crate) fn balanced(&self) -> bool {
        self.allocs() == self.frees()
    }

    /// Last value set for an integer tunable.
    pub(crate) fn iparam(&self, param: IParam) -> Option<i32> {
        self.iparams
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| *p == param)
            .map(|&(_, v)| v)
    }

    /// Last value set for a floating-point tunable.
    pub(crate) fn dparam(&self, param: DParam) -> Option<f64> {
        self.dparams
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| *p == param)
            .map(|&(_, v)| v)
    }

    fn invoke(
        &self,
        data: &mut KernelData,
        run: impl FnOnce(&ReferenceKernel, &mut KernelData) -> KernelStatus,
    ) -> KernelStatus {
        self.invocations.set(self.invocations.get() + 1);
        match self.forced_status.get() {
            Some(status) => status,
            None => run(&self.inner, data),
        }
    }
}

impl Kernel for CountingKernel {
    fn name(&self) -> &str {
        "counting"
    }

    fn alloc(&self, kind: KernelKind) -> KernelData {
        self.allocs.set(self.allocs.get() + 1);
        self.inner.alloc(kind)
    }

    fn free(&self, data: KernelData) {
        self.frees.set(self.frees.get() + 1);
        self.inner.free(data);
    }

    fn set_iparameter(&self, data: &mut KernelData, param: IParam, value: i32) -> CallResult {
        if self.fail_params.get() {
            return Err(KernelCallError::new("set_iparameter", "forced failure"));
        }
        self.iparams.borrow_mut().push((param, value));
        self.inner.set_iparameter(data, param, value)
    }

    fn set_dparameter(&self, data: &mut KernelData, param: DParam, value: f64) -> CallResult {
        if self.fail_params.get() {
            return Err(KernelCallError::new("set_dparameter", "forced failure"));
        }
        self.dparams.borrow_mut().push((param, value));
        self.inner.set_dparameter(data, param, value)
    }

    fn check_mesh_data(&self, data: &KernelData) -> CallResult {
        if self.fail_check.get() {
            return Err(KernelCallError::new("check_mesh_data", "forced failure"));
        }
        self.inner.check_mesh_data(data)
    }

    fn remesh_surface(&self, data: &mut KernelData) -> KernelStatus {
        self.invoke(data, |k, d| k.remesh_surface(d))
    }

    fn remesh_volume(&self, data: &mut KernelData) -> KernelStatus {
        self.invoke(data, |k, d| k.remesh_volume(d))
    }

    fn remesh_levelset(&self, data: &mut KernelData) -> KernelStatus {
        self.invoke(data, |k, d| k.remesh_levelset(d))
    }
}
