//! Progress reporting for kernel operations.
//!
//! A [`Progress`] receives one update per stage of a remesh run (export,
//! configuration, kernel invocation, import, release).
//!
//! # Example
//!
//! ```
//! use meshbridge::algo::progress::Progress;
//! use meshbridge::algo::remesh::Remesher;
//! use meshbridge::kernel::ReferenceKernel;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! let kernel = ReferenceKernel::new();
//! let remesher = Remesher::new(&kernel).with_progress(&progress);
//! # let _ = remesher;
//! ```

/// A progress callback.
///
/// The callback receives the current step, the total number of steps and a
/// short description of the step.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// A reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
