//! Owning handle for a single foreign object reference.
//!
//! A [`ProxyHandle`] is the only place a foreign reference lives on the host
//! side. It is created from a `Bound` value, so a handle around a null
//! reference cannot be expressed; failed lookups produce no handle at all.
//! Dropping the handle releases the reference exactly once.
//!
//! Handle ids are monotonically increasing from 1 and exist for diagnostics
//! only; they never identify the foreign object (two handles may wrap the same
//! object, each holding its own reference).

use std::fmt;
use std::mem::ManuallyDrop;
use std::sync::atomic::{AtomicU64, Ordering};

use pyo3::prelude::*;

use crate::runtime;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct ProxyHandle {
    object: ManuallyDrop<Py<PyAny>>,
    id: u64,
}

impl ProxyHandle {
    /// Take ownership of `object`'s reference.
    pub(crate) fn wrap(object: Bound<'_, PyAny>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        runtime::handle_created();
        tracing::trace!(handle = id, "wrapped foreign reference");
        Self {
            object: ManuallyDrop::new(object.unbind()),
            id,
        }
    }

    /// Borrow the wrapped object for the duration of a GIL scope.
    pub(crate) fn bind<'py>(&self, py: Python<'py>) -> &Bound<'py, PyAny> {
        self.object.bind(py)
    }

    /// A new, independent handle to the same foreign object.
    pub(crate) fn duplicate(&self, py: Python<'_>) -> Self {
        Self::wrap(self.bind(py).clone())
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for ProxyHandle {
    fn drop(&mut self) {
        // SAFETY: `object` is never touched again after this point.
        let object = unsafe { ManuallyDrop::take(&mut self.object) };
        if runtime::is_running() {
            Python::with_gil(|_py| drop(object));
        } else {
            // The interpreter is gone; decref'ing now would touch freed state.
            std::mem::forget(object);
            tracing::debug!(handle = self.id, "leaked reference released after shutdown");
        }
        runtime::handle_released();
    }
}

impl fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyHandle").field("id", &self.id).finish()
    }
}
