//! Process-wide interpreter lifecycle.
//!
//! The embedded interpreter is global state: it is initialized once when the
//! host loads the module and torn down once by `shutdown()`. The lifecycle is
//! a one-way state machine:
//!
//! ```text
//! Uninitialized --initialize()--> Running --shutdown()--> ShutDown
//! ```
//!
//! Every foreign operation enters through [`with_interpreter`], which rejects
//! work outside the `Running` state instead of touching a dead interpreter.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use pyo3::prelude::*;

use crate::config::RuntimeConfig;
use crate::error::{BridgeError, Result};

const UNINITIALIZED: u8 = 0;
const RUNNING: u8 = 1;
const SHUT_DOWN: u8 = 2;

static STATE: AtomicU8 = AtomicU8::new(UNINITIALIZED);
/// Serializes state transitions; reads go through `STATE` alone.
static TRANSITION: Mutex<()> = Mutex::new(());
static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();
/// Whether this crate brought the interpreter up (and so may finalize it).
static OWNS_INTERPRETER: AtomicBool = AtomicBool::new(false);
static LIVE_HANDLES: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    Running,
    ShutDown,
}

pub fn state() -> RuntimeState {
    match STATE.load(Ordering::Acquire) {
        UNINITIALIZED => RuntimeState::Uninitialized,
        RUNNING => RuntimeState::Running,
        _ => RuntimeState::ShutDown,
    }
}

pub fn is_running() -> bool {
    state() == RuntimeState::Running
}

// ==================== Lifecycle ====================

/// Bring up the interpreter with `config`.
///
/// Calling this while already running is a no-op (the first configuration
/// wins). Calling it after `shutdown()` fails: the interpreter cannot be
/// revived.
pub fn initialize(config: RuntimeConfig) -> Result<()> {
    // The guarded data is `()`, so a poisoned lock carries no broken invariant.
    let _guard = TRANSITION.lock().unwrap_or_else(|e| e.into_inner());

    match state() {
        RuntimeState::Running => {
            tracing::debug!("interpreter already running, ignoring initialize");
            return Ok(());
        }
        RuntimeState::ShutDown => return Err(BridgeError::ShutDown),
        RuntimeState::Uninitialized => {}
    }

    if config.preload_global_symbols {
        preload_global_symbols();
    }

    // SAFETY: Py_IsInitialized may be called at any time, with or without the GIL.
    let already_up = unsafe { pyo3::ffi::Py_IsInitialized() } != 0;
    // Initialize without installing signal handlers (embedding mode).
    pyo3::prepare_freethreaded_python();
    // Before the fallible path setup: a retry will find Python already up.
    claim_ownership(!already_up);

    Python::with_gil(|py| -> PyResult<()> {
        let sys = py.import("sys")?;
        let path = sys.getattr("path")?;
        // Insert in reverse so the configured order is preserved at the front.
        for dir in config.sys_paths.iter().rev() {
            path.call_method1("insert", (0i32, &*dir.to_string_lossy()))?;
        }
        Ok(())
    })?;

    let _ = CONFIG.set(config);
    STATE.store(RUNNING, Ordering::Release);
    tracing::info!(owned = owns_interpreter(), "foreign interpreter initialized");
    Ok(())
}

/// Record that this crate started the interpreter. Never cleared.
fn claim_ownership(started_here: bool) {
    if started_here {
        OWNS_INTERPRETER.store(true, Ordering::Release);
    }
}

fn owns_interpreter() -> bool {
    OWNS_INTERPRETER.load(Ordering::Acquire)
}

/// Initialize from the environment unless the host already loaded us.
pub fn ensure_initialized() -> Result<()> {
    match state() {
        RuntimeState::Running => Ok(()),
        RuntimeState::ShutDown => Err(BridgeError::ShutDown),
        RuntimeState::Uninitialized => initialize(RuntimeConfig::from_env()?),
    }
}

/// Tear down the interpreter. Valid exactly once.
///
/// The interpreter is only finalized if this crate initialized it; a host
/// process that embedded Python itself keeps ownership of its teardown.
/// Handles still alive afterwards leak their reference on drop.
pub fn shutdown() -> Result<()> {
    let _guard = TRANSITION.lock().unwrap_or_else(|e| e.into_inner());

    let previous = STATE.swap(SHUT_DOWN, Ordering::AcqRel);
    if previous == SHUT_DOWN {
        return Err(BridgeError::ShutDown);
    }

    if previous == RUNNING && owns_interpreter() {
        // SAFETY: the state is already SHUT_DOWN, so no new foreign work can
        // start and no handle will decref after this point. The GIL is taken
        // through the raw API and never released: the thread state it returns
        // is destroyed by finalization.
        let status = unsafe {
            let _gil = pyo3::ffi::PyGILState_Ensure();
            pyo3::ffi::Py_FinalizeEx()
        };
        if status != 0 {
            tracing::warn!(status, "interpreter finalization reported an error");
        }
    }

    tracing::info!(
        live_handles = live_handles(),
        "foreign interpreter shut down"
    );
    Ok(())
}

/// Run `f` with the GIL held, provided the interpreter is running.
pub fn with_interpreter<F, R>(f: F) -> Result<R>
where
    F: for<'py> FnOnce(Python<'py>) -> Result<R>,
{
    match state() {
        RuntimeState::Running => Python::with_gil(f),
        RuntimeState::Uninitialized => Err(BridgeError::NotInitialized),
        RuntimeState::ShutDown => Err(BridgeError::ShutDown),
    }
}

/// The active configuration, or the defaults before initialization.
pub fn config() -> RuntimeConfig {
    CONFIG.get().cloned().unwrap_or_default()
}

pub(crate) fn print_foreign_errors() -> bool {
    CONFIG.get().map_or(true, |c| c.print_foreign_errors)
}

// ==================== Handle Accounting ====================

/// Number of live proxy handles (for diagnostics).
pub fn live_handles() -> usize {
    LIVE_HANDLES.load(Ordering::Acquire)
}

pub(crate) fn handle_created() {
    LIVE_HANDLES.fetch_add(1, Ordering::AcqRel);
}

pub(crate) fn handle_released() {
    LIVE_HANDLES.fetch_sub(1, Ordering::AcqRel);
}

// ==================== Symbol Visibility ====================

/// Re-open an already loaded `libpython` with `RTLD_GLOBAL` so that native
/// extension modules (NumPy and friends) can resolve interpreter symbols.
#[cfg(target_os = "linux")]
fn preload_global_symbols() {
    use libc::{dlopen, RTLD_GLOBAL, RTLD_NOLOAD, RTLD_NOW};
    use std::os::raw::c_char;

    let candidates: &[&[u8]] = &[
        b"libpython3.so\0",
        b"libpython3.13.so\0",
        b"libpython3.12.so\0",
        b"libpython3.11.so\0",
        b"libpython3.10.so\0",
        b"libpython3.9.so\0",
    ];
    for name in candidates {
        let name_ptr = name.as_ptr() as *const c_char;
        // SAFETY: each candidate is a NUL-terminated literal; RTLD_NOLOAD only
        // probes for a library that is already mapped.
        unsafe {
            if !dlopen(name_ptr, RTLD_NOW | RTLD_NOLOAD).is_null() {
                dlopen(name_ptr, RTLD_NOW | RTLD_GLOBAL);
                tracing::debug!(
                    library = %String::from_utf8_lossy(&name[..name.len() - 1]),
                    "re-opened with RTLD_GLOBAL"
                );
                return;
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn preload_global_symbols() {}
