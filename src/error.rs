//! Error taxonomy for the proxy boundary.
//!
//! Foreign exceptions never cross into host code as foreign objects. They are
//! captured here as plain Rust data ([`ForeignException`]) and surfaced through
//! [`BridgeError`], which the host runtime throws as a `TypeError`.
//!
//! Three paths are hard errors: call-site misuse ([`ErrorKind::Argument`]),
//! import failure ([`ErrorKind::Import`]) and a raising foreign call
//! ([`ErrorKind::ForeignCall`]). Absent attributes, ignored attribute writes,
//! unsupported argument values and unmatched coercion categories are not errors
//! at all; see the resolver, converter and coercion modules.

use std::fmt;

use pyo3::prelude::*;

/// Every failure the bridge can report to the host runtime.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// `import` was called with something other than a string.
    #[error("First argument must be a string")]
    ArgumentNotString,

    /// The foreign import mechanism could not resolve the module name.
    #[error("Could not import that module.")]
    Import { module: String, reason: String },

    /// A foreign callable raised during invocation.
    #[error("foreign call raised {0}")]
    ForeignCall(ForeignException),

    /// A foreign protocol (str, len, item access, numeric conversion) failed
    /// outside of a call.
    #[error("foreign runtime error: {0}")]
    Foreign(#[from] PyErr),

    /// A foreign operation was attempted before the interpreter was loaded.
    #[error("the foreign interpreter has not been initialized")]
    NotInitialized,

    /// A foreign operation was attempted after `shutdown()`.
    #[error("the foreign interpreter has been shut down")]
    ShutDown,

    /// Invalid runtime configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Import,
    ForeignCall,
    Foreign,
    Lifecycle,
    Config,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ArgumentNotString => ErrorKind::Argument,
            Self::Import { .. } => ErrorKind::Import,
            Self::ForeignCall(_) => ErrorKind::ForeignCall,
            Self::Foreign(_) => ErrorKind::Foreign,
            Self::NotInitialized | Self::ShutDown => ErrorKind::Lifecycle,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Name of the host error class this failure is thrown as.
    pub fn host_error_class(&self) -> &'static str {
        "TypeError"
    }

    /// The captured foreign exception, if this is a call failure.
    pub fn foreign_exception(&self) -> Option<&ForeignException> {
        match self {
            Self::ForeignCall(exc) => Some(exc),
            _ => None,
        }
    }
}

/// A foreign exception flattened into host-owned data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignException {
    /// Exception class name, e.g. `ValueError`.
    pub type_name: String,
    /// `str()` of the exception instance.
    pub message: String,
    /// Formatted traceback, when the exception carried one.
    pub traceback: Option<String>,
}

impl ForeignException {
    /// Capture type, message and traceback from a `PyErr` without consuming it.
    pub fn capture(py: Python<'_>, err: &PyErr) -> Self {
        let type_name = err
            .get_type(py)
            .name()
            .map(|name| name.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        let message = err
            .value(py)
            .str()
            .map(|s| s.to_string())
            .unwrap_or_default();
        let traceback = err.traceback(py).and_then(|tb| tb.format().ok());
        Self {
            type_name,
            message,
            traceback,
        }
    }
}

impl fmt::Display for ForeignException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.type_name)
        } else {
            write!(f, "{}: {}", self.type_name, self.message)
        }
    }
}

/// Convert a `PyErr` into a human-readable string, including the traceback
/// if available.
pub fn pyerr_to_string(py: Python<'_>, err: &PyErr) -> String {
    let msg = format!("{err}");
    if let Some(tb) = err.traceback(py) {
        if let Ok(formatted) = tb.format() {
            return format!("{formatted}{msg}");
        }
    }
    msg
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
