//! Attribute resolution on proxied objects.
//!
//! A missing attribute is a normal outcome (`None`), not an error: host code
//! reads it as `undefined`, the way dynamic property access behaves. Any
//! failure while probing (including a property getter that raises) counts as
//! missing.

use pyo3::prelude::*;

use crate::handle::ProxyHandle;
use crate::host::{Assignment, HostValue};

/// Look up `name` on the object behind `handle`, wrapping the result in a new
/// handle.
pub fn get_attribute(py: Python<'_>, handle: &ProxyHandle, name: &str) -> Option<ProxyHandle> {
    let obj = handle.bind(py);
    match obj.hasattr(name) {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(handle = handle.id(), attribute = name, "attribute absent");
            return None;
        }
        Err(err) => {
            tracing::debug!(handle = handle.id(), attribute = name, error = %err, "attribute probe failed");
            return None;
        }
    }
    match obj.getattr(name) {
        Ok(value) => Some(ProxyHandle::wrap(value)),
        Err(err) => {
            tracing::debug!(handle = handle.id(), attribute = name, error = %err, "attribute read failed");
            None
        }
    }
}

/// Attribute writes are accepted and dropped: the foreign object is never
/// mutated through a proxy.
pub fn set_attribute(handle: &ProxyHandle, name: &str, _value: HostValue) -> Assignment {
    tracing::debug!(handle = handle.id(), attribute = name, "attribute write ignored");
    Assignment::Ignored
}
