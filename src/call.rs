//! Calling foreign callables with host arguments.
//!
//! Arguments are converted left to right into a foreign tuple (ownership of
//! each converted value moves into the tuple), the callable is invoked through
//! the generic call protocol, and the result is wrapped in a new handle.
//!
//! When the callee raises, the foreign error is printed (if configured),
//! captured as a [`ForeignException`], and returned as
//! [`BridgeError::ForeignCall`]. No handle is created for a failed call.

use pyo3::prelude::*;
use pyo3::types::PyTuple;

use crate::convert::to_foreign_or_none;
use crate::error::{pyerr_to_string, BridgeError, ForeignException, Result};
use crate::handle::ProxyHandle;
use crate::host::HostValue;
use crate::runtime;

/// Assemble host arguments into a foreign argument tuple, in call order.
pub fn build_args<'py>(py: Python<'py>, args: &[HostValue]) -> PyResult<Bound<'py, PyTuple>> {
    let converted = args
        .iter()
        .map(|arg| to_foreign_or_none(py, arg))
        .collect::<PyResult<Vec<_>>>()?;
    PyTuple::new(py, converted)
}

/// Invoke the object behind `handle` with `args`.
pub fn call(py: Python<'_>, handle: &ProxyHandle, args: &[HostValue]) -> Result<ProxyHandle> {
    let callee = handle.bind(py);
    let tuple = build_args(py, args)?;
    tracing::debug!(handle = handle.id(), arity = args.len(), "calling foreign object");

    match callee.call1(tuple) {
        Ok(result) => Ok(ProxyHandle::wrap(result)),
        Err(err) => Err(translate_failure(py, handle, err)),
    }
}

/// Look up `name` on the object behind `handle` and call it with `args`.
pub fn call_method(
    py: Python<'_>,
    handle: &ProxyHandle,
    name: &str,
    args: &[HostValue],
) -> Result<ProxyHandle> {
    let method = handle.bind(py).getattr(name)?;
    let tuple = build_args(py, args)?;
    tracing::debug!(handle = handle.id(), method = name, arity = args.len(), "calling foreign method");

    match method.call1(tuple) {
        Ok(result) => Ok(ProxyHandle::wrap(result)),
        Err(err) => Err(translate_failure(py, handle, err)),
    }
}

fn translate_failure(py: Python<'_>, handle: &ProxyHandle, err: PyErr) -> BridgeError {
    let exception = ForeignException::capture(py, &err);
    tracing::error!(
        handle = handle.id(),
        exception = %exception.type_name,
        "foreign call raised: {}",
        pyerr_to_string(py, &err)
    );
    if runtime::print_foreign_errors() {
        // Restores the error and prints it through the interpreter's own hook.
        err.print(py);
    }
    BridgeError::ForeignCall(exception)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ensure_initialized, with_interpreter};

    #[test]
    fn test_args_keep_call_order() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let args = [
                HostValue::from("a"),
                HostValue::Number(2.0),
                HostValue::Undefined,
            ];
            let tuple = build_args(py, &args)?;
            assert_eq!(tuple.repr()?.to_string(), "('a', 2.0, None)");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_raising_call_returns_structured_error() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let int_type = ProxyHandle::wrap(py.eval(c"int", None, None)?);
            let err = call(py, &int_type, &[HostValue::from("not a number")]).unwrap_err();
            let exc = err.foreign_exception().expect("call failure");
            assert_eq!(exc.type_name, "ValueError");
            assert!(exc.message.contains("not a number"));
            Ok(())
        })
        .unwrap();
    }
}
