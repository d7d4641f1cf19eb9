//! Host → foreign argument conversion.
//!
//! | Host value          | Foreign value                     |
//! |---------------------|-----------------------------------|
//! | string              | `str`                             |
//! | number              | `float` (integers included)       |
//! | proxy / function    | the wrapped object itself         |
//! | object              | `dict`, values converted in turn  |
//! | array               | `list`, elements converted in turn|
//! | undefined           | `None`                            |
//! | anything else       | no value                          |
//!
//! "No value" is not an error. Callers substitute `None` for the slot
//! ([`to_foreign_or_none`]), so an unsupported value never aborts a call.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyFloat, PyList, PyString};

use crate::host::HostValue;

/// Convert one host value. `Ok(None)` means the value has no foreign form.
pub fn to_foreign<'py>(py: Python<'py>, value: &HostValue) -> PyResult<Option<Bound<'py, PyAny>>> {
    let converted = match value {
        HostValue::String(s) => PyString::new(py, s).into_any(),
        HostValue::Number(n) => PyFloat::new(py, *n).into_any(),
        // Round-trips the original reference, no copy.
        HostValue::Proxy(proxy) => proxy.handle().bind(py).clone(),
        HostValue::Function(func) => func.target().handle().bind(py).clone(),
        HostValue::Object(map) => {
            let dict = PyDict::new(py);
            for (key, item) in map {
                dict.set_item(key, to_foreign_or_none(py, item)?)?;
            }
            dict.into_any()
        }
        HostValue::Array(items) => {
            let elements = items
                .iter()
                .map(|item| to_foreign_or_none(py, item))
                .collect::<PyResult<Vec<_>>>()?;
            PyList::new(py, elements)?.into_any()
        }
        HostValue::Undefined => py.None().into_bound(py),
        HostValue::Null | HostValue::Bool(_) => return Ok(None),
    };
    Ok(Some(converted))
}

/// Convert one host value, using `None` where it has no foreign form.
pub fn to_foreign_or_none<'py>(py: Python<'py>, value: &HostValue) -> PyResult<Bound<'py, PyAny>> {
    match to_foreign(py, value)? {
        Some(converted) => Ok(converted),
        None => {
            tracing::warn!(value = ?value, "host value has no foreign equivalent, passing None");
            Ok(py.None().into_bound(py))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ensure_initialized, with_interpreter};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn type_name(obj: &Bound<'_, PyAny>) -> String {
        obj.get_type().name().unwrap().to_string()
    }

    #[test]
    fn test_numbers_become_floats() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let obj = to_foreign(py, &HostValue::Number(2.0))?.unwrap();
            assert_eq!(type_name(&obj), "float");
            assert_eq!(obj.extract::<f64>()?, 2.0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_unsupported_values_have_no_foreign_form() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            assert!(to_foreign(py, &HostValue::Null)?.is_none());
            assert!(to_foreign(py, &HostValue::Bool(true))?.is_none());
            assert!(to_foreign_or_none(py, &HostValue::Null)?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_composites_convert_recursively() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let mut inner = IndexMap::new();
            inner.insert("k".to_string(), HostValue::from("v"));
            let mut outer = IndexMap::new();
            outer.insert(
                "list".to_string(),
                HostValue::Array(vec![HostValue::Number(1.0), HostValue::Undefined]),
            );
            outer.insert("nested".to_string(), HostValue::Object(inner));
            outer.insert("gap".to_string(), HostValue::Null);

            let obj = to_foreign(py, &HostValue::Object(outer))?.unwrap();
            assert_eq!(type_name(&obj), "dict");
            assert_eq!(obj.repr()?.to_string(), "{'list': [1.0, None], 'nested': {'k': 'v'}, 'gap': None}");
            Ok(())
        })
        .unwrap();
    }
}
