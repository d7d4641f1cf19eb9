//! Foreign → host coercion.
//!
//! [`coerce`] is a one-level contextual conversion: it classifies the foreign
//! value and builds the matching host value, wrapping every foreign value it
//! reaches in a fresh handle. Nothing is cached; each request re-reads the
//! foreign object.
//!
//! Classification order, first match wins:
//!
//! 1. callable  → host function forwarding to the call bridge
//! 2. numeric   → host number
//! 3. mapping   → host object of proxies, key-listing order
//! 4. sequence  → host array of proxies, index order
//! 5. otherwise → `undefined`
//!
//! Mappings are tested before sequences: any class defining `__getitem__`
//! passes the raw sequence check, `os.environ` and `collections.abc.Mapping`
//! subclasses included. A sequence must also report a length, so an object
//! that is only subscriptable coerces to `undefined`.
//!
//! Foreign strings satisfy the sequence protocol, so they coerce to an array
//! of one-character proxies. Use [`stringify`] for their text.

use indexmap::IndexMap;
use pyo3::prelude::*;
use pyo3::types::{PyInt, PyMapping};

use crate::handle::ProxyHandle;
use crate::host::{HostFunction, HostValue};
use crate::proxy::ProxyObject;

/// Runtime category of a foreign value, as used by [`coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Callable,
    Numeric,
    Sequence,
    Mapping,
    Opaque,
}

pub fn classify(obj: &Bound<'_, PyAny>) -> Category {
    let ptr = obj.as_ptr();
    if obj.is_callable() {
        return Category::Callable;
    }
    // SAFETY: `ptr` is a live object kept alive by `obj`, and the GIL is held
    // for the lifetime of the `Bound`. The check functions never fail.
    if unsafe { pyo3::ffi::PyNumber_Check(ptr) } != 0 {
        return Category::Numeric;
    }
    // `dict` fast path, else `isinstance(obj, collections.abc.Mapping)`.
    if obj.downcast::<PyMapping>().is_ok() {
        return Category::Mapping;
    }
    // SAFETY: as above.
    if unsafe { pyo3::ffi::PySequence_Check(ptr) } != 0 && obj.len().is_ok() {
        return Category::Sequence;
    }
    Category::Opaque
}

/// Convert the object behind `handle` to its host-native form.
pub fn coerce(py: Python<'_>, handle: &ProxyHandle) -> PyResult<HostValue> {
    let obj = handle.bind(py);
    let category = classify(obj);
    tracing::trace!(handle = handle.id(), ?category, "coercing foreign value");

    match category {
        Category::Callable => Ok(HostValue::Function(HostFunction::new(ProxyObject::from_handle(
            handle.duplicate(py),
        )))),
        Category::Numeric => to_number(obj).map(HostValue::Number),
        Category::Sequence => expand_sequence(obj),
        Category::Mapping => expand_mapping(obj),
        Category::Opaque => Ok(HostValue::Undefined),
    }
}

/// Narrow a foreign number to a host double.
///
/// Integers go through `i64` and fall back to `float(obj)` when they do not
/// fit; either way large values lose precision. Other numerics use the
/// foreign float protocol, which raises for types without one (`complex`).
fn to_number(obj: &Bound<'_, PyAny>) -> PyResult<f64> {
    if obj.is_instance_of::<PyInt>() {
        if let Ok(i) = obj.extract::<i64>() {
            return Ok(i as f64);
        }
    }
    obj.extract::<f64>()
}

fn expand_sequence(obj: &Bound<'_, PyAny>) -> PyResult<HostValue> {
    let len = obj.len()?;
    let mut items = Vec::with_capacity(len);
    for i in 0..len {
        let item = obj.get_item(i)?;
        items.push(HostValue::Proxy(ProxyObject::from_handle(ProxyHandle::wrap(item))));
    }
    Ok(HostValue::Array(items))
}

fn expand_mapping(obj: &Bound<'_, PyAny>) -> PyResult<HostValue> {
    let keys = obj.call_method0("keys")?;
    let mut map = IndexMap::with_capacity(obj.len().unwrap_or(0));
    for key in keys.try_iter()? {
        let key = key?;
        let value = obj.get_item(&key)?;
        // Non-string keys are stringified; distinct keys may collide here.
        let name = key.str()?.to_string();
        map.insert(name, HostValue::Proxy(ProxyObject::from_handle(ProxyHandle::wrap(value))));
    }
    Ok(HostValue::Object(map))
}

/// `str(obj)` for the object behind `handle`.
pub fn stringify(py: Python<'_>, handle: &ProxyHandle) -> PyResult<String> {
    let s = handle.bind(py).str()?;
    // Lone surrogates are valid foreign text but not UTF-8.
    Ok(s.to_string_lossy().into_owned())
}

/// `repr(obj)` for the object behind `handle`.
pub fn repr(py: Python<'_>, handle: &ProxyHandle) -> PyResult<String> {
    let s = handle.bind(py).repr()?;
    Ok(s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ensure_initialized, with_interpreter};
    use rstest::rstest;
    use std::ffi::CString;

    fn eval_category(expr: &str) -> Category {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let code = CString::new(expr).unwrap();
            let obj = py.eval(code.as_c_str(), None, None)?;
            Ok(classify(&obj))
        })
        .unwrap()
    }

    #[rstest]
    #[case("len", Category::Callable)]
    #[case("int", Category::Callable)]
    #[case("42", Category::Numeric)]
    #[case("1.5", Category::Numeric)]
    #[case("True", Category::Numeric)]
    #[case("[1, 2]", Category::Sequence)]
    #[case("(1,)", Category::Sequence)]
    #[case("'abc'", Category::Sequence)]
    #[case("{'a': 1}", Category::Mapping)]
    #[case("__import__('os').environ", Category::Mapping)]
    #[case("__import__('types').MappingProxyType({'a': 1})", Category::Mapping)]
    #[case("range(3)", Category::Sequence)]
    #[case("None", Category::Opaque)]
    #[case("object()", Category::Opaque)]
    fn test_classify(#[case] expr: &str, #[case] expected: Category) {
        assert_eq!(eval_category(expr), expected);
    }

    #[test]
    fn test_subscriptable_without_length_is_opaque() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let obj = py.eval(
                c"type('Lookup', (), {'__getitem__': lambda self, i: i})()",
                None,
                None,
            )?;
            assert_eq!(classify(&obj), Category::Opaque);
            let handle = ProxyHandle::wrap(obj);
            assert!(coerce(py, &handle)?.is_undefined());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_stringify_tolerates_lone_surrogate() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let handle = ProxyHandle::wrap(py.eval(c"'a\\udc80b'", None, None)?);
            let text = stringify(py, &handle)?;
            assert!(text.starts_with('a') && text.ends_with('b'));
            assert!(text.contains('\u{FFFD}'));
            assert_eq!(repr(py, &handle)?, r"'a\udc80b'");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_big_int_narrows_to_float() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let obj = py.eval(c"2 ** 70", None, None)?;
            assert_eq!(to_number(&obj)?, 2f64.powi(70));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_complex_has_no_host_number() {
        ensure_initialized().unwrap();
        with_interpreter(|py| {
            let obj = py.eval(c"1j", None, None)?;
            assert!(to_number(&obj).is_err());
            Ok(())
        })
        .unwrap();
    }
}
