//! Shared fixture: a foreign module installed straight into `sys.modules`.
#![allow(dead_code)]

use std::sync::Once;

use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyproxy::{exports, HostValue, ProxyObject, RuntimeConfig};

pub const FIXTURE_MODULE: &str = "pyproxy_fixture";

const FIXTURE_SOURCE: &std::ffi::CStr = cr#"
from collections.abc import Mapping

SENTINEL = object()
numbers = [1, 2, 3]
mapping = {"a": 1, "b": 2}
reversed_mapping = {"z": 1, "y": 2, "x": 3}
mixed_keys = {1: "one", (2, 3): "pair"}
greeting = "hi"
ratio = 3.5
big = 2 ** 70
nothing = None
surrogate = "name-\udc80"


def add(a, b):
    return a + b


def is_sentinel(x):
    return x is SENTINEL


def type_names(*args):
    return [type(a).__name__ for a in args]


def echo(x):
    return x


def boom():
    raise ValueError("kaboom")


class Point:
    def __init__(self):
        self.x = 1

    @property
    def broken(self):
        raise RuntimeError("getter failed")

    def shifted(self, dx):
        return self.x + dx


point = Point()


class Settings(Mapping):
    def __init__(self):
        self._data = {"first": 1, "second": 2}

    def __getitem__(self, key):
        return self._data[key]

    def __iter__(self):
        return iter(self._data)

    def __len__(self):
        return len(self._data)


class Lookup:
    def __getitem__(self, index):
        return index * 2


settings = Settings()
lookup = Lookup()
"#;

static INSTALL: Once = Once::new();

/// Load the interpreter (quietly) and install the fixture module once.
pub fn setup() {
    INSTALL.call_once(|| {
        exports::load(RuntimeConfig::default().with_print_foreign_errors(false))
            .expect("interpreter loads");
        pyproxy::runtime::with_interpreter(|py| {
            let module = PyModule::from_code(
                py,
                FIXTURE_SOURCE,
                c"pyproxy_fixture.py",
                c"pyproxy_fixture",
            )?;
            py.import("sys")?
                .getattr("modules")?
                .set_item(FIXTURE_MODULE, module)?;
            Ok(())
        })
        .expect("fixture installs");
    });
}

pub fn fixture() -> ProxyObject {
    setup();
    exports::import(&HostValue::from(FIXTURE_MODULE)).expect("fixture imports")
}

pub fn attr(proxy: &ProxyObject, name: &str) -> ProxyObject {
    proxy
        .get_attribute(name)
        .expect("interpreter running")
        .unwrap_or_else(|| panic!("attribute {name} present"))
}

/// Coerce a proxy expected to hold a number.
pub fn number(proxy: &ProxyObject) -> f64 {
    proxy
        .coerce()
        .expect("coercion succeeds")
        .as_number()
        .expect("numeric value")
}
