//! The host-visible proxy object.
//!
//! A [`ProxyObject`] is what host code holds: it embeds exactly one
//! [`ProxyHandle`] and is collected by the host like any other value, which
//! releases the foreign reference. Every operation takes the GIL through the
//! runtime gate, so all of them fail with [`BridgeError::ShutDown`] once the
//! interpreter has been torn down.
//!
//! The named operations (`get_attribute`, `stringify`, `coerce`, `call`) are
//! also exposed through the host protocol traits in [`crate::host`], which is
//! how the host runtime reaches them implicitly.

use std::fmt;

use crate::attribute;
use crate::call;
use crate::coerce::{self, Category};
use crate::error::{BridgeError, Result};
use crate::handle::ProxyHandle;
use crate::host::{Assignment, CoercionHooks, HostValue, Invocable, Property, PropertyInterceptor};
use crate::runtime;

pub struct ProxyObject {
    handle: ProxyHandle,
}

impl ProxyObject {
    pub(crate) fn from_handle(handle: ProxyHandle) -> Self {
        Self { handle }
    }

    pub(crate) fn handle(&self) -> &ProxyHandle {
        &self.handle
    }

    /// Import a foreign module by dotted name.
    pub fn import(module: &str) -> Result<Self> {
        runtime::with_interpreter(|py| match py.import(module) {
            Ok(m) => {
                tracing::debug!(module, "imported foreign module");
                Ok(Self::from_handle(ProxyHandle::wrap(m.into_any())))
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::debug!(module, %reason, "foreign import failed");
                Err(BridgeError::Import {
                    module: module.to_string(),
                    reason,
                })
            }
        })
    }

    /// Handle id, for diagnostics.
    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    /// A fresh, independent proxy for the same foreign object.
    pub fn duplicate(&self) -> Result<Self> {
        runtime::with_interpreter(|py| Ok(Self::from_handle(self.handle.duplicate(py))))
    }

    /// Attribute lookup; `None` when the foreign object has no such attribute.
    pub fn get_attribute(&self, name: &str) -> Result<Option<Self>> {
        runtime::with_interpreter(|py| {
            Ok(attribute::get_attribute(py, &self.handle, name).map(Self::from_handle))
        })
    }

    /// Attribute write. Accepted and ignored; see [`attribute::set_attribute`].
    pub fn set_attribute(&self, name: &str, value: HostValue) -> Result<Assignment> {
        if !runtime::is_running() {
            return Err(BridgeError::ShutDown);
        }
        Ok(attribute::set_attribute(&self.handle, name, value))
    }

    /// `str()` of the foreign object.
    pub fn stringify(&self) -> Result<String> {
        runtime::with_interpreter(|py| Ok(coerce::stringify(py, &self.handle)?))
    }

    /// `repr()` of the foreign object.
    pub fn repr(&self) -> Result<String> {
        runtime::with_interpreter(|py| Ok(coerce::repr(py, &self.handle)?))
    }

    /// One-level conversion to a host value, by foreign category.
    pub fn coerce(&self) -> Result<HostValue> {
        runtime::with_interpreter(|py| Ok(coerce::coerce(py, &self.handle)?))
    }

    pub fn category(&self) -> Result<Category> {
        runtime::with_interpreter(|py| Ok(coerce::classify(self.handle.bind(py))))
    }

    /// Call the foreign object with host arguments.
    pub fn call(&self, args: &[HostValue]) -> Result<Self> {
        runtime::with_interpreter(|py| call::call(py, &self.handle, args).map(Self::from_handle))
    }

    /// Call the foreign method `name` with host arguments.
    pub fn call_method(&self, name: &str, args: &[HostValue]) -> Result<Self> {
        runtime::with_interpreter(|py| {
            call::call_method(py, &self.handle, name, args).map(Self::from_handle)
        })
    }
}

impl PropertyInterceptor for ProxyObject {
    fn query(&self, name: &str) -> Result<Property> {
        Ok(match self.get_attribute(name)? {
            Some(value) => Property::Found(HostValue::Proxy(value)),
            None => Property::Absent,
        })
    }

    fn assign(&self, name: &str, value: HostValue) -> Result<Assignment> {
        self.set_attribute(name, value)
    }
}

impl CoercionHooks for ProxyObject {
    fn to_display_string(&self) -> Result<String> {
        self.stringify()
    }

    fn value_of(&self) -> Result<HostValue> {
        self.coerce()
    }
}

impl Invocable for ProxyObject {
    fn invoke(&self, args: &[HostValue]) -> Result<HostValue> {
        self.call(args).map(HostValue::Proxy)
    }
}

impl fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyObject")
            .field("handle", &self.handle.id())
            .finish()
    }
}
