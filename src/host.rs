//! Host-side value model and the protocols the host runtime drives.
//!
//! The host runtime's object model is external to this crate; what matters
//! here is the set of values that cross the boundary and the three hooks the
//! host invokes on a proxy:
//!
//! - property lookup ([`PropertyInterceptor`]),
//! - implicit string/value coercion ([`CoercionHooks`]),
//! - direct invocation ([`Invocable`]).

use std::fmt;

use indexmap::IndexMap;

use crate::error::Result;
use crate::proxy::ProxyObject;

/// A value as the host runtime sees it.
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    /// Host numbers are doubles; there is no separate integer type.
    Number(f64),
    String(String),
    Array(Vec<HostValue>),
    /// Plain object; enumeration order is insertion order.
    Object(IndexMap<String, HostValue>),
    Proxy(ProxyObject),
    Function(HostFunction),
}

impl HostValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HostValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, HostValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_proxy(&self) -> Option<&ProxyObject> {
        match self {
            Self::Proxy(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&HostFunction> {
        match self {
            Self::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Host property-lookup protocol.
    ///
    /// Proxies route through their interceptor; an absent foreign attribute
    /// reads as `Undefined`. Plain objects look up their own keys.
    pub fn get_property(&self, name: &str) -> Result<HostValue> {
        match self {
            Self::Proxy(proxy) => Ok(proxy.query(name)?.into_value()),
            Self::Object(map) => match map.get(name) {
                Some(value) => value.try_clone(),
                None => Ok(Self::Undefined),
            },
            Self::Array(items) if name == "length" => Ok(Self::Number(items.len() as f64)),
            _ => Ok(Self::Undefined),
        }
    }

    /// Host string-conversion protocol.
    pub fn to_host_string(&self) -> Result<String> {
        Ok(match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Self::Undefined | Self::Null => Ok(String::new()),
                    other => other.to_host_string(),
                })
                .collect::<Result<Vec<_>>>()?
                .join(","),
            Self::Object(_) => "[object Object]".to_string(),
            Self::Proxy(proxy) => proxy.to_display_string()?,
            Self::Function(func) => format!("function {}", func.target().to_display_string()?),
        })
    }

    /// Deep copy; proxies inside the value get fresh handles to the same
    /// foreign objects.
    pub fn try_clone(&self) -> Result<HostValue> {
        Ok(match self {
            Self::Undefined => Self::Undefined,
            Self::Null => Self::Null,
            Self::Bool(b) => Self::Bool(*b),
            Self::Number(n) => Self::Number(*n),
            Self::String(s) => Self::String(s.clone()),
            Self::Array(items) => {
                Self::Array(items.iter().map(Self::try_clone).collect::<Result<_>>()?)
            }
            Self::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), v.try_clone()?)))
                    .collect::<Result<_>>()?,
            ),
            Self::Proxy(proxy) => Self::Proxy(proxy.duplicate()?),
            Self::Function(func) => Self::Function(func.duplicate()?),
        })
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Array(items) => f.debug_list().entries(items).finish(),
            Self::Object(map) => f.debug_map().entries(map.iter()).finish(),
            Self::Proxy(proxy) => fmt::Debug::fmt(proxy, f),
            Self::Function(func) => fmt::Debug::fmt(func, f),
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<ProxyObject> for HostValue {
    fn from(proxy: ProxyObject) -> Self {
        Self::Proxy(proxy)
    }
}

/// Host number formatting: integral values print without a fraction, and
/// magnitudes outside `[1e-6, 1e21)` switch to exponent form (`1e+21`).
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        return format!("{sign}Infinity");
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{n:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    if n == n.trunc() {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

// ==================== Host Functions ====================

/// A host-native function whose body is a foreign callable.
///
/// Produced when a foreign callable is coerced. It owns its own handle to the
/// callable, independent of the proxy it was coerced from.
pub struct HostFunction {
    target: ProxyObject,
}

impl HostFunction {
    pub(crate) fn new(target: ProxyObject) -> Self {
        Self { target }
    }

    /// The proxy this function forwards to.
    pub fn target(&self) -> &ProxyObject {
        &self.target
    }

    pub fn duplicate(&self) -> Result<Self> {
        Ok(Self::new(self.target.duplicate()?))
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostFunction").field(&self.target).finish()
    }
}

impl Invocable for HostFunction {
    fn invoke(&self, args: &[HostValue]) -> Result<HostValue> {
        self.target.invoke(args)
    }
}

// ==================== Protocols ====================

/// Outcome of a property lookup.
#[derive(Debug)]
pub enum Property {
    Found(HostValue),
    Absent,
}

impl Property {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Collapse into the value the host reads: `Absent` becomes `Undefined`.
    pub fn into_value(self) -> HostValue {
        match self {
            Self::Found(value) => value,
            Self::Absent => HostValue::Undefined,
        }
    }
}

/// Outcome of a property assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Accepted by the host but not forwarded anywhere.
    Ignored,
}

/// Dynamic property access, invoked for every named lookup on the object.
pub trait PropertyInterceptor {
    fn query(&self, name: &str) -> Result<Property>;
    fn assign(&self, name: &str, value: HostValue) -> Result<Assignment>;
}

/// Implicit conversions the host performs on the object.
pub trait CoercionHooks {
    /// `toString` protocol.
    fn to_display_string(&self) -> Result<String>;
    /// `valueOf` protocol.
    fn value_of(&self) -> Result<HostValue>;
}

/// Calling the object as a function.
pub trait Invocable {
    fn invoke(&self, args: &[HostValue]) -> Result<HostValue>;
}
