//! pyproxy: host-side proxies for objects owned by an embedded Python interpreter.
//!
//! Host code never converts foreign values by hand. It imports a foreign
//! module, gets back a [`ProxyObject`], and from there:
//!
//! - property reads resolve foreign attributes (missing ones read as `undefined`),
//! - string coercion calls the foreign `str()`,
//! - value coercion expands numbers, sequences, mappings and callables,
//! - invocation converts arguments, calls the foreign object, and wraps the result.
//!
//! Every foreign value produced along the way is wrapped in a fresh proxy that
//! owns exactly one reference and releases it when dropped.
//!
//! ```no_run
//! use pyproxy::{exports, HostValue};
//!
//! # fn main() -> pyproxy::Result<()> {
//! let math = exports::import(&HostValue::from("math"))?;
//! let sqrt = math.get_attribute("sqrt")?.expect("math.sqrt");
//! let root = sqrt.call(&[HostValue::Number(16.0)])?;
//! assert_eq!(root.coerce()?.as_number(), Some(4.0));
//! exports::shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! The interpreter's global lock is assumed, not managed: all operations are
//! synchronous and run on the caller's thread, in program order.

pub mod attribute;
pub mod call;
pub mod coerce;
pub mod config;
pub mod convert;
pub mod error;
pub mod exports;
pub mod handle;
pub mod host;
pub mod proxy;
pub mod runtime;

pub use coerce::Category;
pub use config::RuntimeConfig;
pub use error::{BridgeError, ErrorKind, ForeignException, Result};
pub use handle::ProxyHandle;
pub use host::{
    Assignment, CoercionHooks, HostFunction, HostValue, Invocable, Property, PropertyInterceptor,
};
pub use proxy::ProxyObject;
pub use runtime::RuntimeState;
