//! The module surface the host runtime sees.
//!
//! ```text
//! load(config)        module initialization, once per process
//! import(name)        -> proxy for the foreign module `name`
//! shutdown()          interpreter teardown, once per process
//! ```
//!
//! `import` validates its argument before touching the interpreter, and loads
//! it from the environment if the host skipped `load`.

use crate::config::RuntimeConfig;
use crate::error::{BridgeError, Result};
use crate::host::HostValue;
use crate::proxy::ProxyObject;
use crate::runtime;

/// Module initialization: bring up the interpreter with `config`.
pub fn load(config: RuntimeConfig) -> Result<()> {
    runtime::initialize(config)
}

/// `import(moduleName)`.
pub fn import(module_name: &HostValue) -> Result<ProxyObject> {
    let name = match module_name {
        HostValue::String(name) => name.as_str(),
        other => {
            tracing::debug!(argument = ?other, "import called with a non-string argument");
            return Err(BridgeError::ArgumentNotString);
        }
    };
    runtime::ensure_initialized()?;
    ProxyObject::import(name)
}

/// `shutdown()`. A second call fails with [`BridgeError::ShutDown`].
pub fn shutdown() -> Result<()> {
    runtime::shutdown()
}
