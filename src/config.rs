//! Runtime configuration for the embedded interpreter.
//!
//! Read once when the interpreter is loaded. Environment overrides:
//!
//! - `PYPROXY_PATH`: extra import roots, platform path-list syntax, searched
//!   before the defaults.
//! - `PYPROXY_PRINT_ERRORS`: print foreign tracebacks when a call raises.
//! - `PYPROXY_PRELOAD`: re-open `libpython` with `RTLD_GLOBAL` (Linux only).

use std::env;
use std::path::PathBuf;

use crate::error::{BridgeError, Result};

pub const ENV_PATH: &str = "PYPROXY_PATH";
pub const ENV_PRINT_ERRORS: &str = "PYPROXY_PRINT_ERRORS";
pub const ENV_PRELOAD: &str = "PYPROXY_PRELOAD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directories inserted at the front of `sys.path`, in order.
    pub sys_paths: Vec<PathBuf>,
    /// Make interpreter symbols globally visible so native extension
    /// modules can resolve them.
    pub preload_global_symbols: bool,
    /// Print the foreign traceback to stderr when a call raises.
    pub print_foreign_errors: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sys_paths: vec![PathBuf::from(".")],
            preload_global_symbols: true,
            print_foreign_errors: true,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overlaid with the `PYPROXY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(paths) = lookup(ENV_PATH) {
            let mut extra: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            extra.append(&mut config.sys_paths);
            config.sys_paths = extra;
        }
        if let Some(raw) = lookup(ENV_PRINT_ERRORS) {
            config.print_foreign_errors = parse_flag(ENV_PRINT_ERRORS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PRELOAD) {
            config.preload_global_symbols = parse_flag(ENV_PRELOAD, &raw)?;
        }

        Ok(config)
    }

    pub fn with_sys_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sys_paths.push(path.into());
        self
    }

    pub fn with_print_foreign_errors(mut self, enabled: bool) -> Self {
        self.print_foreign_errors = enabled;
        self
    }

    pub fn with_preload_global_symbols(mut self, enabled: bool) -> Self {
        self.preload_global_symbols = enabled;
        self
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(BridgeError::Config(format!(
            "{key} must be a boolean, got {other:?}"
        ))),
    }
}
