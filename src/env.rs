use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::{OsStr, OsString};

/// User-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: a snapshot of the environment variables taken at startup, kept
///   as raw OS strings so that non-UTF-8 names and values are carried as is.
/// - `should_exit`: a flag the driver loop checks after every command.
///
/// The working directory is not mirrored here; `cd` changes the real process
/// working directory so that children and relative paths observe it.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<OsString, OsString>,
    /// Set by the `exit` built-in; the driver loop stops once it is true.
    pub should_exit: bool,
}

impl Environment {
    /// Snapshot of the current process environment.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars_os().collect(),
            should_exit: false,
        }
    }

    /// Value of `key` in the snapshot, or in the live process environment if
    /// the snapshot lacks it.
    pub fn get_var(&self, key: impl AsRef<OsStr>) -> Option<OsString> {
        let key = key.as_ref();
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var_os(key))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
