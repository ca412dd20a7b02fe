//! The hosting runtime's side of module construction.
//!
//! A [`ModuleHost`] turns a finished [`ModuleDef`] into a live module object.
//! Construction is the only step of a load that may fail fatally.

use std::fmt;

use jetson_utils_core::{HostError, Module, ModuleDef, ModuleObject};

/// Name and version of the hosting runtime, used in load diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Runtime name, e.g. `"Python"`.
    pub name: &'static str,
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl RuntimeInfo {
    /// Describe a runtime by name and version.
    pub const fn new(name: &'static str, major: u32, minor: u32) -> Self {
        Self { name, major, minor }
    }
}

impl fmt::Display for RuntimeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.name, self.major, self.minor)
    }
}

/// A scripting runtime able to construct extension modules.
pub trait ModuleHost {
    /// The runtime's module object.
    type Module: ModuleObject;

    /// Runtime name and version.
    fn runtime(&self) -> RuntimeInfo;

    /// Construct a module from `def`.
    fn create_module(&mut self, def: &ModuleDef<'_>) -> Result<Self::Module, HostError>;
}

/// Host that builds [`Module`] objects in-process.
#[derive(Debug, Clone)]
pub struct InProcessHost {
    runtime: RuntimeInfo,
}

impl InProcessHost {
    /// Host reporting `runtime` in load diagnostics.
    pub fn new(runtime: RuntimeInfo) -> Self {
        Self { runtime }
    }
}

impl Default for InProcessHost {
    fn default() -> Self {
        Self::new(RuntimeInfo::new("in-process", 1, 0))
    }
}

impl ModuleHost for InProcessHost {
    type Module = Module;

    fn runtime(&self) -> RuntimeInfo {
        self.runtime
    }

    fn create_module(&mut self, def: &ModuleDef<'_>) -> Result<Module, HostError> {
        if !is_identifier(def.name) {
            return Err(HostError::InvalidModuleName(def.name.to_string()));
        }
        Ok(Module::from_def(def))
    }
}

/// Module names must be importable: ASCII letters, digits and underscores,
/// not starting with a digit.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetson_utils_core::Descriptor;

    #[test]
    fn identifiers() {
        assert!(is_identifier("jetson_utils_python"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("3d"));
        assert!(!is_identifier("jetson.utils"));
    }

    #[test]
    fn rejects_invalid_name() {
        let table = [Descriptor::SENTINEL];
        let def = ModuleDef {
            name: "jetson.utils",
            doc: None,
            functions: &table,
        };
        let err = InProcessHost::default().create_module(&def).unwrap_err();
        assert_eq!(err, HostError::InvalidModuleName("jetson.utils".into()));
    }

    #[test]
    fn runtime_display() {
        assert_eq!(RuntimeInfo::new("Python", 3, 10).to_string(), "Python 3.10");
    }
}
