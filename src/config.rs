//! Loader configuration.

use jetson_utils_core::{DEFAULT_TAG, Diagnostics};

/// Module name the runtime imports.
pub const MODULE_NAME: &str = "jetson_utils_python";

/// Settings for a [`ModuleLoader`](crate::ModuleLoader).
///
/// The defaults are the externally observable contract: module name
/// `jetson_utils_python`, no doc string, diagnostics tagged `jetson.utils`
/// and echoed to standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Name passed to the runtime's module constructor.
    pub module_name: String,
    /// Module doc string; `None` leaves it empty.
    pub doc: Option<String>,
    /// Prefix of every diagnostic line.
    pub tag: String,
    /// Write diagnostics to standard output as they are recorded.
    pub echo: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            module_name: MODULE_NAME.to_string(),
            doc: None,
            tag: DEFAULT_TAG.to_string(),
            echo: true,
        }
    }
}

impl LoaderConfig {
    /// Import name of the module.
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Module doc string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Disable or enable the standard output echo. Diagnostics are recorded
    /// either way.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Fresh diagnostics log with this configuration's tag and echo setting.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new(self.tag.clone());
        diagnostics.set_echo(self.echo);
        diagnostics
    }
}
