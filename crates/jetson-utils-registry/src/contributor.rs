//! Contributing subsystems.
//!
//! A contributing subsystem is a native module that supplies a descriptor
//! table and attaches its native types to the loaded module. The registry
//! only sees subsystems through [`Contributor`].

use std::fmt;

use jetson_utils_core::{Descriptor, ModuleObject};

/// A native subsystem that contributes functions and types to the module.
pub trait Contributor {
    /// Short name used in diagnostics, e.g. `"CUDA"`.
    fn name(&self) -> &str;

    /// The subsystem's descriptor table, or `None` if it contributes no
    /// functions.
    fn functions(&self) -> Option<&'static [Descriptor]>;

    /// Attach the subsystem's native types to `module`.
    ///
    /// Returns `false` on failure. The failure is logged by the caller and
    /// does not stop the remaining subsystems.
    fn register_types(&self, module: &mut dyn ModuleObject) -> bool;
}

/// Ordered, extensible collection of contributing subsystems.
///
/// Functions are appended and types registered in insertion order.
#[derive(Default)]
pub struct Contributors {
    entries: Vec<Box<dyn Contributor>>,
}

impl Contributors {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, contributor: impl Contributor + 'static) -> Self {
        self.push(contributor);
        self
    }

    /// Add a contributor at the end of the collection.
    pub fn push(&mut self, contributor: impl Contributor + 'static) {
        self.entries.push(Box::new(contributor));
    }

    /// Iterate contributors in order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Contributor + 'static)> {
        self.entries.iter().map(|c| &**c)
    }

    /// Number of contributors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no contributors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Contributors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}
