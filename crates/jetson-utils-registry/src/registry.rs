//! FunctionRegistry - the bounded, sentinel-terminated function table.
//!
//! [`FunctionRegistry`] collects descriptor tables from every contributing
//! subsystem into one contiguous array that can be handed to the runtime's
//! module constructor in a single call.
//!
//! # Storage Model
//!
//! - A fixed array of `N` descriptors (128 by default) and a running count.
//! - `count < N` at all times. Slot `N - 1` is never written, so after
//!   [`FunctionRegistry::clear`] the table always ends with a sentinel.
//! - Overflow is not an error: the offending table is truncated and a single
//!   warning is recorded in the registry's [`Diagnostics`].
//!
//! # Lifecycle
//!
//! The registry is populated single-threaded while the module loads, read
//! once when the module object is constructed, and read-only afterwards.
//!
//! # Example
//!
//! ```
//! use jetson_utils_core::{CallArgs, CallFlags, Descriptor, Diagnostics, NativeError, Value};
//! use jetson_utils_registry::FunctionRegistry;
//!
//! fn sync(_: &CallArgs) -> Result<Value, NativeError> {
//!     Ok(Value::None)
//! }
//!
//! static TABLE: [Descriptor; 2] = [
//!     Descriptor::new("cudaDeviceSynchronize", sync, CallFlags::NOARGS),
//!     Descriptor::SENTINEL,
//! ];
//!
//! let mut registry = FunctionRegistry::with_diagnostics(Diagnostics::silent("jetson.utils"));
//! registry.append(Some(&TABLE));
//! registry.append(None);
//!
//! assert_eq!(registry.len(), 1);
//! assert!(registry.table()[1].is_sentinel());
//! ```

use jetson_utils_core::{
    Descriptor, Diagnostics, ModuleDef, ModuleObject, RegistrationError, table_entries,
};

use crate::contributor::Contributors;

/// Maximum number of descriptor slots, sentinel included.
pub const MAX_FUNCTIONS: usize = 128;

/// Fixed-capacity, sentinel-terminated function table.
pub struct FunctionRegistry<const N: usize = MAX_FUNCTIONS> {
    slots: [Descriptor; N],
    len: usize,
    diagnostics: Diagnostics,
}

impl FunctionRegistry {
    /// Create an empty registry with the default capacity that echoes its
    /// diagnostics to standard output.
    pub fn new() -> Self {
        Self::with_diagnostics(Diagnostics::default())
    }

    /// Create an empty registry with the default capacity recording into
    /// `diagnostics`.
    pub fn with_diagnostics(diagnostics: Diagnostics) -> Self {
        Self::bounded(diagnostics)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FunctionRegistry<N> {
    /// Create an empty registry of `N` slots recording into `diagnostics`.
    ///
    /// The capacity must be named at the call site, e.g.
    /// `FunctionRegistry::<16>::bounded(..)`.
    pub fn bounded(diagnostics: Diagnostics) -> Self {
        const { assert!(N > 0, "registry needs room for the sentinel") };
        Self {
            slots: [Descriptor::SENTINEL; N],
            len: 0,
            diagnostics,
        }
    }

    // ==========================================================================
    // Table Access
    // ==========================================================================

    /// Number of real entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no entries have been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slots, sentinel included.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Real entries in append order.
    pub fn functions(&self) -> &[Descriptor] {
        &self.slots[..self.len]
    }

    /// Real entries followed by exactly one sentinel.
    pub fn table(&self) -> &[Descriptor] {
        &self.slots[..=self.len]
    }

    /// Module definition over the current table.
    pub fn module_def<'a>(&'a self, name: &'a str, doc: Option<&'a str>) -> ModuleDef<'a> {
        ModuleDef {
            name,
            doc,
            functions: self.table(),
        }
    }

    /// Recorded diagnostics.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable access so the loader can record its milestones in the same log.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Zero every slot so the untouched tail reads as the sentinel.
    pub fn clear(&mut self) {
        self.slots.fill(Descriptor::SENTINEL);
        self.len = 0;
    }

    /// Append a contributor's table, preserving order.
    ///
    /// `None` is a silent no-op. Copying stops at the table's sentinel. If the
    /// registry fills up, the remaining entries of this table are dropped,
    /// one warning is recorded, and the entries already copied stay in place.
    ///
    /// Returns the number of entries copied by this call.
    pub fn append(&mut self, table: Option<&[Descriptor]>) -> usize {
        let Some(table) = table else {
            return 0;
        };

        let mut copied = 0;
        for (index, descriptor) in table_entries(table).enumerate() {
            if self.len >= N - 1 {
                let dropped = table_entries(table).count() - index;
                let err = RegistrationError::CapacityExceeded { capacity: N, dropped };
                tracing::debug!(dropped, first = descriptor.name, "descriptor table truncated");
                self.diagnostics.warning(err.to_string());
                return copied;
            }

            tracing::debug!(name = descriptor.name, slot = self.len, "registering function");
            self.slots[self.len] = *descriptor;
            self.len += 1;
            copied += 1;
        }
        copied
    }

    /// Clear the registry and append every contributor's table in order.
    ///
    /// Always succeeds; overflow is recorded, not returned.
    pub fn initialize_functions(&mut self, contributors: &Contributors) -> bool {
        self.diagnostics.info("registering module functions...");

        self.clear();
        for contributor in contributors.iter() {
            let copied = self.append(contributor.functions());
            tracing::debug!(subsystem = contributor.name(), copied, "appended descriptor table");
        }

        self.diagnostics.info("done registering module functions");
        true
    }

    /// Forward `module` to every contributor's type registration, in order.
    ///
    /// Always succeeds; a contributor reporting failure is recorded and the
    /// remaining contributors still run.
    pub fn initialize_types(
        &mut self,
        module: &mut dyn ModuleObject,
        contributors: &Contributors,
    ) -> bool {
        self.diagnostics.info("registering module types...");

        for contributor in contributors.iter() {
            if !contributor.register_types(module) {
                self.diagnostics
                    .warning(format!("failed to register {} types", contributor.name()));
            }
        }

        self.diagnostics.info("done registering module types");
        true
    }
}
