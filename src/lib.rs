//! # jetson-utils
//!
//! Registration shim that assembles the `jetson_utils_python` extension
//! module from its contributing subsystems.
//!
//! Loading happens once per process:
//!
//! 1. every subsystem's function table is merged into a bounded registry,
//! 2. the host constructs the module object from the merged table,
//! 3. every subsystem attaches its native types to the module.
//!
//! Only step 2 can fail. Everything else is recorded as a diagnostic and the
//! load carries on.
//!
//! # Example
//!
//! ```
//! use jetson_utils::{InProcessHost, LoaderConfig, ModuleLoader, default_contributors};
//!
//! let config = LoaderConfig::default().with_echo(false);
//! let mut loader = ModuleLoader::new(InProcessHost::default(), default_contributors(), config);
//! let module = loader.load().unwrap();
//!
//! assert!(module.function("cudaMalloc").is_some());
//! assert!(module.get_type("cudaImage").is_some());
//! ```

pub mod config;
pub mod host;
pub mod loader;

use std::sync::OnceLock;

pub use config::{LoaderConfig, MODULE_NAME};
pub use host::{InProcessHost, ModuleHost, RuntimeInfo};
pub use loader::{LoadError, LoadState, ModuleLoader};

pub use jetson_utils_core::{
    CallArgs, CallFlags, Descriptor, Diagnostics, HostError, Module, ModuleObject, NativeError,
    TypeObject, Value,
};
pub use jetson_utils_cuda as cuda;
pub use jetson_utils_registry::{Contributor, Contributors, FunctionRegistry, MAX_FUNCTIONS};

/// Every subsystem compiled into the module, in registration order.
pub fn default_contributors() -> Contributors {
    Contributors::new().with(jetson_utils_cuda::CudaSubsystem)
}

static MODULE: OnceLock<Option<Module>> = OnceLock::new();

/// Process-wide module entry point.
///
/// The first call loads the module with the default configuration and
/// contributors; later calls return the same result without reloading.
/// Returns `None` if module construction failed.
pub fn module_init() -> Option<&'static Module> {
    MODULE
        .get_or_init(|| {
            let mut loader = ModuleLoader::new(
                InProcessHost::default(),
                default_contributors(),
                LoaderConfig::default(),
            );
            loader.load().ok()
        })
        .as_ref()
}
