//! Module loading: the once-per-process initialization sequence.
//!
//! [`ModuleLoader::load`] drives a single pass through
//!
//! ```text
//! Uninitialized -> FunctionsRegistered -> ModuleConstructed -> TypesRegistered -> Ready
//!                                      \-> Failed
//! ```
//!
//! Every transition runs once, in order, with no rollback. Module
//! construction is the only fatal step; everything else is logged into the
//! registry's diagnostics and the load carries on.

use std::fmt;

use jetson_utils_core::{Diagnostics, HostError};
use jetson_utils_registry::{Contributors, FunctionRegistry};
use thiserror::Error;

use crate::config::LoaderConfig;
use crate::host::ModuleHost;

/// Where a loader is in its one-way sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// `load` has not run.
    Uninitialized,
    /// Every contributor's table is in the registry.
    FunctionsRegistered,
    /// The host built the module object.
    ModuleConstructed,
    /// Every contributor was asked to attach its types.
    TypesRegistered,
    /// The module is complete. Terminal.
    Ready,
    /// Module construction failed. Terminal.
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Uninitialized => "uninitialized",
            LoadState::FunctionsRegistered => "functions registered",
            LoadState::ModuleConstructed => "module constructed",
            LoadState::TypesRegistered => "types registered",
            LoadState::Ready => "ready",
            LoadState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Fatal load failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The runtime could not construct the module object.
    #[error(transparent)]
    ModuleCreation(#[from] HostError),

    /// `load` was called on a loader that already ran.
    #[error("module load already ran (state: {0})")]
    AlreadyLoaded(LoadState),
}

/// Builds the extension module once, against a given host.
pub struct ModuleLoader<H: ModuleHost> {
    host: H,
    config: LoaderConfig,
    contributors: Contributors,
    registry: FunctionRegistry,
    state: LoadState,
}

impl<H: ModuleHost> ModuleLoader<H> {
    /// Loader that has not run yet. Diagnostics follow `config`'s tag and
    /// echo setting.
    pub fn new(host: H, contributors: Contributors, config: LoaderConfig) -> Self {
        let registry = FunctionRegistry::with_diagnostics(config.diagnostics());
        Self {
            host,
            config,
            contributors,
            registry,
            state: LoadState::Uninitialized,
        }
    }

    /// Current position in the load sequence.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Configuration the loader was created with.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The host modules are built against.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The merged function table.
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Every milestone and swallowed failure of the load.
    pub fn diagnostics(&self) -> &Diagnostics {
        self.registry.diagnostics()
    }

    /// Run the initialization sequence and return the module object.
    ///
    /// Fails only if the host cannot construct the module, in which case no
    /// type registration happens. A loader runs at most once; later calls
    /// return [`LoadError::AlreadyLoaded`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn load(&mut self) -> Result<H::Module, LoadError> {
        if self.state != LoadState::Uninitialized {
            return Err(LoadError::AlreadyLoaded(self.state));
        }

        let runtime = self.host.runtime();
        self.registry
            .diagnostics_mut()
            .info(format!("initializing {runtime} bindings..."));

        if !self.registry.initialize_functions(&self.contributors) {
            self.registry
                .diagnostics_mut()
                .warning("failed to register module functions");
        }
        self.state = LoadState::FunctionsRegistered;

        let def = self
            .registry
            .module_def(&self.config.module_name, self.config.doc.as_deref());
        let created = self.host.create_module(&def);
        let mut module = match created {
            Ok(module) => module,
            Err(err) => {
                self.registry
                    .diagnostics_mut()
                    .error(format!("{} module creation failed: {err}", runtime.name));
                self.state = LoadState::Failed;
                return Err(err.into());
            }
        };
        self.state = LoadState::ModuleConstructed;

        if !self.registry.initialize_types(&mut module, &self.contributors) {
            self.registry
                .diagnostics_mut()
                .warning("failed to register module types");
        }
        self.state = LoadState::TypesRegistered;

        self.registry
            .diagnostics_mut()
            .info(format!("done {runtime} binding initialization"));
        self.state = LoadState::Ready;
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{InProcessHost, RuntimeInfo};
    use jetson_utils_core::{
        CallArgs, CallFlags, Descriptor, DiagnosticKind, Module, ModuleDef, ModuleObject,
        NativeError, TypeObject, Value,
    };
    use jetson_utils_registry::Contributor;
    use std::cell::Cell;
    use std::rc::Rc;

    fn nop(_: &CallArgs) -> Result<Value, NativeError> {
        Ok(Value::None)
    }

    static TABLE: [Descriptor; 3] = [
        Descriptor::new("first", nop, CallFlags::NOARGS),
        Descriptor::new("second", nop, CallFlags::NOARGS),
        Descriptor::SENTINEL,
    ];

    struct Counting {
        types_called: Rc<Cell<u32>>,
    }

    impl Contributor for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn functions(&self) -> Option<&'static [Descriptor]> {
            Some(&TABLE)
        }

        fn register_types(&self, module: &mut dyn ModuleObject) -> bool {
            self.types_called.set(self.types_called.get() + 1);
            module.add_type(TypeObject::new("counted")).is_ok()
        }
    }

    struct FailingHost {
        seen_functions: usize,
    }

    impl ModuleHost for FailingHost {
        type Module = Module;

        fn runtime(&self) -> RuntimeInfo {
            RuntimeInfo::new("Python", 3, 8)
        }

        fn create_module(&mut self, def: &ModuleDef<'_>) -> Result<Module, HostError> {
            self.seen_functions = def.entries().count();
            Err(HostError::ModuleCreation {
                runtime: "Python".into(),
                module: def.name.into(),
                reason: "out of memory".into(),
            })
        }
    }

    fn host() -> InProcessHost {
        InProcessHost::default()
    }

    fn quiet() -> LoaderConfig {
        LoaderConfig::default().with_echo(false)
    }

    fn counting() -> (Contributors, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let contributors = Contributors::new().with(Counting {
            types_called: Rc::clone(&calls),
        });
        (contributors, calls)
    }

    #[test]
    fn load_reaches_ready() {
        let (contributors, calls) = counting();
        let mut loader = ModuleLoader::new(InProcessHost::default(), contributors, quiet());
        assert_eq!(loader.state(), LoadState::Uninitialized);

        let module = loader.load().unwrap();
        assert_eq!(loader.state(), LoadState::Ready);
        assert_eq!(module.name(), "jetson_utils_python");
        assert_eq!(module.function_count(), 2);
        assert!(module.has_type("counted"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn load_logs_milestones_in_order() {
        let (contributors, _) = counting();
        let mut loader = ModuleLoader::new(InProcessHost::default(), contributors, quiet());
        loader.load().unwrap();

        let messages: Vec<_> = loader
            .diagnostics()
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(
            messages,
            [
                "initializing in-process 1.0 bindings...",
                "registering module functions...",
                "done registering module functions",
                "registering module types...",
                "done registering module types",
                "done in-process 1.0 binding initialization",
            ]
        );
    }

    #[test]
    fn construction_failure_is_fatal() {
        let (contributors, calls) = counting();
        let host = FailingHost { seen_functions: 0 };
        let mut loader = ModuleLoader::new(host, contributors, quiet());

        let err = loader.load().unwrap_err();
        assert!(matches!(err, LoadError::ModuleCreation(_)));
        assert_eq!(loader.state(), LoadState::Failed);
        assert_eq!(loader.host().seen_functions, 2);
        assert_eq!(calls.get(), 0, "no type registration after a failed construction");

        let last = loader.diagnostics().iter().last().unwrap();
        assert_eq!(last.kind, DiagnosticKind::Error);
        assert!(last.message.starts_with("Python module creation failed"));
    }

    #[test]
    fn second_load_is_rejected() {
        let mut loader = ModuleLoader::new(host(), Contributors::new(), quiet());
        loader.load().unwrap();
        let err = loader.load().unwrap_err();
        assert_eq!(err, LoadError::AlreadyLoaded(LoadState::Ready));
    }

    #[test]
    fn empty_contributors_build_empty_module() {
        let mut loader = ModuleLoader::new(host(), Contributors::new(), quiet());
        let module = loader.load().unwrap();
        assert_eq!(module.function_count(), 0);
        assert!(loader.registry().is_empty());
        assert!(!loader.diagnostics().has_warnings());
    }

    #[test]
    fn doc_and_name_come_from_config() {
        let config = quiet().with_module_name("jetson_utils").with_doc("CUDA utilities");
        let mut loader = ModuleLoader::new(host(), Contributors::new(), config);
        let module = loader.load().unwrap();
        assert_eq!(loader.config().module_name, module.name());
        assert_eq!(module.name(), "jetson_utils");
        assert_eq!(module.doc(), Some("CUDA utilities"));
    }
}
