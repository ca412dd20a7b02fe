//! Module definitions and the in-process module object.
//!
//! The hosting runtime builds a module from a [`ModuleDef`]: a name, an
//! optional doc string and a finished, sentinel-terminated descriptor table.
//! Contributing subsystems then attach their native types through the
//! [`ModuleObject`] trait, which every host's module type implements.
//!
//! [`Module`] is the in-process implementation. It keeps functions in table
//! order and indexes functions, types and type methods by [`SymbolHash`].

use rustc_hash::FxHashMap;

use crate::descriptor::{Descriptor, table_entries};
use crate::error::{NativeError, RegistrationError};
use crate::symbol_hash::SymbolHash;
use crate::value::{CallArgs, Value};

/// Everything a runtime needs to construct a module object.
#[derive(Debug, Clone, Copy)]
pub struct ModuleDef<'a> {
    /// Module name as imported by scripts.
    pub name: &'a str,
    /// Module doc string; `None` leaves it empty.
    pub doc: Option<&'a str>,
    /// Finished descriptor table, sentinel-terminated.
    pub functions: &'a [Descriptor],
}

impl ModuleDef<'_> {
    /// Real (non-sentinel) entries of the function table.
    pub fn entries(&self) -> impl Iterator<Item = &Descriptor> {
        table_entries(self.functions)
    }
}

/// A native type attached to a module.
#[derive(Debug, Clone, Copy)]
pub struct TypeObject {
    /// Type name as seen by scripts.
    pub name: &'static str,
    /// Optional doc string.
    pub doc: Option<&'static str>,
    /// Method table, sentinel-terminated.
    pub methods: &'static [Descriptor],
}

impl TypeObject {
    /// Create a type with no methods.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            doc: None,
            methods: &[],
        }
    }

    /// Attach a doc string.
    pub const fn with_doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Attach a method table.
    pub const fn with_methods(mut self, methods: &'static [Descriptor]) -> Self {
        self.methods = methods;
        self
    }

    /// Type hash of this type's name.
    pub fn hash(&self) -> SymbolHash {
        SymbolHash::from_type(self.name)
    }

    /// Real (non-sentinel) entries of the method table.
    pub fn method_entries(&self) -> impl Iterator<Item = &'static Descriptor> {
        table_entries(self.methods)
    }
}

/// Operations contributing subsystems may perform on a live module object.
pub trait ModuleObject {
    /// Name the module was created with.
    fn name(&self) -> &str;

    /// Attach a native type to the module.
    fn add_type(&mut self, ty: TypeObject) -> Result<(), RegistrationError>;

    /// Check whether a type with this name is attached.
    fn has_type(&self, name: &str) -> bool;
}

/// In-process module object.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    doc: Option<String>,
    functions: Vec<Descriptor>,
    function_index: FxHashMap<SymbolHash, usize>,
    types: FxHashMap<SymbolHash, TypeObject>,
    type_order: Vec<&'static str>,
    methods: FxHashMap<SymbolHash, &'static Descriptor>,
}

impl Module {
    /// Build a module from a definition.
    ///
    /// Functions are taken in table order up to the sentinel. A later
    /// descriptor with the same name replaces the earlier one in place.
    pub fn from_def(def: &ModuleDef<'_>) -> Self {
        let mut module = Self {
            name: def.name.to_string(),
            doc: def.doc.map(str::to_string),
            functions: Vec::new(),
            function_index: FxHashMap::default(),
            types: FxHashMap::default(),
            type_order: Vec::new(),
            methods: FxHashMap::default(),
        };

        for descriptor in def.entries() {
            match module.function_index.get(&descriptor.hash()) {
                Some(&slot) => {
                    tracing::debug!(name = descriptor.name, "replacing duplicate function");
                    module.functions[slot] = *descriptor;
                }
                None => {
                    module
                        .function_index
                        .insert(descriptor.hash(), module.functions.len());
                    module.functions.push(*descriptor);
                }
            }
        }

        module
    }

    /// Module doc string.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Functions in table order.
    pub fn functions(&self) -> &[Descriptor] {
        &self.functions
    }

    /// Number of functions.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&Descriptor> {
        self.function_index
            .get(&SymbolHash::from_function(name))
            .map(|&slot| &self.functions[slot])
    }

    /// Look up an attached type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeObject> {
        self.types.get(&SymbolHash::from_type(name))
    }

    /// Names of attached types in attachment order.
    pub fn type_names(&self) -> &[&'static str] {
        &self.type_order
    }

    /// Number of attached types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Look up a method of an attached type.
    pub fn method(&self, type_name: &str, name: &str) -> Option<&Descriptor> {
        let owner = SymbolHash::from_type(type_name);
        self.methods
            .get(&SymbolHash::from_method(owner, name))
            .copied()
    }

    /// Call a method of an attached type. The receiver is the first
    /// positional argument.
    pub fn call_method(
        &self,
        type_name: &str,
        name: &str,
        args: &CallArgs,
    ) -> Result<Value, NativeError> {
        let descriptor = self
            .method(type_name, name)
            .ok_or_else(|| NativeError::MethodNotFound {
                type_name: type_name.to_string(),
                method: name.to_string(),
            })?;
        descriptor.call(args)
    }

    /// Call a module function by name.
    pub fn call(&self, name: &str, args: &CallArgs) -> Result<Value, NativeError> {
        let descriptor = self
            .function(name)
            .ok_or_else(|| NativeError::FunctionNotFound(name.to_string()))?;
        descriptor.call(args)
    }
}

impl ModuleObject for Module {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_type(&mut self, ty: TypeObject) -> Result<(), RegistrationError> {
        let hash = ty.hash();
        if self.types.contains_key(&hash) {
            return Err(RegistrationError::DuplicateType(ty.name.to_string()));
        }
        for method in ty.method_entries() {
            self.methods
                .insert(SymbolHash::from_method(hash, method.name), method);
        }
        self.types.insert(hash, ty);
        self.type_order.push(ty.name);
        Ok(())
    }

    fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(&SymbolHash::from_type(name))
    }
}
