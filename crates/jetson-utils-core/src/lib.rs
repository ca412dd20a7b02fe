//! Core types for the jetson-utils registration shim.
//!
//! - [`Descriptor`] / [`CallFlags`] - callable metadata in the runtime's method-table shape
//! - [`Value`] / [`CallArgs`] / [`NativeObject`] - values crossing the native boundary
//! - [`Module`] / [`ModuleDef`] / [`ModuleObject`] - module construction and type attachment
//! - [`Diagnostics`] - tagged, swallowed-failure log
//! - [`SymbolHash`] - deterministic name hashes used for lookups

pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod module;
pub mod symbol_hash;
pub mod value;

pub use descriptor::{CallFlags, Descriptor, NativeEntry, table_entries};
pub use diagnostics::{DEFAULT_TAG, Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{HostError, NativeError, RegistrationError};
pub use module::{Module, ModuleDef, ModuleObject, TypeObject};
pub use symbol_hash::SymbolHash;
pub use value::{CallArgs, NativeObject, NativeType, Value};
