//! Error types for the jetson-utils registration shim.
//!
//! ## Error Hierarchy
//!
//! ```text
//! NativeError        - Raised by native entry points and by call dispatch
//! RegistrationError  - Type attachment and table capacity errors
//! HostError          - The hosting runtime could not build a module object
//! ```
//!
//! Only [`HostError`] is fatal to a module load. The other kinds are either
//! surfaced to the calling script or recorded as warnings and swallowed.

use thiserror::Error;

// ============================================================================
// Native Call Errors
// ============================================================================

/// Errors raised while calling a native entry point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// Wrong number of positional arguments for the calling convention.
    #[error("{function}() takes {expected} argument(s) ({got} given)")]
    ArgumentCount {
        /// Function being called.
        function: String,
        /// Human-readable expectation, e.g. "exactly 1" or "no".
        expected: String,
        /// Number of positional arguments supplied.
        got: usize,
    },

    /// A keyword argument was passed to a function that does not accept it.
    #[error("{function}() got an unexpected keyword argument '{keyword}'")]
    UnexpectedKeyword {
        /// Function being called.
        function: String,
        /// Offending keyword.
        keyword: String,
    },

    /// An argument had the wrong runtime type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        found: String,
    },

    /// An argument had the right type but an unusable value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No function with this name is attached to the module.
    #[error("module has no function '{0}'")]
    FunctionNotFound(String),

    /// No method with this name on an attached type.
    #[error("'{type_name}' has no method '{method}'")]
    MethodNotFound {
        /// Type the method was looked up on.
        type_name: String,
        /// Requested method name.
        method: String,
    },

    /// The descriptor has no entry point (a sentinel slot).
    #[error("'{0}' is not callable")]
    NotCallable(String),

    /// A CUDA runtime call failed.
    #[error("cuda error: {0}")]
    Cuda(String),
}

impl NativeError {
    /// Shorthand for [`NativeError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        NativeError::InvalidArgument(msg.into())
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while attaching functions or types to a module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A type with this name is already attached to the module.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A descriptor table did not fit in the fixed-capacity registry.
    #[error("exceeded max number of functions to register ({capacity})")]
    CapacityExceeded {
        /// Registry capacity, sentinel slot included.
        capacity: usize,
        /// Entries from the offending table that were not copied.
        dropped: usize,
    },
}

// ============================================================================
// Host Errors
// ============================================================================

/// The hosting runtime failed to construct a module object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Module construction was rejected by the runtime.
    #[error("{runtime} could not create module '{module}': {reason}")]
    ModuleCreation {
        /// Runtime name, e.g. "Python".
        runtime: String,
        /// Module that was being created.
        module: String,
        /// Runtime-supplied reason.
        reason: String,
    },

    /// The module name is not a valid identifier for the runtime.
    #[error("invalid module name '{0}'")]
    InvalidModuleName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_count_message() {
        let err = NativeError::ArgumentCount {
            function: "cudaDeviceSynchronize".into(),
            expected: "no".into(),
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "cudaDeviceSynchronize() takes no argument(s) (2 given)"
        );
    }

    #[test]
    fn capacity_message_matches_diagnostic() {
        let err = RegistrationError::CapacityExceeded {
            capacity: 128,
            dropped: 3,
        };
        assert_eq!(
            err.to_string(),
            "exceeded max number of functions to register (128)"
        );
    }
}
