//! Runtime values exchanged with native entry points.
//!
//! [`Value`] is what the hosting runtime passes into a native function and
//! what the function hands back. Native objects (device memory, images) are
//! carried as [`NativeObject`], a shared and lockable type-erased box tagged
//! with the name of the type that was attached to the module.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::NativeError;

/// A value crossing the native boundary.
#[derive(Clone)]
pub enum Value {
    /// The runtime's null/none value
    None,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value (owned)
    Str(String),
    /// Shared handle to a native object
    Native(NativeObject),
}

impl Value {
    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Native(obj) => obj.type_name(),
        }
    }

    /// Check if this value is `None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Read this value as an integer.
    pub fn as_int(&self) -> Result<i64, NativeError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(NativeError::TypeMismatch {
                expected: "int",
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Read this value as a non-negative size.
    pub fn as_size(&self) -> Result<usize, NativeError> {
        let v = self.as_int()?;
        usize::try_from(v)
            .map_err(|_| NativeError::invalid(format!("size must be non-negative, got {v}")))
    }

    /// Integer value holding a native size.
    pub fn from_size(size: usize) -> Result<Value, NativeError> {
        i64::try_from(size)
            .map(Value::Int)
            .map_err(|_| NativeError::invalid(format!("{size} does not fit in an int")))
    }

    /// Read this value as a string slice.
    pub fn as_str(&self) -> Result<&str, NativeError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(NativeError::TypeMismatch {
                expected: "str",
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Read this value as a native object.
    pub fn as_native(&self) -> Result<&NativeObject, NativeError> {
        match self {
            Value::Native(obj) => Ok(obj),
            other => Err(NativeError::TypeMismatch {
                expected: "native object",
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Native(obj) => write!(f, "Native({})", obj.type_name()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<NativeObject> for Value {
    fn from(v: NativeObject) -> Self {
        Value::Native(v)
    }
}

// =============================================================================
// Native objects
// =============================================================================

/// A native type that can be handed to scripts inside a [`NativeObject`].
///
/// `TYPE_NAME` is the name the type is attached to the module under. It is
/// what scripts see in type errors.
pub trait NativeType: Any + Send {
    const TYPE_NAME: &'static str;
}

/// Shared handle to a native object owned by a contributing subsystem.
///
/// Cloning the handle shares the object; the object is dropped when the last
/// handle goes away.
#[derive(Clone)]
pub struct NativeObject {
    type_name: &'static str,
    inner: Arc<Mutex<dyn Any + Send>>,
}

impl NativeObject {
    /// Wrap a native value under its registered type name.
    pub fn new<T: NativeType>(value: T) -> Self {
        Self {
            type_name: T::TYPE_NAME,
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Registered type name of this object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check if two handles refer to the same object.
    pub fn ptr_eq(&self, other: &NativeObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Lock the object and run `f` against it as a `T`.
    ///
    /// Fails with [`NativeError::TypeMismatch`] naming both registered
    /// types if the object is not a `T`.
    pub fn with<T: NativeType, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, NativeError> {
        let mut guard = self.lock()?;
        match guard.downcast_mut::<T>() {
            Some(value) => Ok(f(value)),
            None => Err(NativeError::TypeMismatch {
                expected: T::TYPE_NAME,
                found: self.type_name.to_string(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, dyn Any + Send + 'static>, NativeError> {
        self.inner
            .lock()
            .map_err(|_| NativeError::invalid(format!("{} object is poisoned", self.type_name)))
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeObject")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Call arguments
// =============================================================================

/// Arguments of a single native call.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    /// Positional arguments in call order.
    pub positional: Vec<Value>,
    /// Keyword arguments in call order.
    pub keywords: Vec<(String, Value)>,
}

impl CallArgs {
    /// Empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional arguments only.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keywords: Vec::new(),
        }
    }

    /// Append a keyword argument.
    pub fn keyword(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.keywords.push((name.to_string(), value.into()));
        self
    }

    /// Positional argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword argument by name, if present.
    pub fn get_keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Reject the first keyword argument not named in `allowed`.
    pub fn check_keywords(&self, function: &str, allowed: &[&str]) -> Result<(), NativeError> {
        match self.keywords.iter().find(|(k, _)| !allowed.contains(&k.as_str())) {
            Some((keyword, _)) => Err(NativeError::UnexpectedKeyword {
                function: function.to_string(),
                keyword: keyword.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Look up a parameter that may be passed either by position or keyword.
    pub fn param(&self, index: usize, name: &str) -> Option<&Value> {
        self.get(index).or_else(|| self.get_keyword(name))
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// True when there are no positional or keyword arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u32);

    impl NativeType for Counter {
        const TYPE_NAME: &'static str = "counter";
    }

    struct Label;

    impl NativeType for Label {
        const TYPE_NAME: &'static str = "label";
    }

    #[test]
    fn native_object_shares_state() {
        let obj = NativeObject::new(Counter(0));
        let alias = obj.clone();
        alias.with(|c: &mut Counter| c.0 += 5).unwrap();
        assert_eq!(obj.with(|c: &mut Counter| c.0).unwrap(), 5);
        assert!(obj.ptr_eq(&alias));
    }

    #[test]
    fn native_object_wrong_type() {
        let obj = NativeObject::new(Counter(0));
        let err = obj.with(|_: &mut Label| ()).unwrap_err();
        assert_eq!(
            err,
            NativeError::TypeMismatch {
                expected: "label",
                found: "counter".into(),
            }
        );
    }

    #[test]
    fn negative_size_rejected() {
        assert!(Value::Int(-1).as_size().is_err());
        assert_eq!(Value::Int(64).as_size().unwrap(), 64);
    }

    #[test]
    fn size_values() {
        assert_eq!(Value::from_size(640).unwrap().as_int().unwrap(), 640);
        assert!(Value::from_size(usize::MAX).is_err());
    }

    #[test]
    fn unknown_keyword_rejected() {
        let args = CallArgs::new().keyword("width", 4i64).keyword("format", "rgb8");
        assert!(args.check_keywords("f", &["width", "format"]).is_ok());
        let err = args.check_keywords("f", &["width"]).unwrap_err();
        assert_eq!(
            err,
            NativeError::UnexpectedKeyword {
                function: "f".into(),
                keyword: "format".into(),
            }
        );
    }

    #[test]
    fn param_by_position_or_keyword() {
        let args = CallArgs::positional([Value::Int(4)]).keyword("height", 8i64);
        assert_eq!(args.param(0, "width").unwrap().as_int().unwrap(), 4);
        assert_eq!(args.param(1, "height").unwrap().as_int().unwrap(), 8);
        assert!(args.param(2, "format").is_none());
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::None.type_name(), "None");
        assert_eq!(Value::from("x").type_name(), "str");
        let obj = NativeObject::new(Counter(1));
        assert_eq!(Value::from(obj).type_name(), "counter");
    }
}
