//! Function descriptors and their calling conventions.
//!
//! A [`Descriptor`] binds a callable name to a native entry point, in the same
//! shape the loading runtime expects for a module's method table: name, entry
//! point, calling-convention flags and an optional doc string. Contributing
//! subsystems publish `'static` tables of descriptors terminated by
//! [`Descriptor::SENTINEL`].

use bitflags::bitflags;

use crate::error::NativeError;
use crate::symbol_hash::SymbolHash;
use crate::value::{CallArgs, Value};

/// Native entry point signature.
pub type NativeEntry = fn(&CallArgs) -> Result<Value, NativeError>;

bitflags! {
    /// Calling-convention flags of a descriptor.
    ///
    /// The bit values match the loading runtime's method flags so a finished
    /// table can be handed over without translation.
    ///
    /// ```
    /// use jetson_utils_core::CallFlags;
    ///
    /// let flags = CallFlags::VARARGS | CallFlags::KEYWORDS;
    /// assert!(flags.accepts_keywords());
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CallFlags: u32 {
        /// Positional arguments are passed as a sequence.
        const VARARGS = 0x0001;
        /// Keyword arguments are accepted (combined with `VARARGS`).
        const KEYWORDS = 0x0002;
        /// The function takes no arguments.
        const NOARGS = 0x0004;
        /// The function takes exactly one positional argument.
        const O = 0x0008;
        /// Bound to the class rather than an instance.
        const CLASS = 0x0010;
        /// Not bound to an instance or class.
        const STATIC = 0x0020;
    }
}

impl CallFlags {
    /// Whether keyword arguments may be passed.
    pub fn accepts_keywords(self) -> bool {
        self.contains(CallFlags::KEYWORDS)
    }

    /// Check `args` against the convention before the entry point runs.
    pub fn check(self, function: &str, args: &CallArgs) -> Result<(), NativeError> {
        if !self.accepts_keywords() {
            if let Some((keyword, _)) = args.keywords.first() {
                return Err(NativeError::UnexpectedKeyword {
                    function: function.to_string(),
                    keyword: keyword.clone(),
                });
            }
        }

        let expected = if self.contains(CallFlags::NOARGS) {
            Some((0, "no"))
        } else if self.contains(CallFlags::O) {
            Some((1, "exactly 1"))
        } else {
            None
        };

        match expected {
            Some((count, label)) if args.len() != count => Err(NativeError::ArgumentCount {
                function: function.to_string(),
                expected: label.to_string(),
                got: args.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// An entry naming a callable, its entry point, convention and doc string.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    /// Name the callable is exposed under.
    pub name: &'static str,
    /// Native entry point; `None` only in the sentinel.
    pub entry: Option<NativeEntry>,
    /// Calling convention.
    pub flags: CallFlags,
    /// Optional documentation string.
    pub doc: Option<&'static str>,
}

impl Descriptor {
    /// Zero-valued terminator of a descriptor table.
    pub const SENTINEL: Descriptor = Descriptor {
        name: "",
        entry: None,
        flags: CallFlags::empty(),
        doc: None,
    };

    /// Create a descriptor with no doc string.
    pub const fn new(name: &'static str, entry: NativeEntry, flags: CallFlags) -> Self {
        Self {
            name,
            entry: Some(entry),
            flags,
            doc: None,
        }
    }

    /// Attach a doc string.
    pub const fn with_doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    /// A descriptor terminates a table when either its name or its entry
    /// point is missing.
    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty() || self.entry.is_none()
    }

    /// Function hash of this descriptor's name.
    pub fn hash(&self) -> SymbolHash {
        SymbolHash::from_function(self.name)
    }

    /// Check the arguments against the calling convention and invoke the entry point.
    pub fn call(&self, args: &CallArgs) -> Result<Value, NativeError> {
        let entry = self
            .entry
            .ok_or_else(|| NativeError::NotCallable(self.name.to_string()))?;
        self.flags.check(self.name, args)?;
        entry(args)
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::SENTINEL
    }
}

/// Iterate the real entries of a sentinel-terminated table.
///
/// Stops at the first sentinel, or at the end of the slice if the table
/// carries no terminator.
pub fn table_entries(table: &[Descriptor]) -> impl Iterator<Item = &Descriptor> {
    table.iter().take_while(|d| !d.is_sentinel())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &CallArgs) -> Result<Value, NativeError> {
        Ok(Value::None)
    }

    fn echo(args: &CallArgs) -> Result<Value, NativeError> {
        Ok(args.get(0).cloned().unwrap_or(Value::None))
    }

    #[test]
    fn sentinel_detection() {
        assert!(Descriptor::SENTINEL.is_sentinel());
        assert!(Descriptor::default().is_sentinel());
        let unnamed = Descriptor::new("", noop, CallFlags::NOARGS);
        assert!(unnamed.is_sentinel());
        assert!(!Descriptor::new("noop", noop, CallFlags::NOARGS).is_sentinel());
    }

    #[test]
    fn table_entries_stop_at_sentinel() {
        let table = [
            Descriptor::new("a", noop, CallFlags::NOARGS),
            Descriptor::new("b", noop, CallFlags::NOARGS),
            Descriptor::SENTINEL,
            Descriptor::new("hidden", noop, CallFlags::NOARGS),
        ];
        let names: Vec<_> = table_entries(&table).map(|d| d.name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn table_entries_without_terminator() {
        let table = [Descriptor::new("a", noop, CallFlags::NOARGS)];
        assert_eq!(table_entries(&table).count(), 1);
    }

    #[test]
    fn noargs_rejects_arguments() {
        let d = Descriptor::new("sync", noop, CallFlags::NOARGS);
        assert!(d.call(&CallArgs::new()).is_ok());
        let err = d.call(&CallArgs::positional([Value::Int(1)])).unwrap_err();
        assert!(matches!(err, NativeError::ArgumentCount { got: 1, .. }));
    }

    #[test]
    fn single_argument_convention() {
        let d = Descriptor::new("echo", echo, CallFlags::O);
        let out = d.call(&CallArgs::positional([Value::Int(7)])).unwrap();
        assert_eq!(out.as_int().unwrap(), 7);
        assert!(d.call(&CallArgs::new()).is_err());
    }

    #[test]
    fn keywords_require_flag() {
        let plain = Descriptor::new("echo", echo, CallFlags::VARARGS);
        let args = CallArgs::new().keyword("size", 4i64);
        assert!(matches!(
            plain.call(&args),
            Err(NativeError::UnexpectedKeyword { .. })
        ));

        let kw = Descriptor::new("echo", echo, CallFlags::VARARGS | CallFlags::KEYWORDS);
        assert!(kw.call(&args).is_ok());
    }

    #[test]
    fn sentinel_is_not_callable() {
        let err = Descriptor::SENTINEL.call(&CallArgs::new()).unwrap_err();
        assert!(matches!(err, NativeError::NotCallable(_)));
    }

    #[test]
    fn doc_string() {
        const D: Descriptor =
            Descriptor::new("noop", noop, CallFlags::NOARGS).with_doc("Does nothing.");
        assert_eq!(D.doc, Some("Does nothing."));
    }
}
