//! Tagged diagnostics collected during module initialization.
//!
//! Registration never propagates non-fatal failures. Instead every milestone
//! and every swallowed failure becomes a [`Diagnostic`] in a [`Diagnostics`]
//! collection, which callers can inspect after the fact. When echo is enabled
//! each diagnostic is also written to standard output as
//! `<tag> -- <message>` the moment it is recorded, and mirrored as a
//! `tracing` event.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

/// Tag prefixed to every diagnostic line of this module.
pub const DEFAULT_TAG: &str = "jetson.utils";

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity level of this diagnostic
    pub kind: DiagnosticKind,
    /// The diagnostic message text, without the tag
    pub message: String,
}

/// The severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A registration milestone.
    Info,

    /// A non-fatal failure that was logged and swallowed.
    ///
    /// Capacity overflow of the function table and a subsystem failing to
    /// register its types both end up here.
    Warning,

    /// A fatal failure. The caller also receives it as an error value.
    Error,
}

/// An ordered collection of diagnostics.
///
/// # Examples
///
/// ```
/// use jetson_utils_core::Diagnostics;
///
/// let mut diagnostics = Diagnostics::silent("jetson.utils");
/// diagnostics.info("registering module functions...");
/// diagnostics.warning("failed to register CUDA types");
///
/// assert_eq!(diagnostics.count(), 2);
/// assert!(diagnostics.has_warnings());
/// assert_eq!(
///     diagnostics.to_string(),
///     "jetson.utils -- registering module functions...\n\
///      jetson.utils -- failed to register CUDA types\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostics {
    diagnostics: VecDeque<Diagnostic>,
    tag: String,
    echo: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl Diagnostics {
    /// Creates an empty collection that echoes to standard output.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            diagnostics: VecDeque::new(),
            tag: tag.into(),
            echo: true,
        }
    }

    /// Creates an empty collection that only records.
    pub fn silent(tag: impl Into<String>) -> Self {
        Self {
            echo: false,
            ..Self::new(tag)
        }
    }

    /// Enable or disable the standard output echo.
    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// The tag prefixed to every line.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Records a milestone.
    pub fn info(&mut self, message: impl Into<String>) {
        self.add_diagnostic(Diagnostic {
            kind: DiagnosticKind::Info,
            message: message.into(),
        });
    }

    /// Records a swallowed failure.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.add_diagnostic(Diagnostic {
            kind: DiagnosticKind::Warning,
            message: message.into(),
        });
    }

    /// Records a fatal failure.
    pub fn error(&mut self, message: impl Into<String>) {
        self.add_diagnostic(Diagnostic {
            kind: DiagnosticKind::Error,
            message: message.into(),
        });
    }

    /// Adds a diagnostic to the collection.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::Info => tracing::info!(tag = %self.tag, "{}", diagnostic.message),
            DiagnosticKind::Warning => tracing::warn!(tag = %self.tag, "{}", diagnostic.message),
            DiagnosticKind::Error => tracing::error!(tag = %self.tag, "{}", diagnostic.message),
        }
        // A closed stdout must not abort module loading.
        let _ = self.echo_to(&mut io::stdout().lock(), &diagnostic);
        self.diagnostics.push_back(diagnostic);
    }

    fn echo_to(&self, out: &mut impl Write, diagnostic: &Diagnostic) -> io::Result<()> {
        if !self.echo {
            return Ok(());
        }
        writeln!(out, "{} -- {}", self.tag, diagnostic)?;
        out.flush()
    }

    /// Returns `true` if the collection contains any warnings.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Warning)
    }

    /// Returns `true` if the collection contains no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Removes all diagnostics from the collection.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Returns an iterator over all diagnostics, in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over only the warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{} -- {}", self.tag, diagnostic)?;
        }
        Ok(())
    }
}
