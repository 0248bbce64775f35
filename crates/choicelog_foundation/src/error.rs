//! Error types for choicelog.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Only genuine faults are errors. A violated constraint or a built-in whose
//! preconditions do not hold is an ordinary search outcome and never reaches
//! this type.

use std::fmt;

use thiserror::Error;

/// The main error type for choicelog operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an internal invariant violation.
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invariant(message.into()))
    }

    /// Creates a malformed-program error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed(message.into()))
    }

    /// Creates a host protocol violation.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol(message.into()))
    }

    /// Returns true if this error means the session must be abandoned.
    ///
    /// Every error kind except serialization and I/O failures is fatal to the
    /// session that raised it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::Serialization(_) | ErrorKind::Io(_)
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A data structure invariant was broken (a bug in the engine).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The bytecode program is malformed (a bug in the compiler).
    #[error("malformed program: {0}")]
    Malformed(String),

    /// The host sent messages in an order the protocol forbids.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Encoding or decoding a program or message failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule or component that raised the error.
    pub source: Option<String>,
    /// Stack of enclosing operations, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias using choicelog's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
