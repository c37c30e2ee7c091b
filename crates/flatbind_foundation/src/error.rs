//! Error types for the Flatbind system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// Result type alias for Flatbind operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Flatbind operations.
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

    /// Creates an undeclared type error.
    #[must_use]
    pub fn undeclared_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndeclaredType(name.into()))
    }

    /// Creates an invalid construct error.
    #[must_use]
    pub fn invalid_construct(name: impl Into<String>, construct: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConstruct {
            name: name.into(),
            construct: construct.into(),
        })
    }

    /// Creates a circular declaration error naming the re-entered type.
    #[must_use]
    pub fn circular(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::CircularDeclaration(name.into()))
    }

    /// Creates a malformed declaration error.
    #[must_use]
    pub fn malformed(name: impl Into<String>, problem: Malformation) -> Self {
        Self::new(ErrorKind::MalformedDeclaration {
            name: name.into(),
            problem,
        })
    }

    /// Creates an invalid index-key type error.
    #[must_use]
    pub fn invalid_index_key(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidIndexKeyType {
            name: name.into(),
            key: key.into(),
        })
    }

    /// Wraps an error raised by the declaration source document.
    #[must_use]
    pub fn source_document(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorKind::SourceDocument(Box::new(source)))
    }

    /// Creates an invalid root error.
    #[must_use]
    pub fn invalid_root(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRoot(name.into()))
    }

    /// Creates a malformed occurrence id error.
    #[must_use]
    pub fn malformed_occurrence_id(id: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedOccurrenceId(id.into()))
    }

    /// Creates a malformed ranges error.
    #[must_use]
    pub fn malformed_ranges(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRanges(detail.into()))
    }

    /// Returns the name of the declaration this error is about, if any.
    #[must_use]
    pub fn declaration_name(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::UndeclaredType(name)
            | ErrorKind::CircularDeclaration(name)
            | ErrorKind::InvalidRoot(name)
            | ErrorKind::InvalidConstruct { name, .. }
            | ErrorKind::MalformedDeclaration { name, .. }
            | ErrorKind::InvalidIndexKeyType { name, .. } => Some(name),
            ErrorKind::SourceDocument(_)
            | ErrorKind::MalformedOccurrenceId(_)
            | ErrorKind::MalformedRanges(_) => None,
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A referenced name has no definition in the declaration source.
    #[error("undeclared type: {0}")]
    UndeclaredType(String),

    /// A name resolves to a definition kind that is not recognized.
    #[error("invalid construct '{construct}' for type {name}")]
    InvalidConstruct {
        /// The declaration name.
        name: String,
        /// The unrecognized kind tag.
        construct: String,
    },

    /// A type transitively depends on itself.
    #[error("circular declaration: {0}")]
    CircularDeclaration(String),

    /// Structurally invalid declaration.
    #[error("malformed declaration {name}: {problem}")]
    MalformedDeclaration {
        /// The declaration name.
        name: String,
        /// What is wrong with it.
        problem: Malformation,
    },

    /// An index-by table keyed by a type outside the permitted primitives.
    #[error("invalid index key type {key} for index-by table {name}")]
    InvalidIndexKeyType {
        /// The index-by table name.
        name: String,
        /// The rejected key type name.
        key: String,
    },

    /// The declaration source itself is not well-formed.
    #[error("source document error: {0}")]
    SourceDocument(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An occurrence tree was requested for a declaration that is not a signature.
    #[error("not a procedure or function signature: {0}")]
    InvalidRoot(String),

    /// An occurrence id that does not follow the positional id grammar.
    #[error("malformed occurrence id: {0:?}")]
    MalformedOccurrenceId(String),

    /// A pointer array that violates the range encoding.
    #[error("malformed ranges: {0}")]
    MalformedRanges(String),
}

/// Structural problems detected in a single declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformation {
    /// A required attribute is missing or empty.
    MissingAttribute(&'static str),
    /// A record with no fields.
    EmptyRecord,
    /// A parameter direction that is not IN, OUT, or IN OUT.
    UnknownMode(String),
    /// A function without a return type entry.
    MissingReturn,
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute(attribute) => write!(f, "missing attribute '{attribute}'"),
            Self::EmptyRecord => write!(f, "record has no fields"),
            Self::UnknownMode(mode) => write!(f, "unknown parameter mode '{mode}'"),
            Self::MissingReturn => write!(f, "function has no return type"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Declarations being resolved when the error occurred, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.stack {
            writeln!(f, "  while resolving {frame}")?;
        }
        Ok(())
    }
}
