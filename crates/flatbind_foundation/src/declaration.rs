//! Type declarations.
//!
//! A [`TypeDeclaration`] is one named database type. Declarations form a DAG
//! through shared [`Arc`] children and are never mutated after construction.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Malformation, Result};
use crate::primitive::Primitive;

/// Separates a package (namespace) from the type name declared inside it.
pub const NAMESPACE_SEPARATOR: char = '.';

/// A named database type declaration.
///
/// Equality and hashing are structural: the name plus, for records and
/// signatures, the ordered sequence of members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDeclaration {
    name: String,
    kind: DeclarationKind,
}

/// The closed set of declaration variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// A scalar type.
    Primitive(Primitive),
    /// Ordered named fields.
    Record(Vec<Field>),
    /// Bounded dense collection.
    Varray(Arc<TypeDeclaration>),
    /// Unbounded collection that may have gaps after deletions.
    NestedTable(Arc<TypeDeclaration>),
    /// Associative array.
    IndexByTable {
        /// Element type.
        element: Arc<TypeDeclaration>,
        /// Key type, always an index-key primitive.
        key: Arc<TypeDeclaration>,
    },
    /// Procedure signature.
    Procedure(Vec<Parameter>),
    /// Function signature.
    Function {
        /// Return type.
        returns: Arc<TypeDeclaration>,
        /// Ordered parameters.
        parameters: Vec<Parameter>,
    },
}

/// A record field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: Arc<TypeDeclaration>,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Arc<TypeDeclaration>) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A procedure or function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Direction.
    pub mode: ParamMode,
    /// Parameter type.
    pub ty: Arc<TypeDeclaration>,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, mode: ParamMode, ty: Arc<TypeDeclaration>) -> Self {
        Self {
            name: name.into(),
            mode,
            ty,
        }
    }
}

/// Parameter direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamMode {
    /// Passed into the call.
    In,
    /// Returned from the call.
    Out,
    /// Passed in and returned.
    InOut,
}

impl ParamMode {
    /// Parses a direction, case-insensitively. Accepts `in out` and `inout`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match compact.as_str() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "inout" => Some(Self::InOut),
            _ => None,
        }
    }

    /// Returns true if values flow into the call.
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }

    /// Returns true if values flow out of the call.
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }
}

impl fmt::Display for ParamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
            Self::InOut => write!(f, "IN OUT"),
        }
    }
}

impl TypeDeclaration {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates a primitive declaration named by its canonical form.
    #[must_use]
    pub fn primitive(primitive: Primitive) -> Self {
        Self {
            name: primitive.to_string(),
            kind: DeclarationKind::Primitive(primitive),
        }
    }

    /// Creates a record declaration.
    ///
    /// # Errors
    ///
    /// Returns a malformed declaration error if `fields` is empty.
    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Result<Self> {
        let name = name.into();
        if fields.is_empty() {
            return Err(Error::malformed(name, Malformation::EmptyRecord));
        }
        Ok(Self {
            name,
            kind: DeclarationKind::Record(fields),
        })
    }

    /// Creates a varray declaration.
    #[must_use]
    pub fn varray(name: impl Into<String>, element: Arc<TypeDeclaration>) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::Varray(element),
        }
    }

    /// Creates a nested table declaration.
    #[must_use]
    pub fn nested_table(name: impl Into<String>, element: Arc<TypeDeclaration>) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::NestedTable(element),
        }
    }

    /// Creates an index-by table declaration.
    ///
    /// # Errors
    ///
    /// Returns an invalid index-key error unless `key` is an index-key primitive.
    pub fn index_by_table(
        name: impl Into<String>,
        element: Arc<TypeDeclaration>,
        key: Arc<TypeDeclaration>,
    ) -> Result<Self> {
        let name = name.into();
        match key.as_primitive() {
            Some(primitive) if primitive.is_index_key() => Ok(Self {
                name,
                kind: DeclarationKind::IndexByTable { element, key },
            }),
            _ => Err(Error::invalid_index_key(name, key.name())),
        }
    }

    /// Creates a procedure signature.
    #[must_use]
    pub fn procedure(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::Procedure(parameters),
        }
    }

    /// Creates a function signature.
    #[must_use]
    pub fn function(
        name: impl Into<String>,
        returns: Arc<TypeDeclaration>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: DeclarationKind::Function {
                returns,
                parameters,
            },
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the variant.
    #[must_use]
    pub fn kind(&self) -> &DeclarationKind {
        &self.kind
    }

    /// Returns the package part of the name, if the type is namespaced.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.name
            .rsplit_once(NAMESPACE_SEPARATOR)
            .map(|(namespace, _)| namespace)
    }

    /// Returns true if the driver can carry this type as one atomic value.
    ///
    /// Index-by tables are never transferable.
    #[must_use]
    pub fn is_transferable(&self) -> bool {
        !matches!(self.kind, DeclarationKind::IndexByTable { .. })
            && !self.name.contains(NAMESPACE_SEPARATOR)
    }

    /// Returns the primitive, if this is a primitive declaration.
    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.kind {
            DeclarationKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the element type of a collection.
    #[must_use]
    pub fn element(&self) -> Option<&Arc<TypeDeclaration>> {
        match &self.kind {
            DeclarationKind::Varray(element)
            | DeclarationKind::NestedTable(element)
            | DeclarationKind::IndexByTable { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Returns the key type of an index-by table.
    #[must_use]
    pub fn index_key(&self) -> Option<&Arc<TypeDeclaration>> {
        match &self.kind {
            DeclarationKind::IndexByTable { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Returns true for varrays, nested tables and index-by tables.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.element().is_some()
    }

    /// Returns true for procedure and function signatures.
    #[must_use]
    pub fn is_signature(&self) -> bool {
        matches!(
            self.kind,
            DeclarationKind::Procedure(_) | DeclarationKind::Function { .. }
        )
    }

    /// Returns the signature parameters, if this is a signature.
    #[must_use]
    pub fn parameters(&self) -> Option<&[Parameter]> {
        match &self.kind {
            DeclarationKind::Procedure(parameters) | DeclarationKind::Function { parameters, .. } => {
                Some(parameters.as_slice())
            }
            _ => None,
        }
    }

    /// Returns a short tag naming the variant.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            DeclarationKind::Primitive(_) => "primitive",
            DeclarationKind::Record(_) => "record",
            DeclarationKind::Varray(_) => "varray",
            DeclarationKind::NestedTable(_) => "nested_table",
            DeclarationKind::IndexByTable { .. } => "index_by_table",
            DeclarationKind::Procedure(_) => "procedure",
            DeclarationKind::Function { .. } => "function",
        }
    }

    /// Returns the immediate child declarations in declared order.
    ///
    /// A function's return type comes first. An index-by table lists its
    /// element before its key. Repeated member types appear once per member.
    #[must_use]
    pub fn children(&self) -> Vec<&Arc<TypeDeclaration>> {
        match &self.kind {
            DeclarationKind::Primitive(_) => Vec::new(),
            DeclarationKind::Record(fields) => fields.iter().map(|f| &f.ty).collect(),
            DeclarationKind::Varray(element) | DeclarationKind::NestedTable(element) => {
                vec![element]
            }
            DeclarationKind::IndexByTable { element, key } => vec![element, key],
            DeclarationKind::Procedure(parameters) => parameters.iter().map(|p| &p.ty).collect(),
            DeclarationKind::Function {
                returns,
                parameters,
            } => std::iter::once(returns)
                .chain(parameters.iter().map(|p| &p.ty))
                .collect(),
        }
    }
}

impl fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
