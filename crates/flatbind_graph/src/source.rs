//! The declaration source boundary.
//!
//! A [`DeclarationSource`] hands the resolver one raw [`Definition`] per
//! name. [`Catalog`] is the in-memory implementation; with the `serde`
//! feature it can also be loaded from a MessagePack document.

use std::collections::HashMap;

use flatbind_foundation::{Primitive, Result};

#[cfg(feature = "serde")]
use flatbind_foundation::Error;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind tag for records.
pub const RECORD: &str = "record";
/// Kind tag for varrays.
pub const VARRAY: &str = "varray";
/// Kind tag for nested tables.
pub const NESTED_TABLE: &str = "nested_table";
/// Kind tag for index-by tables.
pub const INDEX_BY_TABLE: &str = "index_by_table";
/// Kind tag for procedures.
pub const PROCEDURE: &str = "procedure";
/// Kind tag for functions.
pub const FUNCTION: &str = "function";

/// Supplies raw type definitions by name.
pub trait DeclarationSource {
    /// Looks up the definition of `name` (already canonicalized).
    ///
    /// Returns `Ok(None)` if the source has no such entry.
    ///
    /// # Errors
    ///
    /// Returns a source document error if the source itself is unreadable.
    fn definition(&self, name: &str) -> Result<Option<Definition>>;
}

impl<S: DeclarationSource + ?Sized> DeclarationSource for &S {
    fn definition(&self, name: &str) -> Result<Option<Definition>> {
        (**self).definition(name)
    }
}

/// Returns the canonical form of a type name.
///
/// Primitive names take their canonical spelling (`NUMBER(10, 2)` becomes
/// `number(10,2)`); every other name is trimmed and lower-cased.
#[must_use]
pub fn canonical_name(name: &str) -> String {
    match Primitive::recognize(name) {
        Some(primitive) => primitive.to_string(),
        None => name.trim().to_lowercase(),
    }
}

/// One raw entry of the declaration source.
///
/// Attributes are optional here so that a missing one can be reported as a
/// malformed declaration rather than a decoding failure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Definition {
    /// Kind tag (`record`, `varray`, `nested_table`, ...).
    pub kind: String,
    /// Element type name for collections.
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Option<String>,
    /// Key type name for index-by tables.
    #[cfg_attr(feature = "serde", serde(default))]
    pub index: Option<String>,
    /// Return type name for functions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub returns: Option<String>,
    /// Record fields or signature parameters, in declared order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub members: Vec<Member>,
}

/// A record field or signature parameter entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Member {
    /// Member name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Member type name.
    #[cfg_attr(feature = "serde", serde(default, rename = "type"))]
    pub ty: Option<String>,
    /// Parameter direction; ignored for record fields.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: Option<String>,
}

impl Member {
    /// Creates a record field entry.
    #[must_use]
    pub fn field(name: &str, ty: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ty: Some(ty.to_string()),
            mode: None,
        }
    }

    /// Creates a parameter entry.
    #[must_use]
    pub fn parameter(name: &str, mode: &str, ty: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ty: Some(ty.to_string()),
            mode: Some(mode.to_string()),
        }
    }
}

impl Definition {
    /// Returns the kind tag trimmed and lower-cased.
    #[must_use]
    pub fn normalized_kind(&self) -> String {
        self.kind.trim().to_lowercase()
    }

    /// Creates an entry with only a kind tag.
    #[must_use]
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    /// Creates a record entry from `(field, type)` pairs.
    #[must_use]
    pub fn record<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            members: fields
                .into_iter()
                .map(|(name, ty)| Member::field(name, ty))
                .collect(),
            ..Self::of_kind(RECORD)
        }
    }

    /// Creates a varray entry.
    #[must_use]
    pub fn varray(element: &str) -> Self {
        Self {
            element: Some(element.to_string()),
            ..Self::of_kind(VARRAY)
        }
    }

    /// Creates a nested table entry.
    #[must_use]
    pub fn nested_table(element: &str) -> Self {
        Self {
            element: Some(element.to_string()),
            ..Self::of_kind(NESTED_TABLE)
        }
    }

    /// Creates an index-by table entry.
    #[must_use]
    pub fn index_by_table(element: &str, index: &str) -> Self {
        Self {
            element: Some(element.to_string()),
            index: Some(index.to_string()),
            ..Self::of_kind(INDEX_BY_TABLE)
        }
    }

    /// Creates a procedure entry from `(name, mode, type)` triples.
    #[must_use]
    pub fn procedure<'a>(parameters: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>) -> Self {
        Self {
            members: parameters
                .into_iter()
                .map(|(name, mode, ty)| Member::parameter(name, mode, ty))
                .collect(),
            ..Self::of_kind(PROCEDURE)
        }
    }

    /// Creates a function entry from a return type and `(name, mode, type)` triples.
    #[must_use]
    pub fn function<'a>(
        returns: &str,
        parameters: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    ) -> Self {
        Self {
            returns: Some(returns.to_string()),
            ..Self::procedure(parameters).with_kind(FUNCTION)
        }
    }

    /// Replaces the kind tag.
    #[must_use]
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_string();
        self
    }
}

/// In-memory declaration source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Catalog {
    definitions: HashMap<String, Definition>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any previous one with the same name.
    pub fn insert(&mut self, name: &str, definition: Definition) {
        self.definitions.insert(canonical_name(name), definition);
    }

    /// Builder form of [`Catalog::insert`].
    #[must_use]
    pub fn with(mut self, name: &str, definition: Definition) -> Self {
        self.insert(name, definition);
        self
    }

    /// Returns the number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the defined names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the names of every procedure and function entry, sorted.
    #[must_use]
    pub fn signature_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .definitions
            .iter()
            .filter(|(_, def)| {
                let kind = def.normalized_kind();
                kind == PROCEDURE || kind == FUNCTION
            })
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Loads a catalog from a MessagePack document.
    ///
    /// # Errors
    ///
    /// Returns a source document error if the bytes do not decode.
    #[cfg(feature = "serde")]
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self> {
        let raw: Self = rmp_serde::from_slice(bytes).map_err(Error::source_document)?;
        Ok(raw
            .definitions
            .into_iter()
            .fold(Self::new(), |catalog, (name, def)| catalog.with(&name, def)))
    }

    /// Encodes this catalog as a MessagePack document.
    ///
    /// # Errors
    ///
    /// Returns a source document error if encoding fails.
    #[cfg(feature = "serde")]
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(Error::source_document)
    }
}

impl DeclarationSource for Catalog {
    fn definition(&self, name: &str) -> Result<Option<Definition>> {
        Ok(self.definitions.get(name).cloned())
    }
}
