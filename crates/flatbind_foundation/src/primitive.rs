//! Primitive (scalar) type names.
//!
//! Primitive names are recognized by pattern rather than looked up in the
//! declaration source: `integer`, `varchar2(30)`, `number(10,2)`, and so on.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A recognized scalar database type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Primitive {
    /// `integer`
    Integer,
    /// `pls_integer`
    PlsInteger,
    /// `binary_integer`
    BinaryInteger,
    /// `boolean`
    Boolean,
    /// `date`
    Date,
    /// `clob`
    Clob,
    /// `blob`
    Blob,
    /// `long`
    Long,
    /// `varchar2(N)`
    Varchar2(u32),
    /// `char(N)`
    Char(u32),
    /// `string(N)`
    String(u32),
    /// `number`, `number(P)` or `number(P,S)`
    Number {
        /// Total digits, if constrained.
        precision: Option<u32>,
        /// Digits after the decimal point, if given.
        scale: Option<i32>,
    },
}

impl Primitive {
    /// Recognizes a primitive type name.
    ///
    /// Matching is case-insensitive and ignores whitespace, so
    /// `VARCHAR2( 30 )` and `varchar2(30)` are the same primitive.
    #[must_use]
    pub fn recognize(name: &str) -> Option<Self> {
        let normalized = normalize(name);
        let (base, args) = match normalized.find('(') {
            Some(open) => {
                let args = normalized[open..].strip_prefix('(')?.strip_suffix(')')?;
                (&normalized[..open], Some(args))
            }
            None => (normalized.as_str(), None),
        };

        match (base, args) {
            ("integer", None) => Some(Self::Integer),
            ("pls_integer", None) => Some(Self::PlsInteger),
            ("binary_integer", None) => Some(Self::BinaryInteger),
            ("boolean", None) => Some(Self::Boolean),
            ("date", None) => Some(Self::Date),
            ("clob", None) => Some(Self::Clob),
            ("blob", None) => Some(Self::Blob),
            ("long", None) => Some(Self::Long),
            ("varchar2", Some(len)) => parse_length(len).map(Self::Varchar2),
            ("char", Some(len)) => parse_length(len).map(Self::Char),
            ("string", Some(len)) => parse_length(len).map(Self::String),
            ("number", None) => Some(Self::Number {
                precision: None,
                scale: None,
            }),
            ("number", Some(args)) => parse_number_args(args),
            _ => None,
        }
    }

    /// Returns true if this primitive may key an index-by table.
    #[must_use]
    pub const fn is_index_key(self) -> bool {
        matches!(
            self,
            Self::PlsInteger | Self::BinaryInteger | Self::Varchar2(_) | Self::String(_) | Self::Long
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::PlsInteger => write!(f, "pls_integer"),
            Self::BinaryInteger => write!(f, "binary_integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Clob => write!(f, "clob"),
            Self::Blob => write!(f, "blob"),
            Self::Long => write!(f, "long"),
            Self::Varchar2(len) => write!(f, "varchar2({len})"),
            Self::Char(len) => write!(f, "char({len})"),
            Self::String(len) => write!(f, "string({len})"),
            Self::Number { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "number({p},{s})"),
                (Some(p), None) => write!(f, "number({p})"),
                _ => write!(f, "number"),
            },
        }
    }
}

/// Lower-cases a primitive name and strips all whitespace.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_length(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().filter(|len| *len > 0)
}

fn parse_number_args(args: &str) -> Option<Primitive> {
    let mut parts = args.split(',');
    let precision = parse_length(parts.next()?)?;
    let scale = match parts.next() {
        Some(scale) => Some(scale.parse::<i32>().ok()?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Primitive::Number {
        precision: Some(precision),
        scale,
    })
}
