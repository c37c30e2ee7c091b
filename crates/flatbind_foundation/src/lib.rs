//! Type declarations, primitive names, and error types for Flatbind.
//!
//! This crate provides:
//! - [`TypeDeclaration`] - The closed set of database type declarations
//! - [`Primitive`] - Recognized scalar type names and index-key eligibility
//! - [`ParamMode`] - Procedure/function parameter directions
//! - [`Error`] - Rich error types with resolution context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod declaration;
pub mod error;
pub mod primitive;

pub use declaration::{
    DeclarationKind, Field, NAMESPACE_SEPARATOR, ParamMode, Parameter, TypeDeclaration,
};
pub use error::{Error, ErrorContext, ErrorKind, Malformation, Result};
pub use primitive::Primitive;
