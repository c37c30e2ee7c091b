//! Declaration resolution and dependency graph for Flatbind.
//!
//! This crate provides:
//! - [`DeclarationSource`] - The boundary to the external type source, with [`Catalog`]
//! - [`Resolver`] - One memoizing, cycle-detecting resolution session
//! - [`TypeGraph`] - Reachable declarations and their topological order

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod graph;
pub mod resolver;
pub mod source;

pub use graph::TypeGraph;
pub use resolver::Resolver;
pub use source::{Catalog, DeclarationSource, Definition, Member, canonical_name};
