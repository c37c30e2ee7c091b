//! Flatbind - flat transfer decomposition for procedural-database types
//!
//! This crate re-exports all layers of the Flatbind system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: flatbind_transfer   - Occurrence trees, transfer-object decomposition, range codec
//! Layer 1: flatbind_graph      - Declaration source boundary, resolution, type graph
//! Layer 0: flatbind_foundation - Core types (TypeDeclaration, Primitive, Error)
//! ```

pub use flatbind_foundation as foundation;
pub use flatbind_graph as graph;
pub use flatbind_transfer as transfer;
