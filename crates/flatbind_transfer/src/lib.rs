//! Occurrence trees and flat transfer-object decomposition for Flatbind.
//!
//! This crate provides:
//! - [`OccurrenceTree`] - Per-position instantiation of a signature with positional ids
//! - [`decompose`] - Mapping of occurrences onto flat driver containers
//! - [`TransferObjectTree`] - The resulting containers and their association table
//! - [`Ranges`] - The pointers range encoding for nested collections
//! - [`CallPlan`] - Both trees for one signature

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod decompose;
pub mod occurrence;
pub mod plan;
pub mod ranges;
pub mod transfer;

pub use config::{DEFAULT_IDENTIFIER_LIMIT, TransferConfig};
pub use decompose::decompose;
pub use occurrence::{Label, OccurrenceHandle, OccurrenceNode, OccurrencePath, OccurrenceTree, Step};
pub use plan::CallPlan;
pub use ranges::{Ranges, decode_sparse, encode_sparse};
pub use transfer::{ShapeEntry, TransferHandle, TransferKind, TransferObject, TransferObjectTree};
