//! Per-signature call plans.

use std::sync::Arc;

use flatbind_foundation::{Error, Result, TypeDeclaration};
use flatbind_graph::TypeGraph;

use crate::config::TransferConfig;
use crate::decompose::decompose;
use crate::occurrence::OccurrenceTree;
use crate::transfer::TransferObjectTree;

/// The occurrence tree and transfer-object tree of one signature.
#[derive(Clone, Debug)]
pub struct CallPlan {
    occurrences: OccurrenceTree,
    transfers: TransferObjectTree,
}

impl CallPlan {
    /// Plans the call to the signature named `name` in `graph`.
    ///
    /// # Errors
    ///
    /// Returns an undeclared type error if `graph` has no declaration named
    /// `name`, and an invalid root error if it is not a signature.
    pub fn build(graph: &TypeGraph, name: &str, config: &TransferConfig) -> Result<Self> {
        let signature = graph
            .declaration(name)
            .ok_or_else(|| Error::undeclared_type(name))?;
        Self::for_signature(signature, config)
    }

    /// Plans the call to an already-resolved signature.
    ///
    /// # Errors
    ///
    /// Returns an invalid root error if `signature` is not a signature.
    pub fn for_signature(signature: &Arc<TypeDeclaration>, config: &TransferConfig) -> Result<Self> {
        let occurrences = OccurrenceTree::build(signature)?;
        let transfers = decompose(&occurrences, config);
        Ok(Self {
            occurrences,
            transfers,
        })
    }

    /// Plans every signature in `graph`, in discovery order.
    ///
    /// # Errors
    ///
    /// Never fails for a graph built by this crate; the `Result` mirrors
    /// [`CallPlan::for_signature`].
    pub fn all(graph: &TypeGraph, config: &TransferConfig) -> Result<Vec<Self>> {
        graph
            .signatures()
            .map(|signature| Self::for_signature(signature, config))
            .collect()
    }

    /// Returns the signature planned for.
    #[must_use]
    pub fn signature(&self) -> &Arc<TypeDeclaration> {
        self.occurrences.signature()
    }

    /// Returns the occurrence tree.
    #[must_use]
    pub fn occurrences(&self) -> &OccurrenceTree {
        &self.occurrences
    }

    /// Returns the transfer-object tree.
    #[must_use]
    pub fn transfers(&self) -> &TransferObjectTree {
        &self.transfers
    }
}
