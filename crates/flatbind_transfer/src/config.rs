//! Configuration for transfer-object decomposition.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default ceiling for generated database identifier lengths.
pub const DEFAULT_IDENTIFIER_LIMIT: usize = 30;

/// Configuration for the decomposition pass.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransferConfig {
    /// Skip the degenerate `[1, len + 1]` data pointers of a transferable
    /// collection that is not nested inside another collection.
    pub elide_simple_boundaries: bool,

    /// Maximum length of a qualified transfer name (prefix plus id).
    pub identifier_limit: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            elide_simple_boundaries: true,
            identifier_limit: DEFAULT_IDENTIFIER_LIMIT,
        }
    }
}

impl TransferConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that materializes every pointers object.
    #[must_use]
    pub fn explicit() -> Self {
        Self {
            elide_simple_boundaries: false,
            ..Self::default()
        }
    }

    /// Builder method to set boundary elision.
    #[must_use]
    pub fn with_elide_simple_boundaries(mut self, elide: bool) -> Self {
        self.elide_simple_boundaries = elide;
        self
    }

    /// Builder method to set the identifier limit.
    #[must_use]
    pub fn with_identifier_limit(mut self, limit: usize) -> Self {
        self.identifier_limit = limit;
        self
    }
}
