//! Decomposition of an occurrence tree into flat transfer containers.
//!
//! The walk threads three things: the current occurrence node, the transfer
//! object new containers attach under, and whether a collection boundary has
//! been crossed since the nearest enclosing transferable unit.
//!
//! | Declaration | Outside a collection | Inside a collection |
//! |-------------|----------------------|---------------------|
//! | signature   | recurse into members | (n/a) |
//! | record      | struct leaf if transferable, else transparent | transparent |
//! | varray / nested table | pointers, then array leaf if transferable, else recurse | same |
//! | index-by table | pointers + index keys, recurse | same |
//! | primitive   | scalar leaf | scalar-array leaf |
//!
//! Nested tables additionally get deletion pointers with a deletions child.

use flatbind_foundation::DeclarationKind;
use tracing::{debug, trace};

use crate::config::TransferConfig;
use crate::occurrence::{OccurrenceHandle, OccurrenceTree};
use crate::transfer::{TransferHandle, TransferKind, TransferObjectTree};

/// Builds the transfer-object tree for `occurrences`.
///
/// Deterministic: structurally equal occurrence trees yield trees with
/// identical shape and ids.
#[must_use]
pub fn decompose(occurrences: &OccurrenceTree, config: &TransferConfig) -> TransferObjectTree {
    let root = occurrences.root();
    let out = TransferObjectTree::new(root, occurrences[root].id(), config.identifier_limit);
    let mut decomposer = Decomposer {
        occurrences,
        config,
        out,
    };
    let transfer_root = decomposer.out.root();
    decomposer.visit(root, transfer_root, false);

    debug!(
        signature = occurrences.signature().name(),
        occurrences = occurrences.len(),
        objects = decomposer.out.len(),
        "decomposed signature"
    );
    decomposer.out
}

struct Decomposer<'t> {
    occurrences: &'t OccurrenceTree,
    config: &'t TransferConfig,
    out: TransferObjectTree,
}

impl Decomposer<'_> {
    fn visit(&mut self, occurrence: OccurrenceHandle, parent: TransferHandle, inside: bool) {
        let occurrences = self.occurrences;
        let node = &occurrences[occurrence];
        let declaration = node.declaration();
        trace!(
            id = node.id(),
            declaration = declaration.name(),
            inside_collection = inside,
            "decompose"
        );

        match declaration.kind() {
            DeclarationKind::Procedure(_) | DeclarationKind::Function { .. } => {
                for &(_, child) in node.children() {
                    self.visit(child, parent, inside);
                }
            }
            DeclarationKind::Record(_) => {
                if declaration.is_transferable() && !inside {
                    self.attach(parent, TransferKind::TransferableRecord, occurrence);
                } else {
                    for &(_, child) in node.children() {
                        self.visit(child, parent, inside);
                    }
                }
            }
            DeclarationKind::Varray(_) => self.visit_collection(occurrence, parent, inside, false),
            DeclarationKind::NestedTable(_) => {
                self.visit_collection(occurrence, parent, inside, true);
            }
            DeclarationKind::IndexByTable { key, .. } => {
                let pointers = self.attach(
                    parent,
                    TransferKind::Pointers {
                        boundary_simple: !inside,
                        targets_deletions: false,
                    },
                    occurrence,
                );
                if let Some(primitive) = key.as_primitive() {
                    self.attach(pointers, TransferKind::IndexKeys(primitive), occurrence);
                }
                if let Some(element) = node.element() {
                    self.visit(element, pointers, true);
                }
            }
            DeclarationKind::Primitive(_) => {
                let kind = if inside {
                    TransferKind::PrimitiveCollection
                } else {
                    TransferKind::PrimitiveScalar
                };
                self.attach(parent, kind, occurrence);
            }
        }
    }

    /// Varrays and nested tables.
    fn visit_collection(
        &mut self,
        occurrence: OccurrenceHandle,
        parent: TransferHandle,
        inside: bool,
        tracks_deletions: bool,
    ) {
        let occurrences = self.occurrences;
        let node = &occurrences[occurrence];
        let transferable = node.declaration().is_transferable();
        let boundary_simple = !inside;

        let data = if transferable && boundary_simple && self.config.elide_simple_boundaries {
            self.attach(parent, TransferKind::TransferableCollection, occurrence);
            None
        } else {
            Some(self.attach(
                parent,
                TransferKind::Pointers {
                    boundary_simple,
                    targets_deletions: false,
                },
                occurrence,
            ))
        };

        if tracks_deletions {
            let deletion_pointers = self.attach(
                parent,
                TransferKind::Pointers {
                    boundary_simple,
                    targets_deletions: true,
                },
                occurrence,
            );
            self.attach(deletion_pointers, TransferKind::Deletions, occurrence);
        }

        let Some(data) = data else {
            return;
        };
        if transferable {
            self.attach(data, TransferKind::TransferableCollection, occurrence);
        } else if let Some(element) = node.element() {
            self.visit(element, data, true);
        }
    }

    fn attach(
        &mut self,
        parent: TransferHandle,
        kind: TransferKind,
        occurrence: OccurrenceHandle,
    ) -> TransferHandle {
        let occurrences = self.occurrences;
        self.out
            .attach(parent, kind, occurrence, occurrences[occurrence].id())
    }
}
