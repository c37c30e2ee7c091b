//! Transfer-object trees.
//!
//! A [`TransferObjectTree`] is the flat-container plan for one call-site:
//! pointer arrays, deletion flags, index keys, and scalar/array/struct
//! leaves. It is a second arena, independent of the [`OccurrenceTree`] it
//! was derived from, linked to it by an association table.
//!
//! [`OccurrenceTree`]: crate::occurrence::OccurrenceTree

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use flatbind_foundation::Primitive;
use tracing::warn;

use crate::occurrence::OccurrenceHandle;

/// Handle to an object in a [`TransferObjectTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferHandle(u32);

impl TransferHandle {
    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// The closed set of transfer containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferKind {
    /// Synthetic root of the whole tree.
    Root,
    /// A single scalar value.
    PrimitiveScalar,
    /// A flat array of scalar values.
    PrimitiveCollection,
    /// Range-encoding array selecting each sub-collection's slice of its children.
    Pointers {
        /// The collection is not nested inside another collection.
        boundary_simple: bool,
        /// The ranges address deletion flags rather than data.
        targets_deletions: bool,
    },
    /// Per-slot flags marking removed nested-table entries.
    Deletions,
    /// Literal associative-array keys, parallel to the data.
    IndexKeys(Primitive),
    /// A record the driver sends as one struct.
    TransferableRecord,
    /// A collection the driver sends as one array.
    TransferableCollection,
}

impl TransferKind {
    /// Returns the one-character role suffix appended to the occurrence id.
    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            Self::Root => 't',
            Self::PrimitiveScalar => 'v',
            Self::PrimitiveCollection => 'a',
            Self::Pointers {
                targets_deletions: false,
                ..
            } => 'p',
            Self::Pointers {
                targets_deletions: true,
                ..
            } => 'q',
            Self::Deletions => 'd',
            Self::IndexKeys(_) => 'k',
            Self::TransferableRecord => 'r',
            Self::TransferableCollection => 'c',
        }
    }

    /// Returns true for deletion pointers, deletion flags and index keys.
    #[must_use]
    pub const fn is_bookkeeping(self) -> bool {
        matches!(
            self,
            Self::Pointers {
                targets_deletions: true,
                ..
            } | Self::Deletions
                | Self::IndexKeys(_)
        )
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::PrimitiveScalar => write!(f, "scalar"),
            Self::PrimitiveCollection => write!(f, "scalar-array"),
            Self::Pointers {
                targets_deletions: false,
                ..
            } => write!(f, "pointers"),
            Self::Pointers {
                targets_deletions: true,
                ..
            } => write!(f, "deletion-pointers"),
            Self::Deletions => write!(f, "deletions"),
            Self::IndexKeys(key) => write!(f, "index-keys({key})"),
            Self::TransferableRecord => write!(f, "struct"),
            Self::TransferableCollection => write!(f, "array"),
        }
    }
}

/// One flat transfer container.
#[derive(Clone, Debug)]
pub struct TransferObject {
    kind: TransferKind,
    occurrence: OccurrenceHandle,
    id: String,
    parent: Option<TransferHandle>,
    children: Vec<TransferHandle>,
}

impl TransferObject {
    /// Returns the container kind.
    #[must_use]
    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    /// Returns the occurrence node this object implements.
    #[must_use]
    pub fn occurrence(&self) -> OccurrenceHandle {
        self.occurrence
    }

    /// Returns the id: occurrence id plus role suffix.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the owning object; `None` only at the root.
    #[must_use]
    pub fn parent(&self) -> Option<TransferHandle> {
        self.parent
    }

    /// Returns the owned objects in creation order.
    #[must_use]
    pub fn children(&self) -> &[TransferHandle] {
        &self.children
    }
}

/// One row of [`TransferObjectTree::shape`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeEntry {
    /// Object id.
    pub id: String,
    /// Object kind.
    pub kind: TransferKind,
    /// Parent object id.
    pub parent: Option<String>,
}

/// Arena of transfer objects plus the occurrence association table.
#[derive(Clone, Debug)]
pub struct TransferObjectTree {
    objects: Vec<TransferObject>,
    associations: HashMap<OccurrenceHandle, Vec<TransferHandle>>,
    by_id: HashMap<String, TransferHandle>,
    identifier_limit: usize,
}

impl TransferObjectTree {
    pub(crate) fn new(root: OccurrenceHandle, root_id: &str, identifier_limit: usize) -> Self {
        let mut tree = Self {
            objects: Vec::new(),
            associations: HashMap::new(),
            by_id: HashMap::new(),
            identifier_limit,
        };
        tree.push(None, TransferKind::Root, root, root_id);
        tree
    }

    /// Adds `kind` under `parent` on behalf of occurrence `occurrence`.
    pub(crate) fn attach(
        &mut self,
        parent: TransferHandle,
        kind: TransferKind,
        occurrence: OccurrenceHandle,
        occurrence_id: &str,
    ) -> TransferHandle {
        let handle = self.push(Some(parent), kind, occurrence, occurrence_id);
        self.objects[parent.0 as usize].children.push(handle);
        handle
    }

    fn push(
        &mut self,
        parent: Option<TransferHandle>,
        kind: TransferKind,
        occurrence: OccurrenceHandle,
        occurrence_id: &str,
    ) -> TransferHandle {
        let handle = TransferHandle(u32::try_from(self.objects.len()).unwrap_or(u32::MAX));
        let id = format!("{occurrence_id}{}", kind.suffix());
        self.by_id.insert(id.clone(), handle);
        self.associations.entry(occurrence).or_default().push(handle);
        self.objects.push(TransferObject {
            kind,
            occurrence,
            id,
            parent,
            children: Vec::new(),
        });
        handle
    }

    /// Returns the synthetic root.
    #[must_use]
    pub fn root(&self) -> TransferHandle {
        TransferHandle(0)
    }

    /// Returns the object for `handle`, if it belongs to this tree.
    #[must_use]
    pub fn get(&self, handle: TransferHandle) -> Option<&TransferObject> {
        self.objects.get(handle.0 as usize)
    }

    /// Returns the number of objects, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (TransferHandle, &TransferObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (TransferHandle(u32::try_from(i).unwrap_or(u32::MAX)), object))
    }

    /// Returns handles in depth-first pre-order from the root.
    #[must_use]
    pub fn preorder(&self) -> Vec<TransferHandle> {
        let mut order = Vec::with_capacity(self.objects.len());
        let mut stack = vec![self.root()];
        while let Some(handle) = stack.pop() {
            order.push(handle);
            stack.extend(self[handle].children.iter().rev());
        }
        order
    }

    /// Finds the object with id `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<TransferHandle> {
        self.by_id.get(id).copied()
    }

    /// Returns every object created for `occurrence`, in creation order.
    ///
    /// Empty for occurrences decomposed transparently into their children.
    #[must_use]
    pub fn objects_for(&self, occurrence: OccurrenceHandle) -> &[TransferHandle] {
        self.associations
            .get(&occurrence)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the canonical object for `occurrence`.
    ///
    /// For a collection this is its data pointers object, or the leaf that
    /// replaced it when the boundary was elided; deletion pointers, deletion
    /// flags and index keys are never canonical.
    #[must_use]
    pub fn primary_for(&self, occurrence: OccurrenceHandle) -> Option<TransferHandle> {
        self.objects_for(occurrence)
            .iter()
            .copied()
            .find(|&handle| !self[handle].kind.is_bookkeeping())
    }

    /// Returns `(id, kind, parent id)` for every object in pre-order.
    #[must_use]
    pub fn shape(&self) -> Vec<ShapeEntry> {
        self.preorder()
            .into_iter()
            .map(|handle| {
                let object = &self[handle];
                ShapeEntry {
                    id: object.id.clone(),
                    kind: object.kind,
                    parent: object.parent.map(|p| self[p].id.clone()),
                }
            })
            .collect()
    }

    /// Returns the qualified name `prefix + id` of every object except the root.
    ///
    /// Names longer than the configured identifier limit are logged.
    #[must_use]
    pub fn qualified_names(&self, prefix: &str) -> Vec<(TransferHandle, String)> {
        self.iter()
            .filter(|(_, object)| object.kind != TransferKind::Root)
            .map(|(handle, object)| {
                let name = format!("{prefix}{}", object.id);
                if name.len() > self.identifier_limit {
                    warn!(
                        name = %name,
                        limit = self.identifier_limit,
                        "transfer identifier exceeds limit"
                    );
                }
                (handle, name)
            })
            .collect()
    }

    /// Returns true if every qualified name fits the identifier limit.
    #[must_use]
    pub fn fits_identifier_limit(&self, prefix: &str) -> bool {
        self.objects
            .iter()
            .filter(|object| object.kind != TransferKind::Root)
            .all(|object| prefix.len() + object.id.len() <= self.identifier_limit)
    }
}

impl Index<TransferHandle> for TransferObjectTree {
    type Output = TransferObject;

    fn index(&self, handle: TransferHandle) -> &Self::Output {
        &self.objects[handle.0 as usize]
    }
}
