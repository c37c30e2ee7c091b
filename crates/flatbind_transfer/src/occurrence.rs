//! Positional type-occurrence trees.
//!
//! An [`OccurrenceTree`] instantiates a signature and everything reachable
//! from it as distinct nodes, one per position, stored in an arena and
//! addressed by [`OccurrenceHandle`]. Each node gets a compact positional id:
//!
//! - the root id is empty;
//! - the `i`-th field or parameter appends `i` when `i < 10`, else `_i_`
//!   (a function's return type is member `0`);
//! - a collection's element appends `e`.
//!
//! So `2e_11_e` is the element of field 11 of the element of parameter 2.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use flatbind_foundation::{DeclarationKind, Error, Result, TypeDeclaration};

/// Handle to a node in an [`OccurrenceTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OccurrenceHandle(u32);

impl OccurrenceHandle {
    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Structural label of a child within its parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    /// A record field.
    Field(String),
    /// A signature parameter.
    Parameter(String),
    /// A function's return type.
    Return,
    /// A collection's element type.
    Element,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) | Self::Parameter(name) => write!(f, "{name}"),
            Self::Return => write!(f, "<return>"),
            Self::Element => write!(f, "<element>"),
        }
    }
}

/// One declaration instantiated at one position.
#[derive(Clone, Debug)]
pub struct OccurrenceNode {
    declaration: Arc<TypeDeclaration>,
    parent: Option<OccurrenceHandle>,
    depth: u32,
    id: String,
    children: Vec<(Label, OccurrenceHandle)>,
}

impl OccurrenceNode {
    /// Returns the declaration at this position.
    #[must_use]
    pub fn declaration(&self) -> &Arc<TypeDeclaration> {
        &self.declaration
    }

    /// Returns the owning node; `None` only at the root.
    #[must_use]
    pub fn parent(&self) -> Option<OccurrenceHandle> {
        self.parent
    }

    /// Returns the distance from the root.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns the positional id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the labelled children in declared order.
    #[must_use]
    pub fn children(&self) -> &[(Label, OccurrenceHandle)] {
        &self.children
    }

    /// Returns the child with the given label.
    #[must_use]
    pub fn child(&self, label: &Label) -> Option<OccurrenceHandle> {
        self.children
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, handle)| *handle)
    }

    /// Returns the element child of a collection node.
    #[must_use]
    pub fn element(&self) -> Option<OccurrenceHandle> {
        self.child(&Label::Element)
    }
}

/// Arena of occurrence nodes rooted at one procedure or function signature.
#[derive(Clone, Debug)]
pub struct OccurrenceTree {
    nodes: Vec<OccurrenceNode>,
    by_id: HashMap<String, OccurrenceHandle>,
}

impl OccurrenceTree {
    /// Instantiates `signature` depth-first in declared member order.
    ///
    /// # Errors
    ///
    /// Returns an invalid root error unless `signature` is a procedure or
    /// function signature.
    pub fn build(signature: &Arc<TypeDeclaration>) -> Result<Self> {
        if !signature.is_signature() {
            return Err(Error::invalid_root(signature.name()));
        }
        let mut tree = Self {
            nodes: Vec::new(),
            by_id: HashMap::new(),
        };
        tree.instantiate(signature, None, 0, String::new());
        Ok(tree)
    }

    fn instantiate(
        &mut self,
        declaration: &Arc<TypeDeclaration>,
        parent: Option<OccurrenceHandle>,
        depth: u32,
        id: String,
    ) -> OccurrenceHandle {
        let handle = OccurrenceHandle(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.by_id.insert(id.clone(), handle);

        let members: Vec<(Label, &Arc<TypeDeclaration>, String)> = match declaration.kind() {
            DeclarationKind::Primitive(_) => Vec::new(),
            DeclarationKind::Record(fields) => fields
                .iter()
                .enumerate()
                .map(|(i, f)| (Label::Field(f.name.clone()), &f.ty, member_id(&id, i + 1)))
                .collect(),
            DeclarationKind::Procedure(parameters) => parameters
                .iter()
                .enumerate()
                .map(|(i, p)| (Label::Parameter(p.name.clone()), &p.ty, member_id(&id, i + 1)))
                .collect(),
            DeclarationKind::Function {
                returns,
                parameters,
            } => std::iter::once((Label::Return, returns, member_id(&id, 0)))
                .chain(parameters.iter().enumerate().map(|(i, p)| {
                    (Label::Parameter(p.name.clone()), &p.ty, member_id(&id, i + 1))
                }))
                .collect(),
            DeclarationKind::Varray(element)
            | DeclarationKind::NestedTable(element)
            | DeclarationKind::IndexByTable { element, .. } => {
                vec![(Label::Element, element, format!("{id}e"))]
            }
        };

        self.nodes.push(OccurrenceNode {
            declaration: Arc::clone(declaration),
            parent,
            depth,
            id,
            children: Vec::with_capacity(members.len()),
        });

        for (label, child, child_id) in members {
            let child_handle = self.instantiate(child, Some(handle), depth + 1, child_id);
            self.nodes[handle.0 as usize].children.push((label, child_handle));
        }
        handle
    }

    /// Returns the root (signature) node handle.
    #[must_use]
    pub fn root(&self) -> OccurrenceHandle {
        OccurrenceHandle(0)
    }

    /// Returns the signature this tree was built from.
    #[must_use]
    pub fn signature(&self) -> &Arc<TypeDeclaration> {
        &self.nodes[0].declaration
    }

    /// Returns the node for `handle`, if it belongs to this tree.
    #[must_use]
    pub fn get(&self, handle: OccurrenceHandle) -> Option<&OccurrenceNode> {
        self.nodes.get(handle.0 as usize)
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in construction (depth-first pre-) order.
    pub fn iter(&self) -> impl Iterator<Item = (OccurrenceHandle, &OccurrenceNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (OccurrenceHandle(u32::try_from(i).unwrap_or(u32::MAX)), node))
    }

    /// Finds the node with positional id `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<OccurrenceHandle> {
        self.by_id.get(id).copied()
    }

    /// Resolves a parsed path from the root.
    #[must_use]
    pub fn resolve(&self, path: &OccurrencePath) -> Option<OccurrenceHandle> {
        path.steps().iter().try_fold(self.root(), |current, step| {
            let node = self.get(current)?;
            match step {
                Step::Element => node.element(),
                Step::Member(i) => self.member(node, *i),
            }
        })
    }

    fn member(&self, node: &OccurrenceNode, ordinal: usize) -> Option<OccurrenceHandle> {
        let has_return = node.children.first().is_some_and(|(l, _)| *l == Label::Return);
        let position = match (has_return, ordinal) {
            (true, i) => i,
            (false, 0) => return None,
            (false, i) => i - 1,
        };
        node.children
            .get(position)
            .filter(|(l, _)| *l != Label::Element)
            .map(|(_, handle)| *handle)
    }
}

impl Index<OccurrenceHandle> for OccurrenceTree {
    type Output = OccurrenceNode;

    fn index(&self, handle: OccurrenceHandle) -> &Self::Output {
        &self.nodes[handle.0 as usize]
    }
}

fn member_id(parent: &str, ordinal: usize) -> String {
    if ordinal < 10 {
        format!("{parent}{ordinal}")
    } else {
        format!("{parent}_{ordinal}_")
    }
}

/// One step of a positional id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Field or parameter ordinal (1-based; 0 is a function's return type).
    Member(usize),
    /// Collection element.
    Element,
}

/// A parsed positional id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OccurrencePath(Vec<Step>);

impl OccurrencePath {
    /// Parses a positional id.
    ///
    /// # Errors
    ///
    /// Returns a malformed occurrence id error for anything the id algorithm
    /// could not have produced, such as `_7_` or an unterminated `_12`.
    pub fn parse(id: &str) -> Result<Self> {
        let mut steps = Vec::new();
        let mut chars = id.char_indices().peekable();
        while let Some((start, c)) = chars.next() {
            match c {
                '0'..='9' => steps.push(Step::Member(c as usize - '0' as usize)),
                'e' => steps.push(Step::Element),
                '_' => {
                    let rest = &id[start + 1..];
                    let end = rest
                        .find('_')
                        .ok_or_else(|| Error::malformed_occurrence_id(id))?;
                    let digits = &rest[..end];
                    let valid = !digits.is_empty()
                        && !digits.starts_with('0')
                        && digits.bytes().all(|b| b.is_ascii_digit());
                    let ordinal = digits
                        .parse::<usize>()
                        .ok()
                        .filter(|n| valid && *n >= 10)
                        .ok_or_else(|| Error::malformed_occurrence_id(id))?;
                    steps.push(Step::Member(ordinal));
                    for _ in 0..=end {
                        chars.next();
                    }
                }
                _ => return Err(Error::malformed_occurrence_id(id)),
            }
        }
        Ok(Self(steps))
    }

    /// Returns the steps from the root.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// Returns the path of the parent position.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }
}

impl fmt::Display for OccurrencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            match step {
                Step::Element => write!(f, "e")?,
                Step::Member(i) if *i < 10 => write!(f, "{i}")?,
                Step::Member(i) => write!(f, "_{i}_")?,
            }
        }
        Ok(())
    }
}
