//! The type dependency graph.
//!
//! A [`TypeGraph`] holds every declaration reachable from a set of roots,
//! the ordered parent-to-child dependency relation, and a deterministic
//! topological order in which every declaration precedes the declarations
//! it is built from.

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use flatbind_foundation::{Result, TypeDeclaration};
use tracing::debug;

use crate::resolver::Resolver;
use crate::source::{DeclarationSource, canonical_name};

/// Immutable dependency graph over resolved declarations.
///
/// Cloning is cheap: storage uses persistent collections, and the graph
/// may be shared read-only across threads.
#[derive(Clone, Debug)]
pub struct TypeGraph {
    /// Declarations in first-discovery order.
    declarations: im::Vector<Arc<TypeDeclaration>>,
    /// Canonical name to position in `declarations`.
    index: im::HashMap<String, usize>,
    /// Ordered children per declaration; repeated member types repeat here.
    children: im::Vector<Vec<usize>>,
    roots: Vec<usize>,
    order: OnceLock<Vec<usize>>,
}

impl TypeGraph {
    /// Resolves `roots` from `source` and builds the graph.
    ///
    /// Construction is all-or-nothing: the first resolution failure aborts it.
    ///
    /// # Errors
    ///
    /// Propagates any resolution error (see [`Resolver::ensure_declaration`]).
    pub fn build<S, I>(source: &S, roots: I) -> Result<Self>
    where
        S: DeclarationSource + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut resolver = Resolver::new(source);
        let mut resolved = Vec::new();
        for root in roots {
            resolved.push(resolver.ensure_declaration(root.as_ref())?);
        }
        Ok(Self::from_roots(resolved))
    }

    /// Builds the graph from already-constructed declarations.
    ///
    /// Declarations are identified by name; discovery is a pre-order walk
    /// visiting children in declared order.
    #[must_use]
    pub fn from_roots(roots: impl IntoIterator<Item = Arc<TypeDeclaration>>) -> Self {
        let mut declarations = im::Vector::new();
        let mut index = im::HashMap::new();
        let mut root_positions = Vec::new();

        for root in roots {
            discover(&root, &mut declarations, &mut index);
            if let Some(&position) = index.get(root.name()) {
                if !root_positions.contains(&position) {
                    root_positions.push(position);
                }
            }
        }

        let children = declarations
            .iter()
            .map(|decl: &Arc<TypeDeclaration>| {
                decl.children()
                    .into_iter()
                    .filter_map(|child| index.get(child.name()).copied())
                    .collect::<Vec<usize>>()
            })
            .collect();

        debug!(
            declarations = declarations.len(),
            roots = root_positions.len(),
            "built type graph"
        );

        Self {
            declarations,
            index,
            children,
            roots: root_positions,
            order: OnceLock::new(),
        }
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Returns true if the graph has no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Looks up a declaration by name (any spelling that canonicalizes to it).
    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&Arc<TypeDeclaration>> {
        self.position(name).map(|i| &self.declarations[i])
    }

    /// Returns true if the graph contains `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns all declarations in first-discovery order.
    pub fn declarations(&self) -> impl Iterator<Item = &Arc<TypeDeclaration>> {
        self.declarations.iter()
    }

    /// Returns the root declarations in the order they were requested.
    #[must_use]
    pub fn roots(&self) -> Vec<&Arc<TypeDeclaration>> {
        self.roots.iter().map(|&i| &self.declarations[i]).collect()
    }

    /// Returns every procedure and function signature, in discovery order.
    pub fn signatures(&self) -> impl Iterator<Item = &Arc<TypeDeclaration>> {
        self.declarations.iter().filter(|decl| decl.is_signature())
    }

    /// Returns the ordered children of `name`, repeats included.
    #[must_use]
    pub fn children_of(&self, name: &str) -> Vec<&Arc<TypeDeclaration>> {
        self.position(name)
            .map(|i| {
                self.children[i]
                    .iter()
                    .map(|&c| &self.declarations[c])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the distinct declarations built from `name`, in discovery order.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> Vec<&Arc<TypeDeclaration>> {
        let Some(target) = self.position(name) else {
            return Vec::new();
        };
        self.children
            .iter()
            .enumerate()
            .filter(|(_, kids)| kids.contains(&target))
            .map(|(i, _)| &self.declarations[i])
            .collect()
    }

    /// Returns the topological order, computing it on first use.
    ///
    /// Every declaration appears before the declarations it depends on.
    /// Declarations nothing depends on seed a FIFO queue in discovery order;
    /// a child is released once its last distinct dependent has been emitted.
    #[must_use]
    pub fn topological_order(&self) -> Vec<&Arc<TypeDeclaration>> {
        self.order
            .get_or_init(|| self.compute_order())
            .iter()
            .map(|&i| &self.declarations[i])
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index
            .get(name)
            .or_else(|| self.index.get(canonical_name(name).as_str()))
            .copied()
    }

    fn compute_order(&self) -> Vec<usize> {
        let distinct: Vec<Vec<usize>> = self.children.iter().map(|kids| dedup(kids)).collect();

        let mut remaining = vec![0usize; self.declarations.len()];
        for kids in &distinct {
            for &child in kids {
                remaining[child] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..self.declarations.len())
            .filter(|&i| remaining[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.declarations.len());

        while let Some(next) = queue.pop_front() {
            order.push(next);
            for &child in &distinct[next] {
                remaining[child] -= 1;
                if remaining[child] == 0 {
                    queue.push_back(child);
                }
            }
        }
        order
    }
}

fn discover(
    decl: &Arc<TypeDeclaration>,
    declarations: &mut im::Vector<Arc<TypeDeclaration>>,
    index: &mut im::HashMap<String, usize>,
) {
    if index.contains_key(decl.name()) {
        return;
    }
    index.insert(decl.name().to_string(), declarations.len());
    declarations.push_back(Arc::clone(decl));
    for child in decl.children() {
        discover(child, declarations, index);
    }
}

/// Removes repeats, keeping first occurrences in order.
fn dedup(items: &[usize]) -> Vec<usize> {
    let mut seen = Vec::with_capacity(items.len());
    for &item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
