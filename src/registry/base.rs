//! Base registry tree and discovery operations.
//!
//! A registry is a tree of nodes: one abstract root, categories opened
//! directly under it, and concrete entries below categories. Concrete
//! entries may nest further concrete entries. Discovery walks the tree on
//! every call; nothing is cached.

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::RegistryError;

/// Trait for values produced by a registry factory.
///
/// Each value reports the key it is registered under.
pub trait Registered: Send + Sync {
    /// Returns the registry key for this value.
    fn registry_key(&self) -> &str;
}

type Factory<T> = Box<dyn Fn() -> Box<T> + Send + Sync>;

enum NodeKind<T: ?Sized + Registered> {
    Root,
    Category,
    Concrete(Factory<T>),
}

struct Node<T: ?Sized + Registered> {
    name: String,
    kind: NodeKind<T>,
    parent: Weak<Node<T>>,
    children: RwLock<Vec<Arc<Node<T>>>>,
}

/// A handle to one node of a registry tree.
///
/// Handles are cheap clones of a shared node. The root and categories are
/// abstract: [`Registry::instantiate`] refuses them and directs callers to
/// [`Registry::load`]. Concrete entries carry the factory supplied at
/// registration time.
///
/// # Type Parameters
///
/// * `T` - The trait object type factories produce (e.g., `dyn SearchMethod`)
pub struct Registry<T: ?Sized + Registered> {
    node: Arc<Node<T>>,
}

impl<T: ?Sized + Registered> Registry<T> {
    /// Create the abstract root of a new registry tree.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            node: Arc::new(Node {
                name: name.into(),
                kind: NodeKind::Root,
                parent: Weak::new(),
                children: RwLock::new(Vec::new()),
            }),
        }
    }

    /// The node's name. For concrete entries this is the registry key.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Whether this handle points at the abstract root.
    pub fn is_root(&self) -> bool {
        matches!(self.node.kind, NodeKind::Root)
    }

    /// Whether this handle points at a category.
    pub fn is_category(&self) -> bool {
        matches!(self.node.kind, NodeKind::Category)
    }

    /// Whether this handle points at a concrete entry.
    pub fn is_concrete(&self) -> bool {
        matches!(self.node.kind, NodeKind::Concrete(_))
    }

    /// Open a keyed namespace directly under the root.
    ///
    /// Returns an error if this handle is not the root, or if a category
    /// with the same name already exists.
    pub fn category(&self, name: impl Into<String>) -> Result<Registry<T>, RegistryError> {
        let name = name.into();
        if !self.is_root() {
            return Err(RegistryError::InvalidRegistration(format!(
                "category '{}' must be opened on the registry root, not on '{}'",
                name, self.node.name
            )));
        }

        let mut children = self.node.children.write();
        if children.iter().any(|c| c.name == name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }

        let child = Arc::new(Node {
            name: name.clone(),
            kind: NodeKind::Category,
            parent: Arc::downgrade(&self.node),
            children: RwLock::new(Vec::new()),
        });
        children.push(child.clone());
        drop(children);

        debug!(category = %name, root = %self.node.name, "opened registry category");
        Ok(Registry { node: child })
    }

    /// Register a concrete entry under this category or concrete entry.
    ///
    /// The key must be unique within the enclosing category's namespace;
    /// duplicates are rejected rather than overwritten. Registering directly
    /// on the root is invalid: entries live inside categories.
    pub fn register<F>(
        &self,
        key: impl Into<String>,
        build: F,
    ) -> Result<Registry<T>, RegistryError>
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.is_root() {
            return Err(RegistryError::InvalidRegistration(format!(
                "'{}' cannot be registered on root '{}'; open a category first",
                key, self.node.name
            )));
        }

        if self.namespace().available().contains_key(key.as_str()) {
            return Err(RegistryError::AlreadyRegistered(key));
        }

        let child = Arc::new(Node {
            name: key.clone(),
            kind: NodeKind::Concrete(Box::new(build)),
            parent: Arc::downgrade(&self.node),
            children: RwLock::new(Vec::new()),
        });
        self.node.children.write().push(child.clone());

        debug!(key = %key, parent = %self.node.name, "registered entry");
        Ok(Registry { node: child })
    }

    /// All strictly-descendant concrete entries, in registration order.
    ///
    /// Categories are walked through but never included. Duplicates are
    /// impossible by construction: every entry has exactly one parent.
    pub fn descendants(&self) -> Vec<Registry<T>> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Registry<T>>) {
        for child in self.node.children.read().iter() {
            let handle = Registry {
                node: child.clone(),
            };
            if handle.is_concrete() {
                out.push(handle.clone());
            }
            handle.collect_descendants(out);
        }
    }

    /// Key-to-entry index over [`Registry::descendants`], rebuilt on every
    /// call.
    ///
    /// A concrete receiver is additionally included under its own key, so a
    /// concrete entry can be queried for itself plus its descendants.
    /// Iteration order is discovery order.
    pub fn available(&self) -> IndexMap<String, Registry<T>> {
        let mut map = IndexMap::new();
        for entry in self.descendants() {
            map.insert(entry.node.name.clone(), entry);
        }
        if self.is_concrete() {
            map.insert(self.node.name.clone(), self.clone());
        }
        map
    }

    /// Check whether a key is visible from this node.
    pub fn contains(&self, key: &str) -> bool {
        self.available().contains_key(key)
    }

    /// Build a value from this entry's factory.
    ///
    /// The root and categories are abstract and refuse instantiation.
    pub fn instantiate(&self) -> Result<Box<T>, RegistryError> {
        match &self.node.kind {
            NodeKind::Concrete(build) => Ok(build()),
            NodeKind::Root | NodeKind::Category => Err(RegistryError::InstantiationNotAllowed {
                name: self.node.name.clone(),
            }),
        }
    }

    /// Look up a key in [`Registry::available`] and run its factory.
    pub fn load(&self, key: &str) -> Result<Box<T>, RegistryError> {
        let entry = self
            .available()
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
        entry.instantiate()
    }

    // The enclosing category scope for duplicate-key checks: the nearest
    // category ancestor, or the node itself when no category encloses it.
    fn namespace(&self) -> Registry<T> {
        let mut node = self.node.clone();
        loop {
            if matches!(node.kind, NodeKind::Category) {
                return Registry { node };
            }
            match node.parent.upgrade() {
                Some(parent) if !matches!(parent.kind, NodeKind::Root) => node = parent,
                _ => return Registry { node },
            }
        }
    }

    fn kind_str(&self) -> &'static str {
        match self.node.kind {
            NodeKind::Root => "root",
            NodeKind::Category => "category",
            NodeKind::Concrete(_) => "concrete",
        }
    }
}

impl<T: ?Sized + Registered> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<T: ?Sized + Registered> PartialEq for Registry<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl<T: ?Sized + Registered> Eq for Registry<T> {}

impl<T: ?Sized + Registered> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.node.name)
            .field("kind", &self.kind_str())
            .finish()
    }
}

/// Ordered keys of a node's [`Registry::available`] index.
pub fn available_methods<T: ?Sized + Registered>(registry: &Registry<T>) -> Vec<String> {
    registry.available().into_keys().collect()
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;
