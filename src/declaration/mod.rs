//! Declaration phase: accumulating component descriptors
//!
//! [`Declarations`] is the explicit accumulator every declaration goes
//! through. Nothing is built while declaring; descriptors are queued in
//! declaration order and handed to the [`Resolver`](crate::resolver::Resolver)
//! in one piece.
//!
//! # Redeclaration
//!
//! Declaring a key that is already pending replaces the pending descriptor
//! in place. The component keeps its original position in declaration order.
//!
//! # Example
//!
//! ```rust
//! use ormkit_registry::core::instance;
//! use ormkit_registry::declaration::Declarations;
//!
//! let mut decls = Declarations::new();
//! decls.gateway("default").adapter("memory");
//! decls.dataset("numbers").build_with(|_ctx| Ok(instance(vec![1, 2])));
//! decls.relation("users").adapter("memory");
//! decls.commands("users").adapter("memory").define("create").define("delete");
//!
//! assert_eq!(decls.len(), 5);
//! ```

pub mod descriptor;

pub use descriptor::{
    BuildFn, ComponentConfig, ComponentDescriptor, Reference, ReferenceOrigin, Relationship,
    RelationshipKind,
};

use std::collections::HashMap;
use tracing::warn;

use crate::core::{ComponentKey, ComponentKind, Instance};
use crate::resolver::BuildContext;

/// Ordered set of pending component descriptors.
#[derive(Debug, Default)]
pub struct Declarations {
    descriptors: Vec<ComponentDescriptor>,
    index: HashMap<ComponentKey, usize>,
}

impl Declarations {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a descriptor, replacing a pending one with the same key.
    pub fn declare(&mut self, descriptor: ComponentDescriptor) -> &mut ComponentDescriptor {
        let key = descriptor.key();
        let position = match self.index.get(&key) {
            Some(&position) => {
                warn!("Redeclaring '{}' replaces the pending declaration", key);
                self.descriptors[position] = descriptor;
                position
            }
            None => {
                self.descriptors.push(descriptor);
                let position = self.descriptors.len() - 1;
                self.index.insert(key, position);
                position
            }
        };
        &mut self.descriptors[position]
    }

    /// Declare a gateway.
    pub fn gateway(&mut self, id: impl Into<String>) -> &mut ComponentDescriptor {
        self.declare(ComponentDescriptor::new(ComponentKind::Gateway, id))
    }

    /// Declare a dataset.
    pub fn dataset(&mut self, id: impl Into<String>) -> &mut ComponentDescriptor {
        self.declare(ComponentDescriptor::new(ComponentKind::Dataset, id))
    }

    /// Declare a schema.
    pub fn schema(&mut self, id: impl Into<String>) -> &mut ComponentDescriptor {
        self.declare(ComponentDescriptor::new(ComponentKind::Schema, id))
    }

    /// Declare a relation.
    pub fn relation(&mut self, id: impl Into<String>) -> &mut ComponentDescriptor {
        self.declare(ComponentDescriptor::new(ComponentKind::Relation, id))
    }

    /// Start declaring commands for `relation_id`.
    pub fn commands(&mut self, relation_id: impl Into<String>) -> ComponentGroup<'_> {
        ComponentGroup::new(self, ComponentKind::Command, relation_id.into())
    }

    /// Start declaring mappers for `relation_id`.
    pub fn mappers(&mut self, relation_id: impl Into<String>) -> ComponentGroup<'_> {
        ComponentGroup::new(self, ComponentKind::Mapper, relation_id.into())
    }

    /// Pending descriptor for `key`.
    pub fn get(&self, key: &ComponentKey) -> Option<&ComponentDescriptor> {
        self.index.get(key).map(|&position| &self.descriptors[position])
    }

    /// Pending descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.descriptors.iter()
    }

    /// Number of pending descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Consume the accumulator, yielding descriptors in declaration order.
    pub fn into_descriptors(self) -> Vec<ComponentDescriptor> {
        self.descriptors
    }
}

/// Declares several commands or mappers belonging to one relation.
///
/// Returned by [`Declarations::commands`] and [`Declarations::mappers`].
/// An adapter set on the group applies to components defined afterwards.
pub struct ComponentGroup<'a> {
    declarations: &'a mut Declarations,
    kind: ComponentKind,
    relation_id: String,
    adapter: Option<String>,
    defined: Vec<ComponentKey>,
}

impl<'a> ComponentGroup<'a> {
    fn new(declarations: &'a mut Declarations, kind: ComponentKind, relation_id: String) -> Self {
        Self {
            declarations,
            kind,
            relation_id,
            adapter: None,
            defined: Vec::new(),
        }
    }

    /// Adapter for components defined from now on.
    pub fn adapter(&mut self, adapter: impl Into<String>) -> &mut Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Define a component built by the default builder of its kind.
    pub fn define(&mut self, id: impl Into<String>) -> &mut Self {
        self.declare_member(id.into());
        self
    }

    /// Define a component with its own build procedure.
    pub fn define_with<F>(&mut self, id: impl Into<String>, build: F) -> &mut Self
    where
        F: FnOnce(&BuildContext<'_>) -> anyhow::Result<Instance> + Send + 'static,
    {
        self.declare_member(id.into()).build_with(build);
        self
    }

    /// Pending descriptor of a member defined through this group.
    pub fn member(&mut self, id: &str) -> Option<&mut ComponentDescriptor> {
        let key = ComponentKey::namespaced(self.kind, self.relation_id.clone(), id);
        let position = *self.declarations.index.get(&key)?;
        Some(&mut self.declarations.descriptors[position])
    }

    /// Keys of the members defined through this group, in order.
    pub fn keys(&self) -> &[ComponentKey] {
        &self.defined
    }

    /// Number of members defined through this group.
    pub fn len(&self) -> usize {
        self.defined.len()
    }

    /// Whether no member was defined.
    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }

    fn declare_member(&mut self, id: String) -> &mut ComponentDescriptor {
        let mut descriptor = match self.kind {
            ComponentKind::Mapper => ComponentDescriptor::mapper(self.relation_id.clone(), id),
            _ => ComponentDescriptor::command(self.relation_id.clone(), id),
        };
        if let Some(adapter) = &self.adapter {
            descriptor.adapter(adapter.clone());
        }

        let key = descriptor.key();
        if !self.defined.contains(&key) {
            self.defined.push(key);
        }
        self.declarations.declare(descriptor)
    }
}
