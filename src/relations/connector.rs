//! Relation nodes and the connectors between them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::Instance;
use crate::declaration::Relationship;

use super::node_name::NodeName;

/// A registered relation wrapped as a graph node.
pub struct RelationNode {
    name: String,
    relation: Instance,
}

impl RelationNode {
    /// Wrap a built relation.
    pub fn new(name: impl Into<String>, relation: Instance) -> Self {
        Self {
            name: name.into(),
            relation,
        }
    }

    /// Relation identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The built relation instance.
    pub fn relation(&self) -> &Instance {
        &self.relation
    }
}

impl fmt::Debug for RelationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationNode").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Every relation node of a registry, by relation identifier.
#[derive(Debug, Default)]
pub struct RelationSet {
    nodes: BTreeMap<String, Arc<RelationNode>>,
}

impl RelationSet {
    pub(crate) fn insert(&mut self, node: RelationNode) {
        self.nodes.insert(node.name.clone(), Arc::new(node));
    }

    /// Node of the relation `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<RelationNode>> {
        self.nodes.get(name)
    }

    /// Whether the relation `name` is part of the set.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Nodes sorted by relation identifier.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RelationNode>> {
        self.nodes.values()
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the set holds no relation.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A named edge from one relation node along a declared relationship.
///
/// The connector keeps the whole relation set so the other side is resolved
/// lazily through [`target`](Connector::target).
pub struct Connector {
    name: NodeName,
    node: Arc<RelationNode>,
    relationship: Relationship,
    relations: Arc<RelationSet>,
}

impl Connector {
    pub(crate) fn new(
        name: NodeName,
        node: Arc<RelationNode>,
        relationship: Relationship,
        relations: Arc<RelationSet>,
    ) -> Self {
        Self {
            name,
            node,
            relationship,
            relations,
        }
    }

    /// Derived connector name.
    pub fn name(&self) -> String {
        self.name.connector_name()
    }

    /// Structured connector name.
    pub fn node_name(&self) -> &NodeName {
        &self.name
    }

    /// Source relation node.
    pub fn source(&self) -> &Arc<RelationNode> {
        &self.node
    }

    /// The relationship this connector was derived from.
    pub fn relationship(&self) -> &Relationship {
        &self.relationship
    }

    /// Target relation node.
    ///
    /// Always present for connectors built by [`RelationGraph`](super::RelationGraph),
    /// which rejects relationships towards unknown relations.
    pub fn target(&self) -> Option<&Arc<RelationNode>> {
        self.relations.get(&self.relationship.target)
    }

    /// The relation set this connector belongs to.
    pub fn relations(&self) -> &Arc<RelationSet> {
        &self.relations
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("name", &self.name())
            .field("source", &self.node.name())
            .field("relationship", &self.relationship)
            .finish()
    }
}
