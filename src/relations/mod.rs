//! Relation connector graph
//!
//! Built as a post-pass once every relation is registered. Each declared
//! relationship becomes one [`Connector`] whose name is derived from the
//! source relation, the target relation and the relationship name (see
//! [`NodeName`]). Names are unique across the graph: two relationships that
//! derive the same name fail the pass with
//! [`RegistryError::DuplicateConnector`].
//!
//! The same naming rules are available without built instances through
//! [`plan_connectors`], which is what `ormkit plan` reports.
//!
//! # Example
//!
//! ```rust
//! use ormkit_registry::core::instance;
//! use ormkit_registry::declaration::{Relationship, RelationshipKind};
//! use ormkit_registry::relations::RelationGraph;
//!
//! let graph = RelationGraph::build(vec![
//!     (
//!         "users".to_string(),
//!         instance("users relation"),
//!         vec![Relationship::new("tasks", "tasks", RelationshipKind::OneToMany)],
//!     ),
//!     ("tasks".to_string(), instance("tasks relation"), Vec::new()),
//! ])?;
//!
//! let connector = graph.connector("users_X_tasks__tasks").unwrap();
//! assert_eq!(connector.target().unwrap().name(), "tasks");
//! # Ok::<(), ormkit_registry::core::RegistryError>(())
//! ```

pub mod connector;
pub mod node_name;

pub use connector::{Connector, RelationNode, RelationSet};
pub use node_name::NodeName;

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::core::{ComponentKey, ComponentKind, Instance, RegistryError};
use crate::declaration::Relationship;

/// Derive connector names for a set of relations without building anything.
///
/// `relations` lists every relation identifier with its relationships, in
/// declaration order. The result follows the same order. Fails when two
/// relationships derive the same name (`AmbiguousConnector` when they
/// differ in source, target or name) or when a relationship targets a
/// relation that is not part of `relations`.
pub fn plan_connectors<'a, I>(relations: I) -> Result<Vec<NodeName>, RegistryError>
where
    I: IntoIterator<Item = (&'a str, &'a [Relationship])>,
{
    let relations: Vec<(&str, &[Relationship])> = relations.into_iter().collect();
    let known: HashSet<&str> = relations.iter().map(|(id, _)| *id).collect();

    let mut seen: HashMap<String, NodeName> = HashMap::new();
    let mut planned = Vec::new();

    for (left, relationships) in relations {
        for relationship in relationships {
            if !known.contains(relationship.target.as_str()) {
                return Err(RegistryError::MissingDependency {
                    component: ComponentKey::new(ComponentKind::Relation, left).path(),
                    kind: ComponentKind::Relation.to_string(),
                    id: relationship.target.clone(),
                });
            }

            let name = NodeName::new(left, &relationship.target, &relationship.name);
            let rendered = name.connector_name();
            if let Some(existing) = seen.get(&rendered) {
                if *existing != name {
                    return Err(RegistryError::AmbiguousConnector {
                        name: rendered,
                        existing: format!("{} → {}", existing.describe(), existing.right()),
                        duplicate: format!("{} → {}", name.describe(), name.right()),
                    });
                }
                return Err(RegistryError::DuplicateConnector {
                    name: rendered,
                    existing: existing.describe(),
                    duplicate: name.describe(),
                });
            }

            seen.insert(rendered, name.clone());
            planned.push(name);
        }
    }

    Ok(planned)
}

/// Connectors between registered relations.
#[derive(Debug, Default)]
pub struct RelationGraph {
    relations: Arc<RelationSet>,
    connectors: BTreeMap<String, Connector>,
    /// Connector names per source relation, in declaration order
    outgoing: BTreeMap<String, Vec<String>>,
}

impl RelationGraph {
    /// Build the graph from built relations and their relationships.
    ///
    /// Every relation must be listed, including those without
    /// relationships, so that targets can be checked.
    pub fn build<I>(relations: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (String, Instance, Vec<Relationship>)>,
    {
        let relations: Vec<(String, Instance, Vec<Relationship>)> = relations.into_iter().collect();

        let names = plan_connectors(
            relations.iter().map(|(id, _, relationships)| (id.as_str(), relationships.as_slice())),
        )?;

        let mut set = RelationSet::default();
        for (id, relation, _) in &relations {
            set.insert(RelationNode::new(id.clone(), Arc::clone(relation)));
        }
        let set = Arc::new(set);

        let mut graph = Self {
            relations: Arc::clone(&set),
            connectors: BTreeMap::new(),
            outgoing: BTreeMap::new(),
        };

        let relationships = relations
            .iter()
            .flat_map(|(id, _, relationships)| relationships.iter().map(move |r| (id, r)));

        for (name, (id, relationship)) in names.into_iter().zip(relationships) {
            let Some(node) = set.get(id) else {
                continue;
            };
            let rendered = name.connector_name();
            let connector =
                Connector::new(name, Arc::clone(node), relationship.clone(), Arc::clone(&set));

            graph.outgoing.entry(id.clone()).or_default().push(rendered.clone());
            graph.connectors.insert(rendered, connector);
        }

        Ok(graph)
    }

    /// Connector registered under `name`.
    pub fn connector(&self, name: &str) -> Option<&Connector> {
        self.connectors.get(name)
    }

    /// Connectors leaving `relation`, in declaration order.
    pub fn connectors_from(&self, relation: &str) -> Vec<&Connector> {
        self.outgoing
            .get(relation)
            .map(|names| names.iter().filter_map(|name| self.connectors.get(name)).collect())
            .unwrap_or_default()
    }

    /// Every connector, sorted by name.
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    /// Node of the relation `name`.
    pub fn node(&self, name: &str) -> Option<&Arc<RelationNode>> {
        self.relations.get(name)
    }

    /// Every relation node, sorted by name.
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<RelationNode>> {
        self.relations.iter()
    }

    /// Shortest chain of connectors leading from `from` to `to`.
    ///
    /// Returns an empty chain when both are the same known relation and
    /// `None` when `to` cannot be reached.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<&Connector>> {
        if !self.relations.contains(from) || !self.relations.contains(to) {
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let mut visited: HashSet<&str> = HashSet::from([from]);
        let mut previous: HashMap<&str, &Connector> = HashMap::new();
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            for connector in self.connectors_from(current) {
                let target = connector.relationship().target.as_str();
                if !visited.insert(target) {
                    continue;
                }
                previous.insert(target, connector);

                if target == to {
                    let mut path = Vec::new();
                    let mut cursor = to;
                    while let Some(step) = previous.get(cursor) {
                        path.push(*step);
                        cursor = step.source().name();
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(target);
            }
        }

        None
    }

    /// Number of connectors.
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    /// Whether no connector was derived.
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}
