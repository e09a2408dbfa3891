//! Resource Dependency Graph
//!
//! The planning phase declares resources into a [`ResourceGraph`]. Every
//! deferred attribute reference becomes an edge from the referenced resource
//! to the resource that needs it, which gives:
//!
//! - Apply ordering (dependencies before dependents)
//! - Impact analysis (what is affected if one resource fails)
//! - Cycle detection for explicit `depends_on` edges

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::resource::{PropertyValue, Resource, ResourceKind};
use crate::error::{Error, Result};

/// Why one resource depends on another
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyType {
    /// A property of the dependent refers to an attribute of the dependency
    Attribute {
        /// Property on the dependent resource
        property: String,
        /// Attribute read from the dependency
        attribute: String,
    },
    /// Declared ordering without data flow
    Explicit,
}

/// Graph of declared resources
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    graph: DiGraph<Resource, DependencyType>,
    node_indices: HashMap<String, NodeIndex>,
}

impl ResourceGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource.
    ///
    /// Every resource it references must already be declared.
    pub fn add_resource(&mut self, resource: Resource) -> Result<NodeIndex> {
        if self.node_indices.contains_key(&resource.name) {
            return Err(Error::DuplicateResource(resource.name));
        }

        let mut edges = Vec::new();
        for (property, value) in &resource.properties {
            if let PropertyValue::Ref(reference) = value {
                let from = self.node_indices.get(&reference.resource).ok_or_else(|| {
                    Error::UnknownResource {
                        resource: reference.resource.clone(),
                        referenced_by: resource.name.clone(),
                    }
                })?;
                edges.push((
                    *from,
                    DependencyType::Attribute {
                        property: property.clone(),
                        attribute: reference.attribute.clone(),
                    },
                ));
            }
        }

        let name = resource.name.clone();
        let idx = self.graph.add_node(resource);
        self.node_indices.insert(name, idx);

        for (from, dependency) in edges {
            self.graph.add_edge(from, idx, dependency);
        }

        Ok(idx)
    }

    /// Declare that `dependent` must be applied after `dependency`.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> Result<()> {
        let to = self.index_of(dependent, dependency)?;
        let from = self.index_of(dependency, dependent)?;
        self.graph.add_edge(from, to, DependencyType::Explicit);
        Ok(())
    }

    fn index_of(&self, name: &str, referenced_by: &str) -> Result<NodeIndex> {
        self.node_indices
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownResource {
                resource: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
    }

    /// Number of declared resources
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether no resource has been declared
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up a resource by name
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.node_indices
            .get(name)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    /// All resources in declaration order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.graph.node_weights()
    }

    /// Resources of one kind in declaration order
    pub fn resources_of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources().filter(move |r| r.kind == kind)
    }

    /// Check for dependency cycles
    pub fn has_cycles(&self) -> bool {
        tarjan_scc(&self.graph).iter().any(|scc| scc.len() > 1)
    }

    /// Resources in apply order (dependencies first)
    pub fn execution_order(&self) -> Result<Vec<&Resource>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            let name = self
                .graph
                .node_weight(cycle.node_id())
                .map(|r| r.name.clone())
                .unwrap_or_default();
            Error::DependencyCycle(format!("resource '{}' is part of a cycle", name))
        })?;

        Ok(order
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect())
    }

    /// Direct dependencies of a resource, in declaration order
    pub fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Incoming)
    }

    /// Resources that directly depend on a resource, in declaration order
    pub fn direct_dependents_of(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<String> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };

        let mut indices: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        indices.sort();
        indices.dedup();
        indices
            .into_iter()
            .filter_map(|i| self.graph.node_weight(i).map(|r| r.name.clone()))
            .collect()
    }

    /// All resources that depend on a resource (direct and transitive)
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_indices.get(name) {
            queue.push_back(start);

            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors_directed(current, Direction::Outgoing) {
                    if neighbor != start && seen.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        let mut indices: Vec<_> = seen.into_iter().collect();
        indices.sort();
        indices
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).map(|r| r.name.clone()))
            .collect()
    }
}

/// Serialized form of one resource, with its dependencies spelled out
#[derive(serde::Serialize)]
struct ResourceEntry<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    depends_on: Vec<String>,
    properties: &'a IndexMap<String, PropertyValue>,
}

impl Serialize for ResourceGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for resource in self.resources() {
            seq.serialize_element(&ResourceEntry {
                name: &resource.name,
                kind: resource.kind.type_name(),
                depends_on: self.dependencies_of(&resource.name),
                properties: &resource.properties,
            })?;
        }
        seq.end()
    }
}
