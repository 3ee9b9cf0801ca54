//! Attribute values and the in-memory multigraph used to feed the schema builder.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{Result, SchemaError};
use crate::graph::HeteroGraph;
use crate::schema::DEFAULT_TYPE_ATTR;

/// Bound satisfied by anything usable as a concrete node identity.
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeKey for T {}

/// Attribute dictionary attached to nodes and edges.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Attribute value stored on a node or edge.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// UTF-8 string; type labels must use this variant.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl PropertyValue {
    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

/// A node of a [`MemoryGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node<K> {
    /// Node identity.
    pub id: K,
    /// Node attributes.
    pub properties: Properties,
}

impl<K> Node<K> {
    /// Creates a node with no attributes.
    pub fn new(id: K) -> Self {
        Self {
            id,
            properties: Properties::new(),
        }
    }

    /// Creates a node whose [`DEFAULT_TYPE_ATTR`] attribute holds `node_type`.
    pub fn typed(id: K, node_type: impl Into<String>) -> Self {
        Self::new(id).with_property(DEFAULT_TYPE_ATTR, PropertyValue::String(node_type.into()))
    }

    /// Sets an attribute, returning the updated node.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// An edge of a [`MemoryGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<K> {
    /// Source endpoint.
    pub source: K,
    /// Target endpoint.
    pub target: K,
    /// Edge attributes.
    pub properties: Properties,
}

impl<K> Edge<K> {
    /// Creates an edge with no attributes.
    pub fn new(source: K, target: K) -> Self {
        Self {
            source,
            target,
            properties: Properties::new(),
        }
    }

    /// Creates an edge whose [`DEFAULT_TYPE_ATTR`] attribute holds `relation`.
    pub fn typed(source: K, target: K, relation: impl Into<String>) -> Self {
        Self::new(source, target)
            .with_property(DEFAULT_TYPE_ATTR, PropertyValue::String(relation.into()))
    }

    /// Sets an attribute, returning the updated edge.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Small in-memory multigraph, directed or undirected.
///
/// Nodes keep insertion order; parallel edges are allowed. This is a reference
/// collaborator for [`HeteroGraph`], not a storage engine.
#[derive(Debug, Clone)]
pub struct MemoryGraph<K> {
    directed: bool,
    nodes: Vec<Node<K>>,
    positions: FxHashMap<K, usize>,
    edges: Vec<Edge<K>>,
}

impl<K: NodeKey> MemoryGraph<K> {
    /// Creates an empty directed multigraph.
    pub fn directed() -> Self {
        Self::with_directedness(true)
    }

    /// Creates an empty undirected multigraph.
    pub fn undirected() -> Self {
        Self::with_directedness(false)
    }

    fn with_directedness(directed: bool) -> Self {
        Self {
            directed,
            nodes: Vec::new(),
            positions: FxHashMap::default(),
            edges: Vec::new(),
        }
    }

    /// Adds a node. Re-adding an existing identity merges its attributes.
    pub fn add_node(&mut self, node: Node<K>) {
        match self.positions.get(&node.id) {
            Some(&pos) => self.nodes[pos].properties.extend(node.properties),
            None => {
                self.positions.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Adds a node labelled with `node_type` under [`DEFAULT_TYPE_ATTR`].
    pub fn add_typed_node(&mut self, id: K, node_type: impl Into<String>) {
        self.add_node(Node::typed(id, node_type));
    }

    /// Adds an edge between two existing nodes.
    pub fn add_edge(&mut self, edge: Edge<K>) -> Result<()> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.positions.contains_key(endpoint) {
                return Err(SchemaError::InvalidArgument(format!(
                    "edge endpoint {endpoint:?} is not a node of this graph"
                )));
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Adds an edge labelled with `relation` under [`DEFAULT_TYPE_ATTR`].
    pub fn add_typed_edge(
        &mut self,
        source: K,
        target: K,
        relation: impl Into<String>,
    ) -> Result<()> {
        self.add_edge(Edge::typed(source, target, relation))
    }

    /// Returns the node with the given identity.
    pub fn node(&self, id: &K) -> Option<&Node<K>> {
        self.positions.get(id).map(|&pos| &self.nodes[pos])
    }
}

impl<K: NodeKey> HeteroGraph for MemoryGraph<K> {
    type NodeKey = K;

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    fn nodes(&self) -> Box<dyn Iterator<Item = (&K, &Properties)> + '_> {
        Box::new(self.nodes.iter().map(|n| (&n.id, &n.properties)))
    }

    fn edges(&self) -> Box<dyn Iterator<Item = (&K, &K, &Properties)> + '_> {
        Box::new(self.edges.iter().map(|e| (&e.source, &e.target, &e.properties)))
    }

    fn node_properties(&self, id: &K) -> Option<&Properties> {
        self.node(id).map(|n| &n.properties)
    }
}
