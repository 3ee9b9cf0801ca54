#![forbid(unsafe_code)]

//! Type schema of a heterogeneous multigraph.
//!
//! A [`GraphSchema`] is an immutable snapshot: the sorted node type labels, the
//! sorted [`TypeTriple`]s, and for each node type the triples leaving it. Positions
//! in the sorted sequences are the integer type ids used by samplers.
//!
//! Lookup methods never fail. A miss returns `None` (or an empty slice) and emits
//! a `warn` event carrying the missing key.

mod adjacency;
mod builder;
mod options;
mod sampling;

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SchemaError};
use crate::model::NodeKey;

pub use adjacency::{adjacency_paths, AdjacencyEntry};
pub use builder::SchemaBuilder;
pub use options::{SchemaOptions, DEFAULT_TYPE_ATTR};
pub use sampling::{SamplingKind, SamplingNode};

/// One heterogeneous edge type: `n1 --rel--> n2`.
///
/// Ordering is by `n1`, then `rel`, then `n2`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeTriple {
    /// Source node type.
    pub n1: String,
    /// Relation label.
    pub rel: String,
    /// Destination node type.
    pub n2: String,
}

impl TypeTriple {
    /// Creates a triple.
    pub fn new(n1: impl Into<String>, rel: impl Into<String>, n2: impl Into<String>) -> Self {
        Self {
            n1: n1.into(),
            rel: rel.into(),
            n2: n2.into(),
        }
    }

    /// The same relation traversed from `n2` to `n1`.
    pub fn reversed(&self) -> Self {
        Self {
            n1: self.n2.clone(),
            rel: self.rel.clone(),
            n2: self.n1.clone(),
        }
    }
}

impl fmt::Display for TypeTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {} -> {}", self.n1, self.rel, self.n2)
    }
}

/// Which representation a type-of query should return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeRepr {
    /// Integer position in the sorted type sequence.
    Index,
    /// Label (node types) or triple (edge types).
    Label,
}

/// Result of [`GraphSchema::node_type_of`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeTypeRef<'a> {
    /// Node type id.
    Index(usize),
    /// Node type label.
    Label(&'a str),
}

/// Result of [`GraphSchema::edge_type_of`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeTypeRef<'a> {
    /// Edge type id.
    Index(usize),
    /// Edge type triple.
    Triple(&'a TypeTriple),
}

/// Queryable type schema derived from one graph at one point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(
    try_from = "SchemaRepr<K>",
    into = "SchemaRepr<K>",
    bound(
        serialize = "K: NodeKey + Serialize",
        deserialize = "K: NodeKey + Deserialize<'de>"
    )
)]
pub struct GraphSchema<K> {
    node_types: Vec<String>,
    edge_types: Vec<TypeTriple>,
    schema: BTreeMap<String, Vec<TypeTriple>>,
    node_type_map: Option<FxHashMap<K, usize>>,
    edge_type_map: Option<FxHashMap<(K, K), usize>>,
    node_index: FxHashMap<String, usize>,
    edge_index: FxHashMap<TypeTriple, usize>,
}

impl<K: NodeKey> GraphSchema<K> {
    /// Assembles a schema from sorted, duplicate-free type sequences.
    ///
    /// `schema` entries are derived by filtering `edge_types` on source type, so
    /// every bucket keeps the global canonical order.
    pub(crate) fn from_parts(
        node_types: Vec<String>,
        edge_types: Vec<TypeTriple>,
        node_type_map: Option<FxHashMap<K, usize>>,
        edge_type_map: Option<FxHashMap<(K, K), usize>>,
    ) -> Self {
        let mut schema: BTreeMap<String, Vec<TypeTriple>> = node_types
            .iter()
            .map(|nt| (nt.clone(), Vec::new()))
            .collect();
        for et in &edge_types {
            if let Some(bucket) = schema.get_mut(&et.n1) {
                bucket.push(et.clone());
            }
        }
        let node_index = node_types
            .iter()
            .enumerate()
            .map(|(idx, nt)| (nt.clone(), idx))
            .collect();
        let edge_index = edge_types
            .iter()
            .enumerate()
            .map(|(idx, et)| (et.clone(), idx))
            .collect();
        Self {
            node_types,
            edge_types,
            schema,
            node_type_map,
            edge_type_map,
            node_index,
            edge_index,
        }
    }

    /// Sorted node type labels; position is the node type id.
    pub fn node_types(&self) -> &[String] {
        &self.node_types
    }

    /// Sorted edge type triples; position is the edge type id.
    pub fn edge_types(&self) -> &[TypeTriple] {
        &self.edge_types
    }

    /// Outgoing edge types for every node type.
    pub fn schema(&self) -> &BTreeMap<String, Vec<TypeTriple>> {
        &self.schema
    }

    /// Whether the identity → type maps were built.
    pub fn has_type_maps(&self) -> bool {
        self.node_type_map.is_some() && self.edge_type_map.is_some()
    }

    /// Id of a node type label.
    pub fn node_type_index(&self, label: &str) -> Option<usize> {
        let idx = self.node_index.get(label).copied();
        if idx.is_none() {
            warn!(kind = "unknown_node_type", label, "schema.node_type_index.miss");
        }
        idx
    }

    /// Label of a node type id.
    pub fn node_type_label(&self, id: usize) -> Option<&str> {
        let label = self.node_types.get(id).map(String::as_str);
        if label.is_none() {
            warn!(
                kind = "unknown_node_type",
                id,
                count = self.node_types.len(),
                "schema.node_type_label.out_of_range"
            );
        }
        label
    }

    /// Id of an edge type triple.
    pub fn edge_type_index(&self, triple: &TypeTriple) -> Option<usize> {
        let idx = self.edge_index.get(triple).copied();
        if idx.is_none() {
            warn!(kind = "unknown_edge_type", triple = %triple, "schema.edge_type_index.miss");
        }
        idx
    }

    /// Triple of an edge type id.
    pub fn edge_type_label(&self, id: usize) -> Option<&TypeTriple> {
        let triple = self.edge_types.get(id);
        if triple.is_none() {
            warn!(
                kind = "unknown_edge_type",
                id,
                count = self.edge_types.len(),
                "schema.edge_type_label.out_of_range"
            );
        }
        triple
    }

    /// Type of a concrete node, in the requested representation.
    ///
    /// Returns `None` when the node is unknown or the schema was built without type maps.
    pub fn node_type_of(&self, node: &K, repr: TypeRepr) -> Option<NodeTypeRef<'_>> {
        let Some(map) = &self.node_type_map else {
            warn!(kind = "no_type_maps", node = ?node, "schema.node_type_of.no_type_maps");
            return None;
        };
        let Some(&idx) = map.get(node) else {
            warn!(kind = "unknown_node_type", node = ?node, "schema.node_type_of.miss");
            return None;
        };
        match repr {
            TypeRepr::Index => Some(NodeTypeRef::Index(idx)),
            TypeRepr::Label => self.node_types.get(idx).map(|l| NodeTypeRef::Label(l.as_str())),
        }
    }

    /// Node type id of a concrete node.
    pub fn node_type_index_of(&self, node: &K) -> Option<usize> {
        match self.node_type_of(node, TypeRepr::Index)? {
            NodeTypeRef::Index(idx) => Some(idx),
            NodeTypeRef::Label(_) => None,
        }
    }

    /// Node type label of a concrete node.
    pub fn node_type_label_of(&self, node: &K) -> Option<&str> {
        match self.node_type_of(node, TypeRepr::Label)? {
            NodeTypeRef::Label(label) => Some(label),
            NodeTypeRef::Index(_) => None,
        }
    }

    /// Type of a concrete edge `(a, b)`, in the requested representation.
    ///
    /// The pair is tried as given, then reversed, so undirected edges resolve in
    /// either orientation.
    pub fn edge_type_of(&self, edge: (&K, &K), repr: TypeRepr) -> Option<EdgeTypeRef<'_>> {
        let (a, b) = edge;
        let Some(map) = &self.edge_type_map else {
            warn!(kind = "no_type_maps", from = ?a, to = ?b, "schema.edge_type_of.no_type_maps");
            return None;
        };
        let found = map
            .get(&(a.clone(), b.clone()))
            .or_else(|| map.get(&(b.clone(), a.clone())));
        let Some(&idx) = found else {
            warn!(
                kind = "unknown_edge_type",
                from = ?a,
                to = ?b,
                "schema.edge_type_of.miss"
            );
            return None;
        };
        match repr {
            TypeRepr::Index => Some(EdgeTypeRef::Index(idx)),
            TypeRepr::Label => self.edge_types.get(idx).map(EdgeTypeRef::Triple),
        }
    }

    /// Edge type id of a concrete edge.
    pub fn edge_type_index_of(&self, edge: (&K, &K)) -> Option<usize> {
        match self.edge_type_of(edge, TypeRepr::Index)? {
            EdgeTypeRef::Index(idx) => Some(idx),
            EdgeTypeRef::Triple(_) => None,
        }
    }

    /// Edge type triple of a concrete edge.
    pub fn edge_type_triple_of(&self, edge: (&K, &K)) -> Option<&TypeTriple> {
        match self.edge_type_of(edge, TypeRepr::Label)? {
            EdgeTypeRef::Triple(triple) => Some(triple),
            EdgeTypeRef::Index(_) => None,
        }
    }

    /// Edge types leaving `node_type`, in canonical order. Empty when the type is unknown.
    pub fn outgoing_edge_types(&self, node_type: &str) -> &[TypeTriple] {
        match self.schema.get(node_type) {
            Some(ets) => ets,
            None => {
                warn!(kind = "unknown_node_type", node_type, "schema.outgoing_edge_types.miss");
                &[]
            }
        }
    }

    /// Outgoing edge types of a type already known to be present.
    fn neighbours(&self, node_type: &str) -> &[TypeTriple] {
        self.schema.get(node_type).map_or(&[], Vec::as_slice)
    }

    /// Validates generator input and returns the depth as `usize`.
    fn check_request<S: AsRef<str>>(&self, head_node_types: &[S], n_hops: i64) -> Result<usize> {
        let depth = usize::try_from(n_hops).map_err(|_| SchemaError::InvalidDepth(n_hops))?;
        for head in head_node_types {
            let head = head.as_ref();
            if !self.node_index.contains_key(head) {
                return Err(SchemaError::UnknownNodeType(head.to_owned()));
            }
        }
        Ok(depth)
    }
}

/// Serialized form of a [`GraphSchema`]; lookup indices and buckets are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct SchemaRepr<K> {
    node_types: Vec<String>,
    edge_types: Vec<TypeTriple>,
    node_type_map: Option<Vec<(K, usize)>>,
    edge_type_map: Option<Vec<((K, K), usize)>>,
}

impl<K: NodeKey> From<GraphSchema<K>> for SchemaRepr<K> {
    fn from(gs: GraphSchema<K>) -> Self {
        Self {
            node_types: gs.node_types,
            edge_types: gs.edge_types,
            node_type_map: gs.node_type_map.map(|m| m.into_iter().collect()),
            edge_type_map: gs.edge_type_map.map(|m| m.into_iter().collect()),
        }
    }
}

impl<K: NodeKey> TryFrom<SchemaRepr<K>> for GraphSchema<K> {
    type Error = SchemaError;

    fn try_from(repr: SchemaRepr<K>) -> Result<Self> {
        if !repr.node_types.windows(2).all(|w| w[0] < w[1]) {
            return Err(SchemaError::InvalidArgument(
                "node types must be sorted and unique".into(),
            ));
        }
        if !repr.edge_types.windows(2).all(|w| w[0] < w[1]) {
            return Err(SchemaError::InvalidArgument(
                "edge types must be sorted and unique".into(),
            ));
        }
        for et in &repr.edge_types {
            for endpoint in [&et.n1, &et.n2] {
                if repr.node_types.binary_search(endpoint).is_err() {
                    return Err(SchemaError::UnknownNodeType(endpoint.clone()));
                }
            }
        }
        let node_type_map = repr
            .node_type_map
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|(node, idx)| {
                        if idx < repr.node_types.len() {
                            Ok((node, idx))
                        } else {
                            Err(SchemaError::UnknownNodeType(idx.to_string()))
                        }
                    })
                    .collect::<Result<FxHashMap<_, _>>>()
            })
            .transpose()?;
        let edge_type_map = repr
            .edge_type_map
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|(edge, idx)| {
                        if idx < repr.edge_types.len() {
                            Ok((edge, idx))
                        } else {
                            Err(SchemaError::UnknownEdgeType(idx.to_string()))
                        }
                    })
                    .collect::<Result<FxHashMap<_, _>>>()
            })
            .transpose()?;
        Ok(GraphSchema::from_parts(
            repr.node_types,
            repr.edge_types,
            node_type_map,
            edge_type_map,
        ))
    }
}
