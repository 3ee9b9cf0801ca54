//! Collaborator abstraction over a heterogeneous multigraph.
//!
//! The schema core never stores graph data itself. It reads nodes and edges
//! through [`HeteroGraph`], and [`TypedGraph`] pairs such a graph with the
//! [`SchemaOptions`] that say where type labels live.

use crate::error::Result;
use crate::model::{NodeKey, Properties};
use crate::schema::{GraphSchema, SchemaBuilder, SchemaOptions};

/// Read access to a heterogeneous multigraph.
pub trait HeteroGraph {
    /// Concrete node identity.
    type NodeKey: NodeKey;

    /// Whether edges are directed. Undirected edges are traversable from both endpoints.
    fn is_directed(&self) -> bool;

    /// Number of nodes; used as a preallocation hint.
    fn number_of_nodes(&self) -> usize;

    /// Number of edges; used as a preallocation hint.
    fn number_of_edges(&self) -> usize;

    /// Iterates over all nodes with their attributes.
    fn nodes(&self) -> Box<dyn Iterator<Item = (&Self::NodeKey, &Properties)> + '_>;

    /// Iterates over all edges as `(source, target, attributes)`.
    fn edges(&self) -> Box<dyn Iterator<Item = (&Self::NodeKey, &Self::NodeKey, &Properties)> + '_>;

    /// Attributes of a single node.
    fn node_properties(&self, id: &Self::NodeKey) -> Option<&Properties>;
}

/// A heterogeneous graph viewed together with its type-label configuration.
#[derive(Debug, Clone)]
pub struct TypedGraph<'g, G> {
    graph: &'g G,
    options: SchemaOptions,
}

impl<'g, G: HeteroGraph> TypedGraph<'g, G> {
    /// Wraps `graph` using the default options.
    pub fn new(graph: &'g G) -> Self {
        Self::with_options(graph, SchemaOptions::default())
    }

    /// Wraps `graph` using explicit options.
    pub fn with_options(graph: &'g G, options: SchemaOptions) -> Self {
        Self { graph, options }
    }

    /// The wrapped graph.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// The active options.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Whether the wrapped graph is directed.
    pub fn is_directed(&self) -> bool {
        self.graph.is_directed()
    }

    /// Number of nodes in the wrapped graph.
    pub fn number_of_nodes(&self) -> usize {
        self.graph.number_of_nodes()
    }

    /// Number of edges in the wrapped graph.
    pub fn number_of_edges(&self) -> usize {
        self.graph.number_of_edges()
    }

    /// Type label of a single node, read from the configured attribute.
    pub fn node_type(&self, id: &G::NodeKey) -> Result<&'g str> {
        let props = self.graph.node_properties(id);
        SchemaBuilder::read_label(id, props, &self.options.node_type_attr)
    }

    /// Derives a fresh schema snapshot of the wrapped graph.
    pub fn create_graph_schema(&self) -> Result<GraphSchema<G::NodeKey>> {
        SchemaBuilder::new(self.options.clone()).build(self.graph)
    }
}
