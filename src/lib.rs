//! Type schemas and bounded-depth sampling plans for heterogeneous multigraphs.
//!
//! [`SchemaBuilder`] scans a graph exposed through [`HeteroGraph`] and produces an
//! immutable [`GraphSchema`]. The schema answers type lookups and generates
//! type-level sampling plans, either as a nested tree
//! ([`GraphSchema::sampling_tree`]) or as a flat breadth-first adjacency list
//! ([`GraphSchema::type_adjacency_list`]).

#![warn(missing_docs)]

pub mod error;
pub mod graph;
pub mod model;
pub mod schema;

pub use error::{MalformedReason, Result, SchemaError};
pub use graph::{HeteroGraph, TypedGraph};
pub use model::{Edge, MemoryGraph, Node, NodeKey, Properties, PropertyValue};
pub use schema::{
    adjacency_paths, AdjacencyEntry, EdgeTypeRef, GraphSchema, NodeTypeRef, SamplingKind,
    SamplingNode, SchemaBuilder, SchemaOptions, TypeRepr, TypeTriple, DEFAULT_TYPE_ATTR,
};
