use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{MalformedReason, Result, SchemaError};
use crate::graph::HeteroGraph;
use crate::model::{NodeKey, Properties};

use super::{GraphSchema, SchemaOptions, TypeTriple};

/// Derives a [`GraphSchema`] from a heterogeneous multigraph in one pass over
/// nodes and one pass over edges.
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    options: SchemaOptions,
}

impl SchemaBuilder {
    /// Creates a builder with the given options.
    pub fn new(options: SchemaOptions) -> Self {
        Self { options }
    }

    /// The builder's options.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Builds the schema. Fails without a partial result if any node or edge
    /// cannot be typed.
    pub fn build<G: HeteroGraph>(&self, graph: &G) -> Result<GraphSchema<G::NodeKey>> {
        let node_attr = self.options.node_type_attr.as_str();
        let edge_attr = self.options.edge_type_attr.as_str();
        let directed = graph.is_directed();

        let mut labels: FxHashMap<&G::NodeKey, &str> = FxHashMap::default();
        labels.reserve(graph.number_of_nodes());
        for (node, props) in graph.nodes() {
            let label = Self::read_label(node, Some(props), node_attr)?;
            labels.insert(node, label);
        }
        let node_types: Vec<String> = labels
            .values()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut registered: BTreeSet<TypeTriple> = BTreeSet::new();
        let mut typed_edges = Vec::new();
        if self.options.create_type_maps {
            typed_edges.reserve(graph.number_of_edges());
        }
        for (source, target, props) in graph.edges() {
            let edge = (source, target);
            let rel = Self::read_label(&edge, Some(props), edge_attr)?;
            let n1 = Self::endpoint_label(&labels, &edge, source, node_attr)?;
            let n2 = Self::endpoint_label(&labels, &edge, target, node_attr)?;

            let forward = TypeTriple::new(n1, rel, n2);
            if !directed {
                registered.insert(forward.reversed());
            }
            if self.options.create_type_maps {
                typed_edges.push((source, target, forward.clone()));
            }
            registered.insert(forward);
        }
        let edge_types: Vec<TypeTriple> = registered.into_iter().collect();

        let (node_type_map, edge_type_map) = if self.options.create_type_maps {
            let node_ids: FxHashMap<&str, usize> = node_types
                .iter()
                .enumerate()
                .map(|(idx, nt)| (nt.as_str(), idx))
                .collect();
            let edge_ids: FxHashMap<&TypeTriple, usize> = edge_types
                .iter()
                .enumerate()
                .map(|(idx, et)| (et, idx))
                .collect();

            let node_type_map: FxHashMap<G::NodeKey, usize> = labels
                .iter()
                .filter_map(|(node, label)| node_ids.get(label).map(|&idx| ((*node).clone(), idx)))
                .collect();
            // Undirected pairs keep whichever orientation was seen first, so both
            // query orientations resolve to the last edge between the two nodes.
            let mut edge_type_map: FxHashMap<(G::NodeKey, G::NodeKey), usize> =
                FxHashMap::default();
            for (source, target, triple) in &typed_edges {
                let Some(&idx) = edge_ids.get(triple) else {
                    continue;
                };
                let forward = ((*source).clone(), (*target).clone());
                let backward = ((*target).clone(), (*source).clone());
                let key = if !directed
                    && !edge_type_map.contains_key(&forward)
                    && edge_type_map.contains_key(&backward)
                {
                    backward
                } else {
                    forward
                };
                edge_type_map.insert(key, idx);
            }
            (Some(node_type_map), Some(edge_type_map))
        } else {
            (None, None)
        };

        debug!(
            directed,
            nodes = labels.len(),
            node_types = node_types.len(),
            edge_types = edge_types.len(),
            type_maps = self.options.create_type_maps,
            "schema.build.complete"
        );
        Ok(GraphSchema::from_parts(
            node_types,
            edge_types,
            node_type_map,
            edge_type_map,
        ))
    }

    /// Reads the type label stored under `attr`.
    pub(crate) fn read_label<'p>(
        element: impl fmt::Debug,
        props: Option<&'p Properties>,
        attr: &str,
    ) -> Result<&'p str> {
        let props =
            props.ok_or_else(|| SchemaError::malformed(&element, attr, MalformedReason::UnknownNode))?;
        let value = props
            .get(attr)
            .ok_or_else(|| SchemaError::malformed(&element, attr, MalformedReason::MissingAttribute))?;
        value
            .as_str()
            .ok_or_else(|| SchemaError::malformed(&element, attr, MalformedReason::NotAString))
    }

    fn endpoint_label<'a, K: NodeKey>(
        labels: &FxHashMap<&K, &'a str>,
        edge: &(&K, &K),
        endpoint: &K,
        attr: &str,
    ) -> Result<&'a str> {
        labels
            .get(endpoint)
            .copied()
            .ok_or_else(|| SchemaError::malformed(edge, attr, MalformedReason::UnknownNode))
    }
}
