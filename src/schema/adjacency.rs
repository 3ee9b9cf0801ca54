use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::model::NodeKey;

use super::GraphSchema;

/// One slot of a flattened breadth-first sampling plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyEntry {
    /// Node type sampled at this slot.
    pub node_type: String,
    /// Indices of child slots, ordered by edge type. Always greater than this slot's index.
    pub children: Vec<usize>,
}

impl AdjacencyEntry {
    fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            children: Vec::new(),
        }
    }
}

impl<K: NodeKey> GraphSchema<K> {
    /// Builds the breadth-first adjacency-list form of the sampling tree.
    ///
    /// The first entries are the heads, in order; later entries appear level by
    /// level. Fails if `n_hops` is negative or any head type is not in the schema.
    pub fn type_adjacency_list<S: AsRef<str>>(
        &self,
        head_node_types: &[S],
        n_hops: i64,
    ) -> Result<Vec<AdjacencyEntry>> {
        let depth = self.check_request(head_node_types, n_hops)?;

        let mut to_process = VecDeque::new();
        let mut clist: Vec<AdjacencyEntry> = Vec::with_capacity(head_node_types.len());
        for (idx, head) in head_node_types.iter().enumerate() {
            let head = head.as_ref();
            if depth > 0 {
                to_process.push_back((head, idx, 0usize));
            }
            clist.push(AdjacencyEntry::new(head));
        }

        while let Some((node_type, own, level)) = to_process.pop_front() {
            for edge_type in self.neighbours(node_type) {
                let child = clist.len();
                clist.push(AdjacencyEntry::new(edge_type.n2.as_str()));
                clist[own].children.push(child);
                if level + 1 < depth {
                    to_process.push_back((edge_type.n2.as_str(), child, level + 1));
                }
            }
        }

        trace!(
            heads = head_node_types.len(),
            entries = clist.len(),
            depth,
            "schema.type_adjacency_list.generated"
        );
        Ok(clist)
    }
}

/// Node-type paths from every root of an adjacency list to each of its leaves.
///
/// Roots are the entries no other entry lists as a child.
pub fn adjacency_paths(entries: &[AdjacencyEntry]) -> Vec<Vec<String>> {
    let referenced: FxHashSet<usize> = entries
        .iter()
        .flat_map(|e| e.children.iter().copied())
        .collect();
    let mut paths = Vec::new();
    let mut prefix: Vec<String> = Vec::new();
    // (entry index, depth below its root)
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for root in (0..entries.len()).filter(|idx| !referenced.contains(idx)) {
        stack.push((root, 0));
        while let Some((idx, depth)) = stack.pop() {
            let Some(entry) = entries.get(idx) else {
                continue;
            };
            prefix.truncate(depth);
            prefix.push(entry.node_type.clone());
            if entry.children.is_empty() {
                paths.push(prefix.clone());
            } else {
                stack.extend(entry.children.iter().rev().map(|&child| (child, depth + 1)));
            }
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::model::MemoryGraph;
    use crate::schema::{SamplingNode, SchemaBuilder};

    fn schema() -> GraphSchema<u32> {
        let mut g = MemoryGraph::undirected();
        g.add_typed_node(1, "Person");
        g.add_typed_node(2, "Movie");
        g.add_typed_node(3, "Genre");
        g.add_typed_edge(1, 2, "rates").unwrap();
        g.add_typed_edge(2, 3, "in").unwrap();
        SchemaBuilder::default().build(&g).unwrap()
    }

    fn entry(node_type: &str, children: &[usize]) -> AdjacencyEntry {
        AdjacencyEntry {
            node_type: node_type.to_owned(),
            children: children.to_vec(),
        }
    }

    #[test]
    fn breadth_first_layout() {
        let list = schema().type_adjacency_list(&["Person", "Genre"], 2).unwrap();
        assert_eq!(
            list,
            vec![
                entry("Person", &[2]),
                entry("Genre", &[3]),
                entry("Movie", &[4, 5]),
                entry("Movie", &[6, 7]),
                entry("Genre", &[]),
                entry("Person", &[]),
                entry("Genre", &[]),
                entry("Person", &[]),
            ]
        );
    }

    #[test]
    fn zero_hops_is_heads_only() {
        let list = schema().type_adjacency_list(&["Movie", "Movie"], 0).unwrap();
        assert_eq!(list, vec![entry("Movie", &[]), entry("Movie", &[])]);
    }

    #[test]
    fn child_indices_exceed_parent() {
        let list = schema().type_adjacency_list(&["Movie", "Person", "Genre"], 4).unwrap();
        for (idx, e) in list.iter().enumerate() {
            assert!(e.children.iter().all(|&c| c > idx));
        }
    }

    #[test]
    fn matches_sampling_tree_paths() {
        let gs = schema();
        let heads = ["Genre", "Person", "Genre"];
        let mut from_list = adjacency_paths(&gs.type_adjacency_list(&heads, 3).unwrap());
        let mut from_tree: Vec<_> = gs
            .sampling_tree(&heads, 3)
            .unwrap()
            .iter()
            .flat_map(SamplingNode::leaf_paths)
            .collect();
        from_list.sort();
        from_tree.sort();
        assert_eq!(from_list, from_tree);
    }

    #[test]
    fn long_chains_flatten_on_a_small_stack() {
        let mut g = MemoryGraph::directed();
        g.add_typed_node(1u8, "A");
        g.add_typed_edge(1, 1, "r").unwrap();
        let gs = SchemaBuilder::default().build(&g).unwrap();

        let worker = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(move || {
                let list = gs.type_adjacency_list(&["A"], 4_000).unwrap();
                let paths = adjacency_paths(&list);
                (list.len(), paths.len(), paths[0].len())
            })
            .unwrap();
        assert_eq!(worker.join().unwrap(), (4_001, 1, 4_001));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let gs = schema();
        assert_eq!(
            gs.type_adjacency_list(&["Person"], -3).unwrap_err(),
            SchemaError::InvalidDepth(-3)
        );
        assert_eq!(
            gs.type_adjacency_list(&["Studio"], 0).unwrap_err(),
            SchemaError::UnknownNodeType("Studio".into())
        );
    }
}
