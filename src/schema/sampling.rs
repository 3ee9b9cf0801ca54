use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::model::NodeKey;

use super::{GraphSchema, TypeTriple};

/// What a sampling tree node stands for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingKind {
    /// A head node of the given node type.
    Root(String),
    /// A neighbour reached through the given edge type.
    Hop(TypeTriple),
}

/// Node of a nested sampling tree.
///
/// Ids depend only on the head index and the child positions along the path:
/// head `j` is `"j#"`, and child `i` of a node with id `p` is `p + "i_"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingNode {
    /// Unique, position-derived id.
    pub id: String,
    /// Head node type or traversed edge type.
    pub kind: SamplingKind,
    /// Sub-trees, one per outgoing edge type, in schema order.
    pub children: Vec<SamplingNode>,
}

impl SamplingNode {
    /// Node type sampled at this position.
    pub fn node_type(&self) -> &str {
        match &self.kind {
            SamplingKind::Root(node_type) => node_type,
            SamplingKind::Hop(edge_type) => &edge_type.n2,
        }
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Node-type paths from this node to each leaf below it.
    pub fn leaf_paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        let mut prefix: Vec<String> = Vec::new();
        let mut stack: Vec<(&SamplingNode, usize)> = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            prefix.truncate(depth);
            prefix.push(node.node_type().to_owned());
            if node.is_leaf() {
                paths.push(prefix.clone());
            } else {
                stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
            }
        }
        paths
    }
}

impl Drop for SamplingNode {
    // Deep plans would otherwise be dropped one stack frame per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A node under construction together with the edge types still to expand.
struct Frame<'a> {
    node: SamplingNode,
    edge_types: &'a [TypeTriple],
    next: usize,
    remaining: usize,
}

impl<K: NodeKey> GraphSchema<K> {
    /// Builds one sampling tree per head node type, descending `n_hops` levels.
    ///
    /// Duplicated head types each get their own root. Fails if `n_hops` is
    /// negative or any head type is not in the schema.
    pub fn sampling_tree<S: AsRef<str>>(
        &self,
        head_node_types: &[S],
        n_hops: i64,
    ) -> Result<Vec<SamplingNode>> {
        let depth = self.check_request(head_node_types, n_hops)?;
        let roots: Vec<SamplingNode> = head_node_types
            .iter()
            .enumerate()
            .map(|(jj, head)| {
                let node_type = head.as_ref();
                let root = SamplingNode {
                    id: format!("{jj}#"),
                    kind: SamplingKind::Root(node_type.to_owned()),
                    children: Vec::new(),
                };
                self.expand(root, depth)
            })
            .collect();
        trace!(heads = roots.len(), depth, "schema.sampling_tree.generated");
        Ok(roots)
    }

    /// Grows `root` depth-first to `depth` levels using an explicit stack.
    fn expand(&self, root: SamplingNode, depth: usize) -> SamplingNode {
        let edge_types = self.neighbours(root.node_type());
        let mut stack = vec![Frame {
            node: root,
            edge_types,
            next: 0,
            remaining: depth,
        }];
        loop {
            // The stack is never empty here: the root frame returns when it completes.
            let last = stack.len() - 1;
            let top = &mut stack[last];
            if top.remaining > 0 && top.next < top.edge_types.len() {
                let ii = top.next;
                top.next += 1;
                let edge_types = top.edge_types;
                let edge_type = &edge_types[ii];
                let child = SamplingNode {
                    id: format!("{}{ii}_", top.node.id),
                    kind: SamplingKind::Hop(edge_type.clone()),
                    children: Vec::new(),
                };
                let remaining = top.remaining - 1;
                stack.push(Frame {
                    node: child,
                    edge_types: self.neighbours(&edge_type.n2),
                    next: 0,
                    remaining,
                });
                continue;
            }
            let done = stack.remove(last);
            match stack.last_mut() {
                Some(parent) => parent.node.children.push(done.node),
                None => return done.node,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::SchemaError;
    use crate::model::MemoryGraph;
    use crate::schema::{SchemaBuilder, SchemaOptions};

    fn schema() -> GraphSchema<u32> {
        let mut g = MemoryGraph::undirected();
        g.add_typed_node(1, "Person");
        g.add_typed_node(2, "Movie");
        g.add_typed_node(3, "Genre");
        g.add_typed_edge(1, 2, "rates").unwrap();
        g.add_typed_edge(2, 3, "in").unwrap();
        SchemaBuilder::new(SchemaOptions::structural()).build(&g).unwrap()
    }

    fn ids(nodes: &[SamplingNode], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.id.clone());
            ids(&node.children, out);
        }
    }

    #[test]
    fn person_rates_movie_two_hops() {
        let mut g = MemoryGraph::undirected();
        g.add_typed_node(1u8, "Person");
        g.add_typed_node(2u8, "Movie");
        g.add_typed_edge(1, 2, "rates").unwrap();
        let gs = SchemaBuilder::default().build(&g).unwrap();

        let tree = gs.sampling_tree(&["Person"], 2).unwrap();
        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.id, "0#");
        assert_eq!(root.kind, SamplingKind::Root("Person".into()));
        assert_eq!(root.children.len(), 1);

        let movie = &root.children[0];
        assert_eq!(movie.id, "0#0_");
        assert_eq!(movie.kind, SamplingKind::Hop(TypeTriple::new("Person", "rates", "Movie")));
        assert_eq!(movie.children.len(), 1);

        let person = &movie.children[0];
        assert_eq!(person.id, "0#0_0_");
        assert_eq!(person.node_type(), "Person");
        assert!(person.is_leaf());
    }

    #[test]
    fn zero_hops_yields_bare_roots() {
        let tree = schema().sampling_tree(&["Movie", "Person"], 0).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(SamplingNode::is_leaf));
        assert_eq!(tree[1].id, "1#");
    }

    #[test]
    fn duplicate_heads_get_distinct_roots_and_unique_ids() {
        let tree = schema().sampling_tree(&["Movie", "Movie"], 3).unwrap();
        let mut all = Vec::new();
        ids(&tree, &mut all);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].leaf_paths().len(), tree[1].leaf_paths().len());
    }

    #[test]
    fn generation_is_deterministic() {
        let gs = schema();
        let a = gs.sampling_tree(&["Genre", "Person"], 3).unwrap();
        let b = gs.sampling_tree(&["Genre", "Person"], 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn leaf_paths_have_full_depth() {
        let tree = schema().sampling_tree(&["Genre"], 3).unwrap();
        let paths = tree[0].leaf_paths();
        assert!(paths.iter().all(|p| p.len() == 4));
        assert!(paths.contains(&vec![
            "Genre".to_owned(),
            "Movie".to_owned(),
            "Person".to_owned(),
            "Movie".to_owned(),
        ]));
    }

    #[test]
    fn leaf_types_stop_early() {
        let mut g = MemoryGraph::directed();
        g.add_typed_node(1u8, "A");
        g.add_typed_node(2u8, "B");
        g.add_typed_edge(1, 2, "r").unwrap();
        let gs = SchemaBuilder::default().build(&g).unwrap();
        let tree = gs.sampling_tree(&["A"], 5).unwrap();
        assert_eq!(tree[0].leaf_paths(), vec![vec!["A".to_owned(), "B".to_owned()]]);
    }

    #[test]
    fn deep_self_loop_builds_and_drops_on_a_small_stack() {
        let mut g = MemoryGraph::directed();
        g.add_typed_node(1u8, "A");
        g.add_typed_edge(1, 1, "r").unwrap();
        let gs = SchemaBuilder::default().build(&g).unwrap();

        let worker = std::thread::Builder::new()
            .stack_size(128 * 1024)
            .spawn(move || {
                let tree = gs.sampling_tree(&["A"], 4_000).unwrap();
                let mut node = &tree[0];
                let mut levels = 0;
                while let Some(child) = node.children.first() {
                    assert_eq!(node.children.len(), 1);
                    node = child;
                    levels += 1;
                }
                let tail_id_len = node.id.len();
                let paths = tree[0].leaf_paths();
                (levels, tail_id_len, paths.len(), paths[0].len())
            })
            .unwrap();
        // "0#" followed by one "0_" per level.
        assert_eq!(worker.join().unwrap(), (4_000, 2 + 2 * 4_000, 1, 4_001));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let gs = schema();
        assert_eq!(
            gs.sampling_tree(&["Movie"], -1).unwrap_err(),
            SchemaError::InvalidDepth(-1)
        );
        assert_eq!(
            gs.sampling_tree(&["Movie", "Studio"], 1).unwrap_err(),
            SchemaError::UnknownNodeType("Studio".into())
        );
    }
}
