//! Resolution Plan
//!
//! Orders the effective graph below a root node so that every node comes
//! after the nodes it depends on. Nodes are grouped into levels; nodes of
//! one level do not depend on each other and may resolve concurrently.
//!
//! The walk follows the provider, so overrides are honoured. Each node is
//! bound against what its parent hands down, exactly as the resolvers do,
//! and dependency edges whose parameter is already bound are skipped. A
//! node keeps the arguments of the path that discovered it first. Ties
//! within a level keep discovery order, which follows declaration order.

use super::bind;
use crate::call_node::CallNode;
use crate::provider::Provider;
use solvent_domain::{Arguments, Error, ProducerKey, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A node below the root with the arguments its parent hands it
#[derive(Debug, Clone)]
pub struct PlannedNode {
    /// Effective node, after overrides
    pub node: Arc<CallNode>,
    /// Keywords handed down by the discovering parent
    pub arguments: Arc<Arguments>,
}

/// Leaves-first levels of the graph below a root
#[derive(Debug, Default)]
pub struct ResolutionPlan {
    levels: Vec<Vec<PlannedNode>>,
}

impl ResolutionPlan {
    /// Plan the resolution of everything below `root`
    ///
    /// Fails with [`Error::DependencyCycle`] when overrides made the
    /// effective graph cyclic.
    pub fn compute(root: &CallNode, provider: &Provider, arguments: &Arguments) -> Result<Self> {
        let mut nodes: Vec<PlannedNode> = Vec::new();
        let mut index: HashMap<ProducerKey, usize> = HashMap::new();
        let mut children: Vec<Vec<usize>> = Vec::new();

        let (root_edges, handed) = edges(root, arguments);
        let mut pending: Vec<(Option<usize>, ProducerKey, Arc<Arguments>)> = root_edges
            .into_iter()
            .rev()
            .map(|key| (None, key, Arc::clone(&handed)))
            .collect();

        // Depth-first discovery; each node's edges are expanded once.
        while let Some((parent, key, incoming)) = pending.pop() {
            let position = match index.get(&key) {
                Some(&position) => position,
                None => {
                    let node = provider.get(key)?;
                    let position = nodes.len();
                    index.insert(key, position);
                    children.push(Vec::new());
                    let (child_edges, handed) = edges(&node, &incoming);
                    for child in child_edges.into_iter().rev() {
                        pending.push((Some(position), child, Arc::clone(&handed)));
                    }
                    nodes.push(PlannedNode {
                        node,
                        arguments: incoming,
                    });
                    position
                }
            };
            if let Some(parent) = parent
                && !children[parent].contains(&position)
            {
                children[parent].push(position);
            }
        }

        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut waiting: Vec<usize> = Vec::with_capacity(nodes.len());
        for (position, list) in children.iter().enumerate() {
            waiting.push(list.len());
            for &child in list {
                parents[child].push(position);
            }
        }

        let mut levels = Vec::new();
        let mut current: Vec<usize> = (0..nodes.len()).filter(|&p| waiting[p] == 0).collect();
        let mut placed = 0;
        while !current.is_empty() {
            placed += current.len();
            let mut next = Vec::new();
            for &position in &current {
                for &parent in &parents[position] {
                    waiting[parent] -= 1;
                    if waiting[parent] == 0 {
                        next.push(parent);
                    }
                }
            }
            next.sort_unstable();
            levels.push(current.iter().map(|&p| nodes[p].clone()).collect());
            current = next;
        }

        if placed < nodes.len() {
            let members = (0..nodes.len())
                .filter(|&p| waiting[p] > 0)
                .map(|p| nodes[p].node.call_name().to_string())
                .collect();
            return Err(Error::DependencyCycle { members });
        }
        Ok(Self { levels })
    }

    /// Levels, leaves first
    pub fn levels(&self) -> &[Vec<PlannedNode>] {
        &self.levels
    }

    /// Nodes in resolution order
    pub fn order(&self) -> impl Iterator<Item = &PlannedNode> {
        self.levels.iter().flatten()
    }

    /// Number of distinct nodes below the root
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Whether the root has nothing to resolve
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Keys a node needs resolved before its own call, and what it hands down
fn edges(node: &CallNode, incoming: &Arguments) -> (Vec<ProducerKey>, Arc<Arguments>) {
    let bound = bind(node, incoming);
    let keys = node
        .extra_dependencies
        .iter()
        .copied()
        .chain(
            node.dependencies
                .iter()
                .filter(|(param, _)| !bound.values.contains_key(param))
                .map(|(_, key)| *key),
        )
        .collect();
    (keys, Arc::new(bound.handed_down()))
}
