// src/network/graph.rs

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::network::node::Node;
use crate::substrate::Substrate;
use crate::types::NodeName;

/// Route from the root to every node seen during the last traversal.
///
/// Routes are dotted hop lists (`"home.n00dles.zer0"`). They are diagnostic
/// only; nothing in scheduling reads them.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryPath {
    routes: HashMap<NodeName, String>,
    /// Visit order, root first.
    order: Vec<NodeName>,
}

impl DiscoveryPath {
    /// Dotted route to `node`, if it was visited.
    pub fn route_to(&self, node: &str) -> Option<&str> {
        self.routes.get(node).map(|s| s.as_str())
    }

    /// Number of visited nodes, root included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(node, route)` pairs in visit order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().filter_map(|name| {
            self.routes
                .get(name)
                .map(|route| (name.as_str(), route.as_str()))
        })
    }

    fn record(&mut self, node: &str, route: String) {
        self.order.push(node.to_string());
        self.routes.insert(node.to_string(), route);
    }
}

/// Depth-first view of the network reachable from a fixed root.
///
/// Traversal uses an explicit stack and a visited set keyed by node name,
/// so cyclic and arbitrarily deep networks are handled without recursion.
pub struct NetworkGraph<'a> {
    substrate: &'a dyn Substrate,
    root: NodeName,
    paths: DiscoveryPath,
}

impl<'a> NetworkGraph<'a> {
    pub fn new(substrate: &'a dyn Substrate, root: impl Into<NodeName>) -> Self {
        Self {
            substrate,
            root: root.into(),
            paths: DiscoveryPath::default(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Current description of the root node.
    pub fn root_node(&self) -> Option<Node> {
        self.substrate.describe(&self.root)
    }

    /// Routes recorded by the most recent [`discover`](Self::discover) call.
    pub fn paths(&self) -> &DiscoveryPath {
        &self.paths
    }

    /// Visit every node reachable from the root exactly once and return the
    /// ones accepted by `predicate`, in visit order.
    ///
    /// - The predicate filters results, not traversal: rejected nodes are
    ///   still expanded.
    /// - The root is never part of the result.
    /// - Routes are recorded for every visited node.
    pub fn discover<P>(&mut self, mut predicate: P) -> Vec<Node>
    where
        P: FnMut(&Node) -> bool,
    {
        let mut paths = DiscoveryPath::default();
        let mut visited: HashSet<NodeName> = HashSet::new();
        let mut results = Vec::new();

        visited.insert(self.root.clone());
        paths.record(&self.root, self.root.clone());

        // (node, route of its parent). Neighbours are pushed in reverse so
        // they pop in scan order, giving the same preorder as a recursive walk.
        let mut stack: Vec<(NodeName, String)> = self
            .substrate
            .neighbors(&self.root)
            .into_iter()
            .rev()
            .map(|n| (n, self.root.clone()))
            .collect();

        while let Some((name, parent_route)) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            let route = format!("{parent_route}.{name}");
            trace!(node = %name, route = %route, "visiting node");

            match self.substrate.describe(&name) {
                Some(node) => {
                    if predicate(&node) {
                        results.push(node);
                    }
                }
                None => {
                    debug!(node = %name, "neighbour has no description; expanding only");
                }
            }

            for neighbour in self.substrate.neighbors(&name).into_iter().rev() {
                if !visited.contains(&neighbour) {
                    stack.push((neighbour, route.clone()));
                }
            }

            paths.record(&name, route);
        }

        debug!(
            root = %self.root,
            visited = paths.len(),
            matched = results.len(),
            "network discovery finished"
        );

        self.paths = paths;
        results
    }
}
