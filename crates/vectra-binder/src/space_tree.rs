//! Space tree: the module and space hierarchy of a package.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`SpaceData`] (the scope of that level and its qualified name)
//! - Edges: `Module(name)` from the package root, `Contains(name)` for spaces
//!
//! Every `(parent, name)` pair has exactly one child node, so files that
//! declare the same space share its scope.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::scope::{ScopeArena, ScopeId, ScopeKind};

/// Edge types in the space graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceEdge {
    /// Package contains module. Module names do not qualify type names.
    Module(String),
    /// Parent space contains child space.
    Contains(String),
}

impl SpaceEdge {
    fn name(&self) -> &str {
        match self {
            SpaceEdge::Module(name) | SpaceEdge::Contains(name) => name,
        }
    }
}

/// Data stored in each node.
#[derive(Debug, Clone)]
pub struct SpaceData {
    pub scope: ScopeId,
    /// Dotted path of the space; empty for the package and module nodes.
    pub full_name: String,
}

#[derive(Debug)]
pub struct SpaceTree {
    graph: DiGraph<SpaceData, SpaceEdge>,
    root: NodeIndex,
}

impl SpaceTree {
    /// Creates a tree whose root holds the package scope.
    pub fn new(package_scope: ScopeId) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(SpaceData {
            scope: package_scope,
            full_name: String::new(),
        });
        Self { graph, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn data(&self, node: NodeIndex) -> &SpaceData {
        &self.graph[node]
    }

    pub fn scope(&self, node: NodeIndex) -> ScopeId {
        self.graph[node].scope
    }

    /// Find a child (module or space) by name.
    pub fn find_child(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.graph
            .edges(parent)
            .find(|edge| edge.weight().name() == name)
            .map(|edge| edge.target())
    }

    /// Get or create the node of a module under the package root.
    pub fn get_or_create_module(&mut self, scopes: &mut ScopeArena, name: &str) -> NodeIndex {
        if let Some(node) = self.find_child(self.root, name) {
            return node;
        }
        let scope = scopes.new_child(self.scope(self.root), ScopeKind::Module);
        let node = self.graph.add_node(SpaceData {
            scope,
            full_name: String::new(),
        });
        self.graph
            .add_edge(self.root, node, SpaceEdge::Module(name.to_string()));
        node
    }

    /// Get or create a child space, with its scope chained under the parent's.
    pub fn get_or_create_space(
        &mut self,
        scopes: &mut ScopeArena,
        parent: NodeIndex,
        name: &str,
    ) -> NodeIndex {
        if let Some(node) = self.find_child(parent, name) {
            return node;
        }
        let parent_data = &self.graph[parent];
        let scope = scopes.new_child(parent_data.scope, ScopeKind::Space);
        let full_name = qualify(&parent_data.full_name, name);
        let node = self.graph.add_node(SpaceData { scope, full_name });
        self.graph
            .add_edge(parent, node, SpaceEdge::Contains(name.to_string()));
        node
    }

    pub fn find_parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .next()
            .map(|edge| edge.source())
    }

    /// Qualified name of a symbol declared directly in `node`.
    pub fn qualified_name(&self, node: NodeIndex, simple_name: &str) -> String {
        qualify(&self.graph[node].full_name, simple_name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

fn qualify(parent: &str, name: &str) -> String {
    match (parent.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}.{}", parent, name),
    }
}
