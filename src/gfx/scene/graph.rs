//! Arena-backed scene graph.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. A node
//! owns its children through an index list; the parent link is a plain
//! back-reference. World transforms are cached and only refreshed by an
//! explicit top-down [`SceneGraph::update_world_transform`] call.

use cgmath::{Matrix4, SquareMatrix};

use super::mesh::MeshId;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One node of the scene tree
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub mesh: Option<MeshId>,
    pub color: [f32; 4],
    local_transform: Matrix4<f32>,
    world_transform: Matrix4<f32>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl SceneNode {
    /// Pure grouping node: no mesh, identity transform
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            color: [1.0; 4],
            local_transform: Matrix4::identity(),
            world_transform: Matrix4::identity(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Node drawing `mesh` in `color`
    pub fn with_mesh(name: impl Into<String>, mesh: MeshId, color: [f32; 4]) -> Self {
        Self {
            mesh: Some(mesh),
            color,
            ..Self::group(name)
        }
    }

    pub fn with_local_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.local_transform = transform;
        self
    }

    pub fn local_transform(&self) -> Matrix4<f32> {
        self.local_transform
    }

    /// World transform as of the last update; stale after ancestor edits
    pub fn world_transform(&self) -> Matrix4<f32> {
        self.world_transform
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Receives one call per mesh-carrying node during [`SceneGraph::draw`]
pub trait NodeRenderer {
    fn draw_node(&mut self, mesh: MeshId, world_transform: &Matrix4<f32>, color: [f32; 4]);
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` as a new root and returns its id.
    ///
    /// Any parent or children the node value carries are discarded.
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Attaches `child` (and its subtree) under `parent`.
    ///
    /// A child that already has a parent is detached from it first. Attaching a
    /// node under itself or one of its descendants is rejected.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::SceneCycle { parent, child });
        }

        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|&id| id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Convenience for `add_node` followed by `add_child`
    pub fn add_node_under(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId> {
        self.check(parent)?;
        let id = self.add_node(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Sets a node's local transform. World transforms are not touched.
    pub fn set_local_transform(&mut self, id: NodeId, transform: Matrix4<f32>) -> Result<()> {
        self.node_mut(id)?.local_transform = transform;
        Ok(())
    }

    /// Recomputes `id`'s world transform from its parent's cached one and
    /// recurses into the subtree.
    pub fn update_world_transform(&mut self, id: NodeId) -> Result<()> {
        let parent_world = match self.node(id)?.parent {
            Some(parent) => self.nodes[parent.0].world_transform,
            None => Matrix4::identity(),
        };
        self.propagate(id, parent_world);
        Ok(())
    }

    /// Updates every tree in the graph from its root
    pub fn update_all(&mut self) {
        for root in self.roots() {
            self.propagate(root, Matrix4::identity());
        }
    }

    /// Hands every mesh node of the subtree at `id` to `renderer`.
    ///
    /// Grouping nodes draw nothing but their children are still visited.
    pub fn draw<R: NodeRenderer + ?Sized>(&self, id: NodeId, renderer: &mut R) -> Result<()> {
        self.check(id)?;
        self.draw_subtree(id, renderer);
        Ok(())
    }

    /// Draws every tree in the graph
    pub fn draw_all<R: NodeRenderer + ?Sized>(&self, renderer: &mut R) {
        for root in self.roots() {
            self.draw_subtree(root, renderer);
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.nodes.get_mut(id.0).ok_or(Error::UnknownNode(id))
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn check(&self, id: NodeId) -> Result<()> {
        self.node(id).map(|_| ())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes[id.0].parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn propagate(&mut self, id: NodeId, parent_world: Matrix4<f32>) {
        let node = &mut self.nodes[id.0];
        node.world_transform = parent_world * node.local_transform;
        let world = node.world_transform;

        // Children are moved out so the recursion can borrow the arena mutably
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.propagate(child, world);
        }
        self.nodes[id.0].children = children;
    }

    fn draw_subtree<R: NodeRenderer + ?Sized>(&self, id: NodeId, renderer: &mut R) {
        let node = &self.nodes[id.0];
        if let Some(mesh) = node.mesh {
            renderer.draw_node(mesh, &node.world_transform, node.color);
        }
        for &child in &node.children {
            self.draw_subtree(child, renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Vector3};

    struct RecordingRenderer {
        draws: Vec<(MeshId, Matrix4<f32>, [f32; 4])>,
    }

    impl NodeRenderer for RecordingRenderer {
        fn draw_node(&mut self, mesh: MeshId, world_transform: &Matrix4<f32>, color: [f32; 4]) {
            self.draws.push((mesh, *world_transform, color));
        }
    }

    fn assert_matrix_close(a: Matrix4<f32>, b: Matrix4<f32>) {
        let (a, b): ([[f32; 4]; 4], [[f32; 4]; 4]) = (a.into(), b.into());
        for col in 0..4 {
            for row in 0..4 {
                assert!((a[col][row] - b[col][row]).abs() < 1e-5, "{:?} vs {:?}", a, b);
            }
        }
    }

    /// root -> a -> b -> c, plus root -> d
    fn chain() -> (SceneGraph, [NodeId; 5]) {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(
            SceneNode::group("root").with_local_transform(Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0))),
        );
        let a = graph
            .add_node_under(
                root,
                SceneNode::with_mesh("a", MeshId::new(0), [1.0, 0.0, 0.0, 1.0])
                    .with_local_transform(Matrix4::from_angle_z(Deg(90.0))),
            )
            .unwrap();
        let b = graph
            .add_node_under(
                a,
                SceneNode::group("b").with_local_transform(Matrix4::from_scale(2.0)),
            )
            .unwrap();
        let c = graph
            .add_node_under(
                b,
                SceneNode::with_mesh("c", MeshId::new(1), [0.0, 1.0, 0.0, 1.0])
                    .with_local_transform(Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.0))),
            )
            .unwrap();
        let d = graph
            .add_node_under(root, SceneNode::with_mesh("d", MeshId::new(2), [0.0, 0.0, 1.0, 1.0]))
            .unwrap();
        (graph, [root, a, b, c, d])
    }

    #[test]
    fn test_world_equals_parent_world_times_local() {
        let (mut graph, [root, ..]) = chain();
        graph.update_world_transform(root).unwrap();

        for index in 0..graph.len() {
            let node = graph.node(NodeId(index)).unwrap();
            let expected = match node.parent() {
                Some(parent) => graph.node(parent).unwrap().world_transform() * node.local_transform(),
                None => node.local_transform(),
            };
            assert_matrix_close(node.world_transform(), expected);
        }
    }

    #[test]
    fn test_world_transforms_stale_until_update() {
        let (mut graph, [root, _, _, c, _]) = chain();
        graph.update_all();
        let before = graph.node(c).unwrap().world_transform();

        graph
            .set_local_transform(root, Matrix4::from_translation(Vector3::new(0.0, 0.0, 7.0)))
            .unwrap();
        assert_eq!(graph.node(c).unwrap().world_transform(), before);

        graph.update_world_transform(root).unwrap();
        let after = graph.node(c).unwrap().world_transform();
        assert!((after.w.z - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_update_from_inner_node_uses_cached_parent() {
        let (mut graph, [root, a, b, c, _]) = chain();
        graph.update_world_transform(root).unwrap();

        graph.set_local_transform(b, Matrix4::identity()).unwrap();
        graph.update_world_transform(b).unwrap();

        let expected = graph.node(a).unwrap().world_transform()
            * Matrix4::from_translation(Vector3::new(0.0, 3.0, 0.0));
        assert_matrix_close(graph.node(c).unwrap().world_transform(), expected);
    }

    #[test]
    fn test_draw_recurses_through_grouping_nodes() {
        let (mut graph, [root, ..]) = chain();
        graph.update_all();

        let mut renderer = RecordingRenderer { draws: Vec::new() };
        graph.draw(root, &mut renderer).unwrap();

        let meshes: Vec<MeshId> = renderer.draws.iter().map(|(mesh, _, _)| *mesh).collect();
        assert_eq!(meshes, vec![MeshId::new(0), MeshId::new(1), MeshId::new(2)]);
        assert_eq!(renderer.draws[1].2, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_reparenting_moves_subtree() {
        let (mut graph, [root, a, b, _, d]) = chain();
        graph.add_child(d, b).unwrap();

        assert!(graph.node(a).unwrap().children().is_empty());
        assert_eq!(graph.node(d).unwrap().children(), &[b]);
        assert_eq!(graph.node(b).unwrap().parent(), Some(d));
        assert_eq!(graph.roots(), vec![root]);
    }

    #[test]
    fn test_cycles_and_unknown_nodes_are_rejected() {
        let (mut graph, [root, _, _, c, _]) = chain();
        assert!(matches!(graph.add_child(c, root), Err(Error::SceneCycle { .. })));
        assert!(matches!(graph.add_child(c, c), Err(Error::SceneCycle { .. })));
        assert!(matches!(
            graph.add_child(root, NodeId(99)),
            Err(Error::UnknownNode(NodeId(99)))
        ));
        assert_eq!(graph.find_by_name("c"), Some(c));
    }
}
