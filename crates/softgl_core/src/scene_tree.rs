//! Scene graph
//!
//! Nodes live in one arena and refer to each other by [`NodeId`]. A node is
//! either a transform (matrix plus children) or a mesh reference. Parents are
//! plain indices used to walk upward, so the tree never owns cycles.
//!
//! Composition follows the row-vector convention of [`mat4`]: a node's world
//! matrix is `local * parent_world`, so a point is transformed by the node's
//! own matrix first and by its ancestors afterwards.

use std::fmt;

use softgl_math::{mat4, Mat4};

use crate::MeshKey;

/// Index of a node in a [`SceneTree`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the scene graph
#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    Transform {
        matrix: Mat4,
        parent: Option<NodeId>,
        children: Vec<NodeId>,
    },
    Mesh {
        mesh: MeshKey,
        parent: Option<NodeId>,
    },
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            SceneNode::Transform { parent, .. } | SceneNode::Mesh { parent, .. } => *parent,
        }
    }
}

/// A mesh node resolved to its world matrix
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshInstance {
    pub node: NodeId,
    pub mesh: MeshKey,
    pub model: Mat4,
}

/// Errors from building a scene tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not belong to this tree
    UnknownNode(NodeId),
    /// Children and matrices are only valid on transform nodes
    NotATransform(NodeId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::UnknownNode(id) => write!(f, "Unknown scene node {}", id.0),
            SceneError::NotATransform(id) => {
                write!(f, "Scene node {} is a mesh node, not a transform", id.0)
            }
        }
    }
}

impl std::error::Error for SceneError {}

/// Forest of transform and mesh nodes
///
/// Nodes can only be added; the tree has no removal or reparenting, which
/// keeps every [`NodeId`] valid for the life of the tree.
#[derive(Clone, Debug, Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform node under `parent` (or as a root)
    pub fn add_transform(&mut self, parent: Option<NodeId>, matrix: Mat4) -> Result<NodeId, SceneError> {
        self.add(SceneNode::Transform {
            matrix,
            parent,
            children: Vec::new(),
        })
    }

    /// Add a mesh node under `parent` (or as a root)
    pub fn add_mesh(&mut self, parent: Option<NodeId>, mesh: MeshKey) -> Result<NodeId, SceneError> {
        self.add(SceneNode::Mesh { mesh, parent })
    }

    fn add(&mut self, node: SceneNode) -> Result<NodeId, SceneError> {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent() {
            match self.nodes.get_mut(parent.0) {
                Some(SceneNode::Transform { children, .. }) => children.push(id),
                Some(SceneNode::Mesh { .. }) => return Err(SceneError::NotATransform(parent)),
                None => return Err(SceneError::UnknownNode(parent)),
            }
        }
        self.nodes.push(node);
        Ok(id)
    }

    /// Replace a transform node's local matrix
    pub fn set_matrix(&mut self, id: NodeId, new_matrix: Mat4) -> Result<(), SceneError> {
        match self.nodes.get_mut(id.0) {
            Some(SceneNode::Transform { matrix, .. }) => {
                *matrix = new_matrix;
                Ok(())
            }
            Some(SceneNode::Mesh { .. }) => Err(SceneError::NotATransform(id)),
            None => Err(SceneError::UnknownNode(id)),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(SceneNode::parent)
    }

    /// Children of a transform node; mesh nodes have none
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(SceneNode::Transform { children, .. }) => children,
            _ => &[],
        }
    }

    /// Nodes without a parent, in insertion order
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent().is_none())
            .map(|(i, _)| NodeId(i))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Effective model matrix of a node
    ///
    /// A mesh node contributes no transform of its own.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut current = self.node(id)?;
        let mut result = mat4::IDENTITY;
        loop {
            if let SceneNode::Transform { matrix, .. } = current {
                result = mat4::mul(result, *matrix);
            }
            match current.parent() {
                // Parents always precede their children in the arena
                Some(parent) => current = self.node(parent)?,
                None => return Some(result),
            }
        }
    }

    /// Every mesh node with its resolved model matrix, in insertion order
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut resolved: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        let mut instances = Vec::new();

        for (i, node) in self.nodes.iter().enumerate() {
            let parent_world = node
                .parent()
                .map_or(mat4::IDENTITY, |p| resolved[p.0]);
            let world = match node {
                SceneNode::Transform { matrix, .. } => mat4::mul(*matrix, parent_world),
                SceneNode::Mesh { mesh, .. } => {
                    instances.push(MeshInstance {
                        node: NodeId(i),
                        mesh: *mesh,
                        model: parent_world,
                    });
                    parent_world
                }
            };
            resolved.push(world);
        }
        instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mesh, MeshLibrary};
    use softgl_math::Vec4;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec4, b: Vec4) -> bool {
        (a.x - b.x).abs() < EPSILON
            && (a.y - b.y).abs() < EPSILON
            && (a.z - b.z).abs() < EPSILON
            && (a.w - b.w).abs() < EPSILON
    }

    fn cube_key() -> MeshKey {
        MeshLibrary::new().insert(Mesh::new())
    }

    #[test]
    fn test_nested_composition() {
        let mut tree = SceneTree::new();
        let a = tree.add_transform(None, mat4::translation(10.0, 0.0, 0.0)).unwrap();
        let b = tree.add_transform(Some(a), mat4::scale(2.0)).unwrap();
        let m = tree.add_mesh(Some(b), cube_key()).unwrap();

        let model = tree.world_matrix(m).unwrap();
        let p = mat4::transform(Vec4::point(1.0, 0.0, 0.0), model);
        assert!(vec_approx_eq(p, Vec4::point(12.0, 0.0, 0.0)));

        let instances = tree.mesh_instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].node, m);
        assert_eq!(instances[0].model, model);
    }

    #[test]
    fn test_root_mesh_has_identity() {
        let mut tree = SceneTree::new();
        let m = tree.add_mesh(None, cube_key()).unwrap();
        assert_eq!(tree.world_matrix(m), Some(mat4::IDENTITY));
    }

    #[test]
    fn test_instances_in_insertion_order() {
        let mut library = MeshLibrary::new();
        let first = library.insert(Mesh::new());
        let second = library.insert(Mesh::new());

        let mut tree = SceneTree::new();
        let root = tree.add_transform(None, mat4::IDENTITY).unwrap();
        tree.add_mesh(Some(root), second).unwrap();
        let other = tree.add_transform(None, mat4::translation(0.0, 1.0, 0.0)).unwrap();
        tree.add_mesh(Some(other), first).unwrap();
        tree.add_mesh(Some(root), first).unwrap();

        let meshes: Vec<MeshKey> = tree.mesh_instances().iter().map(|i| i.mesh).collect();
        assert_eq!(meshes, vec![second, first, first]);
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec![root, other]);
        assert_eq!(tree.children(root).len(), 2);
    }

    #[test]
    fn test_set_matrix_updates_instances() {
        let mut tree = SceneTree::new();
        let root = tree.add_transform(None, mat4::IDENTITY).unwrap();
        tree.add_mesh(Some(root), cube_key()).unwrap();

        tree.set_matrix(root, mat4::translation(0.0, 0.0, 4.0)).unwrap();
        let model = tree.mesh_instances()[0].model;
        let p = mat4::transform(Vec4::point(0.0, 0.0, 0.0), model);
        assert!(vec_approx_eq(p, Vec4::point(0.0, 0.0, 4.0)));
    }

    #[test]
    fn test_invalid_parents() {
        let mut tree = SceneTree::new();
        let mesh = tree.add_mesh(None, cube_key()).unwrap();
        assert_eq!(
            tree.add_transform(Some(mesh), mat4::IDENTITY),
            Err(SceneError::NotATransform(mesh))
        );
        assert_eq!(
            tree.add_mesh(Some(NodeId(42)), cube_key()),
            Err(SceneError::UnknownNode(NodeId(42)))
        );
        assert!(tree.set_matrix(mesh, mat4::IDENTITY).is_err());
        assert_eq!(tree.len(), 1);
    }
}
