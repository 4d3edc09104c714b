//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for assembling a scene tree and the meshes it uses.

use std::path::Path;

use softgl_core::{
    mat4, AssetError, Mat4, Mesh, MeshKey, MeshLibrary, NodeId, SceneLoadError, SceneNode, SceneTemplate,
    SceneTree, Vec3,
};

use crate::config::SceneConfig;

/// A scene ready to render: the tree, its meshes, and the nodes that animate
pub struct SceneState {
    pub tree: SceneTree,
    pub library: MeshLibrary,
    /// Root transform nodes with the matrix they were created with
    pub animated: Vec<(NodeId, Mat4)>,
}

/// Builder for scene trees
///
/// Every object added becomes a root transform node with its mesh beneath
/// it; those roots are what the animation system spins.
///
/// # Example
/// ```ignore
/// let scene = SceneBuilder::new()
///     .add_cube(Vec3::new(-2.0, 0.0, 0.0))
///     .add_obj("assets/teapot.obj", Vec3::new(2.0, 0.0, 0.0))?
///     .build();
/// ```
pub struct SceneBuilder {
    tree: SceneTree,
    library: MeshLibrary,
    animated: Vec<(NodeId, Mat4)>,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    /// Create a new scene builder
    pub fn new() -> Self {
        Self {
            tree: SceneTree::new(),
            library: MeshLibrary::new(),
            animated: Vec::new(),
        }
    }

    /// Add the built-in cube at `position`
    pub fn add_cube(mut self, position: Vec3) -> Self {
        let key = match self.library.by_name("cube") {
            Some(key) => key,
            None => self.library.insert_named("cube", Mesh::cube()),
        };
        self.add_root(position, key);
        self
    }

    /// Add an OBJ mesh at `position`
    pub fn add_obj<P: AsRef<Path>>(mut self, path: P, position: Vec3) -> Result<Self, AssetError> {
        let key = self.library.load_obj(path)?;
        self.add_root(position, key);
        Ok(self)
    }

    /// Start from a scene template, resolving OBJ paths against `base_dir`
    ///
    /// Only transform roots animate; a bare mesh root has no matrix to spin.
    pub fn from_template(template: &SceneTemplate, base_dir: &Path) -> Result<Self, SceneLoadError> {
        let mut library = MeshLibrary::new();
        let tree = template.instantiate(&mut library, base_dir)?;
        let animated = tree
            .roots()
            .filter_map(|id| match tree.node(id) {
                Some(SceneNode::Transform { matrix, .. }) => Some((id, *matrix)),
                _ => None,
            })
            .collect();
        Ok(Self { tree, library, animated })
    }

    fn add_root(&mut self, position: Vec3, key: MeshKey) {
        let base = mat4::translation(position.x, position.y, position.z);
        // Roots have no parent, so adding them cannot fail
        if let Ok(root) = self.tree.add_transform(None, base) {
            if self.tree.add_mesh(Some(root), key).is_ok() {
                self.animated.push((root, base));
            }
        }
    }

    /// Build the final scene
    pub fn build(self) -> SceneState {
        log::info!(
            "Built scene: {} nodes, {} meshes",
            self.tree.len(),
            self.library.len()
        );
        SceneState {
            tree: self.tree,
            library: self.library,
            animated: self.animated,
        }
    }
}

/// Build the scene named by the configuration
///
/// A RON scene is loaded when `path` is set, otherwise a single OBJ when
/// `mesh` is set, otherwise the built-in cube.
pub fn build_from_config(config: &SceneConfig) -> Result<SceneState, SceneLoadError> {
    let builder = if let Some(path) = &config.path {
        let path = Path::new(path);
        let template = SceneTemplate::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        SceneBuilder::from_template(&template, base_dir)?
    } else if let Some(mesh) = &config.mesh {
        SceneBuilder::new().add_obj(mesh, Vec3::ZERO)?
    } else {
        SceneBuilder::new().add_cube(Vec3::ZERO)
    };
    Ok(builder.build())
}
