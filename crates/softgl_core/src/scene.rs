//! Scene templates
//!
//! A [`SceneTemplate`] is the serializable description of a scene graph,
//! stored as RON. Instantiating it loads the referenced meshes into a
//! [`MeshLibrary`] and builds a [`SceneTree`].

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use softgl_math::{mat4, Mat4};

use crate::{AssetError, Mesh, MeshLibrary, NodeId, SceneError, SceneTree};

/// Serializable scene graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTemplate {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Root nodes
    #[serde(default)]
    pub nodes: Vec<NodeTemplate>,
}

/// One node of a [`SceneTemplate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeTemplate {
    Transform {
        #[serde(default)]
        transform: TransformTemplate,
        #[serde(default)]
        children: Vec<NodeTemplate>,
    },
    Mesh {
        source: MeshSource,
    },
}

/// Where a mesh node's geometry comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshSource {
    /// The built-in cube
    Cube,
    /// An OBJ file, relative to the scene's base directory
    Obj(String),
}

/// Translation, Euler rotation (radians) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformTemplate {
    pub translation: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for TransformTemplate {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl TransformTemplate {
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: [x, y, z],
            ..Self::default()
        }
    }

    /// Scale, then rotate about X, Y and Z, then translate
    pub fn to_matrix(&self) -> Mat4 {
        let [sx, sy, sz] = self.scale;
        let [rx, ry, rz] = self.rotation;
        let [tx, ty, tz] = self.translation;
        mat4::mul_chain(&[
            mat4::scale_xyz(sx, sy, sz),
            mat4::rotate_x(rx),
            mat4::rotate_y(ry),
            mat4::rotate_z(rz),
            mat4::translation(tx, ty, tz),
        ])
    }
}

impl SceneTemplate {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Add a root node
    pub fn with_node(mut self, node: NodeTemplate) -> Self {
        self.nodes.push(node);
        self
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneLoadError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Build a scene tree, loading meshes into `library`
    ///
    /// OBJ paths are resolved against `base_dir`. Each path is loaded once
    /// no matter how many nodes use it, and all cube nodes share one mesh.
    pub fn instantiate(
        &self,
        library: &mut MeshLibrary,
        base_dir: &Path,
    ) -> Result<SceneTree, SceneLoadError> {
        let mut tree = SceneTree::new();
        for node in &self.nodes {
            add_node(&mut tree, library, base_dir, None, node)?;
        }
        log::info!(
            "Instantiated scene '{}': {} nodes, {} meshes",
            self.name,
            tree.len(),
            library.len()
        );
        Ok(tree)
    }
}

fn add_node(
    tree: &mut SceneTree,
    library: &mut MeshLibrary,
    base_dir: &Path,
    parent: Option<NodeId>,
    node: &NodeTemplate,
) -> Result<(), SceneLoadError> {
    match node {
        NodeTemplate::Transform { transform, children } => {
            let id = tree.add_transform(parent, transform.to_matrix())?;
            for child in children {
                add_node(tree, library, base_dir, Some(id), child)?;
            }
        }
        NodeTemplate::Mesh { source } => {
            let key = match source {
                MeshSource::Cube => match library.by_name("cube") {
                    Some(key) => key,
                    None => library.insert_named("cube", Mesh::cube()),
                },
                MeshSource::Obj(path) => library.load_obj(base_dir.join(path))?,
            };
            tree.add_mesh(parent, key)?;
        }
    }
    Ok(())
}

/// Error loading, saving or instantiating a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
    /// A referenced mesh failed to load
    Asset(AssetError),
    /// The node structure was rejected by the tree
    Tree(SceneError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl From<ron::Error> for SceneLoadError {
    fn from(e: ron::Error) -> Self {
        SceneLoadError::Serialize(e)
    }
}

impl From<AssetError> for SceneLoadError {
    fn from(e: AssetError) -> Self {
        SceneLoadError::Asset(e)
    }
}

impl From<SceneError> for SceneLoadError {
    fn from(e: SceneError) -> Self {
        SceneLoadError::Tree(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneLoadError::Serialize(e) => write!(f, "Serialize error: {}", e),
            SceneLoadError::Asset(e) => write!(f, "Mesh error: {}", e),
            SceneLoadError::Tree(e) => write!(f, "Scene graph error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Io(e) => Some(e),
            SceneLoadError::Parse(e) => Some(e),
            SceneLoadError::Serialize(e) => Some(e),
            SceneLoadError::Asset(e) => Some(e),
            SceneLoadError::Tree(e) => Some(e),
        }
    }
}
