//! Mesh storage
//!
//! Meshes live in a generational slot map so scene nodes can hold a small
//! copyable [`MeshKey`] instead of owning geometry. A mesh loaded from a file
//! is cached by path; loading the same path twice yields the same key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use slotmap::{new_key_type, SlotMap};

use crate::{AssetError, Mesh};

new_key_type! {
    /// Handle to a mesh stored in a [`MeshLibrary`]
    pub struct MeshKey;
}

/// Owns every mesh referenced by a scene
#[derive(Default)]
pub struct MeshLibrary {
    meshes: SlotMap<MeshKey, Mesh>,
    names: HashMap<String, MeshKey>,
    paths: HashMap<PathBuf, MeshKey>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self {
            meshes: SlotMap::with_key(),
            names: HashMap::new(),
            paths: HashMap::new(),
        }
    }

    /// Add an anonymous mesh
    pub fn insert(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    /// Add a mesh under a name, replacing the name's previous binding
    pub fn insert_named(&mut self, name: impl Into<String>, mesh: Mesh) -> MeshKey {
        let key = self.meshes.insert(mesh);
        self.names.insert(name.into(), key);
        key
    }

    /// Load an OBJ file, or return the key of the copy loaded earlier
    pub fn load_obj<P: AsRef<Path>>(&mut self, path: P) -> Result<MeshKey, AssetError> {
        let path = path.as_ref();
        if let Some(&key) = self.paths.get(path) {
            if self.meshes.contains_key(key) {
                log::debug!("Mesh cache hit: {}", path.display());
                return Ok(key);
            }
        }

        let mesh = Mesh::load_obj(path)?;
        let key = self.meshes.insert(mesh);
        self.paths.insert(path.to_path_buf(), key);
        Ok(key)
    }

    pub fn get(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    /// Look up a mesh key by the name given to [`insert_named`](Self::insert_named)
    pub fn by_name(&self, name: &str) -> Option<MeshKey> {
        self.names
            .get(name)
            .copied()
            .filter(|&key| self.meshes.contains_key(key))
    }

    /// Remove a mesh; keys referring to it become stale
    pub fn remove(&mut self, key: MeshKey) -> Option<Mesh> {
        let mesh = self.meshes.remove(key)?;
        self.names.retain(|_, k| *k != key);
        self.paths.retain(|_, k| *k != key);
        Some(mesh)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
