//! Importer-neutral scene graph.
//!
//! Both the OBJ and the glTF importer produce a [`Scene`]: a flat list of
//! meshes and materials plus a tree of [`Node`]s that reference meshes by
//! index. A [`crate::data_structures::model::Model`] only ever reads this
//! structure, it never mutates it.

/// Where the diffuse colour of a material comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum DiffuseSource {
    /// A file name as it is stored in the asset, possibly with a foreign directory prefix.
    File(String),
    /// Image bytes embedded in the asset (glTF buffer views).
    Embedded {
        bytes: Vec<u8>,
        /// Extension-like format hint, e.g. `png` from `image/png`.
        format: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    pub diffuse: Option<DiffuseSource>,
}

impl SceneMaterial {
    pub const DEFAULT_NAME: &'static str = "DefaultMaterial";

    /// Material used for meshes that reference none.
    pub fn fallback() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            diffuse: None,
        }
    }
}

/// One sub-mesh of an imported asset.
///
/// Attribute arrays are indexed by vertex. `tex_coords` and `colors` only hold the
/// first channel of the source and are `None` if the asset does not provide it.
/// `faces` keeps the polygon structure until post-processing triangulates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub colors: Option<Vec<[f32; 3]>>,
    pub faces: Vec<Vec<u32>>,
    pub material_index: Option<usize>,
}

impl SceneMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub meshes: Vec<usize>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>, meshes: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            meshes,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub root: Node,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
}

impl Scene {
    /// Mesh indices in depth-first order: a node's own meshes first, then its
    /// children from first to last. A mesh referenced by several nodes shows up
    /// once per reference.
    pub fn mesh_references(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            order.extend(node.meshes.iter().copied());
            // reversed so the first child is popped next
            stack.extend(node.children.iter().rev());
        }
        order
    }

    /// Gives every mesh without a material the shared fallback material,
    /// appending it to the material list when at least one mesh needs it.
    pub fn assign_fallback_material(&mut self) {
        if self.meshes.iter().all(|m| m.material_index.is_some()) {
            return;
        }
        let fallback = self.materials.len();
        self.materials.push(SceneMaterial::fallback());
        self.meshes
            .iter_mut()
            .filter(|m| m.material_index.is_none())
            .for_each(|m| m.material_index = Some(fallback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(material_index: Option<usize>) -> SceneMesh {
        SceneMesh {
            material_index,
            ..Default::default()
        }
    }

    #[test]
    fn traversal_is_depth_first_in_child_order() {
        let root = Node::new("root", vec![0]).with_children(vec![
            Node::new("a", vec![1]).with_children(vec![Node::new("a.a", vec![2, 3])]),
            Node::new("b", vec![4]),
        ]);
        let scene = Scene {
            root,
            ..Default::default()
        };
        assert_eq!(scene.mesh_references(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn shared_meshes_are_visited_per_reference() {
        let root = Node::new("root", vec![])
            .with_children(vec![Node::new("a", vec![0]), Node::new("b", vec![0])]);
        let scene = Scene {
            root,
            ..Default::default()
        };
        assert_eq!(scene.mesh_references(), vec![0, 0]);
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let mut node = Node::new("leaf", vec![7]);
        for i in 0..1_000 {
            node = Node::new(format!("n{i}"), vec![]).with_children(vec![node]);
        }
        let scene = Scene {
            root: node,
            ..Default::default()
        };
        assert_eq!(scene.mesh_references(), vec![7]);
    }

    #[test]
    fn fallback_material_only_added_when_needed() {
        let mut scene = Scene {
            meshes: vec![mesh(Some(0))],
            materials: vec![SceneMaterial {
                name: "wood".into(),
                diffuse: None,
            }],
            ..Default::default()
        };
        scene.assign_fallback_material();
        assert_eq!(scene.materials.len(), 1);

        scene.meshes.push(mesh(None));
        scene.meshes.push(mesh(None));
        scene.assign_fallback_material();
        assert_eq!(scene.materials.len(), 2);
        assert_eq!(scene.materials[1], SceneMaterial::fallback());
        assert_eq!(scene.meshes[1].material_index, Some(1));
        assert_eq!(scene.meshes[2].material_index, Some(1));
    }
}
