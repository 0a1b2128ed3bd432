//! Skeleton descriptors
//!
//! The baker consumes only the bone count and the identity; the hierarchy is
//! carried through for import tools.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for skeleton identities.
///
/// Identities are UUID v5 hashes of the skeleton name under this namespace, so
/// the same skeleton imported twice resolves to the same cache entry.
pub const SKELETON_NAMESPACE: Uuid = Uuid::from_u128(0x6d79_7468_5f76_6174_8000_0000_0000_0001);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneDescriptor {
    pub name: String,
    /// Index of the parent bone in the owning skeleton (`None` for roots).
    /// Carried for import tools, the baker only consumes the bone count.
    #[serde(default)]
    pub parent: Option<usize>,
}

impl BoneDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Skeleton topology as seen by the VAT baker.
///
/// Bone list is ordered: `bones[i]` is bone `i` in the texture addressing
/// scheme, occupying texels `i * 4 .. i * 4 + 4` of every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SkeletonDef", into = "SkeletonDef")]
pub struct SkeletonDescriptor {
    id: Uuid,
    name: String,
    bones: Vec<BoneDescriptor>,
}

impl SkeletonDescriptor {
    #[must_use]
    pub fn new(name: &str, bones: Vec<BoneDescriptor>) -> Self {
        Self {
            id: Self::identity_for(name),
            name: name.to_string(),
            bones,
        }
    }

    /// Builds a flat (parentless) skeleton from bone names.
    #[must_use]
    pub fn from_bone_names<I, S>(name: &str, bone_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bones = bone_names.into_iter().map(BoneDescriptor::new).collect();
        Self::new(name, bones)
    }

    /// Identity a skeleton named `name` resolves to.
    #[must_use]
    pub fn identity_for(name: &str) -> Uuid {
        Uuid::new_v5(&SKELETON_NAMESPACE, name.as_bytes())
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[BoneDescriptor] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Looks up a bone's texture slot by name.
    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name == name)
    }
}

// The identity is derived, never stored on disk.
#[derive(Serialize, Deserialize)]
struct SkeletonDef {
    name: String,
    #[serde(default)]
    bones: Vec<BoneDescriptor>,
}

impl From<SkeletonDef> for SkeletonDescriptor {
    fn from(def: SkeletonDef) -> Self {
        Self::new(&def.name, def.bones)
    }
}

impl From<SkeletonDescriptor> for SkeletonDef {
    fn from(skeleton: SkeletonDescriptor) -> Self {
        Self {
            name: skeleton.name,
            bones: skeleton.bones,
        }
    }
}
