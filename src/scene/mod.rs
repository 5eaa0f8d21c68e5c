/// Baked scene data: parallel vertex/index/attribute arrays plus the
/// texture atlas, loaded once and never freed.
pub mod demo;
pub mod loader;

pub use loader::{load_scene, locate_scene_file, parse_scene, SceneError};

use glam::{Vec2, Vec3, Vec4};

/// Words per texture in the atlas: one 512x512 mipmap pyramid of
/// packed 0x00RRGGBB values.
pub const TEXTURE_WORDS: usize = 1 << 18;

/// The pyramid is addressed as `x + (y << ATLAS_SHIFT)`.
pub const ATLAS_SHIFT: u32 = 9;

/// How a fragment gets its base color: an interpolated vertex color or
/// a texture sample. All three corners of a triangle must agree on the
/// variant; the loader enforces this.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shade {
    /// RGB in [0, 1].
    Color(Vec3),
    /// Atlas texture index plus UV in [0, 1).
    Texture { index: u32, uv: Vec2 },
}

/// Per-vertex shading attribute. The normal is a direction (w = 0) in
/// world space; it is transformed alongside the vertices each frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexAttribute {
    pub normal: Vec4,
    pub shade: Shade,
}

/// Immutable source geometry. Indices come in triples: triangle `t`
/// reads `vertex_indices[3t..3t+3]` and `attribute_indices[3t..3t+3]`.
pub struct Scene {
    pub vertices: Vec<Vec4>,
    pub vertex_indices: Vec<u32>,
    pub attributes: Vec<VertexAttribute>,
    pub attribute_indices: Vec<u32>,
    pub textures: Vec<u32>,
}

impl Scene {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertex_indices.len() / 3
    }

    #[inline]
    pub fn texture_count(&self) -> usize {
        self.textures.len() / TEXTURE_WORDS
    }

    /// One texture's pyramid as a word slice.
    #[inline]
    pub fn texture_words(&self, index: u32) -> &[u32] {
        let base = (index as usize) << 18;
        &self.textures[base..base + TEXTURE_WORDS]
    }

    /// Cross-check the parallel arrays. Every violation here would be
    /// undefined behavior territory on the render hot path, so scenes
    /// are rejected up front instead.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.vertex_indices.len() != self.attribute_indices.len() {
            return Err(SceneError::MalformedScene(format!(
                "index arrays disagree: {} vertex indices vs {} attribute indices",
                self.vertex_indices.len(),
                self.attribute_indices.len()
            )));
        }
        if self.vertex_indices.len() % 3 != 0 {
            return Err(SceneError::MalformedScene(format!(
                "vertex index count {} is not a multiple of 3",
                self.vertex_indices.len()
            )));
        }
        if self.textures.len() % TEXTURE_WORDS != 0 {
            return Err(SceneError::MalformedScene(format!(
                "texture section holds {} words, not a whole number of pyramids",
                self.textures.len()
            )));
        }
        for (i, &vi) in self.vertex_indices.iter().enumerate() {
            if vi as usize >= self.vertices.len() {
                return Err(SceneError::MalformedScene(format!(
                    "vertex index {vi} at position {i} out of range"
                )));
            }
        }
        for (i, &ai) in self.attribute_indices.iter().enumerate() {
            if ai as usize >= self.attributes.len() {
                return Err(SceneError::MalformedScene(format!(
                    "attribute index {ai} at position {i} out of range"
                )));
            }
        }
        let texture_count = self.texture_count() as u32;
        for tri in 0..self.triangle_count() {
            let ai = &self.attribute_indices[tri * 3..tri * 3 + 3];
            let shades = [
                &self.attributes[ai[0] as usize].shade,
                &self.attributes[ai[1] as usize].shade,
                &self.attributes[ai[2] as usize].shade,
            ];
            let all_color = shades.iter().all(|s| matches!(s, Shade::Color(_)));
            let all_texture = shades.iter().all(|s| matches!(s, Shade::Texture { .. }));
            if !all_color && !all_texture {
                return Err(SceneError::MalformedScene(format!(
                    "triangle {tri} mixes color and texture attributes"
                )));
            }
            for s in shades {
                if let Shade::Texture { index, .. } = s {
                    if *index >= texture_count {
                        return Err(SceneError::MalformedScene(format!(
                            "triangle {tri} references texture {index} of {texture_count}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
