/// Per-frame geometry arena.
///
/// Holds the transformed copies of every scene vertex and attribute
/// plus room for the vertices the near-plane clipper synthesizes. All
/// arrays are allocated once with twice the source capacity; a frame
/// resets the lengths to the source counts and the clipper grows them.
use glam::Vec3;

use crate::scene::{Scene, Shade};

/// Reserve multiplier over the source counts. Clip output is bounded
/// by one extra triangle per source triangle, which this covers.
pub const GROWTH_FACTOR: usize = 2;

pub struct FrameArena {
    /// Camera-space positions, parallel to the vertex array.
    pub camera: Vec<Vec3>,
    /// Raster positions: pixel x/y plus camera-space depth in z.
    pub raster: Vec<Vec3>,
    /// Camera-space normals, parallel to the attribute array.
    pub normals: Vec<Vec3>,
    /// Color or UV payloads, parallel to the attribute array.
    pub shades: Vec<Shade>,
    /// Triangle index streams; the clipper appends whole triangles.
    pub vertex_indices: Vec<u32>,
    pub attribute_indices: Vec<u32>,

    base_indices: usize,
    vertex_cap: usize,
    attribute_cap: usize,
    index_cap: usize,
}

impl FrameArena {
    pub fn new(scene: &Scene) -> Self {
        let vertex_cap = scene.vertices.len() * GROWTH_FACTOR;
        let attribute_cap = scene.attributes.len() * GROWTH_FACTOR;
        let index_cap = scene.vertex_indices.len() * GROWTH_FACTOR;

        let mut vertex_indices = Vec::with_capacity(index_cap);
        vertex_indices.extend_from_slice(&scene.vertex_indices);
        let mut attribute_indices = Vec::with_capacity(index_cap);
        attribute_indices.extend_from_slice(&scene.attribute_indices);

        Self {
            camera: Vec::with_capacity(vertex_cap),
            raster: Vec::with_capacity(vertex_cap),
            normals: Vec::with_capacity(attribute_cap),
            shades: Vec::with_capacity(attribute_cap),
            vertex_indices,
            attribute_indices,
            base_indices: scene.vertex_indices.len(),
            vertex_cap,
            attribute_cap,
            index_cap,
        }
    }

    /// Reset effective lengths to the source counts. The transform
    /// pass refills the vertex and attribute arrays; the index streams
    /// keep their source prefix in place.
    pub fn begin_frame(&mut self) {
        self.camera.clear();
        self.raster.clear();
        self.normals.clear();
        self.shades.clear();
        self.vertex_indices.truncate(self.base_indices);
        self.attribute_indices.truncate(self.base_indices);
    }

    /// Append a clip-synthesized vertex, returning its index.
    #[inline]
    pub fn push_vertex(&mut self, camera: Vec3, raster: Vec3) -> u32 {
        assert!(
            self.camera.len() < self.vertex_cap,
            "frame arena vertex reserve exhausted ({} entries); raise GROWTH_FACTOR",
            self.vertex_cap
        );
        let index = self.camera.len() as u32;
        self.camera.push(camera);
        self.raster.push(raster);
        index
    }

    /// Append a clip-synthesized attribute, returning its index.
    #[inline]
    pub fn push_attribute(&mut self, normal: Vec3, shade: Shade) -> u32 {
        assert!(
            self.normals.len() < self.attribute_cap,
            "frame arena attribute reserve exhausted ({} entries); raise GROWTH_FACTOR",
            self.attribute_cap
        );
        let index = self.normals.len() as u32;
        self.normals.push(normal);
        self.shades.push(shade);
        index
    }

    /// Append a whole triangle to both index streams.
    #[inline]
    pub fn push_triangle(&mut self, vi: [u32; 3], ai: [u32; 3]) {
        assert!(
            self.vertex_indices.len() + 3 <= self.index_cap,
            "frame arena index reserve exhausted ({} entries); raise GROWTH_FACTOR",
            self.index_cap
        );
        self.vertex_indices.extend_from_slice(&vi);
        self.attribute_indices.extend_from_slice(&ai);
    }
}
