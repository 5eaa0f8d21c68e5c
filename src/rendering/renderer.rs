/// Per-frame pipeline: camera update, buffer maintenance, vertex and
/// attribute transform, then the triangle loop interleaving clipping,
/// setup and scan conversion.
use glam::{Vec2, Vec3};

use crate::camera::{Camera, FrameInput};
use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;
use crate::rendering::arena::FrameArena;
use crate::rendering::clip;
use crate::rendering::framebuffer::{DepthBuffer, PixelSurface};
use crate::rendering::raster::{self, ColorProgram, TextureProgram, TriangleSetup};
use crate::rendering::texture::TextureView;
use crate::rendering::RenderConfig;
use crate::scene::{Scene, Shade};

/// The renderer owns everything with process lifetime: the scene, the
/// camera, the depth buffer and the frame arena. The caller owns the
/// pixel buffer and passes it in every frame.
pub struct Renderer {
    pub camera: Camera,
    config: RenderConfig,
    scene: Scene,
    depth: DepthBuffer,
    arena: FrameArena,
}

impl Renderer {
    pub fn new(scene: Scene) -> Self {
        Self::with_config(scene, RenderConfig::default())
    }

    pub fn with_config(scene: Scene, config: RenderConfig) -> Self {
        Self {
            camera: Camera::new(&config),
            arena: FrameArena::new(&scene),
            depth: DepthBuffer::new(),
            config,
            scene,
        }
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Stored 1/z values for the last rendered frame, matching the
    /// last surface size.
    #[inline]
    pub fn depth_values(&self) -> &[f32] {
        self.depth.as_slice()
    }

    /// Render one frame into the caller's surface. Synchronous and
    /// single-threaded; runs to completion.
    pub fn render(&mut self, surface: &mut PixelSurface<'_>, input: &FrameInput) {
        let Self {
            camera,
            config,
            scene,
            depth,
            arena,
        } = self;

        camera.update(input);

        let width = surface.width;
        let height = surface.height;
        depth.ensure_size(width * height);
        let factor = config.factor(height);

        surface.fill(config.background);
        depth.clear();

        // Vertex pass: world -> camera -> raster for every vertex.
        let m = camera.world_to_camera();
        let half_w = width as f32 / 2.0;
        let half_h = height as f32 / 2.0;
        arena.begin_frame();
        for v in &scene.vertices {
            let c = (m * *v).truncate();
            arena.camera.push(c);
            arena.raster.push(Vec3::new(
                c.x * factor / -c.z + half_w,
                -c.y * factor / -c.z + half_h,
                -c.z,
            ));
        }
        // Attribute pass: rotate normals into camera space.
        for a in &scene.attributes {
            arena.normals.push((m * a.normal).truncate());
            arena.shades.push(a.shade);
        }

        let near = config.near;
        let depth = depth.as_mut_slice();

        // The clipper appends triangles, so the bound is re-read every
        // iteration rather than snapshotted.
        let mut tri = 0;
        while tri < arena.vertex_indices.len() {
            count_call!(FUNCTION_COUNTERS.triangles_submitted);

            let mut rv = triangle_raster(arena, tri);
            let zmax = rv[0].z.max(rv[1].z).max(rv[2].z);
            // Negated comparison so NaN depths are rejected here too.
            if !(zmax > near) {
                count_call!(FUNCTION_COUNTERS.triangles_behind_near);
                tri += 3;
                continue;
            }
            let zmin = rv[0].z.min(rv[1].z).min(rv[2].z);
            if zmin < near {
                clip::clip_triangle(arena, tri, near, factor, half_w, half_h);
                rv = triangle_raster(arena, tri);
            }

            match raster::setup_triangle(rv, width, height) {
                Some(setup) => shade_triangle(scene, arena, tri, &setup, surface, depth),
                None => {
                    count_call!(FUNCTION_COUNTERS.triangles_culled);
                }
            }
            tri += 3;
        }
    }
}

#[inline]
fn triangle_raster(arena: &FrameArena, tri: usize) -> [Vec3; 3] {
    [
        arena.raster[arena.vertex_indices[tri] as usize],
        arena.raster[arena.vertex_indices[tri + 1] as usize],
        arena.raster[arena.vertex_indices[tri + 2] as usize],
    ]
}

/// Pre-divide the triangle's attributes by depth and run the scan loop
/// specialized for its shade variant.
fn shade_triangle(
    scene: &Scene,
    arena: &FrameArena,
    tri: usize,
    setup: &TriangleSetup,
    surface: &mut PixelSurface<'_>,
    depth: &mut [f32],
) {
    let vi = [
        arena.vertex_indices[tri] as usize,
        arena.vertex_indices[tri + 1] as usize,
        arena.vertex_indices[tri + 2] as usize,
    ];
    let ai = [
        arena.attribute_indices[tri] as usize,
        arena.attribute_indices[tri + 1] as usize,
        arena.attribute_indices[tri + 2] as usize,
    ];
    let rvz = setup.rvz;
    let points = [
        arena.camera[vi[0]] * rvz.x,
        arena.camera[vi[1]] * rvz.y,
        arena.camera[vi[2]] * rvz.z,
    ];
    let normals = [
        arena.normals[ai[0]] * rvz.x,
        arena.normals[ai[1]] * rvz.y,
        arena.normals[ai[2]] * rvz.z,
    ];

    match (arena.shades[ai[0]], arena.shades[ai[1]], arena.shades[ai[2]]) {
        (Shade::Color(c0), Shade::Color(c1), Shade::Color(c2)) => {
            let program = ColorProgram {
                points,
                normals,
                colors: [c0 * rvz.x, c1 * rvz.y, c2 * rvz.z],
            };
            raster::scan_triangle(setup, &program, surface, depth);
        }
        (
            Shade::Texture { index, uv: u0 },
            Shade::Texture { uv: u1, .. },
            Shade::Texture { uv: u2, .. },
        ) => {
            let uvs = [u0 * rvz.x, u1 * rvz.y, u2 * rvz.z];
            // Per-triangle derivative terms for mip selection.
            let dz = Vec2::new(rvz.dot(setup.dx), rvz.dot(setup.dy));
            let tpp = Vec2::new(
                uvs[0].x * setup.dx.x + uvs[1].x * setup.dx.y + uvs[2].x * setup.dx.z,
                uvs[0].y * setup.dy.x + uvs[1].y * setup.dy.y + uvs[2].y * setup.dy.z,
            );
            let program = TextureProgram {
                points,
                normals,
                uvs,
                dz,
                tpp,
                texture: TextureView::new(scene.texture_words(index)),
            };
            raster::scan_triangle(setup, &program, surface, depth);
        }
        // Mixed variants are rejected at load time.
        _ => {}
    }
}
