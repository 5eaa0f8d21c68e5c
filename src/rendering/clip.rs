/// Near-plane clipping.
///
/// A triangle straddling `z = near` is rewritten in place: synthesized
/// intersection vertices replace the clipped corners, and when only one
/// corner was behind the plane the leftover quad gets a second triangle
/// appended to the arena. The caller's triangle loop re-reads the index
/// length, so appended triangles are rasterized in the same frame.
use glam::Vec3;

use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;
use crate::rendering::arena::FrameArena;
use crate::scene::Shade;

/// One synthesized vertex on a clipped edge.
#[derive(Copy, Clone)]
struct Intersection {
    camera: Vec3,
    raster: Vec3,
    normal: Vec3,
    shade: Shade,
}

/// Clip the triangle whose indices start at `tri` against `z = near`.
///
/// Preconditions: at least one raster z is below `near` and at least
/// one is above (the caller's straddle test). Postcondition: the
/// triangle at `tri` (and any appended triangle) has all raster z at
/// or above `near`.
pub(crate) fn clip_triangle(
    arena: &mut FrameArena,
    tri: usize,
    near: f32,
    factor: f32,
    half_w: f32,
    half_h: f32,
) {
    count_call!(FUNCTION_COUNTERS.triangles_clipped);

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

    // Walk the directed edges. Exactly one edge keeps both endpoints on
    // the same side of the plane; the other two cross and synthesize an
    // intersection each.
    let mut synthesized: [Option<Intersection>; 3] = [None; 3];
    let mut same_side_edge = 0usize;
    let mut new_triangle = false;
    for edge in 0..3 {
        let a = edge;
        let b = (edge + 1) % 3;
        let behind_a = arena.raster[vi[a]].z < near;
        let behind_b = arena.raster[vi[b]].z < near;
        if behind_a == behind_b {
            same_side_edge = edge;
            new_triangle = !behind_a;
        } else {
            synthesized[edge] = Some(intersect(
                arena, vi[a], vi[b], ai[a], ai[b], near, factor, half_w, half_h,
            ));
        }
    }

    let current = same_side_edge;
    let next = (current + 1) % 3;
    let preceding = (current + 2) % 3;

    if new_triangle {
        // One corner clipped away leaves a quad. The current triangle
        // keeps the in-front edge and takes the intersection on
        // (next, preceding); the rest of the quad becomes a new
        // triangle referencing two appended vertices.
        let on_next = synthesized[next].expect("edge (next, preceding) must cross");
        let on_preceding = synthesized[preceding].expect("edge (preceding, current) must cross");

        write_vertex(arena, vi[preceding], ai[preceding], &on_next);

        let v0 = arena.push_vertex(on_next.camera, on_next.raster);
        let a0 = arena.push_attribute(on_next.normal, on_next.shade);
        let v1 = arena.push_vertex(on_preceding.camera, on_preceding.raster);
        let a1 = arena.push_attribute(on_preceding.normal, on_preceding.shade);
        arena.push_triangle(
            [arena.vertex_indices[tri + current], v0, v1],
            [arena.attribute_indices[tri + current], a0, a1],
        );
        count_call!(FUNCTION_COUNTERS.clip_triangles_appended);
    } else {
        // Two corners clipped away: shrink the triangle in place.
        let on_next = synthesized[next].expect("edge (next, preceding) must cross");
        let on_preceding = synthesized[preceding].expect("edge (preceding, current) must cross");
        write_vertex(arena, vi[current], ai[current], &on_preceding);
        write_vertex(arena, vi[next], ai[next], &on_next);
    }
}

#[inline]
fn write_vertex(arena: &mut FrameArena, vi: usize, ai: usize, hit: &Intersection) {
    arena.camera[vi] = hit.camera;
    arena.raster[vi] = hit.raster;
    arena.normals[ai] = hit.normal;
    arena.shades[ai] = hit.shade;
}

/// Synthesize the vertex where the directed edge (a, b) meets the near
/// plane. Camera position, normal and color/UV interpolate linearly;
/// the raster position is re-projected from the interpolated camera
/// position with its depth pinned to `near`.
#[allow(clippy::too_many_arguments)]
fn intersect(
    arena: &FrameArena,
    va: usize,
    vb: usize,
    aa: usize,
    ab: usize,
    near: f32,
    factor: f32,
    half_w: f32,
    half_h: f32,
) -> Intersection {
    let za = arena.raster[va].z;
    let zb = arena.raster[vb].z;
    let t = (near - za) / (zb - za);

    let camera = arena.camera[va].lerp(arena.camera[vb], t);
    let raster = Vec3::new(
        camera.x * factor / -camera.z + half_w,
        -camera.y * factor / -camera.z + half_h,
        near,
    );
    let normal = arena.normals[aa].lerp(arena.normals[ab], t);
    let shade = match (arena.shades[aa], arena.shades[ab]) {
        (Shade::Color(ca), Shade::Color(cb)) => Shade::Color(ca.lerp(cb, t)),
        // The texture index always comes from the edge start.
        (Shade::Texture { index, uv: ua }, Shade::Texture { uv: ub, .. }) => Shade::Texture {
            index,
            uv: ua.lerp(ub, t),
        },
        // Mixed variants are rejected at load time.
        (start, _) => start,
    };

    Intersection {
        camera,
        raster,
        normal,
        shade,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::RenderConfig;
    use crate::scene::{Scene, VertexAttribute};
    use glam::{Vec2, Vec4};

    const WIDTH: usize = 100;
    const HEIGHT: usize = 100;

    /// Build an arena holding one transformed triangle with the given
    /// camera-space corners (identity camera).
    fn arena_with_triangle(corners: [Vec3; 3]) -> (FrameArena, f32) {
        let config = RenderConfig::default();
        let factor = config.factor(HEIGHT);
        let scene = Scene {
            vertices: corners
                .iter()
                .map(|c| Vec4::new(c.x, c.y, c.z, 1.0))
                .collect(),
            vertex_indices: vec![0, 1, 2],
            attributes: vec![
                VertexAttribute {
                    normal: Vec4::new(0.0, 0.0, 1.0, 0.0),
                    shade: Shade::Color(Vec3::ONE),
                };
                3
            ],
            attribute_indices: vec![0, 1, 2],
            textures: Vec::new(),
        };
        let mut arena = FrameArena::new(&scene);
        arena.begin_frame();
        for c in corners {
            let raster = Vec3::new(
                c.x * factor / -c.z + WIDTH as f32 / 2.0,
                -c.y * factor / -c.z + HEIGHT as f32 / 2.0,
                -c.z,
            );
            arena.camera.push(c);
            arena.raster.push(raster);
        }
        for _ in 0..3 {
            arena.normals.push(Vec3::Z);
            arena.shades.push(Shade::Color(Vec3::ONE));
        }
        (arena, factor)
    }

    fn clip(arena: &mut FrameArena, factor: f32) {
        let config = RenderConfig::default();
        clip_triangle(
            arena,
            0,
            config.near,
            factor,
            WIDTH as f32 / 2.0,
            HEIGHT as f32 / 2.0,
        );
    }

    fn assert_all_in_front(arena: &FrameArena) {
        let near = RenderConfig::default().near;
        for &vi in &arena.vertex_indices {
            let z = arena.raster[vi as usize].z;
            assert!(
                z >= near - 1e-6,
                "vertex {vi} still behind near plane: z = {z}"
            );
        }
    }

    #[test]
    fn one_corner_behind_appends_a_second_triangle() {
        // Corner 2 sits behind the near plane.
        let (mut arena, factor) = arena_with_triangle([
            Vec3::new(-1.0, -1.0, -2.0),
            Vec3::new(1.0, -1.0, -2.0),
            Vec3::new(0.0, 1.0, -0.05),
        ]);
        clip(&mut arena, factor);

        assert_eq!(arena.vertex_indices.len(), 6, "quad splits into two");
        assert_eq!(arena.camera.len(), 5, "two vertices appended");
        assert_eq!(arena.normals.len(), 5);
        assert_all_in_front(&arena);

        // The appended triangle reuses the in-front corner.
        assert_eq!(arena.vertex_indices[3], 0);
        assert_eq!(arena.vertex_indices[4], 3);
        assert_eq!(arena.vertex_indices[5], 4);
    }

    #[test]
    fn two_corners_behind_shrinks_in_place() {
        let (mut arena, factor) = arena_with_triangle([
            Vec3::new(-1.0, -1.0, -0.05),
            Vec3::new(1.0, -1.0, -0.05),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        clip(&mut arena, factor);

        assert_eq!(arena.vertex_indices.len(), 3, "no triangle appended");
        assert_eq!(arena.camera.len(), 3, "no vertex appended");
        assert_all_in_front(&arena);
    }

    #[test]
    fn intersections_sit_on_the_near_plane() {
        let (mut arena, factor) = arena_with_triangle([
            Vec3::new(-1.0, -1.0, -0.05),
            Vec3::new(1.0, -1.0, -0.05),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        clip(&mut arena, factor);

        let near = RenderConfig::default().near;
        // The two rewritten corners are pinned exactly to near, and
        // their camera depth agrees with the raster depth.
        for slot in [0usize, 1] {
            let vi = arena.vertex_indices[slot] as usize;
            assert_eq!(arena.raster[vi].z, near);
            assert!((-arena.camera[vi].z - near).abs() < 1e-4);
        }
    }

    #[test]
    fn clipped_color_interpolates_along_the_edge() {
        let (mut arena, factor) = arena_with_triangle([
            Vec3::new(-1.0, -1.0, -0.05),
            Vec3::new(1.0, -1.0, -0.05),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        // Distinct colors so the lerp is observable.
        arena.shades[0] = Shade::Color(Vec3::ZERO);
        arena.shades[1] = Shade::Color(Vec3::ZERO);
        arena.shades[2] = Shade::Color(Vec3::ONE);
        clip(&mut arena, factor);

        // z runs 0.05 -> 2.0; the plane at 0.1 sits at t = 0.05/1.95.
        let t = (0.1 - 0.05) / (2.0 - 0.05);
        for slot in [0usize, 1] {
            let ai = arena.attribute_indices[slot] as usize;
            match arena.shades[ai] {
                Shade::Color(c) => {
                    assert!((c.x - t).abs() < 1e-4, "lerped color {c:?} vs t {t}")
                }
                _ => panic!("color triangle produced a texture shade"),
            }
        }
    }

    #[test]
    fn texture_index_comes_from_edge_start() {
        let (mut arena, factor) = arena_with_triangle([
            Vec3::new(-1.0, -1.0, -0.05),
            Vec3::new(1.0, -1.0, -0.05),
            Vec3::new(0.0, 1.0, -2.0),
        ]);
        arena.shades[0] = Shade::Texture {
            index: 0,
            uv: Vec2::new(0.0, 0.0),
        };
        arena.shades[1] = Shade::Texture {
            index: 0,
            uv: Vec2::new(1.0, 0.0),
        };
        arena.shades[2] = Shade::Texture {
            index: 0,
            uv: Vec2::new(0.5, 1.0),
        };
        clip(&mut arena, factor);

        for slot in [0usize, 1] {
            let ai = arena.attribute_indices[slot] as usize;
            match arena.shades[ai] {
                Shade::Texture { index, uv } => {
                    assert_eq!(index, 0);
                    assert!((0.0..1.0).contains(&uv.x));
                    assert!((0.0..=1.0).contains(&uv.y));
                }
                _ => panic!("texture triangle produced a color shade"),
            }
        }
    }
}
