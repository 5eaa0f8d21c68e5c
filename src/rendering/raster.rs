/// Triangle setup and edge-function scan conversion.
///
/// The bounding box of each triangle is traversed with incrementally
/// stepped edge weights: one vector add per pixel, one per row. Depth
/// is compared as 1/z (larger wins) and surviving fragments are shaded
/// through a compile-time-dispatched fragment program, so the per-pixel
/// cost never includes an indirect call.
use glam::{Vec2, Vec3};

use crate::count_call;
use crate::perf::FUNCTION_COUNTERS;
use crate::rendering::framebuffer::PixelSurface;
use crate::rendering::shading::{headlight, modulate, pack_unit_rgb};
use crate::rendering::texture::TextureView;

/// Signed twice-area of (v1, v2, v3); doubles as the coverage test and
/// the unnormalized barycentric weight.
#[inline]
pub(crate) fn edge_function(v1: Vec3, v2: Vec3, v3: Vec3) -> f32 {
    (v3.x - v1.x) * (v1.y - v2.y) + (v3.y - v1.y) * (v2.x - v1.x)
}

/// Minimum signed area: rejects back-faces (negative) and sub-pixel
/// slivers in one comparison.
const MIN_AREA: f32 = 10.0;

/// Everything the scan loop needs, derived once per triangle.
pub(crate) struct TriangleSetup {
    /// Reciprocal camera depth per corner.
    pub rvz: Vec3,
    /// Edge weights at the top-left covered pixel center.
    pub w_start: Vec3,
    /// Weight step per +1 pixel in x.
    pub dx: Vec3,
    /// Weight step per +1 pixel in y.
    pub dy: Vec3,
    /// Pixel bounding box, clamped to the surface.
    pub xmin: usize,
    pub xmax: usize,
    pub ymin: usize,
    pub ymax: usize,
}

/// Bounding-box, back-face and degeneracy culling. Returns None when
/// the triangle cannot produce any fragment.
pub(crate) fn setup_triangle(
    rv: [Vec3; 3],
    width: usize,
    height: usize,
) -> Option<TriangleSetup> {
    let rvmin = rv[0].min(rv[1]).min(rv[2]);
    let rvmax = rv[0].max(rv[1]).max(rv[2]);
    let w = width as f32;
    let h = height as f32;
    if rvmax.x < 0.0 || rvmax.y < 0.0 || rvmin.x >= w || rvmin.y >= h {
        return None;
    }

    let area = edge_function(rv[0], rv[1], rv[2]);
    // Written as a negated >= so a NaN area is rejected too.
    if !(area >= MIN_AREA) {
        return None;
    }
    let one_over_area = 1.0 / area;

    let xmin = rvmin.x.floor().max(0.0) as usize;
    let ymin = rvmin.y.floor().max(0.0) as usize;
    let xmax = (rvmax.x.floor() as usize).min(width - 1);
    let ymax = (rvmax.y.floor() as usize).min(height - 1);

    let start = Vec3::new(xmin as f32 + 0.5, ymin as f32 + 0.5, 0.0);
    let w_start = Vec3::new(
        edge_function(rv[1], rv[2], start),
        edge_function(rv[2], rv[0], start),
        edge_function(rv[0], rv[1], start),
    ) * one_over_area;
    let dx = Vec3::new(
        rv[1].y - rv[2].y,
        rv[2].y - rv[0].y,
        rv[0].y - rv[1].y,
    ) * one_over_area;
    let dy = Vec3::new(
        rv[2].x - rv[1].x,
        rv[0].x - rv[2].x,
        rv[1].x - rv[0].x,
    ) * one_over_area;

    Some(TriangleSetup {
        rvz: Vec3::new(1.0 / rv[0].z, 1.0 / rv[1].z, 1.0 / rv[2].z),
        w_start,
        dx,
        dy,
        xmin,
        xmax,
        ymin,
        ymax,
    })
}

/// Per-triangle fragment state. Implementations hold perspective-
/// pre-divided attributes and shade one covered pixel from the
/// corrected barycentric weights `wp` and the stored depth `z` (1/z).
pub(crate) trait FragmentProgram {
    fn shade(&self, wp: Vec3, z: f32) -> u32;
}

/// Interpolated vertex color modulated by the headlight term.
pub(crate) struct ColorProgram {
    /// Pre-divided camera-space positions.
    pub points: [Vec3; 3],
    /// Pre-divided camera-space normals.
    pub normals: [Vec3; 3],
    /// Pre-divided colors.
    pub colors: [Vec3; 3],
}

impl FragmentProgram for ColorProgram {
    #[inline]
    fn shade(&self, wp: Vec3, _z: f32) -> u32 {
        let point =
            self.points[0] * wp.x + self.points[1] * wp.y + self.points[2] * wp.z;
        let normal =
            self.normals[0] * wp.x + self.normals[1] * wp.y + self.normals[2] * wp.z;
        let light = headlight(point, normal);
        let color =
            self.colors[0] * wp.x + self.colors[1] * wp.y + self.colors[2] * wp.z;
        pack_unit_rgb(light * color)
    }
}

/// Mip-selected texture sample modulated by the headlight term.
pub(crate) struct TextureProgram<'a> {
    pub points: [Vec3; 3],
    pub normals: [Vec3; 3],
    /// Pre-divided UVs.
    pub uvs: [Vec2; 3],
    /// Screen-space gradient of 1/z: (dot(rvz, dx), dot(rvz, dy)).
    pub dz: Vec2,
    /// Screen-space gradient of UV/z along its own axis.
    pub tpp: Vec2,
    pub texture: TextureView<'a>,
}

impl FragmentProgram for TextureProgram<'_> {
    #[inline]
    fn shade(&self, wp: Vec3, z: f32) -> u32 {
        let point =
            self.points[0] * wp.x + self.points[1] * wp.y + self.points[2] * wp.z;
        let normal =
            self.normals[0] * wp.x + self.normals[1] * wp.y + self.normals[2] * wp.z;
        let light = headlight(point, normal);
        let m = self.uvs[0] * wp.x + self.uvs[1] * wp.y + self.uvs[2] * wp.z;
        modulate(self.texture.sample(m, z, self.dz, self.tpp), light)
    }
}

/// Walk the bounding box, depth-test covered pixels and shade the
/// survivors. Coverage is `w >= 0` on all three weights; shared edges
/// may double-cover, with the depth test hiding the overlap.
pub(crate) fn scan_triangle<P: FragmentProgram>(
    setup: &TriangleSetup,
    program: &P,
    surface: &mut PixelSurface<'_>,
    depth: &mut [f32],
) {
    let width = surface.width;
    let row_break = width - (setup.xmax - setup.xmin) - 1;

    let mut w_row = setup.w_start;
    let mut index = setup.ymin * width + setup.xmin;
    for _y in setup.ymin..=setup.ymax {
        let mut w = w_row;
        for _x in setup.xmin..=setup.xmax {
            count_call!(FUNCTION_COUNTERS.pixels_tested);
            if w.x >= 0.0 && w.y >= 0.0 && w.z >= 0.0 {
                // 1/z at the pixel; larger beats stored.
                let z = setup.rvz.dot(w);
                // Index stays inside the clamped bounding box rows.
                let stored = unsafe { depth.get_unchecked_mut(index) };
                if z > *stored {
                    count_call!(FUNCTION_COUNTERS.depth_test_passed);
                    *stored = z;
                    let wp = w / z;
                    let color = program.shade(wp, z);
                    unsafe {
                        *surface.data.get_unchecked_mut(index) = color;
                    }
                } else {
                    count_call!(FUNCTION_COUNTERS.depth_test_failed);
                }
            }
            w += setup.dx;
            index += 1;
        }
        w_row += setup.dy;
        index += row_break;
    }
}
