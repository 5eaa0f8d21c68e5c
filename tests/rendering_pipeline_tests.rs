/// End-to-end tests of the frame pipeline on a 100x100 surface with
/// the default configuration.
use glam::{Vec3, Vec4};
use softraster::{FrameInput, PixelSurface, Renderer, Scene, Shade, VertexAttribute};

const WIDTH: usize = 100;
const HEIGHT: usize = 100;
const BACKGROUND: u32 = 0x001E1E1E;

fn color_triangle_scene(positions: [Vec4; 3], normal: Vec4, color: Vec3) -> Scene {
    Scene {
        vertices: positions.to_vec(),
        vertex_indices: vec![0, 1, 2],
        attributes: vec![
            VertexAttribute {
                normal,
                shade: Shade::Color(color),
            };
            3
        ],
        attribute_indices: vec![0, 1, 2],
        textures: Vec::new(),
    }
}

fn render_frame(renderer: &mut Renderer) -> Vec<u32> {
    let mut pixels = vec![0u32; WIDTH * HEIGHT];
    let mut surface = PixelSurface::new(&mut pixels, WIDTH, HEIGHT);
    renderer.render(&mut surface, &FrameInput::default());
    pixels
}

/// A white triangle facing the camera head on renders a centered
/// grayscale silhouette, brightly lit.
#[test]
fn facing_triangle_renders_lit_grayscale() {
    let scene = color_triangle_scene(
        [
            Vec4::new(-1.0, -1.0, -2.0, 1.0),
            Vec4::new(0.0, 1.0, -2.0, 1.0),
            Vec4::new(1.0, -1.0, -2.0, 1.0),
        ],
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec3::ONE,
    );
    let mut renderer = Renderer::new(scene);
    let pixels = render_frame(&mut renderer);

    let mut covered = 0;
    for &p in &pixels {
        if p == BACKGROUND {
            continue;
        }
        covered += 1;
        let r = (p >> 16) & 0xFF;
        let g = (p >> 8) & 0xFF;
        let b = p & 0xFF;
        assert_eq!(r, g, "lit pixel is not grayscale: {p:#08x}");
        assert_eq!(g, b, "lit pixel is not grayscale: {p:#08x}");
        assert!(r > 0x80, "lit pixel too dark: {p:#08x}");
    }
    assert!(covered > 0, "triangle rendered no pixels");

    // The silhouette is centered on the image.
    assert_ne!(pixels[WIDTH / 2 + HEIGHT / 2 * WIDTH], BACKGROUND);
}

/// Moving the camera ten units back puts the triangle behind it:
/// nothing is drawn.
#[test]
fn triangle_behind_camera_writes_nothing() {
    let scene = color_triangle_scene(
        [
            Vec4::new(-1.0, -1.0, -2.0, 1.0),
            Vec4::new(0.0, 1.0, -2.0, 1.0),
            Vec4::new(1.0, -1.0, -2.0, 1.0),
        ],
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec3::ONE,
    );
    let mut renderer = Renderer::new(scene);
    renderer.camera.position = Vec3::new(0.0, 0.0, -10.0);
    let pixels = render_frame(&mut renderer);

    assert!(pixels.iter().all(|&p| p == BACKGROUND));
}

/// A back-facing triangle (clockwise winding after projection, so the
/// signed area is negative) produces zero pixel writes.
#[test]
fn back_facing_triangle_writes_nothing() {
    let scene = color_triangle_scene(
        [
            Vec4::new(-1.0, -1.0, -2.0, 1.0),
            Vec4::new(1.0, -1.0, -2.0, 1.0),
            Vec4::new(0.0, 1.0, -2.0, 1.0),
        ],
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec3::ONE,
    );
    let mut renderer = Renderer::new(scene);
    let pixels = render_frame(&mut renderer);

    assert!(pixels.iter().all(|&p| p == BACKGROUND));
}

/// Two triangles projecting onto the same pixels: the nearer one wins
/// every covered pixel, whichever comes first in the index buffer.
#[test]
fn depth_test_is_order_independent() {
    // The far triangle is scaled by 1.5 at depth 3, so both project to
    // exactly the same screen footprint.
    let near_positions = [
        Vec4::new(-1.0, -1.0, -2.0, 1.0),
        Vec4::new(0.0, 1.0, -2.0, 1.0),
        Vec4::new(1.0, -1.0, -2.0, 1.0),
    ];
    let far_positions = [
        Vec4::new(-1.5, -1.5, -3.0, 1.0),
        Vec4::new(0.0, 1.5, -3.0, 1.0),
        Vec4::new(1.5, -1.5, -3.0, 1.0),
    ];
    let normal = Vec4::new(0.0, 0.0, 1.0, 0.0);

    let build = |near_first: bool| -> Scene {
        let mut vertices = Vec::new();
        vertices.extend_from_slice(&near_positions);
        vertices.extend_from_slice(&far_positions);
        let mut attributes = Vec::new();
        // White up close, red far away.
        attributes.extend(std::iter::repeat(VertexAttribute {
            normal,
            shade: Shade::Color(Vec3::ONE),
        }).take(3));
        attributes.extend(std::iter::repeat(VertexAttribute {
            normal,
            shade: Shade::Color(Vec3::new(1.0, 0.0, 0.0)),
        }).take(3));

        let (first, second) = if near_first {
            ([0u32, 1, 2], [3u32, 4, 5])
        } else {
            ([3u32, 4, 5], [0u32, 1, 2])
        };
        let mut vertex_indices = first.to_vec();
        vertex_indices.extend_from_slice(&second);

        Scene {
            vertices,
            vertex_indices: vertex_indices.clone(),
            attributes,
            attribute_indices: vertex_indices,
            textures: Vec::new(),
        }
    };

    let pixels_near_first = render_frame(&mut Renderer::new(build(true)));
    let pixels_far_first = render_frame(&mut Renderer::new(build(false)));

    assert_eq!(
        pixels_near_first, pixels_far_first,
        "draw order changed the image"
    );

    // Covered pixels show the white triangle, never bare red.
    let mut covered = 0;
    for &p in &pixels_near_first {
        if p == BACKGROUND {
            continue;
        }
        covered += 1;
        let g = (p >> 8) & 0xFF;
        assert!(g > 0, "far (red) triangle won a pixel: {p:#08x}");
    }
    assert!(covered > 0);
}

/// Re-rendering the same scene with unchanged input is bit-identical.
#[test]
fn repeated_frames_are_deterministic() {
    let scene = color_triangle_scene(
        [
            Vec4::new(-1.0, -1.0, -2.0, 1.0),
            Vec4::new(0.0, 1.0, -2.0, 1.0),
            Vec4::new(1.0, -1.0, -2.0, 1.0),
        ],
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec3::new(0.9, 0.6, 0.3),
    );
    let mut renderer = Renderer::new(scene);
    let first = render_frame(&mut renderer);
    let second = render_frame(&mut renderer);
    assert_eq!(first, second);
}
