/// Demo scene construction and serialization: the back end of the
/// `bake-scene` binary. Builds a textured triangle plus randomly
/// oriented solids, renders the procedural texture pyramids, and
/// writes the whole thing in the `data.bin` binary format.
use glam::{Vec2, Vec3, Vec4};
use rand::Rng;

use super::loader::{DISCRIMINATOR_COLOR, DISCRIMINATOR_TEXTURE};
use super::{Scene, Shade, VertexAttribute};
use crate::rendering::texture;

const ORANGE: Vec3 = Vec3::new(1.0, 0.647, 0.0);
const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);
const BLUE: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Incrementally assembled scene.
pub struct SceneBuilder {
    vertices: Vec<Vec4>,
    vertex_indices: Vec<u32>,
    attributes: Vec<VertexAttribute>,
    attribute_indices: Vec<u32>,
    textures: Vec<u32>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            vertex_indices: Vec::new(),
            attributes: Vec::new(),
            attribute_indices: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn build(self) -> Scene {
        Scene {
            vertices: self.vertices,
            vertex_indices: self.vertex_indices,
            attributes: self.attributes,
            attribute_indices: self.attribute_indices,
            textures: self.textures,
        }
    }

    fn push_solid(&mut self, positions: &[Vec3], faces: &[[u32; 3]], shades: &[Shade]) {
        debug_assert_eq!(shades.len(), faces.len() * 3);
        let vertex_base = self.vertices.len() as u32;
        let attribute_base = self.attributes.len() as u32;
        self.vertices
            .extend(positions.iter().map(|p| p.extend(1.0)));
        for (f, face) in faces.iter().enumerate() {
            let normal = face_normal(positions, *face);
            for corner in 0..3 {
                self.vertex_indices.push(vertex_base + face[corner]);
                self.attribute_indices
                    .push(attribute_base + (f * 3 + corner) as u32);
                self.attributes.push(VertexAttribute {
                    normal: normal.extend(0.0),
                    shade: shades[f * 3 + corner],
                });
            }
        }
    }

    /// A single upright triangle in front of the origin, mapped onto
    /// texture 0.
    pub fn add_triangle(&mut self) {
        let half = 3.0f32.sqrt() / 2.0;
        let positions: Vec<Vec3> = [
            Vec3::new(-half, -0.5, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(half, -0.5, 0.0),
        ]
        .iter()
        .map(|v| *v + Vec3::new(0.0, 0.0, -5.0))
        .collect();
        let shades = [
            Shade::Texture {
                index: 0,
                uv: Vec2::new(0.0, half),
            },
            Shade::Texture {
                index: 0,
                uv: Vec2::new(0.5, 0.0),
            },
            Shade::Texture {
                index: 0,
                uv: Vec2::new(1.0, half),
            },
        ];
        self.push_solid(&positions, &[[0, 1, 2]], &shades);
    }

    /// Regular tetrahedron with the given orientation basis, radius
    /// and center. One red and one blue accent corner; orange
    /// elsewhere.
    pub fn add_tetrahedron(&mut self, axis: (Vec3, Vec3, Vec3), radius: f32, center: Vec3) {
        let (x, y, z) = axis;
        let k1 = (8.0f32 / 9.0).sqrt();
        let k2 = (2.0f32 / 9.0).sqrt();
        let k3 = (2.0f32 / 3.0).sqrt();
        let positions: Vec<Vec3> = [
            z,
            k1 * x - z / 3.0,
            -k2 * x + k3 * y - z / 3.0,
            -k2 * x - k3 * y - z / 3.0,
        ]
        .iter()
        .map(|v| radius * *v + center)
        .collect();
        let faces = [[0, 2, 1], [0, 3, 2], [0, 1, 3], [1, 2, 3]];
        let mut shades = [Shade::Color(ORANGE); 12];
        shades[3] = Shade::Color(RED);
        shades[8] = Shade::Color(BLUE);
        self.push_solid(&positions, &faces, &shades);
    }

    /// Regular icosahedron with a few accent corners.
    pub fn add_icosahedron(&mut self, axis: (Vec3, Vec3, Vec3), radius: f32, center: Vec3) {
        let (x, y, z) = axis;
        let phi = (5.0f32.sqrt() + 1.0) / 2.0;
        let l = 1.0 / (phi + 2.0).sqrt();
        let k = phi * l;
        let positions: Vec<Vec3> = [
            k * x + l * y,
            k * x - l * y,
            -k * x + l * y,
            -k * x - l * y,
            l * x + k * z,
            -l * x + k * z,
            l * x - k * z,
            -l * x - k * z,
            k * y + l * z,
            k * y - l * z,
            -k * y + l * z,
            -k * y - l * z,
        ]
        .iter()
        .map(|v| radius * *v + center)
        .collect();
        let faces = [
            [0, 1, 4],
            [4, 8, 0],
            [0, 8, 9],
            [9, 6, 0],
            [0, 6, 1],
            [1, 10, 4],
            [4, 10, 5],
            [5, 8, 4],
            [5, 2, 8],
            [8, 2, 9],
            [9, 2, 7],
            [7, 6, 9],
            [7, 11, 6],
            [6, 11, 1],
            [1, 11, 10],
            [3, 5, 10],
            [10, 11, 3],
            [3, 11, 7],
            [7, 2, 3],
            [3, 2, 5],
        ];
        let mut shades = [Shade::Color(ORANGE); 60];
        for (i, accent) in [(9, RED), (24, BLUE), (26, RED), (45, RED)] {
            shades[i] = Shade::Color(accent);
        }
        self.push_solid(&positions, &faces, &shades);
    }

    /// Texture 0: checkerboard. Texture 1: two-tone noise.
    pub fn add_textures(&mut self) {
        let checker = texture::checkerboard_base(0x00C8C8C8, 0x00303030, 32);
        self.textures.extend(texture::build_pyramid(&checker));
        let noise = texture::noise_base(0x0032A032, 0x00206020);
        self.textures.extend(texture::build_pyramid(&noise));
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn face_normal(positions: &[Vec3], face: [u32; 3]) -> Vec3 {
    let a = positions[face[0] as usize];
    let b = positions[face[1] as usize];
    let c = positions[face[2] as usize];
    (c - a).cross(b - a)
}

fn random_unit_sphere_point(rng: &mut impl Rng) -> Vec3 {
    let cz = rng.gen_range(-1.0f32..=1.0);
    let angle = rng.gen_range(0.0f32..std::f32::consts::TAU);
    let s = (1.0 - cz * cz).sqrt();
    Vec3::new(angle.cos() * s, angle.sin() * s, cz)
}

/// Random right-handed orthonormal basis.
pub fn random_unit_axis(rng: &mut impl Rng) -> (Vec3, Vec3, Vec3) {
    let x = random_unit_sphere_point(rng);
    let mut q = random_unit_sphere_point(rng);
    while q == x || q == -x {
        q = random_unit_sphere_point(rng);
    }
    let y = x.cross(q).normalize();
    let z = x.cross(y);
    (x, y, z)
}

/// The scene the baker ships: the textured triangle up close, solids
/// scattered further out.
pub fn build_demo_scene(rng: &mut impl Rng) -> Scene {
    let mut builder = SceneBuilder::new();
    builder.add_triangle();
    builder.add_tetrahedron(random_unit_axis(rng), 2.0, Vec3::new(-5.0, 0.0, -30.0));
    builder.add_tetrahedron(random_unit_axis(rng), 2.0, Vec3::new(5.0, 2.0, -40.0));
    builder.add_icosahedron(random_unit_axis(rng), 2.0, Vec3::new(0.0, -3.0, -45.0));
    builder.add_icosahedron(random_unit_axis(rng), 2.0, Vec3::new(8.0, -2.0, -60.0));
    builder.add_textures();
    builder.build()
}

/// Serialize a scene in the `data.bin` binary format.
pub fn serialize(scene: &Scene) -> Vec<u8> {
    let mut out = Vec::new();

    section_header(&mut out, scene.vertices.len() as u64);
    for v in &scene.vertices {
        for c in v.to_array() {
            out.extend_from_slice(&c.to_le_bytes());
        }
    }

    write_index_section(&mut out, &scene.vertex_indices);

    section_header(&mut out, scene.attributes.len() as u64);
    for attr in &scene.attributes {
        write_attribute(&mut out, attr);
    }

    write_index_section(&mut out, &scene.attribute_indices);

    section_header(&mut out, scene.textures.len() as u64);
    for word in &scene.textures {
        out.extend_from_slice(&word.to_le_bytes());
    }

    out
}

fn section_header(out: &mut Vec<u8>, count: u64) {
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
}

/// Index sections round their counts up to even and pad with a zero.
fn write_index_section(out: &mut Vec<u8>, indices: &[u32]) {
    let padded = indices.len() + indices.len() % 2;
    section_header(out, padded as u64);
    for &i in indices {
        out.extend_from_slice(&(i as u64).to_le_bytes());
    }
    if indices.len() % 2 == 1 {
        out.extend_from_slice(&0u64.to_le_bytes());
    }
}

/// 48-byte record: normal, payload, discriminator, each padded out to
/// a 16-byte boundary.
fn write_attribute(out: &mut Vec<u8>, attr: &VertexAttribute) {
    for c in attr.normal.to_array() {
        out.extend_from_slice(&c.to_le_bytes());
    }
    match attr.shade {
        Shade::Color(c) => {
            for v in c.to_array() {
                out.extend_from_slice(&v.to_le_bytes());
            }
            out.extend_from_slice(&[0u8; 4]);
            out.extend_from_slice(&DISCRIMINATOR_COLOR.to_le_bytes());
        }
        Shade::Texture { index, uv } => {
            out.extend_from_slice(&index.to_le_bytes());
            out.extend_from_slice(&uv.x.to_le_bytes());
            out.extend_from_slice(&uv.y.to_le_bytes());
            out.extend_from_slice(&[0u8; 4]);
            out.extend_from_slice(&DISCRIMINATOR_TEXTURE.to_le_bytes());
        }
    }
    out.extend_from_slice(&[0u8; 12]);
}
