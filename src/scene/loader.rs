/// Reader for the baked scene binary (`data.bin`).
///
/// Little-endian, five sections read sequentially. Each section opens
/// with two u64 words (count, padding); index counts are rounded up to
/// even, so the reader truncates them back to whole triangles.
use std::fmt;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3, Vec4};

use super::{Scene, Shade, VertexAttribute};

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    /// The file ended inside the named section.
    Truncated(&'static str),
    /// The file parsed but violates a format invariant.
    MalformedScene(String),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Truncated(section) => {
                write!(f, "scene file truncated in section '{}'", section)
            }
            SceneError::MalformedScene(detail) => write!(f, "malformed scene: {}", detail),
        }
    }
}

impl std::error::Error for SceneError {}

/// Attribute discriminator values in the binary format.
pub(crate) const DISCRIMINATOR_COLOR: u32 = 0;
pub(crate) const DISCRIMINATOR_TEXTURE: u32 = 1;

/// Size of one attribute record on disk: 16-byte normal, 16-byte
/// payload-plus-padding, discriminator padded out to the next 16.
pub(crate) const ATTRIBUTE_RECORD_BYTES: usize = 48;

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize, section: &'static str) -> Result<&'a [u8], SceneError> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or(SceneError::Truncated(section))?;
        if end > self.bytes.len() {
            return Err(SceneError::Truncated(section));
        }
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Section header: the count word followed by one padding word.
    fn header(&mut self, section: &'static str) -> Result<usize, SceneError> {
        let bytes = self.take(16, section)?;
        let count = bytemuck::pod_read_unaligned::<u64>(&bytes[0..8]);
        usize::try_from(count)
            .map_err(|_| SceneError::MalformedScene(format!("{section} count {count} overflows")))
    }

    fn u32s(&mut self, count: usize, section: &'static str) -> Result<Vec<u32>, SceneError> {
        let bytes = self.take(count * 4, section)?;
        Ok(bytemuck::pod_collect_to_vec(bytes))
    }

    fn f32s(&mut self, count: usize, section: &'static str) -> Result<Vec<f32>, SceneError> {
        let bytes = self.take(count * 4, section)?;
        Ok(bytemuck::pod_collect_to_vec(bytes))
    }

    fn u64s(&mut self, count: usize, section: &'static str) -> Result<Vec<u64>, SceneError> {
        let bytes = self.take(count * 8, section)?;
        Ok(bytemuck::pod_collect_to_vec(bytes))
    }
}

/// Parse a scene image from memory. Validation runs before returning,
/// so a successful parse is safe to render.
pub fn parse_scene(bytes: &[u8]) -> Result<Scene, SceneError> {
    let mut r = Reader::new(bytes);

    // Section 1: vertex positions.
    let vertex_count = r.header("vertices")?;
    let words = r.f32s(vertex_count * 4, "vertices")?;
    let vertices: Vec<Vec4> = words
        .chunks_exact(4)
        .map(|c| Vec4::new(c[0], c[1], c[2], c[3]))
        .collect();

    // Section 2: vertex indices, count padded up to even.
    let padded = r.header("vertex indices")?;
    let raw = r.u64s(padded, "vertex indices")?;
    let vertex_indices = narrow_indices(&raw, "vertex indices")?;

    // Section 3: attribute records.
    let attribute_count = r.header("attributes")?;
    let record_bytes = r.take(attribute_count * ATTRIBUTE_RECORD_BYTES, "attributes")?;
    let mut attributes = Vec::with_capacity(attribute_count);
    for record in record_bytes.chunks_exact(ATTRIBUTE_RECORD_BYTES) {
        attributes.push(parse_attribute(record)?);
    }

    // Section 4: attribute indices, also even-padded.
    let padded = r.header("attribute indices")?;
    let raw = r.u64s(padded, "attribute indices")?;
    let attribute_indices = narrow_indices(&raw, "attribute indices")?;

    // Section 5: texture atlas words.
    let texture_words = r.header("textures")?;
    let textures = r.u32s(texture_words, "textures")?;

    let scene = Scene {
        vertices,
        vertex_indices,
        attributes,
        attribute_indices,
        textures,
    };
    scene.validate()?;
    Ok(scene)
}

/// Drop the even-padding tail and narrow to u32, keeping whole triangles.
fn narrow_indices(raw: &[u64], section: &'static str) -> Result<Vec<u32>, SceneError> {
    let count = raw.len() - raw.len() % 3;
    raw[..count]
        .iter()
        .map(|&i| {
            u32::try_from(i).map_err(|_| {
                SceneError::MalformedScene(format!("{section}: index {i} exceeds u32 range"))
            })
        })
        .collect()
}

fn parse_attribute(record: &[u8]) -> Result<VertexAttribute, SceneError> {
    let f = |o: usize| bytemuck::pod_read_unaligned::<f32>(&record[o..o + 4]);
    let u = |o: usize| bytemuck::pod_read_unaligned::<u32>(&record[o..o + 4]);

    let normal = Vec4::new(f(0), f(4), f(8), f(12));
    let discriminator = u(32);
    let shade = match discriminator {
        DISCRIMINATOR_COLOR => Shade::Color(Vec3::new(f(16), f(20), f(24))),
        DISCRIMINATOR_TEXTURE => Shade::Texture {
            index: u(16),
            uv: Vec2::new(f(20), f(24)),
        },
        other => {
            return Err(SceneError::MalformedScene(format!(
                "unknown attribute discriminator {other}"
            )))
        }
    };
    Ok(VertexAttribute { normal, shade })
}

/// Find `data.bin` next to the executable image, falling back to the
/// generator's output directory for CLI runs.
pub fn locate_scene_file() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join("data.bin");
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    let fallback = Path::new("../data-generator/data.bin");
    if fallback.exists() {
        return Some(fallback.to_path_buf());
    }
    None
}

/// Load and parse a scene from an explicit path.
pub fn load_scene(path: &Path) -> Result<Scene, SceneError> {
    let bytes = std::fs::read(path)?;
    parse_scene(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_truncated() {
        assert!(matches!(parse_scene(&[]), Err(SceneError::Truncated(_))));
    }

    #[test]
    fn header_without_body_is_truncated() {
        // Claims 4 vertices, supplies none.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&4u64.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        assert!(matches!(
            parse_scene(&bytes),
            Err(SceneError::Truncated("vertices"))
        ));
    }

    #[test]
    fn unknown_discriminator_is_malformed() {
        let mut record = [0u8; ATTRIBUTE_RECORD_BYTES];
        record[32..36].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            parse_attribute(&record),
            Err(SceneError::MalformedScene(_))
        ));
    }

    #[test]
    fn color_record_round_trips() {
        let mut record = [0u8; ATTRIBUTE_RECORD_BYTES];
        for (i, v) in [0.0f32, 0.0, 1.0, 0.0].iter().enumerate() {
            record[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        for (i, v) in [0.25f32, 0.5, 0.75].iter().enumerate() {
            record[16 + i * 4..20 + i * 4].copy_from_slice(&v.to_le_bytes());
        }
        record[32..36].copy_from_slice(&DISCRIMINATOR_COLOR.to_le_bytes());

        let attr = parse_attribute(&record).unwrap();
        assert_eq!(attr.normal, Vec4::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(attr.shade, Shade::Color(Vec3::new(0.25, 0.5, 0.75)));
    }

    #[test]
    fn texture_record_round_trips() {
        let mut record = [0u8; ATTRIBUTE_RECORD_BYTES];
        record[16..20].copy_from_slice(&3u32.to_le_bytes());
        record[20..24].copy_from_slice(&0.5f32.to_le_bytes());
        record[24..28].copy_from_slice(&0.125f32.to_le_bytes());
        record[32..36].copy_from_slice(&DISCRIMINATOR_TEXTURE.to_le_bytes());

        let attr = parse_attribute(&record).unwrap();
        assert_eq!(
            attr.shade,
            Shade::Texture {
                index: 3,
                uv: Vec2::new(0.5, 0.125)
            }
        );
    }
}
