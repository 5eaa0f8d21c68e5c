/// Texture atlas sampling and pyramid construction.
///
/// Each texture is a 512x512 word block holding a full mipmap pyramid:
/// the NxN level lives in the square at offset `511 & !(2N - 1)` along
/// both axes, so level 256 fills the origin corner and level 1 sits at
/// (510, 510). Words are packed 0x00RRGGBB.
use glam::Vec2;

use crate::scene::{ATLAS_SHIFT, TEXTURE_WORDS};

/// Base image edge length fed to the pyramid builder; also the largest
/// mip level.
pub const BASE_DIM: usize = 256;

/// Borrowed view over one texture's pyramid words.
#[derive(Copy, Clone)]
pub struct TextureView<'a> {
    words: &'a [u32],
}

impl<'a> TextureView<'a> {
    #[inline]
    pub fn new(words: &'a [u32]) -> Self {
        debug_assert_eq!(words.len(), TEXTURE_WORDS);
        Self { words }
    }

    /// Sample with per-pixel mip selection.
    ///
    /// `m` is the perspective-corrected UV, `z` the interpolated
    /// reciprocal depth, `dz` the screen-space gradient of 1/z and
    /// `tpp` the screen-space gradient of UV/z; together they give the
    /// texel footprint of the pixel without per-pixel derivatives.
    #[inline]
    pub fn sample(&self, m: Vec2, z: f32, dz: Vec2, tpp: Vec2) -> u32 {
        let lx = mip_extent(z / (tpp.x - m.x * dz.x));
        let ly = mip_extent(z / (tpp.y - m.y * dz.y));
        let x = (m.x.fract() * lx as f32) as u32 + mip_origin(lx);
        let y = (m.y.fract() * ly as f32) as u32 + mip_origin(ly);
        self.words[(x + (y << ATLAS_SHIFT)) as usize]
    }
}

/// Clamp a footprint extent to [1, 256] and round up to a power of two.
#[inline]
pub fn mip_extent(raw: f32) -> u32 {
    let e = raw.abs().clamp(1.0, 256.0);
    (e.ceil() as u32).next_power_of_two()
}

/// Corner offset of the NxN level inside the 512x512 pyramid.
#[inline]
pub fn mip_origin(extent: u32) -> u32 {
    511 & !(2 * extent - 1)
}

/// Build one pyramid from a 256x256 base image, box-filtering each
/// successive level down to 1x1.
pub fn build_pyramid(base: &[u32]) -> Vec<u32> {
    assert_eq!(base.len(), BASE_DIM * BASE_DIM, "base image must be 256x256");

    let mut words = vec![0u32; TEXTURE_WORDS];
    let mut level = base.to_vec();
    let mut dim = BASE_DIM;
    loop {
        let origin = mip_origin(dim as u32) as usize;
        for y in 0..dim {
            let row = (origin + y) << ATLAS_SHIFT as usize;
            words[row + origin..row + origin + dim].copy_from_slice(&level[y * dim..(y + 1) * dim]);
        }
        if dim == 1 {
            break;
        }
        level = downsample(&level, dim);
        dim /= 2;
    }
    words
}

/// Average 2x2 blocks of packed RGB words into one.
fn downsample(src: &[u32], dim: usize) -> Vec<u32> {
    let half = dim / 2;
    let mut out = vec![0u32; half * half];
    for y in 0..half {
        for x in 0..half {
            let mut r = 0u32;
            let mut g = 0u32;
            let mut b = 0u32;
            for (sy, sx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let w = src[(2 * y + sy) * dim + 2 * x + sx];
                r += (w >> 16) & 0xFF;
                g += (w >> 8) & 0xFF;
                b += w & 0xFF;
            }
            out[y * half + x] = ((r / 4) << 16) | ((g / 4) << 8) | (b / 4);
        }
    }
    out
}

/// 256x256 checkerboard base image with the given cell size.
pub fn checkerboard_base(c1: u32, c2: u32, cell: usize) -> Vec<u32> {
    let mut out = vec![0u32; BASE_DIM * BASE_DIM];
    for y in 0..BASE_DIM {
        for x in 0..BASE_DIM {
            out[y * BASE_DIM + x] = if ((x / cell) + (y / cell)) % 2 == 0 {
                c1
            } else {
                c2
            };
        }
    }
    out
}

/// 256x256 two-tone value-noise base image.
pub fn noise_base(base: u32, dark: u32) -> Vec<u32> {
    let mut out = vec![0u32; BASE_DIM * BASE_DIM];
    let mut seed: u32 = 12345;
    for word in out.iter_mut() {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        *word = if (seed >> 16) & 1 == 0 { base } else { dark };
    }
    out
}
