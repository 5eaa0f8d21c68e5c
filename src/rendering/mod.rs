/// Software rasterization pipeline: vertex transform, near-plane
/// clipping, perspective-correct scan conversion, fragment shading.
pub mod arena;
pub mod clip;
pub mod framebuffer;
pub mod raster;
pub mod renderer;
pub mod shading;
pub mod texture;

pub use arena::FrameArena;
pub use framebuffer::{DepthBuffer, PixelSurface};
pub use renderer::Renderer;

/// Fixed projection and control tunables.
#[derive(Copy, Clone, Debug)]
pub struct RenderConfig {
    /// Camera-space depth of the near plane.
    pub near: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub move_speed: f32,
    pub rotation_speed: f32,
    /// Packed 0x00RRGGBB clear color.
    pub background: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            fov: std::f32::consts::PI / 5.0,
            move_speed: 0.1,
            rotation_speed: 0.3,
            background: 0x001E1E1E,
        }
    }
}

impl RenderConfig {
    /// Half-height of the image plane at the near distance.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.near * (self.fov / 2.0).tan()
    }

    /// Projection factor mapping camera-space x/y to pixels for a
    /// given output height.
    #[inline]
    pub fn factor(&self, height: usize) -> f32 {
        self.near * height as f32 / (2.0 * self.scale())
    }
}
