pub mod camera;
pub mod perf;
/// First-person CPU software rasterizer.
/// Perspective-correct barycentric scan conversion over a baked scene,
/// with near-plane clipping and mip-selected texturing.
pub mod rendering;
pub mod scene;

pub use camera::{Camera, FrameInput};
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use rendering::{DepthBuffer, FrameArena, PixelSurface, RenderConfig, Renderer};
pub use scene::{load_scene, locate_scene_file, parse_scene, Scene, SceneError, Shade, VertexAttribute};
