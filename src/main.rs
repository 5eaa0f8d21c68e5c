/// Viewer entry point
/// Owns the window, collects input, and calls the renderer once per
/// frame with the presentation buffer.
use glam::Vec2;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
use std::num::NonZeroU32;
use std::process;
use std::sync::Arc;
use std::time::Instant;
use softraster::{FrameInput, PixelSurface, Renderer, SceneError, FUNCTION_COUNTERS};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

/// Exit code when no scene file can be found on the search path.
const EXIT_NO_SCENE: i32 = 666;

/// Keyboard and mouse state folded into the renderer's per-frame input.
struct InputCollector {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    boost: bool,
    mouse_captured: bool,
    /// Absolute mouse position, accumulated from raw deltas while
    /// captured.
    mouse: Vec2,
}

impl InputCollector {
    fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            boost: false,
            mouse_captured: false,
            mouse: Vec2::ZERO,
        }
    }

    fn frame_input(&self) -> FrameInput {
        let amount = if self.boost { 2.0 } else { 1.0 };
        FrameInput {
            up: if self.forward { amount } else { 0.0 },
            down: if self.backward { amount } else { 0.0 },
            left: if self.left { amount } else { 0.0 },
            right: if self.right { amount } else { 0.0 },
            mouse: self.mouse,
        }
    }
}

fn main() {
    println!("=== softraster ===");
    println!("Controls:");
    println!("  WASD - Move camera (hold Shift to double speed)");
    println!("  Click - Capture mouse, then look around");
    println!("  P - Print pipeline counters");
    println!("  ESC - Release mouse / exit");
    println!();

    let scene = match softraster::locate_scene_file() {
        Some(path) => match softraster::load_scene(&path) {
            Ok(scene) => {
                println!(
                    "Loaded {} ({} triangles, {} textures)",
                    path.display(),
                    scene.triangle_count(),
                    scene.texture_count()
                );
                scene
            }
            Err(err @ SceneError::Io(_)) => {
                eprintln!("failed to read {}: {err}", path.display());
                process::exit(EXIT_NO_SCENE);
            }
            Err(err) => {
                eprintln!("failed to load {}: {err}", path.display());
                process::exit(1);
            }
        },
        None => {
            eprintln!("data.bin not found next to the executable or in ../data-generator/");
            process::exit(EXIT_NO_SCENE);
        }
    };

    let mut renderer = Renderer::new(scene);
    let mut input = InputCollector::new();

    let event_loop = EventLoop::new().unwrap();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("softraster")
            .with_inner_size(winit::dpi::LogicalSize::new(960, 540))
            .build(&event_loop)
            .unwrap(),
    );

    let context = softbuffer::Context::new(window.clone()).unwrap();
    let mut surface = softbuffer::Surface::new(&context, window.clone()).unwrap();

    // Timing
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let pressed = event.state == ElementState::Pressed;

                        if let PhysicalKey::Code(keycode) = event.physical_key {
                            match keycode {
                                KeyCode::KeyW => input.forward = pressed,
                                KeyCode::KeyS => input.backward = pressed,
                                KeyCode::KeyA => input.left = pressed,
                                KeyCode::KeyD => input.right = pressed,
                                KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                                    input.boost = pressed
                                }
                                KeyCode::KeyP if pressed => {
                                    FUNCTION_COUNTERS.snapshot().print_report();
                                    FUNCTION_COUNTERS.reset();
                                }
                                KeyCode::Escape if pressed => {
                                    if input.mouse_captured {
                                        input.mouse_captured = false;
                                        window.set_cursor_visible(true);
                                    } else {
                                        elwt.exit();
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left && state == ElementState::Pressed {
                            input.mouse_captured = true;
                            window.set_cursor_visible(false);
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let size = window.inner_size();
                        let (width, height) =
                            (size.width.max(1) as usize, size.height.max(1) as usize);

                        surface
                            .resize(
                                NonZeroU32::new(width as u32).unwrap(),
                                NonZeroU32::new(height as u32).unwrap(),
                            )
                            .unwrap();

                        let mut buffer = surface.buffer_mut().unwrap();
                        let mut pixels = PixelSurface::new(&mut buffer, width, height);
                        renderer.render(&mut pixels, &input.frame_input());
                        buffer.present().unwrap();

                        frame_count += 1;
                        if fps_timer.elapsed().as_secs() >= 1 {
                            println!("FPS: {}", frame_count);
                            frame_count = 0;
                            fps_timer = Instant::now();
                        }
                    }
                    _ => {}
                },
                Event::DeviceEvent {
                    event: DeviceEvent::MouseMotion { delta },
                    ..
                } => {
                    if input.mouse_captured {
                        input.mouse += Vec2::new(delta.0 as f32, delta.1 as f32);
                    }
                }
                Event::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .unwrap();
}
