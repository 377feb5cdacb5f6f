//! Winit application shell
//!
//! Owns the window and the event loop, and wires raw window events into the
//! animation driver: wheel deltas through the scroll tracker, cursor moves
//! through the pointer tracker, occlusion changes into pause/resume and the
//! `D` key into the debug overlay toggle.
//!
//! GPU setup failure is not fatal. When the render engine cannot be created
//! the backdrop is simply disabled: the window stays up and every event
//! handler becomes a no-op.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::driver::AnimationDriver;
use crate::gfx::{camera::CameraRig, render_engine::RenderEngine, scene::build_scene};
use crate::input::{PointerTracker, ScrollTracker};

/// Pixels per wheel line, applied to `MouseScrollDelta::LineDelta`.
const LINE_HEIGHT: f32 = 60.0;

/// Virtual page height in viewport heights. Scrolling through the whole page
/// sweeps progress from 0 to 1.
const PAGE_HEIGHTS: f32 = 6.0;

pub struct BackdropApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    driver: Option<AnimationDriver>,
    scroll: ScrollTracker,
    pointer: PointerTracker,
    debug_enabled: bool,
    last_frame: Option<Instant>,
}

impl BackdropApp {
    /// Create a new backdrop application with default settings
    pub fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                driver: None,
                scroll: ScrollTracker::new(800.0, 800.0 * PAGE_HEIGHTS),
                pointer: PointerTracker::new(1200.0, 800.0),
                debug_enabled: false,
                last_frame: None,
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl Default for BackdropApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("backdrop")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();
            self.scroll
                .set_metrics(height as f32, height as f32 * PAGE_HEIGHTS);
            self.pointer.set_size(width as f32, height as f32);

            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height).await
            });

            match renderer {
                Ok(mut renderer) => {
                    let mut scene = build_scene(&mut rand::rng());
                    renderer.prepare_scene(&mut scene);

                    let aspect = width as f32 / (height as f32).max(1.0);
                    self.driver = Some(AnimationDriver::new(scene, CameraRig::new(aspect)));
                    self.render_engine = Some(renderer);
                }
                Err(err) => {
                    // The window stays up; every handler below no-ops.
                    log::warn!("backdrop disabled: {err}");
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key_code {
                winit::keyboard::KeyCode::Escape => event_loop.exit(),
                winit::keyboard::KeyCode::KeyD => {
                    if let Some(driver) = self.driver.as_mut() {
                        self.debug_enabled = !self.debug_enabled;
                        driver.toggle_debug(self.debug_enabled);
                        log::info!(
                            "debug overlay {}",
                            if self.debug_enabled { "on" } else { "off" }
                        );
                    }
                }
                _ => (),
            },
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(driver) = self.driver.as_mut() {
                    let (nx, ny) = self.pointer.normalize(position.x as f32, position.y as f32);
                    driver.update_pointer(nx, ny);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(driver) = self.driver.as_mut() {
                    // Wheel-down is a negative delta; the page scrolls down.
                    let pixels = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                    };
                    let progress = self.scroll.scroll_by(pixels);
                    driver.update_scroll(progress);
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(driver) = self.driver.as_mut() {
                    if occluded {
                        driver.pause();
                    } else {
                        driver.resume();
                        // Avoid one giant dt when the window comes back
                        self.last_frame = None;
                    }
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scroll
                    .set_metrics(height as f32, height as f32 * PAGE_HEIGHTS);
                self.pointer.set_size(width as f32, height as f32);
                if let Some(driver) = self.driver.as_mut() {
                    driver.handle_resize(width, height);
                }
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(driver), Some(render_engine)) =
                    (self.driver.as_mut(), self.render_engine.as_mut())
                else {
                    return;
                };

                let now = Instant::now();
                let dt = self
                    .last_frame
                    .map(|last| (now - last).as_secs_f32())
                    .unwrap_or(0.0);
                self.last_frame = Some(now);

                driver.tick(dt, render_engine);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
