use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{
    ColorMode, SceneMode, Settings, DROPLET_COUNT_STEP, DROPLET_VELOCITY_STEP, FADE_STEP,
    GRAVITY_STEP, SPLASH_DELAY_STEP, SPLASH_SPREAD_STEP, WAVE_SPEED_STEP, WAVE_STRENGTH_STEP,
    WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::error::StartupError;
use crate::frame::run_frame;
use crate::gpu::{GpuContext, PresentPipeline, SurfaceBuffers};
use crate::render::{Painter, PixelSurface};
use crate::simulation::World;

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    buffers: Option<SurfaceBuffers>,
    present_pipeline: Option<PresentPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    surface: PixelSurface,
    world: World,
    settings: Settings,
    /// Last cursor position in logical pixels
    cursor: Option<Vec2>,
    modifiers: ModifiersState,
    clock: Instant,
    fps_counter: FpsCounter,
}

impl App {
    pub fn new() -> Self {
        let surface = PixelSurface::new(WINDOW_WIDTH, WINDOW_HEIGHT, 1.0);
        let world = World::new(surface.size());
        Self {
            window: None,
            gpu: None,
            buffers: None,
            present_pipeline: None,
            bind_group: None,
            surface,
            world,
            settings: Settings::from_env(),
            cursor: None,
            modifiers: ModifiersState::empty(),
            clock: Instant::now(),
            fps_counter: FpsCounter::new(),
        }
    }

    fn now(&self) -> f32 {
        self.clock.elapsed().as_secs_f32()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), StartupError> {
        log::info!("Initializing splash waves...");

        let window_attrs = Window::default_attributes()
            .with_title("Splash Waves - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        log::info!("Creating present pipeline...");
        let present_pipeline = PresentPipeline::new(&gpu.device, gpu.format());

        self.window = Some(window.clone());
        self.gpu = Some(gpu);
        self.present_pipeline = Some(present_pipeline);
        self.resize(window.inner_size(), window.scale_factor());

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Click/Tap: Splash");
        log::info!("  Tab / Shift+Tab: Next/previous shape");
        log::info!("  X: Toggle random shape per splash");
        log::info!("  Space: Toggle rings/pool scene");
        log::info!("  C: Toggle monochrome/colorful");
        log::info!("  P: Cycle droplet palette");
        log::info!("  T: Toggle trails, D: Toggle droplets");
        log::info!("  A: Toggle auto-click, M: Toggle collision damping");
        log::info!("  Up/Down: Wave speed, Left/Right: Droplet count");
        log::info!("  +/-: Wave strength, [/]: Background fade");
        log::info!("  G, V, L, S (Shift lowers): Gravity, velocity, delay, spread");
        log::info!("  R: Reset");
        log::info!("  Escape: Quit");
        Ok(())
    }

    /// Match the raster, GPU buffers and world bounds to the window
    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface
            .resize(size.width, size.height, scale_factor as f32);
        self.world.resize(self.surface.size());

        let (Some(gpu), Some(pipeline)) = (self.gpu.as_mut(), self.present_pipeline.as_ref()) else {
            return;
        };
        gpu.resize(size);
        let buffers = SurfaceBuffers::new(&gpu.device, &gpu.queue, size.width, size.height);
        self.bind_group = Some(pipeline.create_bind_group(&gpu.device, &buffers.pixels, &buffers.params));
        self.buffers = Some(buffers);
    }

    fn splash(&mut self, pos: Vec2) {
        let now = self.now();
        self.world.spawn(pos, &mut self.settings, now);
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.now();
        run_frame(&mut self.world, &mut self.settings, &mut self.surface, now);

        let (Some(gpu), Some(buffers), Some(pipeline), Some(bind_group)) = (
            self.gpu.as_ref(),
            self.buffers.as_ref(),
            self.present_pipeline.as_ref(),
            self.bind_group.as_ref(),
        ) else {
            return;
        };

        buffers.upload(&gpu.queue, self.surface.pack());

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        pipeline.draw(&mut encoder, &view, bind_group);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.fps_counter.tick() {
            if let Some(window) = &self.window {
                let random = if self.settings.random_shape { " (random)" } else { "" };
                let scene = match self.settings.scene {
                    SceneMode::Rings => "Rings",
                    SceneMode::Pool => "Pool",
                };
                window.set_title(&format!(
                    "Splash Waves - {:.0} FPS - {}{} - {} - {} waves",
                    fps,
                    self.settings.shape.name(),
                    random,
                    scene,
                    self.world.waves().len()
                ));
            }
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let lower = self.modifiers.shift_key();
        let settings = &mut self.settings;
        match key_code {
            KeyCode::Space => {
                settings.scene = match settings.scene {
                    SceneMode::Rings => SceneMode::Pool,
                    SceneMode::Pool => SceneMode::Rings,
                };
                log::info!("Scene: {:?}", settings.scene);
            }

            KeyCode::Tab => {
                settings.shape = if lower {
                    settings.shape.previous()
                } else {
                    settings.shape.next()
                };
                log::info!("Shape: {}", settings.shape.name());
            }
            KeyCode::KeyX => {
                settings.random_shape = !settings.random_shape;
                log::info!("Random shape: {}", on_off(settings.random_shape));
            }

            KeyCode::KeyC => {
                settings.color_mode = match settings.color_mode {
                    ColorMode::Monochrome => ColorMode::Colorful,
                    ColorMode::Colorful => ColorMode::Monochrome,
                };
                log::info!("Color mode: {:?}", settings.color_mode);
            }
            KeyCode::KeyP => {
                settings.palette = settings.palette.next();
                log::info!("Palette: {}", settings.palette.name());
            }
            KeyCode::KeyT => {
                settings.trail_effect = !settings.trail_effect;
                log::info!("Trail effect: {}", on_off(settings.trail_effect));
            }
            KeyCode::KeyD => {
                settings.particles = !settings.particles;
                log::info!("Droplets: {}", on_off(settings.particles));
            }
            KeyCode::KeyM => {
                settings.collision_damping = !settings.collision_damping;
                log::info!("Collision damping: {}", on_off(settings.collision_damping));
            }

            KeyCode::ArrowUp => {
                settings.wave_speed += WAVE_SPEED_STEP;
                log::info!("Wave speed: {:.1}", settings.wave_speed);
            }
            KeyCode::ArrowDown => {
                settings.wave_speed = (settings.wave_speed - WAVE_SPEED_STEP).max(0.0);
                log::info!("Wave speed: {:.1}", settings.wave_speed);
            }
            KeyCode::ArrowRight => {
                settings.droplet_count += DROPLET_COUNT_STEP;
                log::info!("Droplet count: {}", settings.droplet_count);
            }
            KeyCode::ArrowLeft => {
                settings.droplet_count = settings.droplet_count.saturating_sub(DROPLET_COUNT_STEP);
                log::info!("Droplet count: {}", settings.droplet_count);
            }
            KeyCode::Equal => {
                settings.wave_strength += WAVE_STRENGTH_STEP;
                log::info!("Wave strength: {:.1}", settings.wave_strength);
            }
            KeyCode::Minus => {
                settings.wave_strength = (settings.wave_strength - WAVE_STRENGTH_STEP).max(0.0);
                log::info!("Wave strength: {:.1}", settings.wave_strength);
            }
            KeyCode::BracketLeft => {
                settings.background_fade = (settings.background_fade - FADE_STEP).max(0.0);
                log::info!("Background fade: {:.2}", settings.background_fade);
            }
            KeyCode::BracketRight => {
                settings.background_fade = (settings.background_fade + FADE_STEP).min(1.0);
                log::info!("Background fade: {:.2}", settings.background_fade);
            }
            KeyCode::KeyG => {
                settings.gravity_intensity = step(settings.gravity_intensity, GRAVITY_STEP, lower);
                log::info!("Gravity: {:.1}", settings.gravity_intensity);
            }
            KeyCode::KeyV => {
                settings.droplet_velocity =
                    step(settings.droplet_velocity, DROPLET_VELOCITY_STEP, lower);
                log::info!("Droplet velocity: {:.0}", settings.droplet_velocity);
            }
            KeyCode::KeyL => {
                settings.splash_delay = step(settings.splash_delay, SPLASH_DELAY_STEP, lower);
                log::info!("Splash delay: {:.2}s", settings.splash_delay);
            }
            KeyCode::KeyS => {
                settings.splash_spread = step(settings.splash_spread, SPLASH_SPREAD_STEP, lower);
                log::info!("Splash spread: {:.1}", settings.splash_spread);
            }

            KeyCode::KeyA => {
                if self.world.is_auto_clicking() {
                    self.world.stop_auto_click();
                    log::info!("Auto-click: OFF");
                } else {
                    let now = self.now();
                    self.world
                        .start_auto_click(self.settings.auto_click_interval, now);
                    log::info!("Auto-click: every {:.1}s", self.settings.auto_click_interval);
                }
            }
            KeyCode::KeyR => {
                self.world.reset();
                self.surface.clear();
                log::info!("Reset");
            }

            _ => {}
        }
    }
}

/// Raise or lower a control by one step, never below zero
fn step(value: f32, amount: f32, lower: bool) -> f32 {
    if lower {
        (value - amount).max(0.0)
    } else {
        value + amount
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("{}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale = self.surface.scale_factor();
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32) / scale);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(pos) = self.cursor {
                    self.splash(pos);
                }
            }
            WindowEvent::Touch(touch) => {
                if touch.phase == TouchPhase::Started {
                    let scale = self.surface.scale_factor();
                    let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32) / scale;
                    self.splash(pos);
                }
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                let scale = self
                    .window
                    .as_ref()
                    .map_or(1.0, |window| window.scale_factor());
                self.resize(new_size, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed to {:.2}", scale_factor);
                if let Some(size) = self.window.as_ref().map(|window| window.inner_size()) {
                    self.resize(size, scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render(event_loop);
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
