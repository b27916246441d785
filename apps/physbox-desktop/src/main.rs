use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use physbox_common::{Color, CubeParams};
use physbox_input::{Command, InputState, Key};
use physbox_kernel::{Session, SessionConfig};
use physbox_physics::WorldConfig;
use physbox_render_wgpu::WgpuRenderer;
use physbox_tools::SessionInspector;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "physbox-desktop", about = "Physbox rigid-body sandbox")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// World configuration JSON; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for randomized cube placement
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn load_config(path: Option<&Path>) -> Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Host key codes the sandbox reacts to.
fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::Forward,
        KeyCode::KeyS => Key::Backward,
        KeyCode::KeyA => Key::Left,
        KeyCode::KeyD => Key::Right,
        KeyCode::Space => Key::Up,
        KeyCode::ControlLeft => Key::Down,
        KeyCode::ShiftLeft => Key::Boost,
        KeyCode::KeyF => Key::Fire,
        KeyCode::KeyR => Key::Reset,
        _ => return None,
    })
}

/// Everything the host keeps besides GPU state.
struct AppState {
    session: Session,
    input: InputState,
    show_panel: bool,
    mouse_captured: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(session: Session) -> Self {
        Self {
            session,
            input: InputState::new(),
            show_panel: true,
            mouse_captured: false,
            last_frame: Instant::now(),
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if code == KeyCode::F1 && pressed {
            self.show_panel = !self.show_panel;
            return;
        }
        if let Some(key) = map_key(code) {
            self.input
                .handle_key(key, pressed, self.session.queue_mut());
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        let summary = SessionInspector::summary(&self.session);

        egui::SidePanel::left("parameters")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Physbox");
                ui.separator();
                ui.label(format!("Frame: {}  Seed: {}", summary.frame, summary.seed));
                ui.label(format!(
                    "Entities: {} (cubes {}, projectiles {})",
                    summary.entities, summary.cubes, summary.projectiles
                ));
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    summary.camera.x, summary.camera.y, summary.camera.z
                ));
                ui.separator();

                ui.heading("Cube");
                let params = self.session.cube_params_mut();
                ui.add(
                    egui::Slider::new(
                        &mut params.size,
                        CubeParams::MIN_SIZE..=CubeParams::MAX_SIZE,
                    )
                    .text("size"),
                );
                ui.horizontal(|ui| {
                    let mut rgb = params.color.to_array();
                    if ui.color_edit_button_rgb(&mut rgb).changed() {
                        params.color = Color::from_array(rgb);
                    }
                    ui.label("colour");
                });
                ui.checkbox(&mut params.randomize_position, "Random position");
                let params = *params;
                if ui.button("Add cube").clicked() {
                    self.session.push(Command::SpawnCube(params));
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Fire (F)").clicked() {
                        self.session.push(Command::SpawnProjectile);
                    }
                    if ui.button("Reset (R)").clicked() {
                        self.session.push(Command::Reset);
                    }
                });

                ui.separator();
                ui.small("F1: panel | RMB: look | WASD/Space/Ctrl: move | Shift: fast");
            });
    }
}

/// Window, surface and device, plus the two renderers that draw into it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Physbox")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("physbox_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Draw the scene, then the panel on top, and present.
    fn draw(&mut self, egui_ctx: &EguiContext, state: &mut AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .render(&self.device, &self.queue, &view, state.session.scene());

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer.render(&mut pass, &paint_jobs, &screen);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(session: Session) -> Self {
        Self {
            state: AppState::new(session),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(mut gpu) => {
                let floor = self.state.session.config().world.floor;
                gpu.renderer
                    .set_grid(&gpu.device, floor.map(|f| f.half_extent));
                self.state.session.push(Command::SetViewport {
                    width: gpu.config.width,
                    height: gpu.config.height,
                });
                self.state.last_frame = Instant::now();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
                self.state.session.push(Command::SetViewport {
                    width: gpu.config.width,
                    height: gpu.config.height,
                });
            }
            WindowEvent::Focused(false) => {
                let state = &mut self.state;
                state.input.release_all(state.session.queue_mut());
                state.mouse_captured = false;
                gpu.window.set_cursor_visible(true);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                gpu.window.set_cursor_visible(!self.state.mouse_captured);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32();
                self.state.last_frame = now;

                if let Err(e) = self.state.session.frame(dt) {
                    tracing::error!("frame failed: {e}");
                    event_loop.exit();
                    return;
                }

                gpu.draw(&self.egui_ctx, &mut self.state);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_captured {
                self.state.session.push(Command::RotateCamera {
                    dx: delta.0 as f32,
                    dy: delta.1 as f32,
                });
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("physbox-desktop starting");

    let world = load_config(cli.config.as_deref())?;
    let session = Session::new(SessionConfig {
        world,
        seed: cli.seed,
    })?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(session);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_and_movement_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::KeyF), Some(Key::Fire));
        assert_eq!(map_key(KeyCode::KeyR), Some(Key::Reset));
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::Forward));
        assert_eq!(map_key(KeyCode::ShiftLeft), Some(Key::Boost));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn f1_toggles_panel_without_commands() {
        let session = Session::new(SessionConfig::default()).unwrap();
        let mut state = AppState::new(session);
        state.handle_key(KeyCode::F1, true);
        state.handle_key(KeyCode::F1, false);
        assert!(!state.show_panel);
        assert_eq!(state.session.pending_commands(), 0);
    }

    #[test]
    fn fire_key_queues_projectile() {
        let session = Session::new(SessionConfig::default()).unwrap();
        let mut state = AppState::new(session);
        state.handle_key(KeyCode::KeyF, true);
        state.handle_key(KeyCode::KeyF, false);
        assert_eq!(state.session.pending_commands(), 1);
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), WorldConfig::default());
    }
}
