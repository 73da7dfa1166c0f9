use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::capture;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::dump;
use crate::gpu::{GpuContext, SurfaceAction};
use crate::hot_shader::HotPlaygroundPass;
use crate::input::Input;
use crate::push_constant::PushConstant;
use crate::shader::{create_default_shaders, shader_paths};

const HELP: &[(&str, &str)] = &[
    ("F1", "Print help"),
    ("F2", "Toggle play/pause"),
    ("F3", "Pause and step back one frame"),
    ("F4", "Pause and step forward one frame"),
    ("F5", "Restart playback at frame 0 (time and pos = 0)"),
    ("F6", "Print parameters"),
    ("F10", "Save shaders"),
    ("F11", "Take screenshot"),
    ("ESC", "Exit"),
    ("Arrows, PgUp/PgDn", "Move pos"),
];

/// Run the playground until the window closes.
///
/// Creates the default shader pair in `config.shader_dir` if the directory is
/// missing, then watches both files and recompiles on change.
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TrigonApp::Pending { config };
    event_loop.run_app(&mut app).context("event loop error")?;

    match app {
        TrigonApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum TrigonApp {
    Pending { config: AppConfig },
    Running(Box<Playground>),
    Failed(anyhow::Error),
}

/// Everything alive while the window is open.
struct Playground {
    config: AppConfig,
    window: Arc<Window>,
    gpu: GpuContext,
    pass: HotPlaygroundPass,
    input: Input,
    clock: Clock,
    pc: PushConstant,
    last_frame: Instant,
}

impl Playground {
    fn new(event_loop: &ActiveEventLoop, config: AppConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );
        let gpu = GpuContext::new(window.clone())?;

        log::info!("adapter: {}", gpu.adapter_summary());
        log::info!("record binding: {:?}", gpu.binding_mode);

        create_default_shaders(&config.shader_dir)?;
        let (vertex, fragment) = shader_paths(&config.shader_dir);
        let pass = HotPlaygroundPass::new(&gpu, &vertex, &fragment)
            .with_context(|| format!("failed to load shaders from {}", config.shader_dir.display()))?;
        if !pass.is_valid() {
            log::warn!("no shader compiled yet; the window stays black until one does");
        }

        log::info!(
            "shader directory: {}",
            config
                .shader_dir
                .canonicalize()
                .unwrap_or_else(|_| config.shader_dir.clone())
                .display()
        );
        print_help();

        let pc = PushConstant::new(gpu.resolution());

        Ok(Self {
            config,
            window,
            gpu,
            pass,
            input: Input::new(),
            clock: Clock::new(),
            pc,
            last_frame: Instant::now(),
        })
    }

    /// Key bindings. Returns `false` when the app should exit.
    fn handle_keys(&mut self) -> bool {
        let input = &self.input;

        if input.key_pressed(KeyCode::Escape) {
            return false;
        }
        if input.key_pressed(KeyCode::F1) {
            print_help();
        }
        if input.key_pressed(KeyCode::F2) {
            let paused = self.clock.toggle_pause();
            log::info!("{}", if paused { "paused" } else { "playing" });
        }
        if input.key_pressed(KeyCode::F3) {
            self.clock.step_back();
        }
        if input.key_pressed(KeyCode::F4) {
            self.clock.step_forward();
        }
        if input.key_pressed(KeyCode::F5) {
            self.clock.restart();
            self.pc.restart();
        }
        if input.key_pressed(KeyCode::F6) {
            log::info!("parameters:\n{}", self.pc);
        }
        if input.key_pressed(KeyCode::F10) {
            if let Err(e) = dump::save_shaders(&self.config.dump_dir, self.pass.sources()) {
                log::error!("shader dump failed: {e:#}");
            }
        }
        if input.key_pressed(KeyCode::F11) {
            let started = Instant::now();
            match capture::capture_frame(&self.gpu, &self.pass, &self.pc) {
                Ok(shot) => {
                    log::debug!("captured frame in {:?}", started.elapsed());
                    capture::save_in_background(shot, self.config.screenshot_dir.clone());
                }
                Err(e) => log::error!("screenshot failed: {e:#}"),
            }
        }

        true
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let resolution = self.gpu.resolution();
        self.pc.resolution = resolution;
        self.input.apply_buttons(&mut self.pc);
        if !self.clock.is_paused() {
            self.input.apply_motion(&mut self.pc, Vec2::from(resolution), dt);
            self.pc.frame = self.pc.frame.wrapping_add(1);
        }
        self.pc.time = self.clock.time();
    }

    /// Draws one frame. Returns `false` on a fatal surface error.
    fn render(&mut self) -> bool {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                let action = self.gpu.handle_surface_error(e);
                log::debug!("surface acquire failed: {action:?}");
                return action != SurfaceAction::Fatal;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Playground Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Playground Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pass.render(&self.gpu, &mut render_pass, &self.pc);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        true
    }
}

impl ApplicationHandler for TrigonApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let TrigonApp::Pending { config } = self else {
            return;
        };

        *self = match Playground::new(event_loop, config.clone()) {
            Ok(playground) => {
                playground.window.request_redraw();
                TrigonApp::Running(Box::new(playground))
            }
            Err(err) => {
                event_loop.exit();
                TrigonApp::Failed(err)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let TrigonApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                app.pass.check_reload(&app.gpu);

                if !app.handle_keys() {
                    event_loop.exit();
                    return;
                }

                app.update();

                if !app.render() {
                    log::error!("surface is out of memory, exiting");
                    event_loop.exit();
                    return;
                }

                app.input.begin_frame();
                app.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn print_help() {
    let mut text = String::from("key bindings:");
    for (key, action) in HELP {
        text.push_str(&format!("\n  {key:<18} {action}"));
    }
    log::info!("{text}");
}
