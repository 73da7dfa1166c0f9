//! Core GPU context and device management.
//!
//! [`GpuContext`] owns the wgpu device, queue, surface and surface configuration.
//! It also decides how the per-draw record reaches the shaders: adapters that
//! expose `PUSH_CONSTANTS` get a real push-constant range, everything else
//! falls back to a small uniform buffer.

use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::window::Window;

use crate::push_constant::PUSH_CONSTANT_SIZE;
use crate::shader::BindingMode;

/// What to do after a failed surface acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceAction {
    /// Surface was reconfigured; try again next frame.
    Reconfigured,
    /// Transient error; skip this frame.
    SkipFrame,
    /// Unrecoverable; exit the event loop.
    Fatal,
}

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    /// How the record is bound for this device.
    pub binding_mode: BindingMode,
    adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let binding_mode = choose_binding_mode(adapter.features(), adapter.limits());

        let (required_features, required_limits) = match binding_mode {
            BindingMode::PushConstant => (
                wgpu::Features::PUSH_CONSTANTS,
                wgpu::Limits {
                    max_push_constant_size: PUSH_CONSTANT_SIZE,
                    ..wgpu::Limits::default()
                },
            ),
            BindingMode::Uniform => (wgpu::Features::empty(), wgpu::Limits::default()),
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Trigon Device"),
            required_features,
            required_limits,
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            binding_mode,
            adapter_info: adapter.get_info(),
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Zero-sized dimensions (window minimize) are ignored, so the resolution
    /// published to shaders never has a zero component.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Surface size as the record's `resolution` field.
    pub fn resolution(&self) -> [f32; 2] {
        [self.config.width as f32, self.config.height as f32]
    }

    /// One-line description of the adapter for the startup log.
    pub fn adapter_summary(&self) -> String {
        let info = &self.adapter_info;
        format!(
            "{} ({:?}, {:?}, vendor {}: {})",
            info.name,
            info.device_type,
            info.backend,
            vendor_name(info.vendor),
            info.driver_info
        )
    }

    /// Reconfigures or gives up after a failed `get_current_texture`.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                self.surface.configure(&self.device, &self.config);
                SurfaceAction::Reconfigured
            }
            SurfaceError::OutOfMemory => SurfaceAction::Fatal,
            SurfaceError::Timeout | SurfaceError::Other => SurfaceAction::SkipFrame,
        }
    }
}

/// Push constants need both the feature and enough room for the whole record.
pub fn choose_binding_mode(features: wgpu::Features, limits: wgpu::Limits) -> BindingMode {
    if features.contains(wgpu::Features::PUSH_CONSTANTS)
        && limits.max_push_constant_size >= PUSH_CONSTANT_SIZE
    {
        BindingMode::PushConstant
    } else {
        BindingMode::Uniform
    }
}

/// PCI vendor id to a readable name.
pub fn vendor_name(vendor: u32) -> &'static str {
    match vendor {
        0x1002 => "AMD",
        0x1010 => "ImgTec",
        0x10DE => "NVIDIA",
        0x13B5 => "ARM",
        0x5143 => "Qualcomm",
        0x8086 => "Intel",
        0x106B => "Apple",
        _ => "unknown",
    }
}
