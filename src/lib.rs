//! # Trigon
//!
//! **A live-coding shader playground built on one full-screen triangle.**
//!
//! Trigon opens a window, writes a default shader pair into `shaders/` if the
//! folder is missing, and redraws every frame with three vertices and no
//! vertex buffer. Edit either file and the pipeline is rebuilt on the fly; a
//! broken edit keeps the last working version on screen.
//!
//! ## Quick Start
//!
//! ```no_run
//! use trigon::{AppConfig, LoggingConfig, init_logging};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(LoggingConfig::default());
//!     trigon::run(AppConfig::new().title("Plasma").shader_dir("plasma"))
//! }
//! ```
//!
//! ## What shaders get
//!
//! Both stages are compiled behind a generated prelude that declares the
//! per-draw [`PushConstant`] record as `pc`:
//!
//! - `pc.pos`: free position, moved with the arrow keys
//! - `pc.time`: playback time in seconds (pausable, steppable)
//! - `pc.resolution`: target size in pixels
//! - `pc.mouse`: cursor in `[-1, 1]`, y up
//! - `pc.mouse_pressed`, `pc.frame`
//!
//! The vertex stage ([`VERTEX_SHADER_WGSL`]) hands the fragment stage a
//! centered, aspect-corrected `uv` at `@location(0)`. [`vertex::generate`] is
//! the same computation on the CPU.

mod app;
mod capture;
mod clock;
mod config;
mod dump;
mod gpu;
mod hot_shader;
mod input;
mod logging;
mod playground_pass;
mod push_constant;
pub mod shader;
pub mod vertex;

pub use app::run;
pub use capture::{CAPTURE_FORMAT, Screenshot, capture_frame, save_png};
pub use clock::Clock;
pub use config::{AppConfig, SHADER_DIR_ENV};
pub use dump::save_shaders;
pub use gpu::{GpuContext, SurfaceAction};
pub use hot_shader::{HotPlaygroundPass, HotShader, ShaderPair};
pub use input::Input;
pub use logging::{LoggingConfig, init_logging};
pub use playground_pass::PlaygroundPass;
pub use push_constant::{PUSH_CONSTANT_SIZE, PushConstant};
pub use shader::{BindingMode, ShaderError};
pub use vertex::{FULLSCREEN_VERTEX_COUNT, VERTEX_SHADER_WGSL, VertexOutput};

// Re-export glam math types for convenience
pub use glam::{Vec2, Vec4};
