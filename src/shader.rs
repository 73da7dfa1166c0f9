//! Shader sources: the generated prelude, default shaders, and compile errors.
//!
//! Every playground shader is compiled as `prelude + source`. The prelude
//! declares the [`PushConstant`](crate::PushConstant) record as `pc`, in the
//! push-constant address space when the device supports it and as a uniform
//! at `@group(0) @binding(0)` otherwise. User shaders read `pc.time`,
//! `pc.resolution` and friends without caring which one is active.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::vertex::VERTEX_SHADER_WGSL;

/// File name of the vertex shader inside the shader directory.
pub const VERTEX_SHADER_FILE: &str = "shader.vert.wgsl";

/// File name of the fragment shader inside the shader directory.
pub const FRAGMENT_SHADER_FILE: &str = "shader.frag.wgsl";

/// Fragment entry point name.
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// How the per-draw record reaches the shaders.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingMode {
    /// A push-constant range visible to the vertex and fragment stages.
    PushConstant,
    /// A uniform buffer at `@group(0) @binding(0)`.
    Uniform,
}

const RECORD_STRUCT: &str = "struct PushConstant {
    pos: vec3f,
    time: f32,
    resolution: vec2f,
    mouse: vec2f,
    mouse_pressed: u32,
    frame: u32,
}
";

/// WGSL declaring the record as `pc` for the given binding mode.
pub fn prelude(mode: BindingMode) -> String {
    let binding = match mode {
        BindingMode::PushConstant => "var<push_constant> pc: PushConstant;",
        BindingMode::Uniform => "@group(0) @binding(0) var<uniform> pc: PushConstant;",
    };
    format!("{RECORD_STRUCT}\n{binding}\n\n")
}

/// Prepends the prelude to a user shader.
pub fn compose(mode: BindingMode, source: &str) -> String {
    let mut out = prelude(mode);
    out.push_str(source);
    out
}

/// Animated default fragment shader written when no shader directory exists.
pub const DEFAULT_FRAGMENT_WGSL: &str = r#"// `pc` is declared by the prelude: pos, time, resolution, mouse, mouse_pressed, frame.

@fragment
fn fs_main(@location(0) uv: vec2f) -> @location(0) vec4f {
    let aspect = pc.resolution.x / pc.resolution.y;
    let mouse = pc.mouse * vec2f(aspect, 1.0);

    let d = length(uv - mouse);
    let ring = 0.5 + 0.5 * cos(12.0 * d - 3.0 * pc.time);
    let glow = select(0.0, 0.25, pc.mouse_pressed != 0u) / (1.0 + 8.0 * d);

    let col = 0.5 + 0.5 * cos(pc.time + uv.xyx + vec3f(0.0, 2.0, 4.0));
    return vec4f(col * ring + glow, 1.0);
}
"#;

/// Writes the default shader pair into `dir` if the directory does not exist yet.
///
/// Returns `true` when the shaders were created. An existing directory is left
/// untouched, even if it is missing one of the files.
pub fn create_default_shaders(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create shader directory {}", dir.display()))?;

    for (name, source) in [
        (VERTEX_SHADER_FILE, VERTEX_SHADER_WGSL),
        (FRAGMENT_SHADER_FILE, DEFAULT_FRAGMENT_WGSL),
    ] {
        let path = dir.join(name);
        fs::write(&path, source)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("created default shader {}", path.display());
    }

    Ok(true)
}

/// Paths of the vertex and fragment shaders inside `dir`.
pub fn shader_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(VERTEX_SHADER_FILE), dir.join(FRAGMENT_SHADER_FILE))
}

/// Errors that can occur when building a playground pipeline.
#[derive(Debug)]
pub enum ShaderError {
    /// A shader file could not be read.
    Io(std::io::Error),
    /// wgpu rejected the shader or pipeline.
    Validation(String),
}

impl std::fmt::Display for ShaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderError::Io(e) => write!(f, "IO error: {}", e),
            ShaderError::Validation(msg) => write!(f, "Shader validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShaderError {
    fn from(e: std::io::Error) -> Self {
        ShaderError::Io(e)
    }
}
