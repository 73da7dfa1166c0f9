//! The per-draw parameter record shared by every playground shader.
//!
//! [`PushConstant`] is uploaded once per frame, either as a real push-constant
//! range or as a uniform buffer (see [`BindingMode`](crate::BindingMode)). The
//! layout matches the WGSL struct emitted by [`prelude`](crate::shader::prelude):
//!
//! ```wgsl
//! struct PushConstant {
//!     pos: vec3f,
//!     time: f32,
//!     resolution: vec2f,
//!     mouse: vec2f,
//!     mouse_pressed: u32,
//!     frame: u32,
//! }
//! ```
//!
//! `vec3f` has 16-byte alignment but a 12-byte size, so `time` packs into the
//! fourth lane. The WGSL struct size rounds up to 48 bytes, hence the trailing
//! padding words.

use std::fmt;

/// Size in bytes of [`PushConstant`] as seen by the GPU.
pub const PUSH_CONSTANT_SIZE: u32 = std::mem::size_of::<PushConstant>() as u32;

/// Parameters supplied fresh for every draw call.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PushConstant {
    /// Free-form position moved with the arrow keys.
    pub pos: [f32; 3],
    /// Playback time in seconds.
    pub time: f32,
    /// Render target size in pixels `[width, height]`.
    pub resolution: [f32; 2],
    /// Cursor position in `[-1, 1]`, y up.
    pub mouse: [f32; 2],
    /// 1 while the left mouse button is held, otherwise 0.
    pub mouse_pressed: u32,
    /// Frames rendered while playing.
    pub frame: u32,
    pub _padding: [u32; 2],
}

impl PushConstant {
    /// Creates a record for a target of the given size with everything else zeroed.
    pub fn new(resolution: [f32; 2]) -> Self {
        Self {
            resolution,
            ..bytemuck::Zeroable::zeroed()
        }
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Resets playback-dependent fields (time, position, frame counter).
    pub fn restart(&mut self) {
        self.pos = [0.0; 3];
        self.time = 0.0;
        self.frame = 0;
    }
}

impl Default for PushConstant {
    fn default() -> Self {
        Self::new([1.0, 1.0])
    }
}

impl fmt::Display for PushConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "position:\t{:?}", self.pos)?;
        writeln!(f, "time:\t\t{}", self.time)?;
        writeln!(f, "width, height:\t{:?}", self.resolution)?;
        writeln!(f, "mouse:\t\t{:?}", self.mouse)?;
        writeln!(f, "mouse pressed:\t{}", self.mouse_pressed != 0)?;
        writeln!(f, "frame:\t\t{}", self.frame)
    }
}
