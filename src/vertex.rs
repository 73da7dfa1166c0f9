//! The full-screen triangle vertex stage.
//!
//! Three invocations with no vertex buffer produce an over-sized triangle whose
//! corners sit at clip-space `(-1,-1)`, `(3,-1)` and `(-1,3)`. Clipping trims it
//! to exactly the viewport:
//!
//! ```text
//!  3 +
//!    |\
//!  2 |  \
//!    |    \
//!  1 +-----+
//!    |     |\
//!  0 |     |  \
//!    |     |    \
//! -1 +-----+-----+
//!   -1  0  1  2  3
//! ```
//!
//! Alongside the clip position, the stage emits a centered, aspect-corrected
//! coordinate: `x` spans a wider range on landscape targets so that one unit
//! covers the same number of pixels on both axes.
//!
//! [`VERTEX_SHADER_WGSL`] is the GPU version. [`generate`] runs the same math on
//! the CPU and is what the tests check.

use glam::{Vec2, Vec4};

use crate::push_constant::PushConstant;

/// Number of vertices to draw; no vertex or index buffer is bound.
pub const FULLSCREEN_VERTEX_COUNT: u32 = 3;

/// Vertex entry point name in [`VERTEX_SHADER_WGSL`].
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

/// WGSL vertex stage. Expects the record to be declared as `pc` by the prelude.
pub const VERTEX_SHADER_WGSL: &str = r#"struct VertexOutput {
    @builtin(position) clip_position: vec4f,
    @location(0) uv: vec2f,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    let base = vec2f(f32((vertex_index << 1u) & 2u), f32(vertex_index & 2u));

    var out: VertexOutput;
    out.clip_position = vec4f(base * 2.0 - 1.0, 0.0, 1.0);
    out.uv = (base - 0.5) * 2.0 / vec2f(pc.resolution.y / pc.resolution.x, 1.0);
    return out;
}
"#;

/// What the vertex stage hands to the rasterizer for one invocation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexOutput {
    /// Homogeneous clip-space position.
    pub clip_position: Vec4,
    /// Centered, aspect-corrected coordinate interpolated across the triangle.
    pub uv: Vec2,
}

/// Corner of the over-sized triangle in `{0, 2}²` for a vertex index.
///
/// Only the low two bits matter: 0 → `(0,0)`, 1 → `(2,0)`, 2 → `(0,2)`.
pub fn base_uv(index: u32) -> Vec2 {
    Vec2::new(((index << 1) & 2) as f32, (index & 2) as f32)
}

/// Maps a base corner to clip space: `(uv * 2 - 1, 0, 1)`.
pub fn clip_position(base_uv: Vec2) -> Vec4 {
    (base_uv * 2.0 - Vec2::ONE).extend(0.0).extend(1.0)
}

/// Recenters a base corner and corrects it for the target's aspect ratio.
///
/// `resolution.x` must be non-zero. A zero width collapses `x` to zero, and a
/// zero-sized target yields NaN, the same as on the GPU.
pub fn aspect_uv(base_uv: Vec2, resolution: Vec2) -> Vec2 {
    (base_uv - 0.5) * 2.0 / Vec2::new(resolution.y / resolution.x, 1.0)
}

/// Runs the vertex stage for one invocation.
pub fn generate(index: u32, pc: &PushConstant) -> VertexOutput {
    let base = base_uv(index);
    VertexOutput {
        clip_position: clip_position(base),
        uv: aspect_uv(base, Vec2::from(pc.resolution)),
    }
}

/// All three vertices of the draw, in index order.
pub fn fullscreen_triangle(pc: &PushConstant) -> [VertexOutput; 3] {
    [generate(0, pc), generate(1, pc), generate(2, pc)]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < EPS
    }

    #[test]
    fn base_uv_corners() {
        assert_eq!(base_uv(0), Vec2::new(0.0, 0.0));
        assert_eq!(base_uv(1), Vec2::new(2.0, 0.0));
        assert_eq!(base_uv(2), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn clip_position_scales_and_shifts() {
        for index in 0..FULLSCREEN_VERTEX_COUNT {
            let base = base_uv(index);
            let clip = clip_position(base);
            assert_eq!(clip.x, base.x * 2.0 - 1.0);
            assert_eq!(clip.y, base.y * 2.0 - 1.0);
            assert_eq!(clip.z, 0.0);
            assert_eq!(clip.w, 1.0);
        }

        assert_eq!(clip_position(base_uv(0)), Vec4::new(-1.0, -1.0, 0.0, 1.0));
        assert_eq!(clip_position(base_uv(1)), Vec4::new(3.0, -1.0, 0.0, 1.0));
        assert_eq!(clip_position(base_uv(2)), Vec4::new(-1.0, 3.0, 0.0, 1.0));
    }

    #[test]
    fn square_target_only_recenters() {
        let pc = PushConstant::new([1.0, 1.0]);
        for index in 0..FULLSCREEN_VERTEX_COUNT {
            let out = generate(index, &pc);
            let expected = (base_uv(index) - 0.5) * 2.0;
            assert!(close(out.uv, expected), "index {index}: {:?}", out.uv);
        }
    }

    #[test]
    fn wide_target_stretches_x() {
        let pc = PushConstant::new([2.0, 1.0]);
        let out = generate(0, &pc);
        assert!(close(out.uv, Vec2::new(-2.0, -1.0)), "{:?}", out.uv);
    }

    #[test]
    fn resolution_only_affects_x() {
        let square = PushConstant::new([512.0, 512.0]);
        let wide = PushConstant::new([1024.0, 256.0]);
        let ratio = 256.0 / 1024.0;

        for index in 0..FULLSCREEN_VERTEX_COUNT {
            let a = generate(index, &square).uv;
            let b = generate(index, &wide).uv;
            assert!((b.x - a.x / ratio).abs() < EPS);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn ignores_everything_but_resolution() {
        let plain = PushConstant::new([1280.0, 720.0]);
        let busy = PushConstant {
            pos: [4.0, 5.0, 6.0],
            time: 99.0,
            mouse: [0.5, -0.5],
            mouse_pressed: 1,
            frame: 7,
            ..plain
        };
        assert_eq!(fullscreen_triangle(&plain), fullscreen_triangle(&busy));
    }

    #[test]
    fn invocation_order_does_not_matter() {
        let pc = PushConstant::new([1280.0, 720.0]);
        let forward: Vec<_> = (0..3).map(|i| generate(i, &pc)).collect();
        let mut backward: Vec<_> = (0..3).rev().map(|i| (i, generate(i, &pc))).collect();
        backward.sort_by_key(|(i, _)| *i);

        for (i, (_, out)) in backward.iter().enumerate() {
            assert_eq!(forward[i], *out);
        }
    }

    #[test]
    fn triangle_covers_viewport() {
        let pc = PushConstant::new([800.0, 600.0]);
        let [a, b, c] = fullscreen_triangle(&pc).map(|v| v.clip_position.truncate().truncate());

        // Every viewport corner lies inside the triangle (barycentric sign test).
        let edge = |p: Vec2, q: Vec2, r: Vec2| (q - p).perp_dot(r - p);
        for corner in [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
        ] {
            let d0 = edge(a, b, corner);
            let d1 = edge(b, c, corner);
            let d2 = edge(c, a, corner);
            assert!(d0 >= 0.0 && d1 >= 0.0 && d2 >= 0.0, "{corner:?} outside");
        }
    }

    #[test]
    fn degenerate_resolution_is_unguarded() {
        let out = generate(1, &PushConstant::new([0.0, 720.0]));
        assert_eq!(out.uv.x, 0.0);

        let out = generate(1, &PushConstant::new([0.0, 0.0]));
        assert!(out.uv.x.is_nan());
        assert_eq!(out.uv.y, -1.0);
    }

    #[test]
    fn wgsl_uses_same_entry_point() {
        assert!(VERTEX_SHADER_WGSL.contains(&format!("fn {VERTEX_ENTRY_POINT}(")));
        assert!(VERTEX_SHADER_WGSL.contains("pc.resolution"));
    }
}
