//! Math types.
//!
//! All scene-space math is 2D and uses [glam](https://docs.rs/glam)'s `Vec2`,
//! re-exported so users don't need to depend on glam directly.

pub use glam::Vec2;

/// Tolerance used when comparing resolved transforms.
pub const EPSILON: f32 = 1e-4;

/// Component-wise approximate equality.
pub fn approx_eq(a: Vec2, b: Vec2) -> bool {
    a.abs_diff_eq(b, EPSILON)
}
