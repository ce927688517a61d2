//! wgpu backend for the frame pipeline.
//!
//! Draws a ground grid and one instanced cube per body. The depth pre-pass
//! uses reversed Z (clear to 0, `Greater`); the forward pass re-tests the
//! same depth with `Equal` so each pixel is shaded once.
//!
//! Shadow, SSAO and bloom stages are accepted but draw nothing. The 2D
//! overlay is painted by the application after `composite`.

mod gpu;
mod shaders;

pub use gpu::{WgpuFrame, WgpuRenderer, DEPTH_FORMAT};
