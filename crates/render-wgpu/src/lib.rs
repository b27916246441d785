//! wgpu backend for physbox scenes.
//!
//! Draws every mesh of a [`physbox_render::RenderScene`] with instanced unit
//! primitives, lit by the scene's ambient and directional lights, plus a
//! floor grid. The renderer reads the scene; it never mutates it.

mod geometry;
mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
