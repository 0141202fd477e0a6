mod buffers;
mod context;
mod render;

pub use buffers::SurfaceBuffers;
pub use context::GpuContext;
pub use render::PresentPipeline;
