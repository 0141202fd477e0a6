mod painter;
pub mod shapes;
mod surface;

pub use painter::{Painter, Path};
pub use surface::PixelSurface;
