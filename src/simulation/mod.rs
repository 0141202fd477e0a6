mod droplet;
mod pool;
mod scheduler;
mod shape;
mod wave;
mod world;

pub use droplet::Droplet;
pub use pool::Pool;
pub use scheduler::{AutoClick, ScheduledWave, Scheduler};
pub use shape::ShapeKind;
pub use wave::{Rgb, Wave, WaveId};
pub use world::World;
