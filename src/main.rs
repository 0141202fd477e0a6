mod app;
mod config;
mod error;
mod frame;
mod gpu;
mod render;
mod simulation;

use winit::event_loop::EventLoop;

use app::App;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
