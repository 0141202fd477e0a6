use glam::Vec2;

use crate::config::{SceneMode, Settings, POOL_RESOLUTION};
use crate::render::{shapes, Painter};
use crate::simulation::{Pool, World};

/// Run one animation frame: paint the background, tick the world, then draw
/// every surviving droplet and wave.
///
/// `now` is the frame clock in seconds; it drives scheduled spawns and the
/// time-varying shapes.
pub fn run_frame<P: Painter + ?Sized>(
    world: &mut World,
    settings: &mut Settings,
    painter: &mut P,
    now: f32,
) {
    if settings.scene == SceneMode::Rings {
        fade_background(painter, settings);
    }

    world.tick(now, settings);

    // The field is painted after its step so it matches this tick's waves
    if settings.scene == SceneMode::Pool {
        draw_pool(painter, world.pool());
    }

    if settings.particles {
        for droplet in world.droplets() {
            painter.set_fill(droplet.color, droplet.alpha);
            painter.fill_circle(droplet.pos, droplet.size);
        }
    }

    for wave in world.waves() {
        shapes::render(painter, wave, wave.intensity(), wave.color, now);
    }
}

/// Translucent black over the last frame; cleared outright when trails are off
fn fade_background<P: Painter + ?Sized>(painter: &mut P, settings: &Settings) {
    if !settings.trail_effect {
        painter.clear();
    }
    painter.set_fill([0, 0, 0], settings.background_fade);
    painter.fill_rect(Vec2::ZERO, painter.size());
}

fn draw_pool<P: Painter + ?Sized>(painter: &mut P, pool: &Pool) {
    let cell = Vec2::splat(POOL_RESOLUTION);
    for y in 0..pool.rows {
        for x in 0..pool.cols {
            painter.set_fill(Pool::shade(pool.height(x, y)), 1.0);
            painter.fill_rect(Vec2::new(x as f32, y as f32) * cell, cell);
        }
    }
}
