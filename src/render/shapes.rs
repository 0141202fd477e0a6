use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;

use crate::render::{Painter, Path};
use crate::simulation::{Rgb, ShapeKind, Wave};

/// Golden ratio, length falloff between branch generations
const PHI: f32 = 1.618_034;

/// Angular offset of the side branches in the fractal pattern
const FRACTAL_SPREAD: f32 = 0.6;
const FRACTAL_DEPTH: u32 = 3;
const FRACTAL_CHILD_SCALE: f32 = 0.6;

const MANDALA_PETALS: u32 = 12;
const SPIRAL_TURNS: f32 = 5.0;
const SPIRAL_SAMPLES: usize = 320;
/// Spiral points per stroke chunk; width and opacity are constant within one
const SPIRAL_CHUNK: usize = 16;

const OUTLINE_SAMPLES: usize = 96;

/// Draw one wave at its current state.
///
/// `intensity` drives opacity, `time` (seconds) animates the time-varying
/// patterns. The wave is only read, and the painter's graphics state is
/// left exactly as it was found.
pub fn render<P: Painter + ?Sized>(
    painter: &mut P,
    wave: &Wave,
    intensity: f32,
    color: Rgb,
    time: f32,
) {
    let alpha = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let style = Style {
        radius: wave.radius,
        width: wave.width,
        alpha,
        color,
        time: if wave.shape.is_time_varying() { time } else { 0.0 },
    };

    painter.save();
    painter.translate(wave.pos);
    match wave.shape {
        ShapeKind::Circle => circle(painter, &style),
        ShapeKind::Square => square(painter, &style),
        ShapeKind::Triangle => triangle(painter, &style),
        ShapeKind::Mandala => mandala(painter, &style),
        ShapeKind::Spiral => spiral(painter, &style, 6.0, false),
        ShapeKind::Fireworks => spiral(painter, &style, 14.0, true),
        ShapeKind::Fractal => fractal(painter, &style),
        ShapeKind::EtherealPlasma => ethereal_plasma(painter, &style),
        ShapeKind::QuantumSingularity => quantum_singularity(painter, &style),
        ShapeKind::FractalConsciousness => fractal_consciousness(painter, &style),
        ShapeKind::CosmicMandala => cosmic_mandala(painter, &style),
        ShapeKind::FractalDendrite => fractal_dendrite(painter, &style),
        ShapeKind::QuantumInterference => quantum_interference(painter, &style),
    }
    painter.restore();
}

struct Style {
    radius: f32,
    width: f32,
    alpha: f32,
    color: Rgb,
    time: f32,
}

impl Style {
    fn pen<P: Painter + ?Sized>(&self, painter: &mut P, width: f32, alpha: f32) {
        painter.set_line_width(width);
        painter.set_stroke(self.color, self.alpha * alpha);
    }
}

/// Closed outline whose radius is a function of the polar angle
fn polar_outline(samples: usize, radius_at: impl Fn(f32) -> f32) -> Path {
    let mut path = Path::new();
    for i in 0..=samples {
        let a = TAU * i as f32 / samples as f32;
        let p = Vec2::from_angle(a) * radius_at(a);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

fn circle<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    let mut path = Path::new();
    path.circle(Vec2::ZERO, s.radius);
    painter.set_glow(s.width * 1.5);
    s.pen(painter, s.width, 1.0);
    painter.stroke(&path);
    painter.set_glow(0.0);
}

fn square<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    let r = s.radius;
    let mut path = Path::new();
    path.polygon(&[
        Vec2::new(-r, -r),
        Vec2::new(r, -r),
        Vec2::new(r, r),
        Vec2::new(-r, r),
    ]);
    s.pen(painter, s.width, 1.0);
    painter.stroke(&path);
}

fn triangle<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    // Screen y grows downward, so -90 degrees points up
    let corners: Vec<Vec2> = (0..3)
        .map(|k| Vec2::from_angle(-FRAC_PI_2 + k as f32 * TAU / 3.0) * s.radius)
        .collect();
    let mut path = Path::new();
    path.polygon(&corners);
    s.pen(painter, s.width, 1.0);
    painter.stroke(&path);
}

fn mandala<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    let r = s.radius;
    let mut petal = Path::new();
    petal.move_to(Vec2::ZERO);
    petal.cubic_to(
        Vec2::new(r * 0.3, r * 0.25),
        Vec2::new(r * 0.7, r * 0.25),
        Vec2::new(r, 0.0),
    );
    petal.cubic_to(
        Vec2::new(r * 0.7, -r * 0.25),
        Vec2::new(r * 0.3, -r * 0.25),
        Vec2::ZERO,
    );

    s.pen(painter, s.width, 1.0);
    for k in 0..MANDALA_PETALS {
        painter.save();
        painter.rotate(k as f32 * TAU / MANDALA_PETALS as f32);
        painter.stroke(&petal);
        painter.restore();
    }
}

/// Outward spiral over five turns; `ripple` sets how often the sine ripple
/// repeats per radian. Fireworks add a glow and dot accents.
fn spiral<P: Painter + ?Sized>(painter: &mut P, s: &Style, ripple: f32, fireworks: bool) {
    let sweep = SPIRAL_TURNS * TAU;
    let points: Vec<Vec2> = (0..=SPIRAL_SAMPLES)
        .map(|i| {
            let t = i as f32 / SPIRAL_SAMPLES as f32;
            let theta = t * sweep;
            let wobble = (theta * ripple + s.time * 3.0).sin() * s.radius * 0.05;
            Vec2::from_angle(theta + s.time * 0.5) * (s.radius * t + wobble)
        })
        .collect();

    if fireworks {
        painter.set_glow(s.width * 3.0);
    }
    for (n, chunk) in points.chunks(SPIRAL_CHUNK).enumerate() {
        let start = n * SPIRAL_CHUNK;
        let progress = start as f32 / SPIRAL_SAMPLES as f32;
        let theta = progress * sweep;
        let width = s.width * (1.0 + 0.5 * (theta * 3.0 + s.time * 2.0).sin());

        let mut path = Path::new();
        // Overlap one point with the previous chunk so the line stays joined
        path.move_to(points[start.saturating_sub(1)]);
        for &p in chunk {
            path.line_to(p);
        }
        s.pen(painter, width, 1.0 - progress * 0.8);
        painter.stroke(&path);
    }

    if fireworks {
        painter.set_glow(0.0);
        for (i, &p) in points.iter().enumerate().step_by(24).skip(1) {
            let progress = i as f32 / SPIRAL_SAMPLES as f32;
            painter.set_fill(s.color, s.alpha * (1.0 - progress * 0.6));
            painter.fill_circle(p, s.width);
        }
    }
}

fn fractal<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    fractal_branch(painter, s, Vec2::ZERO, s.radius, s.time * 0.2, FRACTAL_DEPTH);
}

fn fractal_branch<P: Painter + ?Sized>(
    painter: &mut P,
    s: &Style,
    center: Vec2,
    radius: f32,
    angle: f32,
    depth: u32,
) {
    if depth == 0 {
        return;
    }
    let level = depth as f32 / FRACTAL_DEPTH as f32;
    let mut path = Path::new();
    path.circle(center, radius);
    s.pen(painter, s.width * level, level);
    painter.stroke(&path);

    for k in [-1.0, 0.0, 1.0] {
        let heading = angle + k * FRACTAL_SPREAD;
        let child = center + Vec2::from_angle(heading) * radius;
        fractal_branch(painter, s, child, radius * FRACTAL_CHILD_SCALE, heading, depth - 1);
    }
}

fn ethereal_plasma<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    painter.set_glow(s.width * 2.0);
    for layer in 0..3 {
        let l = layer as f32;
        let lobes = 5.0 + l;
        let rate = 1.5 + l * 0.5;
        let path = polar_outline(OUTLINE_SAMPLES, |a| {
            s.radius * (1.0 - l * 0.15) + (a * lobes + s.time * rate).sin() * s.radius * 0.08
        });
        s.pen(painter, s.width * (1.5 - l * 0.4), 0.6 - l * 0.15);
        painter.stroke(&path);
    }
    painter.set_glow(0.0);
}

fn quantum_singularity<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    // Rings drift inward and are reborn at the rim
    let phase = (s.time * 0.5).rem_euclid(1.0);
    painter.save();
    painter.scale(1.0 + 0.05 * (s.time * 4.0).sin());
    for k in 0..6 {
        let t = (k as f32 + 1.0 - phase) / 6.0;
        let mut ring = Path::new();
        ring.circle(Vec2::ZERO, s.radius * t);
        s.pen(painter, s.width * t, t);
        painter.stroke(&ring);
    }
    painter.restore();

    s.pen(painter, s.width, 0.8);
    for arm in 0..4 {
        let offset = arm as f32 * TAU / 4.0 + s.time;
        let mut path = Path::new();
        for i in 0..=64 {
            let t = 3.0 * TAU * i as f32 / 64.0;
            let p = Vec2::from_angle(t + offset) * (s.radius * (-0.25 * t).exp());
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        painter.stroke(&path);
    }

    painter.set_fill(s.color, s.alpha);
    painter.fill_circle(Vec2::ZERO, s.width * 1.5);
}

fn fractal_consciousness<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    const DEPTH: usize = 5;
    let mut levels: Vec<Path> = (0..=DEPTH).map(|_| Path::new()).collect();
    let sway = (s.time * 0.8).sin() * 0.15;
    for root in 0..5 {
        let angle = root as f32 * TAU / 5.0 + s.time * 0.1;
        grow_limb(&mut levels, Vec2::ZERO, angle, s.radius * 0.45, 0, DEPTH, sway);
    }
    for (depth, path) in levels.iter().enumerate() {
        let falloff = 1.0 - depth as f32 / (DEPTH as f32 + 1.0);
        s.pen(painter, s.width * falloff, falloff);
        painter.stroke(path);
    }
}

/// One limb per call, two children each a golden ratio shorter
fn grow_limb(
    levels: &mut [Path],
    start: Vec2,
    angle: f32,
    length: f32,
    depth: usize,
    max_depth: usize,
    sway: f32,
) {
    let end = start + Vec2::from_angle(angle) * length;
    levels[depth].move_to(start);
    levels[depth].line_to(end);
    if depth < max_depth {
        for turn in [-0.5, 0.5] {
            grow_limb(levels, end, angle + turn + sway, length / PHI, depth + 1, max_depth, sway);
        }
    }
}

fn cosmic_mandala<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    let r = s.radius;
    for (ring, (petals, reach, spin)) in [(8u32, 1.0f32, 0.3f32), (16, 0.6, -0.5)]
        .into_iter()
        .enumerate()
    {
        painter.save();
        painter.rotate(s.time * spin);
        let mut path = Path::new();
        for k in 0..petals {
            let a0 = k as f32 * TAU / petals as f32;
            let a1 = a0 + TAU / petals as f32;
            let tip = Vec2::from_angle((a0 + a1) / 2.0) * r * reach;
            path.move_to(Vec2::from_angle(a0) * r * reach * 0.3);
            path.quad_to(tip, Vec2::from_angle(a1) * r * reach * 0.3);
        }
        s.pen(painter, s.width * (1.0 - ring as f32 * 0.3), 0.9 - ring as f32 * 0.3);
        painter.stroke(&path);
        painter.restore();
    }

    s.pen(painter, s.width * 0.6, 0.5);
    for arm in 0..8 {
        let offset = arm as f32 * TAU / 8.0 - s.time * 0.2;
        let mut path = Path::new();
        path.move_to(Vec2::from_angle(offset) * r * 0.1);
        let mut t = 0.0f32;
        loop {
            t += 0.1;
            let rr = r * 0.1 * (0.3 * t).exp();
            if rr > r || t > 40.0 {
                break;
            }
            path.line_to(Vec2::from_angle(t + offset) * rr);
        }
        painter.stroke(&path);
    }
}

/// Deterministic pseudo-noise in [-1, 1]
fn hash_noise(x: f32) -> f32 {
    let v = (x * 12.9898).sin() * 43_758.547;
    v.rem_euclid(1.0) * 2.0 - 1.0
}

fn fractal_dendrite<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    const ARMS: u32 = 8;
    const STEPS: u32 = 10;
    let r = s.radius;
    let mut trunk = Path::new();
    let mut twigs = Path::new();
    for arm in 0..ARMS {
        let angle = arm as f32 * TAU / ARMS as f32;
        let dir = Vec2::from_angle(angle);
        let side = dir.perp();
        trunk.move_to(Vec2::ZERO);
        for k in 1..=STEPS {
            let t = k as f32 / STEPS as f32;
            let jitter = hash_noise(k as f32 + arm as f32 * 7.83 + (s.time * 0.5).floor());
            let p = dir * r * t + side * jitter * r * 0.04;
            trunk.line_to(p);

            let turn = if k % 2 == 0 { 0.7 } else { -0.7 };
            let twig = Vec2::from_angle(angle + turn) * r * 0.12 * (1.0 - t);
            twigs.move_to(p);
            twigs.line_to(p + twig);
        }
    }
    s.pen(painter, s.width, 1.0);
    painter.stroke(&trunk);
    s.pen(painter, s.width * 0.5, 0.6);
    painter.stroke(&twigs);
}

fn quantum_interference<P: Painter + ?Sized>(painter: &mut P, s: &Style) {
    let r = s.radius;
    let beat = polar_outline(OUTLINE_SAMPLES * 2, |a| {
        r + r * 0.08 * (a * 8.0 + s.time * 2.0).sin() * (a * 5.0 - s.time * 3.0).cos()
    });
    s.pen(painter, s.width, 1.0);
    painter.stroke(&beat);

    painter.save();
    painter.rotate(s.time * 0.4);
    for source in [Vec2::new(-r * 0.3, 0.0), Vec2::new(r * 0.3, 0.0)] {
        for k in 1..=5 {
            let t = k as f32 / 5.0;
            let mut ring = Path::new();
            ring.circle(source, r * 0.7 * t);
            s.pen(painter, s.width * 0.5, 0.5 * (1.0 - t * 0.6));
            painter.stroke(&ring);
        }
    }
    painter.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    /// Tracks state-stack discipline and what was drawn
    #[derive(Default)]
    struct RecordingPainter {
        depth: i32,
        max_depth: i32,
        transforms_at_root: usize,
        strokes: usize,
        fills: usize,
        max_alpha: f32,
        glow: f32,
        glow_at_stroke: f32,
        glow_stack: Vec<f32>,
    }

    impl Painter for RecordingPainter {
        fn save(&mut self) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            self.glow_stack.push(self.glow);
        }
        fn restore(&mut self) {
            self.depth -= 1;
            assert!(self.depth >= 0, "restore without save");
            self.glow = self.glow_stack.pop().unwrap_or(0.0);
        }
        fn translate(&mut self, _offset: Vec2) {
            if self.depth == 0 {
                self.transforms_at_root += 1;
            }
        }
        fn rotate(&mut self, _angle: f32) {
            if self.depth == 0 {
                self.transforms_at_root += 1;
            }
        }
        fn scale(&mut self, _factor: f32) {
            if self.depth == 0 {
                self.transforms_at_root += 1;
            }
        }
        fn set_stroke(&mut self, _color: Rgb, alpha: f32) {
            self.max_alpha = self.max_alpha.max(alpha);
        }
        fn set_fill(&mut self, _color: Rgb, alpha: f32) {
            self.max_alpha = self.max_alpha.max(alpha);
        }
        fn set_line_width(&mut self, _width: f32) {}
        fn set_glow(&mut self, radius: f32) {
            self.glow = radius;
        }
        fn stroke(&mut self, _path: &Path) {
            self.strokes += 1;
            self.glow_at_stroke = self.glow;
        }
        fn fill_circle(&mut self, _center: Vec2, _radius: f32) {
            self.fills += 1;
        }
        fn fill_rect(&mut self, _origin: Vec2, _size: Vec2) {
            self.fills += 1;
        }
        fn clear(&mut self) {}
        fn size(&self) -> Vec2 {
            Vec2::new(800.0, 600.0)
        }
    }

    fn wave(shape: ShapeKind) -> Wave {
        let settings = Settings {
            shape,
            ..Settings::default()
        };
        let mut wave = Wave::new(0, Vec2::new(200.0, 150.0), 1.0, &settings);
        wave.radius = 60.0;
        wave
    }

    #[test]
    fn test_every_shape_restores_state() {
        for shape in ShapeKind::ALL {
            let mut painter = RecordingPainter::default();
            let wave = wave(shape);
            render(&mut painter, &wave, wave.intensity(), wave.color, 1.25);
            assert_eq!(painter.depth, 0, "{} left the stack unbalanced", shape.name());
            assert_eq!(painter.transforms_at_root, 0, "{} leaked a transform", shape.name());
            assert_eq!(painter.glow, 0.0, "{} leaked glow", shape.name());
            assert!(painter.strokes > 0, "{} drew nothing", shape.name());
        }
    }

    #[test]
    fn test_render_does_not_mutate_wave() {
        let wave = wave(ShapeKind::Fractal);
        let before = (wave.radius, wave.strength, wave.energy, wave.color);
        let mut painter = RecordingPainter::default();
        render(&mut painter, &wave, 0.5, wave.color, 3.0);
        assert_eq!(before, (wave.radius, wave.strength, wave.energy, wave.color));
    }

    #[test]
    fn test_opacity_follows_intensity() {
        for shape in ShapeKind::ALL {
            let wave = wave(shape);
            let mut painter = RecordingPainter::default();
            render(&mut painter, &wave, 0.25, wave.color, 0.0);
            assert!(painter.max_alpha <= 0.25 + 1e-6, "{}", shape.name());
        }
    }

    #[test]
    fn test_circle_is_one_glowing_stroke() {
        let wave = wave(ShapeKind::Circle);
        let mut painter = RecordingPainter::default();
        render(&mut painter, &wave, 1.0, wave.color, 0.0);
        assert_eq!(painter.strokes, 1);
        assert!(painter.glow_at_stroke > 0.0);
        assert_eq!(painter.glow, 0.0);
    }

    #[test]
    fn test_fractal_draws_three_levels() {
        let wave = wave(ShapeKind::Fractal);
        let mut painter = RecordingPainter::default();
        render(&mut painter, &wave, 1.0, wave.color, 0.0);
        assert_eq!(painter.strokes, 1 + 3 + 9);
    }

    #[test]
    fn test_mandala_petals_are_scoped() {
        let wave = wave(ShapeKind::Mandala);
        let mut painter = RecordingPainter::default();
        render(&mut painter, &wave, 1.0, wave.color, 0.0);
        assert_eq!(painter.strokes, MANDALA_PETALS as usize);
        assert_eq!(painter.max_depth, 2);
    }

    #[test]
    fn test_fireworks_add_dot_accents() {
        let wave = wave(ShapeKind::Fireworks);
        let mut painter = RecordingPainter::default();
        render(&mut painter, &wave, 1.0, wave.color, 0.0);
        assert!(painter.fills > 0);
    }

    #[test]
    fn test_non_finite_intensity_is_invisible() {
        let wave = wave(ShapeKind::Circle);
        let mut painter = RecordingPainter::default();
        render(&mut painter, &wave, f32::NAN, wave.color, 0.0);
        assert_eq!(painter.max_alpha, 0.0);
    }
}
