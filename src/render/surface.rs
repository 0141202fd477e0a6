use glam::{Affine2, Vec2};

use crate::render::{Painter, Path};
use crate::simulation::Rgb;

/// Longest stroke segment rasterized in one piece (device pixels)
const MAX_SEGMENT: f32 = 16.0;
const MAX_PIECES: usize = 1024;

/// Halo opacity relative to the stroke it surrounds
const GLOW_ALPHA: f32 = 0.25;

#[derive(Clone, Copy, Debug)]
struct GraphicsState {
    transform: Affine2,
    stroke: [f32; 4],
    fill: [f32; 4],
    line_width: f32,
    glow: f32,
}

impl GraphicsState {
    fn new(scale: f32) -> Self {
        Self {
            transform: Affine2::from_scale(Vec2::splat(scale)),
            stroke: [1.0, 1.0, 1.0, 1.0],
            fill: [1.0, 1.0, 1.0, 1.0],
            line_width: 1.0,
            glow: 0.0,
        }
    }

    /// Uniform scale of the current transform
    fn scale(&self) -> f32 {
        self.transform.matrix2.determinant().abs().sqrt()
    }

    fn is_axis_aligned(&self) -> bool {
        self.transform.matrix2.x_axis.y.abs() < 1e-6 && self.transform.matrix2.y_axis.x.abs() < 1e-6
    }
}

fn rgba(color: Rgb, alpha: f32) -> [f32; 4] {
    [
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
        if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 },
    ]
}

/// CPU raster the simulation paints into; packed RGBA8 is uploaded to the GPU
/// once per frame.
///
/// Strokes accumulate coverage per pixel before blending so joints between
/// flattened segments are not blended twice.
pub struct PixelSurface {
    width: u32,
    height: u32,
    /// Device pixels per logical pixel
    scale: f32,
    pixels: Vec<[f32; 3]>,
    packed: Vec<u32>,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    coverage: Vec<f32>,
    touched: Vec<usize>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        let mut surface = Self {
            width: 0,
            height: 0,
            scale,
            pixels: Vec::new(),
            packed: Vec::new(),
            state: GraphicsState::new(scale),
            stack: Vec::new(),
            coverage: Vec::new(),
            touched: Vec::new(),
        };
        surface.resize(width, height, scale);
        surface
    }

    /// Resize to new device dimensions, clearing the image and graphics state
    pub fn resize(&mut self, width: u32, height: u32, scale: f32) {
        let len = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.scale = if scale > 0.0 { scale } else { 1.0 };
        self.pixels = vec![[0.0; 3]; len];
        self.packed = vec![0; len];
        self.coverage = vec![0.0; len];
        self.touched.clear();
        self.stack.clear();
        self.state = GraphicsState::new(self.scale);
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    /// Pack the image into RGBA8 words for upload
    pub fn pack(&mut self) -> &[u32] {
        for (dst, src) in self.packed.iter_mut().zip(self.pixels.iter()) {
            let r = (src[0].clamp(0.0, 1.0) * 255.0).round() as u32;
            let g = (src[1].clamp(0.0, 1.0) * 255.0).round() as u32;
            let b = (src[2].clamp(0.0, 1.0) * 255.0).round() as u32;
            *dst = r | (g << 8) | (b << 16) | (0xFF << 24);
        }
        &self.packed
    }

    fn blend(&mut self, idx: usize, color: [f32; 4], coverage: f32) {
        let a = color[3] * coverage;
        let px = &mut self.pixels[idx];
        px[0] += (color[0] - px[0]) * a;
        px[1] += (color[1] - px[1]) * a;
        px[2] += (color[2] - px[2]) * a;
    }

    /// Device-space pixel bounds clipped to the surface, or None when empty
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(usize, usize, usize, usize)> {
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width as usize);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height as usize);
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    fn cover_segment(&mut self, a: Vec2, b: Vec2, half_width: f32) {
        let pad = Vec2::splat(half_width + 1.0);
        if self.clip(a.min(b) - pad, a.max(b) + pad).is_none() {
            return;
        }
        let length = a.distance(b);
        let pieces = ((length / MAX_SEGMENT).ceil() as usize).clamp(1, MAX_PIECES);
        for i in 0..pieces {
            let p0 = a.lerp(b, i as f32 / pieces as f32);
            let p1 = a.lerp(b, (i + 1) as f32 / pieces as f32);
            self.cover_piece(p0, p1, half_width);
        }
    }

    fn cover_piece(&mut self, a: Vec2, b: Vec2, half_width: f32) {
        let pad = Vec2::splat(half_width + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(a.min(b) - pad, a.max(b) + pad) else {
            return;
        };
        let ab = b - a;
        let len_sq = ab.length_squared();
        let width = self.width as usize;
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = p.distance(a + ab * t);
                let c = (half_width + 0.5 - d).clamp(0.0, 1.0);
                if c > 0.0 {
                    let idx = y * width + x;
                    if self.coverage[idx] == 0.0 {
                        self.touched.push(idx);
                    }
                    if c > self.coverage[idx] {
                        self.coverage[idx] = c;
                    }
                }
            }
        }
    }

    /// Blend accumulated coverage with `color` and reset the accumulator
    fn flush_coverage(&mut self, color: [f32; 4]) {
        let touched = std::mem::take(&mut self.touched);
        for &idx in &touched {
            let c = self.coverage[idx];
            self.coverage[idx] = 0.0;
            self.blend(idx, color, c);
        }
        self.touched = touched;
        self.touched.clear();
    }

    fn stroke_pass(&mut self, path: &Path, half_width: f32, color: [f32; 4]) {
        let transform = self.state.transform;
        for sub in path.subpaths() {
            for pair in sub.windows(2) {
                let a = transform.transform_point2(pair[0]);
                let b = transform.transform_point2(pair[1]);
                self.cover_segment(a, b, half_width);
            }
        }
        self.flush_coverage(color);
    }

    fn fill_convex(&mut self, corners: [Vec2; 4], color: [f32; 4]) {
        let min = corners.iter().fold(Vec2::splat(f32::MAX), |m, c| m.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::MIN), |m, c| m.max(*c));
        let Some((x0, y0, x1, y1)) = self.clip(min, max) else {
            return;
        };
        let width = self.width as usize;
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let mut sign = 0.0f32;
                let mut inside = true;
                for i in 0..4 {
                    let e0 = corners[i];
                    let e1 = corners[(i + 1) % 4];
                    let cross = (e1 - e0).perp_dot(p - e0);
                    if cross != 0.0 {
                        if sign == 0.0 {
                            sign = cross.signum();
                        } else if cross.signum() != sign {
                            inside = false;
                            break;
                        }
                    }
                }
                if inside {
                    self.blend(y * width + x, color, 1.0);
                }
            }
        }
    }
}

impl Painter for PixelSurface {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("restore() without matching save()"),
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.transform = self.state.transform * Affine2::from_translation(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(angle);
    }

    fn scale(&mut self, factor: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::splat(factor));
    }

    fn set_stroke(&mut self, color: Rgb, alpha: f32) {
        self.state.stroke = rgba(color, alpha);
    }

    fn set_fill(&mut self, color: Rgb, alpha: f32) {
        self.state.fill = rgba(color, alpha);
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    }

    fn set_glow(&mut self, radius: f32) {
        self.state.glow = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    }

    fn stroke(&mut self, path: &Path) {
        let color = self.state.stroke;
        if color[3] <= 0.0 || path.is_empty() {
            return;
        }
        let scale = self.state.scale();
        let half_width = self.state.line_width * scale / 2.0;
        if self.state.glow > 0.0 {
            let mut halo = color;
            halo[3] *= GLOW_ALPHA;
            self.stroke_pass(path, half_width + self.state.glow * scale, halo);
        }
        self.stroke_pass(path, half_width, color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        let color = self.state.fill;
        if color[3] <= 0.0 {
            return;
        }
        let c = self.state.transform.transform_point2(center);
        let r = radius * self.state.scale();
        let pad = Vec2::splat(r + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(c - pad, c + pad) else {
            return;
        };
        let width = self.width as usize;
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(y * width + x, color, coverage);
                }
            }
        }
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        let color = self.state.fill;
        if color[3] <= 0.0 {
            return;
        }
        let t = self.state.transform;
        if self.state.is_axis_aligned() {
            let a = t.transform_point2(origin);
            let b = t.transform_point2(origin + size);
            let Some((x0, y0, x1, y1)) = self.clip(a.min(b), a.max(b)) else {
                return;
            };
            let width = self.width as usize;
            for y in y0..y1 {
                for x in x0..x1 {
                    self.blend(y * width + x, color, 1.0);
                }
            }
        } else {
            let corners = [
                t.transform_point2(origin),
                t.transform_point2(origin + Vec2::new(size.x, 0.0)),
                t.transform_point2(origin + size),
                t.transform_point2(origin + Vec2::new(0.0, size.y)),
            ];
            self.fill_convex(corners, color);
        }
    }

    fn clear(&mut self) {
        self.pixels.fill([0.0; 3]);
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) / self.scale
    }
}

#[cfg(test)]
impl PixelSurface {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color of a device pixel
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}
