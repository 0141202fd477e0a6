use glam::Vec2;

use crate::config::{POOL_DAMPING, POOL_IMPULSE, POOL_RESOLUTION};

/// Damped height-field water surface sampled on a coarse grid.
///
/// Two buffers are swapped every step, like the classic two-buffer ripple
/// filter: the new height is the neighbour average of the previous buffer
/// minus the current value.
pub struct Pool {
    pub cols: usize,
    pub rows: usize,
    current: Vec<f32>,
    previous: Vec<f32>,
}

impl Pool {
    /// Grid covering a `width` x `height` surface in logical pixels
    pub fn new(width: f32, height: f32) -> Self {
        let cols = (width / POOL_RESOLUTION).floor().max(0.0) as usize;
        let rows = (height / POOL_RESOLUTION).floor().max(0.0) as usize;
        Self {
            cols,
            rows,
            current: vec![0.0; cols * rows],
            previous: vec![0.0; cols * rows],
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.current.fill(0.0);
        self.previous.fill(0.0);
    }

    /// Drop an impulse at a surface position; positions off the grid are ignored
    pub fn disturb(&mut self, pos: Vec2) {
        if pos.x < 0.0 || pos.y < 0.0 {
            return;
        }
        let x = (pos.x / POOL_RESOLUTION) as usize;
        let y = (pos.y / POOL_RESOLUTION) as usize;
        if x < self.cols && y < self.rows {
            self.previous[y * self.cols + x] = POOL_IMPULSE;
        }
    }

    pub fn step(&mut self) {
        let cols = self.cols;
        if cols < 3 || self.rows < 3 {
            return;
        }
        for y in 1..self.rows - 1 {
            for x in 1..cols - 1 {
                let i = y * cols + x;
                let sum = self.previous[i - 1]
                    + self.previous[i + 1]
                    + self.previous[i - cols]
                    + self.previous[i + cols];
                self.current[i] = (sum / 2.0 - self.current[i]) * POOL_DAMPING;
            }
        }
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    /// Height at a grid cell, after the latest step
    pub fn height(&self, x: usize, y: usize) -> f32 {
        self.previous[y * self.cols + x]
    }

    /// Blue-tinted shade for a height: bright crests, dark troughs
    pub fn shade(height: f32) -> [u8; 3] {
        let c = (128.0 + height * 2.0).clamp(0.0, 255.0) as u8;
        [c, c, 255]
    }
}
