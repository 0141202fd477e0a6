use glam::Vec2;

/// A wave waiting for its due time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledWave {
    /// Frame clock time (seconds) at which the wave appears
    pub due: f32,
    pub pos: Vec2,
    pub strength: f32,
}

/// Pending one-shot spawns, polled once per frame against the frame clock.
///
/// Everything fires on the simulation thread; a cancelled spawn is never
/// created.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<ScheduledWave>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f32, pos: Vec2, strength: f32) {
        self.pending.push(ScheduledWave { due, pos, strength });
    }

    /// Drop every pending spawn, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return every spawn due at `now`, in scheduling order
    pub fn take_due(&mut self, now: f32, out: &mut Vec<ScheduledWave>) {
        out.clear();
        self.pending.retain(|s| {
            if s.due <= now {
                out.push(*s);
                false
            } else {
                true
            }
        });
    }
}

/// Repeating synthetic click. At most one runs at a time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoClick {
    pub interval: f32,
    pub next_due: f32,
}

impl AutoClick {
    pub fn new(interval: f32, now: f32) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// Whether a click is due at `now`; advances the schedule when it is.
    ///
    /// After a stall the schedule restarts from `now` instead of replaying
    /// every missed click.
    pub fn poll(&mut self, now: f32) -> bool {
        if self.next_due > now {
            return false;
        }
        self.next_due += self.interval.max(0.0);
        if self.next_due <= now {
            self.next_due = now + self.interval.max(0.0);
        }
        true
    }
}
