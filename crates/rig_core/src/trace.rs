//! Smoothed, gap-annotated velocity ring buffer for live display.

use tracing::trace;

/// Number of slots: 5 s of display at a notional 100 Hz.
pub const TRACE_LEN: usize = 500;

/// Slots marked as "no data" ahead of the cursor after each write. Raw
/// samples arrive sparser than the display resolution; the gap keeps the
/// plot visually broken until fresh samples catch up.
const GAP_SLOTS: usize = 8;

/// Redraw is signalled every this many cursor advances, decoupling sample
/// arrival rate from display refresh rate.
const REDRAW_EVERY: usize = 5;

/// Exponentially smoothed speed trace over the most recent 5 s.
///
/// `push` smooths against the previous slot with wraparound, so the newest
/// sample blends into the oldest at the seam; that behavior is kept
/// deliberately to match the established display.
#[derive(Debug, Clone)]
pub struct VelocityTrace {
    speed: Box<[f64; TRACE_LEN]>,
    idx: usize,
    scale: f64,
}

impl VelocityTrace {
    /// `scale` converts a raw encoder count to speed units
    /// (`speed = raw / scale`); sensor-specific, comes from configuration.
    pub fn new(scale: f64) -> Self {
        Self {
            speed: Box::new([0.0; TRACE_LEN]),
            idx: 0,
            scale,
        }
    }

    /// Fold one locomotion sample into the ring.
    pub fn push(&mut self, raw_count: u16, t_us: u32) {
        let y = f64::from(raw_count) / self.scale;
        let prev = (self.idx + TRACE_LEN - 1) % TRACE_LEN;
        self.speed[self.idx] = 0.1 * y + 0.9 * self.speed[prev];
        trace!(t_us, raw_count, speed = self.speed[self.idx], "vr sample");

        // Gap fill is clamped at the end of the buffer, no wraparound.
        let gap_end = (self.idx + 1 + GAP_SLOTS).min(TRACE_LEN);
        for slot in &mut self.speed[self.idx + 1..gap_end] {
            *slot = f64::NAN;
        }

        self.idx = (self.idx + 1) % TRACE_LEN;
    }

    /// True when the display should refresh (every fifth advance).
    pub fn redraw_due(&self) -> bool {
        self.idx % REDRAW_EVERY == 0
    }

    pub fn samples(&self) -> &[f64; TRACE_LEN] {
        &self.speed
    }

    pub fn cursor(&self) -> usize {
        self.idx
    }

    /// Zero the buffer and cursor; called at session/plot reset.
    pub fn reset(&mut self) {
        self.speed.fill(0.0);
        self.idx = 0;
    }
}
