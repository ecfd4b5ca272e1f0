//! Windowed breath-state detector.
//!
//! Samples of a chest-height proxy are accumulated over a fixed window and
//! averaged; consecutive window averages are compared against a threshold
//! scaled to the signal magnitude to classify the breath as inhale or exhale.
//! A minimum dwell time gates transitions so jitter-driven flips do not get
//! counted as breath cycles.

use crate::config::{ConfigError, DetectorConfig};
use crate::domain::{BreathPhase, CycleStats, SignalSample};

/// Hard cap on the threshold-scaling search. An all-zero signal would never
/// reach the magnitude floor, so the search must be bounded to stay total.
const SENSITIVITY_SEARCH_CAP: u32 = 10_000;

/// Magnitude the scaled window average must reach before the divisor is fixed.
const SENSITIVITY_FLOOR: f32 = 0.2;

#[derive(Debug, Clone, Copy, Default)]
struct Window {
    sum: f32,
    count: u32,
    elapsed: f32,
}

/// Streaming inhale/exhale classifier with cycle timing statistics.
///
/// Driven by one [`advance`](BreathDetector::advance) call per external tick;
/// never polls a sensor itself. All query methods are total and side-effect
/// free.
#[derive(Debug)]
pub struct BreathDetector {
    cfg: DetectorConfig,
    phase: BreathPhase,
    /// Window average from the previous closure. Zero doubles as the "unset"
    /// sentinel, so no phase comparison happens until the second window closes.
    previous_avg: f32,
    current_avg: f32,
    window: Window,
    /// Elapsed time in the cycle being measured. Pauses while untracked.
    cycle_timer: f32,
    stats: CycleStats,
    last_cycle_secs: f32,
    tracked: bool,
    /// Set when a cycle has started being timed.
    armed: bool,
    /// Set on the inhale-to-exhale edge; the next return to inhale closes the cycle.
    released: bool,
    lean_x: f32,
}

impl BreathDetector {
    pub fn new(cfg: DetectorConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            phase: BreathPhase::Inhale,
            previous_avg: 0.0,
            current_avg: 0.0,
            window: Window::default(),
            cycle_timer: 0.0,
            stats: CycleStats::default(),
            last_cycle_secs: 0.0,
            tracked: false,
            armed: false,
            released: false,
            lean_x: 0.0,
        })
    }

    /// Advance the detector by one tick.
    ///
    /// `sample` is `None` while no body is tracked; untracked ticks pause
    /// accumulation and cycle timing without resetting either. A tick that
    /// closes the current window does only that; its sample is discarded.
    pub fn advance(&mut self, dt: f32, sample: Option<f32>) {
        self.window.elapsed += dt;

        if self.window.elapsed >= self.cfg.window_secs {
            self.close_window();
            return;
        }

        match sample {
            Some(value) => {
                self.tracked = true;
                self.window.sum += value;
                self.window.count += 1;
                if self.armed {
                    self.cycle_timer += dt;
                }
                self.cycle_edge();
            }
            None => self.tracked = false,
        }
    }

    /// Convenience for replaying [`SignalSample`]s.
    pub fn ingest(&mut self, sample: SignalSample) {
        self.advance(sample.dt, Some(sample.value));
    }

    /// Effective threshold a window-average delta must exceed to register as a
    /// phase change.
    ///
    /// The configured percentage is scaled down by the smallest integer `k >= 2`
    /// that lifts the window-average magnitude to [`SENSITIVITY_FLOOR`], so weak
    /// signals get proportionally larger relative thresholds. Returns zero while
    /// untracked, and zero for a degenerate all-zero signal once the bounded
    /// search gives up.
    pub fn sensitivity(&self) -> f32 {
        if !self.tracked {
            return 0.0;
        }

        let magnitude = self.current_avg.abs();
        let mut k: u32 = 1;
        let mut scaled = 0.0f32;
        while scaled < SENSITIVITY_FLOOR {
            if k >= SENSITIVITY_SEARCH_CAP {
                return 0.0;
            }
            k += 1;
            scaled = magnitude * k as f32;
        }

        ((100 - u32::from(self.cfg.sensitivity)) as f32 / 100.0) / k as f32
    }

    /// Record the instantaneous sideways-lean value for this tick.
    /// Ignored unless lean tracking is enabled in the config.
    pub fn set_lean(&mut self, lean_x: f32) {
        if self.cfg.enable_lean {
            self.lean_x = lean_x;
        }
    }

    /// Lean value after thresholding and gain, rounded to two decimals.
    /// Magnitudes at or below the configured threshold report as zero.
    pub fn lean(&self) -> f32 {
        if self.lean_x.abs() <= self.cfg.lean_threshold {
            0.0
        } else {
            (self.lean_x * self.cfg.lean_gain * 100.0).round() / 100.0
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracked
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    /// Duration of the most recent completed breath cycle, seconds.
    /// Zero until a full inhale/exhale cycle has been observed.
    pub fn last_cycle_secs(&self) -> f32 {
        self.last_cycle_secs
    }

    pub fn avg_cycle_secs(&self) -> f32 {
        self.stats.average()
    }

    pub fn total_cycles(&self) -> u32 {
        self.stats.count
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    /// Zero the cycle statistics. Phase, window accumulator, and the cycle in
    /// flight are untouched.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    fn close_window(&mut self) {
        self.previous_avg = self.current_avg;
        self.current_avg = if self.window.count > 0 {
            self.window.sum / self.window.count as f32
        } else {
            log::warn!("window closed with no samples; average defaults to 0");
            0.0
        };
        log::trace!(
            "window closed: avg {:.4} (prev {:.4})",
            self.current_avg,
            self.previous_avg
        );
        self.update_phase();
        self.window = Window::default();
    }

    fn update_phase(&mut self) {
        // The first window has no predecessor to compare against.
        if self.previous_avg == 0.0 {
            return;
        }

        // No transitions while the body is lost: an empty window averages to
        // zero and would otherwise read as a huge spurious drop.
        if !self.tracked {
            return;
        }

        let delta = (self.previous_avg - self.current_avg).abs();
        if delta <= self.sensitivity() {
            return;
        }

        match self.phase {
            BreathPhase::Inhale => {
                // Half the elapsed cycle time stands in for a minimum exhale
                // duration, assuming roughly symmetric inhale/exhale phases.
                if self.cycle_timer / 2.0 > self.cfg.dwell_secs
                    && self.current_avg < self.previous_avg
                {
                    self.phase = BreathPhase::Exhale;
                    self.released = true;
                    log::debug!("phase -> exhale (delta {:.4})", delta);
                }
            }
            BreathPhase::Exhale => {
                if self.cycle_timer > self.cfg.dwell_secs
                    && self.current_avg > self.previous_avg
                {
                    self.phase = BreathPhase::Inhale;
                    log::debug!("phase -> inhale (delta {:.4})", delta);
                }
            }
        }
    }

    fn cycle_edge(&mut self) {
        if !self.armed && self.phase == BreathPhase::Inhale {
            self.armed = true;
            // Counted at arming, before the cycle is confirmed complete.
            self.stats.count += 1;
        } else if self.released && self.phase == BreathPhase::Inhale {
            self.last_cycle_secs = self.cycle_timer;
            self.stats.sum += self.cycle_timer;
            log::debug!(
                "cycle complete: {:.2}s (avg {:.2}s over {})",
                self.last_cycle_secs,
                self.stats.average(),
                self.stats.count
            );
            self.cycle_timer = 0.0;
            self.armed = false;
            self.released = false;
        }
    }
}
