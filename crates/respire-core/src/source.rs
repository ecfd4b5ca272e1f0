//! Sample-source collaborators and the session driver.
//!
//! The detector never polls a sensor itself; it is handed one scalar per tick
//! by a [`BodySource`] the caller injects. Sources here cover replaying a
//! recorded log and generating a synthetic breather for demos and tests.

use crate::config::{ConfigError, DetectorConfig};
use crate::detector::BreathDetector;
use crate::domain::{BreathPhase, SessionId};
use crate::replay::SampleRecord;
use crate::validation::validate_sample;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// External supplier of chest-height samples, polled once per tick.
pub trait BodySource {
    /// The scalar sample for this tick, or `None` while no body is tracked.
    fn try_sample(&mut self) -> Option<f32>;

    fn is_tracked(&self) -> bool;

    /// Instantaneous sideways-lean value, when the source provides one.
    fn lean(&mut self) -> Option<f32> {
        None
    }
}

/// Feeds recorded [`SampleRecord`]s back in order.
#[derive(Debug)]
pub struct ReplaySource {
    records: VecDeque<SampleRecord>,
    current: Option<SampleRecord>,
}

impl ReplaySource {
    pub fn new(records: Vec<SampleRecord>) -> Self {
        Self {
            records: records.into(),
            current: None,
        }
    }

    /// Recorded tick duration of the next record, or `None` when exhausted.
    pub fn peek_dt(&self) -> Option<f32> {
        self.records.front().map(|r| r.dt)
    }
}

impl BodySource for ReplaySource {
    fn try_sample(&mut self) -> Option<f32> {
        self.current = self.records.pop_front();
        self.current.as_ref().and_then(|r| r.value)
    }

    fn is_tracked(&self) -> bool {
        self.current.as_ref().map_or(false, |r| r.value.is_some())
    }

    fn lean(&mut self) -> Option<f32> {
        self.current.as_ref().and_then(|r| r.lean)
    }
}

/// Sinusoidal chest displacement at a fixed breathing rate, with optional
/// noise and tracking dropouts.
#[derive(Debug)]
pub struct SyntheticSource {
    rate_bpm: f32,
    amplitude: f32,
    baseline: f32,
    jitter: f32,
    dropout: f32,
    tick_dt: f32,
    t: f32,
    tracked: bool,
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(rate_bpm: f32, tick_hz: f32) -> Self {
        Self::seeded(rate_bpm, tick_hz, rand::random())
    }

    pub fn seeded(rate_bpm: f32, tick_hz: f32, seed: u64) -> Self {
        Self {
            rate_bpm,
            // Large enough that window-average deltas clear the default
            // sensitivity threshold of 0.05 on the steep part of the wave.
            amplitude: 0.35,
            baseline: 0.9,
            jitter: 0.0,
            dropout: 0.0,
            tick_dt: 1.0 / tick_hz,
            t: 0.0,
            tracked: false,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    /// Per-tick probability of reporting no tracked body.
    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout.clamp(0.0, 1.0);
        self
    }

    pub fn tick_dt(&self) -> f32 {
        self.tick_dt
    }
}

impl BodySource for SyntheticSource {
    fn try_sample(&mut self) -> Option<f32> {
        self.t += self.tick_dt;
        if self.dropout > 0.0 && self.rng.gen::<f32>() < self.dropout {
            self.tracked = false;
            return None;
        }
        self.tracked = true;
        let omega = std::f32::consts::TAU * self.rate_bpm / 60.0;
        let noise = if self.jitter > 0.0 {
            self.rng.gen_range(-self.jitter..self.jitter)
        } else {
            0.0
        };
        Some(self.baseline + self.amplitude * (omega * self.t).sin() + noise)
    }

    fn is_tracked(&self) -> bool {
        self.tracked
    }
}

/// One detector coupled to one sample source, plus bookkeeping for a summary.
pub struct Session<S: BodySource> {
    id: SessionId,
    started: DateTime<Utc>,
    detector: BreathDetector,
    source: S,
    ticks: u64,
    invalid_samples: u64,
}

impl<S: BodySource> Session<S> {
    pub fn new(detector: BreathDetector, source: S) -> Self {
        Self {
            id: SessionId::new(),
            started: Utc::now(),
            detector,
            source,
            ticks: 0,
            invalid_samples: 0,
        }
    }

    pub fn with_config(cfg: DetectorConfig, source: S) -> Result<Self, ConfigError> {
        Ok(Self::new(BreathDetector::new(cfg)?, source))
    }

    /// Pull one sample from the source and advance the detector by `dt`.
    /// Samples that fail validation are dropped and counted as untracked.
    pub fn tick(&mut self, dt: f32) {
        self.ticks += 1;
        let value = self.source.try_sample().and_then(|v| match validate_sample(v) {
            Ok(()) => Some(v),
            Err(err) => {
                log::warn!("dropping sample: {err}");
                self.invalid_samples += 1;
                None
            }
        });
        if let Some(lean) = self.source.lean() {
            self.detector.set_lean(lean);
        }
        self.detector.advance(dt, value);
    }

    pub fn detector(&self) -> &BreathDetector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut BreathDetector {
        &mut self.detector
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            started: self.started,
            ticks: self.ticks,
            invalid_samples: self.invalid_samples,
            tracking: self.detector.is_tracking(),
            phase: self.detector.phase(),
            total_cycles: self.detector.total_cycles(),
            last_cycle_secs: self.detector.last_cycle_secs(),
            avg_cycle_secs: self.detector.avg_cycle_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub started: DateTime<Utc>,
    pub ticks: u64,
    pub invalid_samples: u64,
    pub tracking: bool,
    pub phase: BreathPhase,
    pub total_cycles: u32,
    pub last_cycle_secs: f32,
    pub avg_cycle_secs: f32,
}
