use serde::{Deserialize, Serialize};

/// Binary phase of the breath cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathPhase {
    #[default]
    Inhale,
    Exhale,
}

impl std::fmt::Display for BreathPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreathPhase::Inhale => write!(f, "inhale"),
            BreathPhase::Exhale => write!(f, "exhale"),
        }
    }
}

/// One scalar chest-height reading plus elapsed time since the previous one.
///
/// The detector does not own the source of these; whatever polls the sensor
/// (or replays a log) hands them over one tick at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    pub value: f32,
    pub dt: f32,
}

/// Cumulative completed-cycle statistics.
///
/// `count` is incremented when a cycle starts being timed, `sum` only when the
/// cycle completes and survived dwell gating, so the average can run slightly
/// low while a cycle is in flight. Reset only on explicit request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub sum: f32,
    pub count: u32,
}

impl CycleStats {
    pub fn average(&self) -> f32 {
        if self.count > 0 {
            self.sum / self.count as f32
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_zero_without_cycles() {
        let stats = CycleStats::default();
        assert_eq!(stats.average(), 0.0);
    }

    #[test]
    fn average_divides_by_count() {
        let stats = CycleStats { sum: 9.0, count: 3 };
        assert!((stats.average() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
