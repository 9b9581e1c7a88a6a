//! Sleep-state hysteresis machine.

use crate::config::DetectorConfig;
use serde::Serialize;

/// Inferred depth of sleep. `Asleep` is terminal for a session; only an
/// explicit reset leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SleepState {
    Awake,
    Drowsy,
    Asleep,
}

impl SleepState {
    /// Stable string used by persisted records.
    pub fn badge(self) -> &'static str {
        match self {
            SleepState::Awake => "Awake",
            SleepState::Drowsy => "Drowsy",
            SleepState::Asleep => "Asleep",
        }
    }
}

/// Per-sample threshold checks feeding the transitions.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct TransitionInputs {
    pub(super) bpm_ok: bool,
    pub(super) cv_ok: bool,
    pub(super) cv_weak: bool,
    pub(super) amp_low: bool,
}

/// Awake → Drowsy → Asleep with per-transition hold accumulators.
///
/// The two holds are deliberately asymmetric: the drowsy hold resets hard on
/// any failing sample, while the asleep hold only decays by two ticks so a
/// brief dropout during settling does not restart the 30 s wait. Holds are
/// tracked as whole sample counts and converted to seconds for comparison,
/// keeping the boundary exact at the configured hold durations.
pub(super) struct SleepStateMachine {
    state: SleepState,
    drowsy_hold: u64,
    asleep_hold: u64,
    dt: f64,
    drowsy_hold_secs: f64,
    asleep_hold_secs: f64,
    bpm_range: (f64, f64),
    cv_ok_max: f64,
    cv_weak_max: f64,
}

impl SleepStateMachine {
    pub(super) fn new(cfg: &DetectorConfig) -> Self {
        Self {
            state: SleepState::Awake,
            drowsy_hold: 0,
            asleep_hold: 0,
            dt: cfg.dt(),
            drowsy_hold_secs: cfg.drowsy_hold_secs,
            asleep_hold_secs: cfg.asleep_hold_secs,
            bpm_range: (cfg.drowsy_rate_min_bpm, cfg.drowsy_rate_max_bpm),
            cv_ok_max: cfg.cv_steady_max,
            cv_weak_max: cfg.cv_weak_max,
        }
    }

    /// Derive the threshold checks from this sample's features.
    pub(super) fn inputs(
        &self,
        rate_bpm: Option<f64>,
        cv: Option<f64>,
        amp_low: bool,
    ) -> TransitionInputs {
        TransitionInputs {
            bpm_ok: rate_bpm.is_some_and(|b| b > self.bpm_range.0 && b < self.bpm_range.1),
            cv_ok: cv.is_some_and(|c| c < self.cv_ok_max),
            cv_weak: cv.is_some_and(|c| c < self.cv_weak_max),
            amp_low,
        }
    }

    /// Advance the machine by one sample tick. Returns the new state when a
    /// transition fires.
    pub(super) fn step(&mut self, inputs: TransitionInputs) -> Option<SleepState> {
        match self.state {
            SleepState::Awake => {
                if inputs.bpm_ok && inputs.cv_weak {
                    self.drowsy_hold += 1;
                    if self.hold_secs(self.drowsy_hold) >= self.drowsy_hold_secs {
                        self.state = SleepState::Drowsy;
                        self.asleep_hold = 0;
                        return Some(self.state);
                    }
                } else {
                    self.drowsy_hold = 0;
                }
                None
            }
            SleepState::Drowsy => {
                if inputs.bpm_ok && inputs.cv_ok && inputs.amp_low {
                    self.asleep_hold += 1;
                    if self.hold_secs(self.asleep_hold) >= self.asleep_hold_secs {
                        self.state = SleepState::Asleep;
                        return Some(self.state);
                    }
                } else {
                    self.asleep_hold = self.asleep_hold.saturating_sub(2);
                }
                None
            }
            // Waking up is judged elsewhere; the session ends via reset.
            SleepState::Asleep => None,
        }
    }

    pub(super) fn state(&self) -> SleepState {
        self.state
    }

    #[cfg(test)]
    pub(super) fn drowsy_hold_secs(&self) -> f64 {
        self.hold_secs(self.drowsy_hold)
    }

    #[cfg(test)]
    pub(super) fn asleep_hold_secs(&self) -> f64 {
        self.hold_secs(self.asleep_hold)
    }

    fn hold_secs(&self, ticks: u64) -> f64 {
        ticks as f64 * self.dt
    }

    pub(super) fn reset(&mut self) {
        self.state = SleepState::Awake;
        self.drowsy_hold = 0;
        self.asleep_hold = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> SleepStateMachine {
        SleepStateMachine::new(&DetectorConfig::default())
    }

    fn drowsy_inputs() -> TransitionInputs {
        TransitionInputs {
            bpm_ok: true,
            cv_ok: false,
            cv_weak: true,
            amp_low: false,
        }
    }

    fn asleep_inputs() -> TransitionInputs {
        TransitionInputs {
            bpm_ok: true,
            cv_ok: true,
            cv_weak: true,
            amp_low: true,
        }
    }

    fn drive_to_drowsy(m: &mut SleepStateMachine) {
        for _ in 0..200 {
            m.step(drowsy_inputs());
        }
        assert_eq!(m.state(), SleepState::Drowsy);
    }

    #[test]
    fn drowsy_transition_fires_exactly_at_hold() {
        let mut m = machine();
        for _ in 0..199 {
            assert_eq!(m.step(drowsy_inputs()), None);
        }
        assert_eq!(m.state(), SleepState::Awake);
        assert_eq!(m.step(drowsy_inputs()), Some(SleepState::Drowsy));
    }

    #[test]
    fn awake_hold_resets_hard_on_one_bad_sample() {
        let mut m = machine();
        for _ in 0..150 {
            m.step(drowsy_inputs());
        }
        m.step(TransitionInputs::default());
        assert_eq!(m.drowsy_hold_secs(), 0.0);
        assert_eq!(m.state(), SleepState::Awake);
    }

    #[test]
    fn asleep_hold_decays_instead_of_resetting() {
        let mut m = machine();
        drive_to_drowsy(&mut m);
        for _ in 0..100 {
            m.step(asleep_inputs());
        }
        let before = m.asleep_hold_secs();
        m.step(TransitionInputs::default());
        let after = m.asleep_hold_secs();
        assert!(after > 0.0, "hold must survive a single dropout");
        assert!((before - after - 0.2).abs() < 1e-9, "decay is 2 ticks");
    }

    #[test]
    fn asleep_transition_fires_at_hold() {
        let mut m = machine();
        drive_to_drowsy(&mut m);
        let mut transitioned = None;
        for i in 0..300 {
            if let Some(next) = m.step(asleep_inputs()) {
                transitioned = Some((i, next));
                break;
            }
        }
        let (i, next) = transitioned.expect("should reach Asleep");
        assert_eq!(next, SleepState::Asleep);
        assert_eq!(i, 299);
    }

    #[test]
    fn asleep_unreachable_without_amp_low() {
        let mut m = machine();
        drive_to_drowsy(&mut m);
        let mut inputs = asleep_inputs();
        inputs.amp_low = false;
        for _ in 0..3_500 {
            m.step(inputs);
        }
        assert_eq!(m.state(), SleepState::Drowsy);
    }

    #[test]
    fn asleep_is_terminal_until_reset() {
        let mut m = machine();
        drive_to_drowsy(&mut m);
        for _ in 0..300 {
            m.step(asleep_inputs());
        }
        assert_eq!(m.state(), SleepState::Asleep);
        for _ in 0..100 {
            assert_eq!(m.step(TransitionInputs::default()), None);
        }
        assert_eq!(m.state(), SleepState::Asleep);
        m.reset();
        assert_eq!(m.state(), SleepState::Awake);
    }

    #[test]
    fn badges_match_persisted_values() {
        assert_eq!(SleepState::Awake.badge(), "Awake");
        assert_eq!(SleepState::Drowsy.badge(), "Drowsy");
        assert_eq!(SleepState::Asleep.badge(), "Asleep");
    }
}
