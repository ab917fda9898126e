use crate::params::Params;

/// One simulation step, in milliseconds. The animator drains wall time in
/// slices of this size so oscillator rates are independent of display rate.
pub const FIXED_STEP_MS: f64 = 1000.0 / 60.0;

/// The seven angular accumulators behind every oscillator.
///
/// `hue` and `bg_shift` are kept in [0, 360) degrees; the rest are radians
/// and grow unbounded (their consumers are periodic, and f64 keeps full
/// precision at these rates for far longer than any session).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseState {
    /// Rotation of the whole ring.
    pub comp: f64,
    /// Shared spin accumulator; a clone's own spin angle is this minus the
    /// origin captured when the clone was built.
    pub spin: f64,
    pub scale_pulse: f64,
    pub rad_osc: f64,
    /// Foreground hue drift, degrees.
    pub hue: f64,
    /// Background hue drift, degrees.
    pub bg_shift: f64,
    pub wave: f64,
}

impl PhaseState {
    /// Advance every accumulator by one fixed simulation step.
    ///
    /// Composite rotation, spin, scale pulse and radial oscillation always
    /// run. Hue drift, background shift and wave only advance while their
    /// feature flag is set: a disabled oscillator freezes in place so
    /// re-enabling it continues from where it stopped.
    pub fn advance(&mut self, params: &Params) {
        self.comp += params.comp_speed * params.comp_direction.sign();
        self.spin += params.spin_speed * params.spin_direction.sign();
        self.scale_pulse += params.scale_rate;
        self.rad_osc += params.radial_rate;

        if params.hue_enabled {
            self.hue = (self.hue + params.hue_drift_speed).rem_euclid(360.0);
        }
        if params.bg_shift_enabled {
            self.bg_shift = (self.bg_shift + params.bg_shift_speed).rem_euclid(360.0);
        }
        if params.wave_enabled {
            self.wave += params.wave_speed;
        }
    }

    /// Zero all seven accumulators. Called when a new asset is loaded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
