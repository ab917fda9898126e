use std::fmt;

/// Rotation direction for the composite ring and for individual clone spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Cw,
    Ccw,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Self::Cw => 1.0,
            Self::Ccw => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Cw => Self::Ccw,
            Self::Ccw => Self::Cw,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cw => "cw",
            Self::Ccw => "ccw",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cw" => Some(Self::Cw),
            "ccw" => Some(Self::Ccw),
            _ => None,
        }
    }
}

/// How a clone's pixels combine with what is already on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Screen,
    Multiply,
    Lighten,
    Difference,
}

impl BlendMode {
    pub const fn all() -> [Self; 5] {
        [
            Self::Normal,
            Self::Screen,
            Self::Multiply,
            Self::Lighten,
            Self::Difference,
        ]
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|&m| m == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Screen => "screen",
            Self::Multiply => "multiply",
            Self::Lighten => "lighten",
            Self::Difference => "difference",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Palette used when the background color drifts over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundPreset {
    Rainbow,
    Warm,
    Cool,
    Sunset,
    Ocean,
    Fire,
    PurpleHaze,
}

impl BackgroundPreset {
    pub const fn all() -> [Self; 7] {
        [
            Self::Rainbow,
            Self::Warm,
            Self::Cool,
            Self::Sunset,
            Self::Ocean,
            Self::Fire,
            Self::PurpleHaze,
        ]
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|&p| p == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rainbow => "rainbow",
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Sunset => "sunset",
            Self::Ocean => "ocean",
            Self::Fire => "fire",
            Self::PurpleHaze => "purple-haze",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(raw.trim()))
    }
}

/// One immutable animation-parameter snapshot.
///
/// The engine never mutates a snapshot; settings changes replace it
/// wholesale via [`crate::animator::Animator::set_params`]. Every field is
/// independently configurable; nothing is derived from another field.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Number of clones in the ring. Must be >= 1.
    pub repeats: usize,
    /// Base clone width in framebuffer pixels (height follows the asset's
    /// intrinsic aspect ratio).
    pub size_px: f64,
    /// Ring radius in pixels before oscillation/audio modulation.
    pub radius: f64,

    /// Composite ring rotation, radians per simulation step.
    pub comp_speed: f64,
    pub comp_direction: Direction,
    /// Individual clone spin, radians per simulation step.
    pub spin_speed: f64,
    pub spin_direction: Direction,

    pub scale_enabled: bool,
    pub scale_rate: f64,
    pub scale_amount: f64,
    pub scale_per_item: bool,

    pub radial_enabled: bool,
    pub radial_rate: f64,
    pub radial_amount: f64,
    pub radial_per_item: bool,

    /// When enabled each clone also tracks its angular position around the
    /// ring; the offset selects outward (0), inward (pi) or tangent (+-pi/2).
    pub orient_enabled: bool,
    pub orient_offset: f64,

    pub wave_enabled: bool,
    pub wave_frequency: f64,
    pub wave_amplitude: f64,
    pub wave_speed: f64,
    pub wave_per_item: bool,

    pub hue_enabled: bool,
    /// Degrees of hue drift per simulation step.
    pub hue_drift_speed: f64,

    pub bg_color: [u8; 3],
    pub bg_shift_enabled: bool,
    pub bg_shift_preset: BackgroundPreset,
    /// Degrees of background hue drift per simulation step.
    pub bg_shift_speed: f64,

    pub audio_reactive: bool,
    pub audio_sensitivity: f64,
    pub bass_boost: f64,
    pub mid_boost: f64,
    pub treble_boost: f64,
    /// Maximum radius modulation in pixels at full audio level.
    pub audio_mod_max: f64,

    pub blend_mode: BlendMode,
    pub remove_stroke: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            repeats: 25,
            size_px: 48.0,
            radius: 56.0,
            comp_speed: 0.015,
            comp_direction: Direction::Ccw,
            spin_speed: 0.013,
            spin_direction: Direction::Ccw,
            scale_enabled: true,
            scale_rate: 0.005,
            scale_amount: 0.65,
            scale_per_item: true,
            radial_enabled: true,
            radial_rate: 0.004,
            radial_amount: 24.0,
            radial_per_item: false,
            orient_enabled: false,
            orient_offset: 0.0,
            wave_enabled: false,
            wave_frequency: 2.0,
            wave_amplitude: 12.0,
            wave_speed: 0.02,
            wave_per_item: false,
            hue_enabled: true,
            hue_drift_speed: 0.1,
            bg_color: [0x11, 0x11, 0x11],
            bg_shift_enabled: false,
            bg_shift_preset: BackgroundPreset::Rainbow,
            bg_shift_speed: 0.5,
            audio_reactive: false,
            audio_sensitivity: 1.0,
            bass_boost: 1.0,
            mid_boost: 1.0,
            treble_boost: 1.0,
            audio_mod_max: 40.0,
            blend_mode: BlendMode::Normal,
            remove_stroke: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    /// `repeats` must be >= 1; the solver divides by it.
    ZeroRepeats,
    /// A numeric field was NaN or infinite.
    NonFinite { field: &'static str },
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRepeats => write!(f, "repeats must be at least 1"),
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
        }
    }
}

impl std::error::Error for ParamsError {}

impl Params {
    /// Validate a snapshot at the parameter boundary. The solver and the
    /// clone manager assume a validated snapshot and never re-check.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.repeats < 1 {
            return Err(ParamsError::ZeroRepeats);
        }
        let fields: [(&'static str, f64); 18] = [
            ("size_px", self.size_px),
            ("radius", self.radius),
            ("comp_speed", self.comp_speed),
            ("spin_speed", self.spin_speed),
            ("scale_rate", self.scale_rate),
            ("scale_amount", self.scale_amount),
            ("radial_rate", self.radial_rate),
            ("radial_amount", self.radial_amount),
            ("orient_offset", self.orient_offset),
            ("wave_frequency", self.wave_frequency),
            ("wave_amplitude", self.wave_amplitude),
            ("wave_speed", self.wave_speed),
            ("hue_drift_speed", self.hue_drift_speed),
            ("bg_shift_speed", self.bg_shift_speed),
            ("audio_sensitivity", self.audio_sensitivity),
            ("bass_boost", self.bass_boost),
            ("mid_boost", self.mid_boost),
            ("treble_boost", self.treble_boost),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(ParamsError::NonFinite { field: name });
            }
        }
        if !self.audio_mod_max.is_finite() {
            return Err(ParamsError::NonFinite {
                field: "audio_mod_max",
            });
        }
        Ok(())
    }

    /// True when moving from `self` to `next` requires tearing down and
    /// recreating the clone instances. Everything else takes effect on the
    /// next render pass without structural work.
    pub fn structural_change(&self, next: &Params) -> bool {
        self.repeats != next.repeats
            || self.remove_stroke != next.remove_stroke
            || self.blend_mode != next.blend_mode
    }
}
