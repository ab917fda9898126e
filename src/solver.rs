use crate::params::{BackgroundPreset, Params};
use crate::phase::PhaseState;
use std::f64::consts::PI;

/// Phase offset between neighbouring clones for per-item oscillator
/// variation. A fixed irrational angle spreads the offsets evenly around the
/// cycle for any clone count; it is deliberately not derived from N.
pub const GOLDEN_ANGLE: f64 = 2.399963229728653;

/// Per-clone color adjustment, applied by the compositor when present.
/// Semantics follow the CSS filter functions the original surface used:
/// `brightness()` and `saturate()` gains plus `hue-rotate()` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorFilter {
    pub hue_deg: f64,
    pub brightness: f64,
    pub saturation: f64,
}

/// Everything the compositor needs to commit one clone to the canvas.
/// `x`/`y` are the top-left placement origin; the clone's center sits at
/// `(x + width / 2, y + height / 2)` and rotation is about that center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloneTransform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians, clockwise in screen space.
    pub rotation: f64,
    /// `None` clears any previously applied filter.
    pub filter: Option<ColorFilter>,
}

/// Compute the full visual transform for clone `index` of `n`.
///
/// Pure: reads phase and parameters, never mutates them. `spin_angle` is the
/// clone's individual spin, `audio_level` the current normalized audio
/// scalar (0 when audio-reactive is off or capture is inactive), `(cx, cy)`
/// the center of the canvas and `aspect` the asset's intrinsic
/// height/width ratio.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    index: usize,
    n: usize,
    spin_angle: f64,
    phase: &PhaseState,
    params: &Params,
    audio_level: f64,
    cx: f64,
    cy: f64,
    aspect: f64,
) -> CloneTransform {
    debug_assert!(n >= 1, "clone count is validated at the parameter boundary");
    let i = index as f64;
    let step = (2.0 * PI) / n as f64;
    let ang = i * step + phase.comp;

    let mut rad = params.radius + audio_level * params.audio_mod_max;
    if params.radial_enabled {
        let osc_phase = if params.radial_per_item {
            phase.rad_osc + i * GOLDEN_ANGLE
        } else {
            phase.rad_osc
        };
        rad += params.radial_amount * osc_phase.sin();
    }

    let mut x = cx + rad * ang.cos();
    let mut y = cy + rad * ang.sin();

    // Wave displacement is tangential: computed after the radial position and
    // applied along ang + pi/2 so it never changes the clone's distance from
    // the center to first order.
    if params.wave_enabled {
        let mut wave_phase = phase.wave + i * params.wave_frequency * step;
        if params.wave_per_item {
            wave_phase += i * GOLDEN_ANGLE;
        }
        let offset = params.wave_amplitude * wave_phase.sin();
        let tangent = ang + PI / 2.0;
        x += offset * tangent.cos();
        y += offset * tangent.sin();
    }

    let mut scale = 1.0;
    if params.scale_enabled {
        let pulse_phase = if params.scale_per_item {
            phase.scale_pulse + i * step
        } else {
            phase.scale_pulse
        };
        scale = 1.0 + params.scale_amount * pulse_phase.sin();
    }

    let width = params.size_px * scale;
    let height = width * aspect;

    let rotation = if params.orient_enabled {
        spin_angle + ang + params.orient_offset
    } else {
        spin_angle
    };

    let filter = if params.hue_enabled {
        let hue_deg = (phase.hue + i * (360.0 / n as f64)).rem_euclid(360.0);
        let (brightness, saturation) = if params.scale_enabled {
            let pulse_phase = if params.scale_per_item {
                phase.scale_pulse + i * step
            } else {
                phase.scale_pulse
            };
            let t = (pulse_phase.sin() + 1.0) / 2.0;
            (0.75 + 0.25 * t, 0.75 + 0.5 * t)
        } else {
            (1.0, 1.0)
        };
        Some(ColorFilter {
            hue_deg,
            brightness,
            saturation,
        })
    } else {
        None
    };

    CloneTransform {
        x: x - width / 2.0,
        y: y - height / 2.0,
        width,
        height,
        rotation,
        filter,
    }
}

/// Current background color: the drifting preset palette when background
/// shift is enabled, otherwise the static configured color.
pub fn background_color(params: &Params, phase: &PhaseState) -> [u8; 3] {
    if !params.bg_shift_enabled {
        return params.bg_color;
    }
    preset_color(params.bg_shift_preset, phase.bg_shift)
}

/// Evaluate one palette at a phase angle in [0, 360) degrees.
pub fn preset_color(preset: BackgroundPreset, angle: f64) -> [u8; 3] {
    let t = angle / 360.0;
    match preset {
        BackgroundPreset::Rainbow => hsl_to_rgb(angle, 70.0, 20.0),
        // Red through yellow.
        BackgroundPreset::Warm => hsl_to_rgb(t * 60.0, 80.0, 25.0),
        // Cyan through purple.
        BackgroundPreset::Cool => hsl_to_rgb(180.0 + t * 120.0, 70.0, 20.0),
        // Orange through purple.
        BackgroundPreset::Sunset => hsl_to_rgb(20.0 + t * 260.0, 75.0, 22.0),
        BackgroundPreset::Ocean => {
            hsl_to_rgb(180.0 + (t * 2.0 * PI).sin() * 30.0, 65.0, 18.0)
        }
        BackgroundPreset::Fire => {
            let hue = (t * PI).sin() * 40.0;
            let lightness = 20.0 + (t * PI).sin() * 10.0;
            hsl_to_rgb(hue, 85.0, lightness)
        }
        // Purple through magenta.
        BackgroundPreset::PurpleHaze => hsl_to_rgb(270.0 + t * 60.0, 70.0, 20.0),
    }
}

/// HSL to RGB, h in degrees, s and l in percent.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let h = h.rem_euclid(360.0);
    let l = l / 100.0;
    let a = (s * l.min(1.0 - l)) / 100.0;
    let f = |n: f64| -> u8 {
        let k = (n + h / 30.0).rem_euclid(12.0);
        let color = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * color).round().clamp(0.0, 255.0) as u8
    };
    [f(0.0), f(8.0), f(4.0)]
}
