use mandalaviz::params::{BackgroundPreset, Params};
use mandalaviz::phase::PhaseState;
use mandalaviz::solver::{GOLDEN_ANGLE, background_color, hsl_to_rgb, preset_color, solve};
use std::f64::consts::PI;

const CX: f64 = 200.0;
const CY: f64 = 200.0;

fn still_params() -> Params {
    // Pure ring placement: every oscillator off, no audio.
    Params {
        repeats: 4,
        size_px: 10.0,
        radius: 100.0,
        scale_enabled: false,
        radial_enabled: false,
        orient_enabled: false,
        wave_enabled: false,
        hue_enabled: false,
        bg_shift_enabled: false,
        ..Params::default()
    }
}

fn center_of(t: &mandalaviz::solver::CloneTransform) -> (f64, f64) {
    (t.x + t.width / 2.0, t.y + t.height / 2.0)
}

#[test]
fn solve_is_pure() {
    let params = Params::default();
    let phase = PhaseState {
        comp: 0.3,
        spin: 1.1,
        scale_pulse: 0.2,
        rad_osc: 0.9,
        hue: 42.0,
        bg_shift: 10.0,
        wave: 0.4,
    };
    let a = solve(3, 25, 0.7, &phase, &params, 0.25, CX, CY, 1.0);
    let b = solve(3, 25, 0.7, &phase, &params, 0.25, CX, CY, 1.0);
    assert_eq!(a, b);
}

#[test]
fn four_clones_sit_at_the_cardinal_points() {
    let params = still_params();
    let phase = PhaseState::default();
    let expected = [
        (CX + 100.0, CY),
        (CX, CY + 100.0),
        (CX - 100.0, CY),
        (CX, CY - 100.0),
    ];
    for (i, (ex, ey)) in expected.into_iter().enumerate() {
        let t = solve(i, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
        let (x, y) = center_of(&t);
        assert!((x - ex).abs() < 1e-9, "clone {i} x: {x} vs {ex}");
        assert!((y - ey).abs() < 1e-9, "clone {i} y: {y} vs {ey}");
        assert_eq!(t.width, 10.0);
        assert_eq!(t.height, 10.0);
        assert_eq!(t.rotation, 0.0);
        assert!(t.filter.is_none());
    }
}

#[test]
fn composition_phase_rotates_the_whole_ring() {
    let params = still_params();
    let phase = PhaseState {
        comp: PI / 2.0,
        ..PhaseState::default()
    };
    // Clone 0 moves a quarter turn: from the +x axis to the +y axis.
    let t = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    let (x, y) = center_of(&t);
    assert!((x - CX).abs() < 1e-9);
    assert!((y - (CY + 100.0)).abs() < 1e-9);
}

#[test]
fn audio_level_widens_the_ring() {
    let mut params = still_params();
    params.radius = 50.0;
    params.audio_mod_max = 100.0;
    let phase = PhaseState::default();
    // Half level adds half the modulation ceiling: 50 + 0.5 * 100.
    let t = solve(0, 4, 0.0, &phase, &params, 0.5, CX, CY, 1.0);
    let (x, y) = center_of(&t);
    assert!((x - (CX + 100.0)).abs() < 1e-9);
    assert!((y - CY).abs() < 1e-9);
}

#[test]
fn radial_oscillation_moves_along_the_radius() {
    let mut params = still_params();
    params.radial_enabled = true;
    params.radial_amount = 24.0;
    params.radial_per_item = false;
    let phase = PhaseState {
        rad_osc: PI / 2.0, // sin = 1
        ..PhaseState::default()
    };
    let t = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    let (x, y) = center_of(&t);
    assert!((x - (CX + 124.0)).abs() < 1e-9);
    assert!((y - CY).abs() < 1e-9);
}

#[test]
fn wave_offset_is_tangential() {
    let mut params = still_params();
    params.wave_enabled = true;
    params.wave_amplitude = 12.0;
    params.wave_per_item = false;
    let phase = PhaseState {
        wave: PI / 2.0, // sin = 1 for clone 0
        ..PhaseState::default()
    };
    // Clone 0 sits on the +x axis; its tangent is +y, so the full offset
    // lands on y and the radial distance stays (to first order) unchanged.
    let t = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    let (x, y) = center_of(&t);
    assert!((x - (CX + 100.0)).abs() < 1e-9);
    assert!((y - (CY + 12.0)).abs() < 1e-9);
}

#[test]
fn per_item_radial_oscillation_offsets_by_the_golden_angle() {
    let mut params = still_params();
    params.radial_enabled = true;
    params.radial_amount = 24.0;
    params.radial_per_item = true;
    let phase = PhaseState::default(); // rad_osc = 0

    // Clone 0 sees sin(0): its radius is unmodulated.
    let t0 = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    let (x0, y0) = center_of(&t0);
    let d0 = ((x0 - CX).powi(2) + (y0 - CY).powi(2)).sqrt();
    assert!((d0 - 100.0).abs() < 1e-9);

    // Clone i sees sin(rad_osc + i * GOLDEN_ANGLE).
    for i in 1..4usize {
        let t = solve(i, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
        let (x, y) = center_of(&t);
        let dist = ((x - CX).powi(2) + (y - CY).powi(2)).sqrt();
        let expected = 100.0 + 24.0 * (i as f64 * GOLDEN_ANGLE).sin();
        assert!((dist - expected).abs() < 1e-9, "clone {i}: {dist} vs {expected}");
    }
}

#[test]
fn per_item_wave_offsets_by_the_golden_angle() {
    let mut params = still_params();
    params.wave_enabled = true;
    params.wave_amplitude = 12.0;
    params.wave_frequency = 0.0; // isolate the per-item term
    params.wave_per_item = true;
    let phase = PhaseState::default(); // wave = 0

    // Clone 1 of 4 sits on the +y axis; its tangent points along -x.
    let t = solve(1, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    let (x, y) = center_of(&t);
    let offset = 12.0 * GOLDEN_ANGLE.sin();
    assert!((x - (CX - offset)).abs() < 1e-9, "{x}");
    assert!((y - (CY + 100.0)).abs() < 1e-9, "{y}");

    // Clone 0's wave phase is zero: no displacement.
    let t0 = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    let (x0, y0) = center_of(&t0);
    assert!((x0 - (CX + 100.0)).abs() < 1e-9);
    assert!((y0 - CY).abs() < 1e-9);
}

#[test]
fn per_item_scale_pulse_staggers_clone_sizes() {
    let mut params = still_params();
    params.scale_enabled = true;
    params.scale_amount = 0.5;
    params.scale_per_item = true;
    let phase = PhaseState::default(); // scale_pulse = 0

    // Per-item pulse phase is i * step (step = pi/2 for n = 4).
    let w: Vec<f64> = (0..4)
        .map(|i| solve(i, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0).width)
        .collect();
    assert!((w[0] - 10.0).abs() < 1e-9); // sin(0)
    assert!((w[1] - 15.0).abs() < 1e-9); // sin(pi/2)
    assert!((w[2] - 10.0).abs() < 1e-9); // sin(pi)
    assert!((w[3] - 5.0).abs() < 1e-9); // sin(3pi/2)
    assert!(w[0] != w[1], "neighbouring clones must pulse out of step");
}

#[test]
fn scale_pulse_resizes_around_the_same_center() {
    let mut params = still_params();
    params.scale_enabled = true;
    params.scale_amount = 0.5;
    params.scale_per_item = false;
    let phase = PhaseState {
        scale_pulse: PI / 2.0, // sin = 1 => scale 1.5
        ..PhaseState::default()
    };
    let t = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    assert!((t.width - 15.0).abs() < 1e-9);
    assert!((t.height - 15.0).abs() < 1e-9);
    let (x, y) = center_of(&t);
    assert!((x - (CX + 100.0)).abs() < 1e-9);
    assert!((y - CY).abs() < 1e-9);
}

#[test]
fn aspect_ratio_shapes_the_height() {
    let params = still_params();
    let phase = PhaseState::default();
    let t = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 2.0);
    assert_eq!(t.width, 10.0);
    assert_eq!(t.height, 20.0);
}

#[test]
fn rotation_is_spin_only_without_orientation() {
    let params = still_params();
    let phase = PhaseState::default();
    let t = solve(2, 4, 0.37, &phase, &params, 0.0, CX, CY, 1.0);
    assert_eq!(t.rotation, 0.37);
}

#[test]
fn orientation_adds_ring_angle_and_offset() {
    let mut params = still_params();
    params.orient_enabled = true;
    params.orient_offset = PI;
    let phase = PhaseState::default();
    let t = solve(1, 4, 0.5, &phase, &params, 0.0, CX, CY, 1.0);
    // ang for clone 1 of 4 is pi/2.
    assert!((t.rotation - (0.5 + PI / 2.0 + PI)).abs() < 1e-12);
}

#[test]
fn hue_filter_spreads_clones_across_the_wheel() {
    let mut params = still_params();
    params.hue_enabled = true;
    let phase = PhaseState {
        hue: 300.0,
        ..PhaseState::default()
    };
    let f0 = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0)
        .filter
        .unwrap();
    let f1 = solve(1, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0)
        .filter
        .unwrap();
    assert!((f0.hue_deg - 300.0).abs() < 1e-9);
    assert!((f1.hue_deg - 30.0).abs() < 1e-9); // 300 + 90 wraps
    // Scale pulse is off, so brightness and saturation stay neutral.
    assert_eq!(f0.brightness, 1.0);
    assert_eq!(f0.saturation, 1.0);
}

#[test]
fn filter_breathes_with_the_scale_pulse() {
    let mut params = still_params();
    params.hue_enabled = true;
    params.scale_enabled = true;
    params.scale_per_item = false;
    let phase = PhaseState {
        scale_pulse: PI / 2.0, // t = 1
        ..PhaseState::default()
    };
    let f = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0)
        .filter
        .unwrap();
    assert!((f.brightness - 1.0).abs() < 1e-12);
    assert!((f.saturation - 1.25).abs() < 1e-12);

    let phase = PhaseState {
        scale_pulse: -PI / 2.0, // t = 0
        ..PhaseState::default()
    };
    let f = solve(0, 4, 0.0, &phase, &params, 0.0, CX, CY, 1.0)
        .filter
        .unwrap();
    assert!((f.brightness - 0.75).abs() < 1e-12);
    assert!((f.saturation - 0.75).abs() < 1e-12);
}

#[test]
fn single_clone_ring_is_well_defined() {
    let params = still_params();
    let phase = PhaseState::default();
    let t = solve(0, 1, 0.0, &phase, &params, 0.0, CX, CY, 1.0);
    let (x, y) = center_of(&t);
    assert!((x - (CX + 100.0)).abs() < 1e-9);
    assert!((y - CY).abs() < 1e-9);
}

#[test]
fn background_is_static_until_shift_is_enabled() {
    let mut params = still_params();
    params.bg_color = [10, 20, 30];
    let phase = PhaseState {
        bg_shift: 120.0,
        ..PhaseState::default()
    };
    assert_eq!(background_color(&params, &phase), [10, 20, 30]);

    params.bg_shift_enabled = true;
    params.bg_shift_preset = BackgroundPreset::Rainbow;
    assert_eq!(
        background_color(&params, &phase),
        preset_color(BackgroundPreset::Rainbow, 120.0)
    );
}

#[test]
fn preset_palettes_differ() {
    let colors: Vec<[u8; 3]> = BackgroundPreset::all()
        .into_iter()
        .map(|p| preset_color(p, 90.0))
        .collect();
    // Not every pair needs to differ, but the palette set must not collapse
    // to a single color.
    assert!(colors.iter().any(|c| *c != colors[0]));
}

#[test]
fn hsl_primaries_convert_exactly() {
    assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), [255, 0, 0]);
    assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), [0, 255, 0]);
    assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), [0, 0, 255]);
    assert_eq!(hsl_to_rgb(77.0, 0.0, 50.0), [128, 128, 128]);
    // Hue wraps past a full turn.
    assert_eq!(hsl_to_rgb(480.0, 100.0, 50.0), [0, 255, 0]);
}
