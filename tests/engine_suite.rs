use mandalaviz::animator::Animator;
use mandalaviz::asset::builtin_motif;
use mandalaviz::compose::Canvas;
use mandalaviz::params::{Params, ParamsError};
use mandalaviz::phase::PhaseState;
use std::time::{Duration, Instant};

fn quiet_params() -> Params {
    // Everything optional off, so phase assertions only see the always-on
    // accumulators.
    Params {
        repeats: 4,
        scale_enabled: false,
        radial_enabled: false,
        wave_enabled: false,
        hue_enabled: false,
        bg_shift_enabled: false,
        ..Params::default()
    }
}

fn running_animator(params: Params) -> Animator {
    let mut a = Animator::new(params).unwrap();
    a.load_asset(builtin_motif(16));
    a
}

#[test]
fn new_rejects_zero_repeats() {
    let params = Params {
        repeats: 0,
        ..Params::default()
    };
    assert_eq!(Animator::new(params).unwrap_err(), ParamsError::ZeroRepeats);
}

#[test]
fn load_asset_builds_clones_with_zero_spin() {
    let a = running_animator(quiet_params());
    assert!(a.has_asset());
    assert!(!a.is_paused());
    assert_eq!(a.clones().len(), 4);
    for clone in a.clones().iter() {
        assert_eq!(clone.spin_angle(a.phase()), 0.0);
    }
}

#[test]
fn first_frame_only_baselines_time() {
    let mut a = running_animator(quiet_params());
    let mut canvas = Canvas::new(8, 8);
    assert_eq!(a.frame(Instant::now(), &mut canvas), 0);
    assert_eq!(a.phase(), &PhaseState::default());
}

#[test]
fn sub_step_frame_advances_nothing() {
    let mut a = running_animator(quiet_params());
    let mut canvas = Canvas::new(8, 8);
    let t0 = Instant::now();
    a.frame(t0, &mut canvas);
    let steps = a.frame(t0 + Duration::from_millis(10), &mut canvas);
    assert_eq!(steps, 0);
    assert_eq!(a.phase(), &PhaseState::default());
}

#[test]
fn accumulated_time_drains_in_whole_steps() {
    let params = quiet_params();
    let comp_per_step = params.comp_speed * params.comp_direction.sign();
    let mut a = running_animator(params);
    let mut canvas = Canvas::new(8, 8);

    let t0 = Instant::now();
    a.frame(t0, &mut canvas);
    // 17 ms per frame is one fixed step (16.67 ms) plus a remainder that
    // never reaches a second step.
    let mut total = 0usize;
    for k in 1..=5u64 {
        total += a.frame(t0 + Duration::from_millis(17 * k), &mut canvas);
    }
    assert_eq!(total, 5);
    assert!((a.phase().comp - 5.0 * comp_per_step).abs() < 1e-12);
}

#[test]
fn long_stall_is_clamped() {
    let mut a = running_animator(quiet_params());
    let mut canvas = Canvas::new(8, 8);
    let t0 = Instant::now();
    a.frame(t0, &mut canvas);

    // 500 ms of wall time is credited as at most 32 ms: one whole step.
    let steps = a.frame(t0 + Duration::from_millis(500), &mut canvas);
    assert_eq!(steps, 1);
}

#[test]
fn paused_frames_do_not_advance() {
    let mut a = running_animator(quiet_params());
    let mut canvas = Canvas::new(8, 8);
    let t0 = Instant::now();
    a.frame(t0, &mut canvas);
    a.pause();
    assert!(a.is_paused());

    let steps = a.frame(t0 + Duration::from_secs(2), &mut canvas);
    assert_eq!(steps, 0);
    assert_eq!(a.phase(), &PhaseState::default());
}

#[test]
fn paused_frame_still_repaints_a_fresh_canvas() {
    let mut params = quiet_params();
    params.bg_color = [40, 50, 60];
    let mut a = running_animator(params);
    let mut canvas = Canvas::new(8, 8);
    a.frame(Instant::now(), &mut canvas);
    a.pause();

    // A terminal resize swaps in a zeroed buffer; a paused frame must paint
    // it rather than leave it black until resume.
    let mut resized = Canvas::new(16, 16);
    assert_eq!(a.frame(Instant::now(), &mut resized), 0);
    assert_eq!(&resized.rgba[..4], &[40, 50, 60, 255]);
}

#[test]
fn resume_rebaselines_instead_of_catching_up() {
    let mut a = running_animator(quiet_params());
    let mut canvas = Canvas::new(8, 8);
    let t0 = Instant::now();
    a.frame(t0, &mut canvas);
    a.frame(t0 + Duration::from_millis(17), &mut canvas);

    a.pause();
    a.resume();
    // The first frame after resume only re-baselines; a ten second pause
    // produces no burst of steps.
    let steps = a.frame(t0 + Duration::from_secs(10), &mut canvas);
    assert_eq!(steps, 0);
}

#[test]
fn disabled_oscillators_freeze_and_continue() {
    let mut params = quiet_params();
    params.wave_enabled = false;
    params.hue_enabled = false;
    let mut phase = PhaseState::default();

    for _ in 0..10 {
        phase.advance(&params);
    }
    assert_eq!(phase.wave, 0.0);
    assert_eq!(phase.hue, 0.0);
    assert!(phase.comp != 0.0);

    params.wave_enabled = true;
    params.hue_enabled = true;
    phase.advance(&params);
    assert!((phase.wave - params.wave_speed).abs() < 1e-12);
    assert!((phase.hue - params.hue_drift_speed).abs() < 1e-12);
}

#[test]
fn hue_accumulators_stay_in_degree_range() {
    let mut params = quiet_params();
    params.hue_enabled = true;
    params.hue_drift_speed = 100.0;
    params.bg_shift_enabled = true;
    params.bg_shift_speed = 250.0;

    let mut phase = PhaseState::default();
    for _ in 0..5 {
        phase.advance(&params);
    }
    assert!((phase.hue - 140.0).abs() < 1e-9); // 500 mod 360
    assert!((phase.bg_shift - 170.0).abs() < 1e-9); // 1250 mod 360
    assert!((0.0..360.0).contains(&phase.hue));
    assert!((0.0..360.0).contains(&phase.bg_shift));
}

#[test]
fn repeat_change_rebuilds_clones() {
    let mut a = running_animator(quiet_params());
    let mut canvas = Canvas::new(8, 8);
    let t0 = Instant::now();
    a.frame(t0, &mut canvas);
    for k in 1..=3u64 {
        a.frame(t0 + Duration::from_millis(17 * k), &mut canvas);
    }
    assert!(a.phase().spin != 0.0);

    let mut next = a.params().clone();
    next.repeats = 7;
    a.set_params(next).unwrap();
    assert_eq!(a.clones().len(), 7);
    // New instances are born with spin zero even though the shared
    // accumulator has moved on.
    for clone in a.clones().iter() {
        assert_eq!(clone.spin_angle(a.phase()), 0.0);
    }
}

#[test]
fn cosmetic_change_keeps_clone_instances() {
    let mut a = running_animator(quiet_params());
    let mut next = a.params().clone();
    next.radius = 99.0;
    next.comp_speed = 0.5;
    a.set_params(next).unwrap();
    assert_eq!(a.clones().len(), 4);
    assert_eq!(a.params().radius, 99.0);
}

#[test]
fn set_params_rejects_invalid_snapshot() {
    let mut a = running_animator(quiet_params());
    let mut next = a.params().clone();
    next.radius = f64::NAN;
    assert_eq!(
        a.set_params(next).unwrap_err(),
        ParamsError::NonFinite { field: "radius" }
    );
    // The previous snapshot stays in force.
    assert!(a.params().radius.is_finite());
}

#[test]
fn clear_pauses_and_releases_everything() {
    let mut a = running_animator(quiet_params());
    a.clear();
    assert!(a.is_paused());
    assert!(!a.has_asset());
    assert!(a.clones().is_empty());

    // Frames after clear still paint the background but simulate nothing.
    let mut canvas = Canvas::new(4, 4);
    assert_eq!(a.frame(Instant::now(), &mut canvas), 0);
}

#[test]
fn loading_new_asset_resets_phase() {
    let mut a = running_animator(quiet_params());
    let mut canvas = Canvas::new(8, 8);
    let t0 = Instant::now();
    a.frame(t0, &mut canvas);
    for k in 1..=4u64 {
        a.frame(t0 + Duration::from_millis(17 * k), &mut canvas);
    }
    assert!(a.phase().comp != 0.0);

    a.load_asset(builtin_motif(12));
    assert_eq!(a.phase(), &PhaseState::default());
    assert!(!a.is_paused());
}
