use crate::asset::Sprite;
use crate::audio::AudioInput;
use crate::clones::CloneSet;
use crate::compose::Canvas;
use crate::params::{Params, ParamsError};
use crate::phase::{FIXED_STEP_MS, PhaseState};
use crate::solver;
use std::time::Instant;

/// Upper bound on the wall time credited to a single frame. A long stall
/// (suspended terminal, debugger pause) then costs at most two simulation
/// steps instead of a runaway catch-up burst.
const MAX_FRAME_DELTA_MS: f64 = 32.0;

#[derive(Debug, Clone, Copy)]
struct RunState {
    paused: bool,
    last_frame: Option<Instant>,
    accumulator_ms: f64,
}

impl RunState {
    fn stopped() -> Self {
        Self {
            paused: true,
            last_frame: None,
            accumulator_ms: 0.0,
        }
    }
}

/// The render loop: owns phase state, the clone set, run state and the
/// audio input, and turns wall-clock timestamps into fixed simulation steps
/// plus one composited render pass per frame.
pub struct Animator {
    params: Params,
    phase: PhaseState,
    clones: CloneSet,
    asset: Option<Sprite>,
    run: RunState,
    audio: AudioInput,
    last_audio_level: f64,
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // AudioInput holds a cpal::Stream, which has no Debug impl.
        f.debug_struct("Animator")
            .field("params", &self.params)
            .field("phase", &self.phase)
            .field("clones", &self.clones)
            .field("asset", &self.asset)
            .field("run", &self.run)
            .field("last_audio_level", &self.last_audio_level)
            .finish_non_exhaustive()
    }
}

impl Animator {
    pub fn new(params: Params) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            phase: PhaseState::default(),
            clones: CloneSet::new(),
            asset: None,
            run: RunState::stopped(),
            audio: AudioInput::new(),
            last_audio_level: 0.0,
        })
    }

    /// Install a freshly decoded asset: zero every phase accumulator,
    /// rebuild the clone set and start running.
    pub fn load_asset(&mut self, template: Sprite) {
        self.phase.reset();
        self.clones
            .rebuild(&template, self.params.repeats, &self.phase);
        self.asset = Some(template);
        self.start();
    }

    /// Replace the parameter snapshot. Structural fields (repeat count,
    /// stroke removal, blend mode) trigger a clone rebuild; everything else
    /// simply feeds the next render pass.
    pub fn set_params(&mut self, next: Params) -> Result<(), ParamsError> {
        next.validate()?;
        let rebuild = self.params.structural_change(&next)
            || self.clones.len() != next.repeats;
        self.params = next;
        if rebuild {
            if let Some(template) = &self.asset {
                self.clones
                    .rebuild(template, self.params.repeats, &self.phase);
            }
        }
        Ok(())
    }

    /// Begin (or continue) running. Idempotent while already running.
    pub fn start(&mut self) {
        if !self.run.paused {
            return;
        }
        self.run.paused = false;
        self.run.last_frame = None;
        self.run.accumulator_ms = 0.0;
    }

    /// Freeze phase and time state. Idempotent.
    pub fn pause(&mut self) {
        self.run.paused = true;
    }

    /// Resume from pause. The elapsed-time baseline restarts at the next
    /// frame and the step accumulator is zeroed, so a long pause never
    /// produces a burst of catch-up steps.
    pub fn resume(&mut self) {
        if self.run.paused {
            self.run.paused = false;
            self.run.last_frame = None;
            self.run.accumulator_ms = 0.0;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.run.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.run.paused
    }

    /// Pause and release all clone instances and asset state. Terminal until
    /// a new asset is loaded.
    pub fn clear(&mut self) {
        self.pause();
        self.clones.clear();
        self.asset = None;
    }

    /// One host frame: drain elapsed wall time in fixed simulation steps,
    /// then solve and commit every clone's transform onto `canvas`.
    ///
    /// Returns the number of simulation steps performed (0 when paused or
    /// when less than one step of time has accumulated).
    pub fn frame(&mut self, now: Instant, canvas: &mut Canvas) -> usize {
        if self.run.paused {
            // Still repaint: the canvas may have just been resized (and
            // zeroed), and a paused screen should stay visible.
            self.render(canvas);
            return 0;
        }

        let delta_ms = match self.run.last_frame {
            Some(prev) => (now.duration_since(prev).as_secs_f64() * 1000.0).min(MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.run.last_frame = Some(now);
        self.run.accumulator_ms += delta_ms;

        let mut steps = 0usize;
        while self.run.accumulator_ms >= FIXED_STEP_MS {
            self.phase.advance(&self.params);
            self.run.accumulator_ms -= FIXED_STEP_MS;
            steps += 1;
        }

        self.render(canvas);
        steps
    }

    fn render(&mut self, canvas: &mut Canvas) {
        canvas.fill(solver::background_color(&self.params, &self.phase));

        let Some(asset) = &self.asset else {
            self.last_audio_level = 0.0;
            return;
        };

        self.last_audio_level = if self.params.audio_reactive {
            self.audio.level(
                self.params.bass_boost,
                self.params.mid_boost,
                self.params.treble_boost,
                self.params.audio_sensitivity,
            )
        } else {
            0.0
        };

        let n = self.clones.len();
        if n == 0 {
            return;
        }
        let cx = canvas.width as f64 / 2.0;
        let cy = canvas.height as f64 / 2.0;
        let aspect = asset.aspect();

        for (i, clone) in self.clones.iter().enumerate() {
            let transform = solver::solve(
                i,
                n,
                clone.spin_angle(&self.phase),
                &self.phase,
                &self.params,
                self.last_audio_level,
                cx,
                cy,
                aspect,
            );
            canvas.draw_sprite(&clone.sprite, &transform, self.params.blend_mode);
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn phase(&self) -> &PhaseState {
        &self.phase
    }

    pub fn clones(&self) -> &CloneSet {
        &self.clones
    }

    pub fn has_asset(&self) -> bool {
        self.asset.is_some()
    }

    pub fn audio(&self) -> &AudioInput {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioInput {
        &mut self.audio
    }

    /// Audio level sampled during the most recent render pass.
    pub fn last_audio_level(&self) -> f64 {
        self.last_audio_level
    }

    /// Current background color (static or drifting preset).
    pub fn background(&self) -> [u8; 3] {
        solver::background_color(&self.params, &self.phase)
    }
}
