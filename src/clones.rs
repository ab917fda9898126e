use crate::asset::Sprite;
use crate::phase::PhaseState;

/// One renderable instance in the ring.
///
/// Each instance owns a full copy of the asset raster, so per-clone effects
/// can never bleed between members. Spin is stored as the accumulator value
/// at build time: the clone's current spin angle is the shared accumulator
/// minus this origin, which makes a rebuild reset spin to zero without
/// touching the phase state.
#[derive(Debug, Clone)]
pub struct CloneInstance {
    pub sprite: Sprite,
    spin_origin: f64,
}

impl CloneInstance {
    pub fn spin_angle(&self, phase: &PhaseState) -> f64 {
        phase.spin - self.spin_origin
    }
}

/// Owner of the N clone instances. Membership only ever changes through
/// [`CloneSet::rebuild`] and [`CloneSet::clear`]; the render loop mutates
/// nothing here mid-frame.
#[derive(Debug, Default)]
pub struct CloneSet {
    clones: Vec<CloneInstance>,
}

impl CloneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy all instances and create exactly `n` fresh independent copies
    /// of `template`, each with spin angle zero.
    pub fn rebuild(&mut self, template: &Sprite, n: usize, phase: &PhaseState) {
        self.clones.clear();
        self.clones.reserve_exact(n);
        for _ in 0..n {
            self.clones.push(CloneInstance {
                sprite: template.clone(),
                spin_origin: phase.spin,
            });
        }
    }

    pub fn clear(&mut self) {
        self.clones.clear();
    }

    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CloneInstance> {
        self.clones.iter()
    }
}
