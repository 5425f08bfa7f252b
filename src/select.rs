use crate::particle::{is_light_charged_lepton, Particle, STABLE_STATUS};

use particle_id::ParticleID;
use strum::{Display, EnumString};

/// Decides which particles end up in the output
pub trait Predicate {
    fn accepts(&self, status: i32, id: ParticleID) -> bool;
}

impl<F: Fn(i32, ParticleID) -> bool> Predicate for F {
    fn accepts(&self, status: i32, id: ParticleID) -> bool {
        self(status, id)
    }
}

#[derive(
    Display, EnumString, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Debug,
)]
pub enum Selection {
    /// All stable final-state particles
    #[default]
    #[strum(to_string = "stable", serialize = "stable-all")]
    Stable,
    /// Stable electrons and muons, including antiparticles
    #[strum(to_string = "stable-lepton")]
    StableLepton,
}

impl Predicate for Selection {
    fn accepts(&self, status: i32, id: ParticleID) -> bool {
        match self {
            Selection::Stable => status == STABLE_STATUS,
            Selection::StableLepton => {
                status == STABLE_STATUS && is_light_charged_lepton(id)
            }
        }
    }
}

/// Selected particles of one event, stored column-wise
///
/// All columns always have the same length.
#[derive(Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct Row {
    ids: Vec<i32>,
    px: Vec<f64>,
    py: Vec<f64>,
    pz: Vec<f64>,
    e: Vec<f64>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, particle: &Particle) {
        self.ids.push(particle.id.id());
        self.px.push(particle.px());
        self.py.push(particle.py());
        self.pz.push(particle.pz());
        self.e.push(particle.e());
    }

    /// Remove all particles, keeping the allocated memory
    pub fn clear(&mut self) {
        self.ids.clear();
        self.px.clear();
        self.py.clear();
        self.pz.clear();
        self.e.clear();
    }

    pub fn particle_count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn px(&self) -> &[f64] {
        &self.px
    }

    pub fn py(&self) -> &[f64] {
        &self.py
    }

    pub fn pz(&self) -> &[f64] {
        &self.pz
    }

    pub fn e(&self) -> &[f64] {
        &self.e
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Selector<P> {
    predicate: P,
}

impl<P: Predicate> Selector<P> {
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }

    /// Append all accepted particles to `row`, keeping their order
    ///
    /// Returns the number of appended particles.
    pub fn fill<'a, I>(&self, particles: I, row: &mut Row) -> usize
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let before = row.particle_count();
        for particle in particles {
            if self.predicate.accepts(particle.status, particle.id) {
                row.push(particle)
            }
        }
        row.particle_count() - before
    }
}
