use particle_id::ParticleID;
use particle_id::sm_elementary_particles::{electron, muon};

/// Status code of stable final-state particles
pub const STABLE_STATUS: i32 = 1;

/// Production vertex of a particle
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct Vertex {
    /// position in mm
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// production time in mm/c
    pub t: f64,
}

#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct Particle {
    pub id: ParticleID,
    pub status: i32,
    /// four-momentum (E, px, py, pz) in GeV
    pub p: [f64; 4],
    /// mass in GeV
    pub m: f64,
    /// 1-based positions of the mothers in the event, 0 if absent
    pub mothers: [i32; 2],
    /// 1-based positions of the daughters in the event, 0 if absent
    pub daughters: [i32; 2],
    pub vertex: Vertex,
}

impl Particle {
    /// Particle without lineage or vertex information
    ///
    /// The mass is reconstructed from the four-momentum.
    pub fn new(id: ParticleID, status: i32, p: [f64; 4]) -> Self {
        Self {
            id,
            status,
            p,
            m: m(&p),
            mothers: [0; 2],
            daughters: [0; 2],
            vertex: Vertex::default(),
        }
    }

    pub fn e(&self) -> f64 {
        self.p[0]
    }

    pub fn px(&self) -> f64 {
        self.p[1]
    }

    pub fn py(&self) -> f64 {
        self.p[2]
    }

    pub fn pz(&self) -> f64 {
        self.p[3]
    }

    pub fn is_stable(&self) -> bool {
        self.status == STABLE_STATUS
    }
}

/// Whether `id` is an electron or muon, or one of their antiparticles
pub fn is_light_charged_lepton(id: ParticleID) -> bool {
    let id = ParticleID::new(id.id().abs());
    id == electron || id == muon
}

fn m(p: &[f64; 4]) -> f64 {
    let m2 = p[0] * p[0] - p[1] * p[1] - p[2] * p[2] - p[3] * p[3];
    m2.max(0.).sqrt()
}
