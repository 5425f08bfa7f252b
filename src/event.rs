use crate::particle::Particle;

/// A single collider event
///
/// Particles are kept in file order. Their position in `particles` is the
/// (zero-based) index that the 1-based mother and daughter links refer to.
#[derive(Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct Event {
    pub id: i32,
    pub particles: Vec<Particle>,
}

impl Event {
    pub fn with_capacity(id: i32, nparticles: usize) -> Self {
        Self {
            id,
            particles: Vec::with_capacity(nparticles),
        }
    }

    /// Mothers of the particle at position `idx`
    pub fn mothers(&self, idx: usize) -> impl Iterator<Item = &Particle> {
        let links = self.particles.get(idx).map(|p| p.mothers);
        self.resolve(links)
    }

    /// Daughters of the particle at position `idx`
    pub fn daughters(&self, idx: usize) -> impl Iterator<Item = &Particle> {
        let links = self.particles.get(idx).map(|p| p.daughters);
        self.resolve(links)
    }

    // HEPEVT links are either up to two single entries or, if the second
    // one is larger than the first, an inclusive range
    fn resolve(&self, links: Option<[i32; 2]>) -> impl Iterator<Item = &Particle> {
        let len = i32::try_from(self.particles.len()).unwrap_or(i32::MAX);
        let positions: Vec<i32> = match links {
            Some([first, last]) if first > 0 && last > first => {
                (first..=last.min(len)).collect()
            }
            Some([first, second]) if first == second => {
                [first].into_iter().filter(|&pos| pos > 0).collect()
            }
            Some(links) => links.into_iter().filter(|&pos| pos > 0).collect(),
            None => Vec::new(),
        };
        positions
            .into_iter()
            .filter_map(move |pos| self.particles.get(pos as usize - 1))
    }
}
