use std::io::BufRead;

use crate::event::Event;
use crate::particle::{Particle, STABLE_STATUS};

use hepmc2::reader::LineParseError;
use log::trace;
use particle_id::ParticleID;

/// Particle node in an event graph
pub trait GraphParticle {
    fn pdg_id(&self) -> i32;

    fn status(&self) -> i32;

    /// four-momentum (E, px, py, pz)
    fn momentum(&self) -> [f64; 4];

    /// Whether the particle decays, i.e. has an outgoing vertex
    fn has_end_vertex(&self) -> bool;

    fn is_final_state(&self) -> bool {
        !self.has_end_vertex() && self.status() == STABLE_STATUS
    }
}

/// Event stored as a graph of particles and vertices
pub trait GraphEvent {
    type Particle: GraphParticle;

    fn number(&self) -> i32;

    /// All particle nodes, each exactly once, in a fixed order
    fn particles(&self) -> impl Iterator<Item = &Self::Particle>;
}

/// Final-state particles, in the order in which the event lists them
pub fn final_state_particles<E: GraphEvent>(event: &E) -> Vec<Particle> {
    event
        .particles()
        .filter(|p| p.is_final_state())
        .map(|p| Particle::new(ParticleID::new(p.pdg_id()), p.status(), p.momentum()))
        .collect()
}

/// Plain event containing only the final-state particles of `event`
pub fn graph_event<E: GraphEvent>(event: &E) -> Event {
    let particles = final_state_particles(event);
    trace!(
        "event {} has {} final-state particles",
        event.number(),
        particles.len()
    );
    Event {
        id: event.number(),
        particles,
    }
}

impl GraphParticle for hepmc2::event::Particle {
    fn pdg_id(&self) -> i32 {
        self.id
    }

    fn status(&self) -> i32 {
        self.status
    }

    fn momentum(&self) -> [f64; 4] {
        self.p.0
    }

    fn has_end_vertex(&self) -> bool {
        self.end_vtx != 0
    }
}

// Every particle is listed exactly once as outgoing particle of its
// production vertex, except for incoming beam particles. These always
// have an end vertex, so they are never part of the final state anyway.
impl GraphEvent for hepmc2::event::Event {
    type Particle = hepmc2::event::Particle;

    fn number(&self) -> i32 {
        self.number
    }

    fn particles(&self) -> impl Iterator<Item = &Self::Particle> {
        self.vertices.iter().flat_map(|vx| vx.particles_out.iter())
    }
}

impl From<&hepmc2::event::Event> for Event {
    fn from(event: &hepmc2::event::Event) -> Self {
        graph_event(event)
    }
}

/// Read all events from a HepMC2 stream
///
/// Each event is reduced to its final-state particles.
pub fn events<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<Event, LineParseError>> {
    hepmc2::reader::Reader::new(reader).map(|event| event.map(|event| Event::from(&event)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        id: i32,
        status: i32,
        p: [f64; 4],
        decays: bool,
    }

    impl GraphParticle for Node {
        fn pdg_id(&self) -> i32 {
            self.id
        }

        fn status(&self) -> i32 {
            self.status
        }

        fn momentum(&self) -> [f64; 4] {
            self.p
        }

        fn has_end_vertex(&self) -> bool {
            self.decays
        }
    }

    struct Graph {
        number: i32,
        // outgoing particles per vertex
        vertices: Vec<Vec<Node>>,
    }

    impl GraphEvent for Graph {
        type Particle = Node;

        fn number(&self) -> i32 {
            self.number
        }

        fn particles(&self) -> impl Iterator<Item = &Node> {
            self.vertices.iter().flatten()
        }
    }

    fn node(id: i32, status: i32, decays: bool) -> Node {
        Node {
            id,
            status,
            p: [id.abs() as f64, 1., 2., 3.],
            decays,
        }
    }

    // p p > Z j, Z > mu+ mu-, with the jet as a stable gluon
    fn drell_yan() -> Graph {
        Graph {
            number: 12,
            vertices: vec![
                vec![node(2212, 4, true), node(2212, 4, true)],
                vec![node(23, 22, true), node(21, 1, false)],
                vec![node(13, 1, false), node(-13, 1, false), node(22, 1, true)],
                vec![node(11, 1, false), node(-11, 2, false)],
            ],
        }
    }

    #[test]
    fn final_state() {
        let particles = final_state_particles(&drell_yan());
        let ids: Vec<_> = particles.iter().map(|p| p.id.id()).collect();
        assert_eq!(ids, [21, 13, -13, 11]);
        assert!(particles.iter().all(|p| p.is_stable()));
        assert_eq!(particles[1].p, [13., 1., 2., 3.]);
    }

    #[test]
    fn decaying_stable_particle_is_excluded() {
        let graph = Graph {
            number: 1,
            vertices: vec![vec![node(22, 1, true)]],
        };
        assert!(final_state_particles(&graph).is_empty());
    }

    #[test]
    fn plain_event() {
        let event = graph_event(&drell_yan());
        assert_eq!(event.id, 12);
        assert_eq!(event.particles.len(), 4);
        assert!(event.particles.iter().all(|p| p.mothers == [0, 0]));
    }

    // beams enter the first vertex, the Z decays into a muon pair and a
    // photon with a non-final status
    const LISTING: &str = "HepMC::Version 2.06.09
HepMC::IO_GenEvent-START_EVENT_LISTING
E 7 -1 -1.0 -1.0 -1.0 0 -1 2 1 2 0 0
U GEV MM
V -1 0 0 0 0 0 2 1 0
P 1 2212 0 0 7000 7000 0.938 1 0 0 -1 0
P 2 2212 0 0 -7000 7000 0.938 1 0 0 -1 0
P 3 23 0 0 0 91.2 91.2 1 0 0 -2 0
V -2 0 0 0 0 0 0 3 0
P 4 13 1 2 3 4 0.1 1 0 0 0 0
P 5 -13 -1 -2 -3 4 0.1 1 0 0 0 0
P 6 22 0 0 1 1 0 2 0 0 0 0
E 8 -1 -1.0 -1.0 -1.0 0 -1 1 0 0 0 0
V -1 0 0 0 0 0 0 1 0
P 1 22 0 0 2 2 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";

    #[test]
    fn hepmc2_events() {
        let events: Vec<_> = events(LISTING.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(events.len(), 2);

        let event = &events[0];
        assert_eq!(event.id, 7);
        let ids: Vec<_> = event.particles.iter().map(|p| p.id.id()).collect();
        assert_eq!(ids, [13, -13]);
        assert_eq!(event.particles[0].p, [4., 1., 2., 3.]);
        assert_eq!(event.particles[1].p, [4., -1., -2., -3.]);

        assert_eq!(events[1].id, 8);
        assert_eq!(events[1].particles.len(), 1);
        assert_eq!(events[1].particles[0].id.id(), 22);
    }

    #[test]
    fn hepmc2_beams_are_incoming() {
        let mut reader = hepmc2::reader::Reader::new(LISTING.as_bytes());
        let event = reader.next().unwrap().unwrap();
        assert_eq!(event.vertices[0].particles_in.len(), 2);
        let ids: Vec<_> = GraphEvent::particles(&event).map(|p| p.id).collect();
        assert_eq!(ids, [23, 13, -13, 22]);
        assert!(!GraphParticle::is_final_state(&event.vertices[0].particles_out[0]));
    }

    #[test]
    fn hepmc2_malformed_line() {
        let listing = LISTING.replace("P 5 -13", "P 5 x");
        let res: Result<Vec<_>, _> = events(listing.as_bytes()).collect();
        let err = res.unwrap_err();
        assert_eq!(err.line_nr, 11);
    }

    #[test]
    fn empty_graph() {
        let graph = Graph {
            number: 3,
            vertices: Vec::new(),
        };
        let event = graph_event(&graph);
        assert_eq!(event.id, 3);
        assert!(event.particles.is_empty());
    }
}
