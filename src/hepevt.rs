//! Reader for plain-text HEPEVT event records
//!
//! Each event starts with a header `<event id> <number of particles>`,
//! followed by one record per particle:
//!
//! ```text
//! <nmothers> <status> <pdg id> <mother 1> <mother 2> <daughter 1> <daughter 2>
//! <px> <py> <pz> <E> <mass> <x> <y> <z> <t>
//! ```
//!
//! All entries are whitespace-separated; line breaks carry no meaning.
use std::io::{self, BufRead};
use std::ops::Range;
use std::str::FromStr;

use crate::event::Event;
use crate::particle::{Particle, Vertex};

use log::trace;
use particle_id::ParticleID;
use thiserror::Error;

// upper limit for the space reserved up front from the declared number
// of particles
const MAX_RESERVED_PARTICLES: usize = 1 << 12;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: failed to parse {field} from '{token}'")]
    Malformed {
        line: usize,
        field: &'static str,
        token: String,
    },
    #[error("input ended inside the header of event {event_id}")]
    TruncatedHeader { event_id: i32 },
    #[error("event {event_id} has negative particle count {count}")]
    NegativeCount { event_id: i32, count: i32 },
    #[error("event {event_id} should have {expected} particles, but input ended after {found}")]
    Truncated {
        event_id: i32,
        expected: usize,
        found: usize,
    },
}

/// Streaming HEPEVT reader
///
/// Events are read one at a time. After the first error the reader
/// does not return any further events.
#[derive(Debug)]
pub struct Reader<R> {
    source: R,
    line: String,
    pos: usize,
    line_nr: usize,
    failed: bool,
}

impl<R: BufRead> Reader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            line: String::new(),
            pos: 0,
            line_nr: 0,
            failed: false,
        }
    }

    /// Read the next event
    ///
    /// Returns `Ok(None)` if the input is exhausted at an event boundary.
    pub fn next_event(&mut self) -> Result<Option<Event>, ReadError> {
        if self.failed {
            return Ok(None);
        }
        let res = self.read_event();
        if res.is_err() {
            self.failed = true;
        }
        res
    }

    fn read_event(&mut self) -> Result<Option<Event>, ReadError> {
        let Some(event_id) = self.parse_next::<i32>("event id")? else {
            return Ok(None);
        };
        let Some(count) = self.parse_next::<i32>("number of particles")? else {
            return Err(ReadError::TruncatedHeader { event_id });
        };
        let Ok(nparticles) = usize::try_from(count) else {
            return Err(ReadError::NegativeCount { event_id, count });
        };
        trace!("reading event {event_id} with {nparticles} particles");

        let reserved = nparticles.min(MAX_RESERVED_PARTICLES);
        let mut event = Event::with_capacity(event_id, reserved);
        for found in 0..nparticles {
            let Some(particle) = self.read_particle()? else {
                return Err(ReadError::Truncated {
                    event_id,
                    expected: nparticles,
                    found,
                });
            };
            event.particles.push(particle);
        }
        Ok(Some(event))
    }

    fn read_particle(&mut self) -> Result<Option<Particle>, ReadError> {
        // the number of mothers is redundant with the mother links
        if self.parse_next::<i32>("number of mothers")?.is_none() {
            return Ok(None);
        }
        let Some(status) = self.parse_next("status")? else {
            return Ok(None);
        };
        let Some(id) = self.parse_next("particle id")? else {
            return Ok(None);
        };
        let Some(mothers) = self.parse_array::<i32, 2>("mother index")? else {
            return Ok(None);
        };
        let Some(daughters) = self.parse_array::<i32, 2>("daughter index")? else {
            return Ok(None);
        };
        let Some([px, py, pz, e]) = self.parse_array::<f64, 4>("momentum")? else {
            return Ok(None);
        };
        let Some(m) = self.parse_next("mass")? else {
            return Ok(None);
        };
        let Some([x, y, z, t]) = self.parse_array::<f64, 4>("vertex")? else {
            return Ok(None);
        };
        Ok(Some(Particle {
            id: ParticleID::new(id),
            status,
            p: [e, px, py, pz],
            m,
            mothers,
            daughters,
            vertex: Vertex { x, y, z, t },
        }))
    }

    fn parse_array<T, const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<Option<[T; N]>, ReadError>
    where
        T: FromStr + Copy + Default,
    {
        let mut res = [T::default(); N];
        for entry in &mut res {
            let Some(val) = self.parse_next(field)? else {
                return Ok(None);
            };
            *entry = val;
        }
        Ok(Some(res))
    }

    fn parse_next<T: FromStr>(
        &mut self,
        field: &'static str,
    ) -> Result<Option<T>, ReadError> {
        let Some(range) = self.next_token()? else {
            return Ok(None);
        };
        let token = &self.line[range];
        match token.parse() {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(ReadError::Malformed {
                line: self.line_nr,
                field,
                token: token.to_owned(),
            }),
        }
    }

    fn next_token(&mut self) -> io::Result<Option<Range<usize>>> {
        loop {
            let rest = &self.line[self.pos..];
            let token = rest.trim_start();
            if !token.is_empty() {
                let start = self.line.len() - token.len();
                let len = token.find(char::is_whitespace).unwrap_or(token.len());
                self.pos = start + len;
                return Ok(Some(start..self.pos));
            }
            self.line.clear();
            self.pos = 0;
            if self.source.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_nr += 1;
        }
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Event, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
