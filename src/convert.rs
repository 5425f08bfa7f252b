use std::ops::AddAssign;

use crate::event::Event;
use crate::hepevt::ReadError;
use crate::select::{Predicate, Row, Selector};
use crate::sink::{RowSink, SinkError};

use log::trace;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Error reading HEPEVT event: {0}")]
    Read(#[from] ReadError),
    #[error("Error reading HepMC event: {0}")]
    HepMC(#[from] hepmc2::reader::LineParseError),
    #[error("Error writing output: {0}")]
    Sink(#[from] SinkError),
}

/// Event and particle counts of a conversion
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Summary {
    pub events: usize,
    pub particles: usize,
    pub selected: usize,
}

impl AddAssign for Summary {
    fn add_assign(&mut self, rhs: Self) {
        self.events += rhs.events;
        self.particles += rhs.particles;
        self.selected += rhs.selected;
    }
}

/// Write one row per event to `sink`
///
/// The sink is not finished, so that events from several sources can
/// end up in the same output. Stops at the first error.
pub fn fill_rows<I, E, P, S>(
    events: I,
    selector: &Selector<P>,
    sink: &mut S,
) -> Result<Summary, ConvertError>
where
    I: IntoIterator<Item = Result<Event, E>>,
    ConvertError: From<E>,
    P: Predicate,
    S: RowSink + ?Sized,
{
    let mut row = Row::new();
    let mut summary = Summary::default();
    for event in events {
        let event = event?;
        debug_assert!(row.is_empty());
        let selected = selector.fill(&event.particles, &mut row);
        trace!(
            "event {}: selected {selected} of {} particles",
            event.id,
            event.particles.len()
        );
        sink.write_row(&row)?;
        row.clear();
        summary.events += 1;
        summary.particles += event.particles.len();
        summary.selected += selected;
    }
    Ok(summary)
}

/// Write one row per event to `sink` and finish it
///
/// The sink is finished even if reading fails, so it holds all rows
/// of the events before the failure.
pub fn convert<I, E, P, S>(
    events: I,
    selector: &Selector<P>,
    sink: &mut S,
) -> Result<Summary, ConvertError>
where
    I: IntoIterator<Item = Result<Event, E>>,
    ConvertError: From<E>,
    P: Predicate,
    S: RowSink + ?Sized,
{
    finish_after(sink, |sink| fill_rows(events, selector, sink))
}

/// Run `fill` on `sink` and finish the sink afterwards
///
/// The sink is finished even if `fill` fails. The error from `fill`
/// takes precedence over an error when finishing.
pub fn finish_after<S, F, T, E>(sink: &mut S, fill: F) -> Result<T, E>
where
    S: RowSink + ?Sized,
    F: FnOnce(&mut S) -> Result<T, E>,
    E: From<SinkError>,
{
    let res = fill(sink);
    let finished = sink.finish();
    let out = res?;
    finished?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::hepevt::Reader;
    use crate::select::Selection;

    const INPUT: &str = "1 2
0 1 11 0 0 0 0 1.0 0.0 0.0 5.0 0.0 0.0 0.0 0.0 0.0
0 2 -11 0 0 0 0 -1.0 0.0 0.0 5.0 0.0 0.0 0.0 0.0 0.0
";

    #[derive(Default)]
    struct Recorder {
        rows: Vec<Row>,
        finished: bool,
    }

    impl RowSink for Recorder {
        fn write_row(&mut self, row: &Row) -> Result<(), SinkError> {
            assert!(!self.finished);
            self.rows.push(row.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), SinkError> {
            self.finished = true;
            Ok(())
        }
    }

    fn run(input: &str, selection: Selection) -> (Result<Summary, ConvertError>, Recorder) {
        let mut sink = Recorder::default();
        let res = convert(
            Reader::new(input.as_bytes()),
            &Selector::new(selection),
            &mut sink,
        );
        (res, sink)
    }

    #[test]
    fn stable_particles() {
        let (res, sink) = run(INPUT, Selection::Stable);
        assert_eq!(
            res.unwrap(),
            Summary {
                events: 1,
                particles: 2,
                selected: 1
            }
        );
        assert!(sink.finished);
        assert_eq!(sink.rows.len(), 1);
        let row = &sink.rows[0];
        assert_eq!(row.particle_count(), 1);
        assert_eq!(row.ids(), [11]);
        assert_eq!(row.px(), [1.0]);
        assert_eq!(row.py(), [0.0]);
        assert_eq!(row.pz(), [0.0]);
        assert_eq!(row.e(), [5.0]);
    }

    #[test]
    fn rows_do_not_leak_between_events() {
        let input = format!("{INPUT}2 1\n0 2 13 0 0 0 0 1.0 0.0 0.0 5.0 0.0 0.0 0.0 0.0 0.0\n{INPUT}");
        let (res, sink) = run(&input, Selection::Stable);
        assert_eq!(res.unwrap().events, 3);
        let counts: Vec<_> = sink.rows.iter().map(|r| r.particle_count()).collect();
        assert_eq!(counts, [1, 0, 1]);
        assert!(sink.rows[1].is_empty());
        assert_eq!(sink.rows[0], sink.rows[2]);
    }

    #[test]
    fn empty_input() {
        let (res, sink) = run("", Selection::StableLepton);
        assert_eq!(res.unwrap(), Summary::default());
        assert!(sink.rows.is_empty());
        assert!(sink.finished);
    }

    #[test]
    fn truncated_input() {
        let input = format!("{INPUT}2 3\n0 1 13 0 0 0 0 1.0 0.0 0.0 5.0 0.0 0.0 0.0 0.0 0.0\n");
        let (res, sink) = run(&input, Selection::Stable);
        assert!(matches!(
            res,
            Err(ConvertError::Read(ReadError::Truncated {
                event_id: 2,
                expected: 3,
                found: 1
            }))
        ));
        assert!(sink.finished);
        assert_eq!(sink.rows.len(), 1);
    }

    struct Broken;

    impl RowSink for Broken {
        fn write_row(&mut self, _row: &Row) -> Result<(), SinkError> {
            Ok(())
        }

        fn finish(&mut self) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    #[test]
    fn finish_errors_are_reported() {
        let res = convert(
            Reader::new(INPUT.as_bytes()),
            &Selector::new(Selection::Stable),
            &mut Broken,
        );
        assert!(matches!(res, Err(ConvertError::Sink(SinkError::Closed))));

        let truncated = format!("{INPUT}2 3\n");
        let res = convert(
            Reader::new(truncated.as_bytes()),
            &Selector::new(Selection::Stable),
            &mut Broken,
        );
        assert!(matches!(res, Err(ConvertError::Read(_))));
    }

    #[test]
    fn deterministic() {
        let input = INPUT.repeat(3);
        let (first, first_rows) = run(&input, Selection::Stable);
        let (second, second_rows) = run(&input, Selection::Stable);
        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(first_rows.rows, second_rows.rows);
    }

    #[test]
    fn summaries_add_up() {
        let mut total = Summary {
            events: 1,
            particles: 4,
            selected: 2,
        };
        total += Summary {
            events: 2,
            particles: 3,
            selected: 0,
        };
        assert_eq!(
            total,
            Summary {
                events: 3,
                particles: 7,
                selected: 2
            }
        );
    }
}
