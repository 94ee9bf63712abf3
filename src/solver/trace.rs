//! Diagnostic events emitted during search.
//!
//! The engine reports what it does to a [`Tracer`] it owns. [`LogTracer`] forwards events to the
//! `log` facade; [`EventRecorder`] keeps them so callers can inspect a run afterwards.

use log::{debug, trace};

use super::types::{DecisionLevel, Lit, SolveStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchEvent {
    Decision {
        lit: Lit,
        level: DecisionLevel,
    },
    Propagation {
        lit: Lit,
        level: DecisionLevel,
        /// Literals of the antecedent clause.
        antecedent: Vec<Lit>,
    },
    Conflict {
        clause: Vec<Lit>,
        level: DecisionLevel,
    },
    /// A learned clause; its first literal is the asserting (UIP) literal.
    Learned {
        clause: Vec<Lit>,
        backtrack_level: DecisionLevel,
    },
    Backtrack {
        from: DecisionLevel,
        to: DecisionLevel,
    },
    Finished(SolveStatus),
}

pub trait Tracer {
    fn event(&mut self, event: &SearchEvent);

    /// Lets the engine skip building events nobody will look at.
    fn enabled(&self) -> bool {
        true
    }
}

/// Writes events to the `log` facade: propagations at trace level, the rest at debug.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn event(&mut self, event: &SearchEvent) {
        match event {
            SearchEvent::Propagation {
                lit,
                level,
                antecedent,
            } => trace!("Propagating {lit} @ {level} from {}", join(antecedent)),
            SearchEvent::Decision { lit, level } => debug!("Deciding lit: {lit} @ {level}"),
            SearchEvent::Conflict { clause, level } => {
                debug!("Conflict @ {level} on {}", join(clause))
            }
            SearchEvent::Learned {
                clause,
                backtrack_level,
            } => debug!("Learned {} (backtrack to {backtrack_level})", join(clause)),
            SearchEvent::Backtrack { from, to } => debug!("Backtracking {from} -> {to}"),
            SearchEvent::Finished(status) => debug!("Finished: {status}"),
        }
    }

    fn enabled(&self) -> bool {
        log::log_enabled!(log::Level::Debug)
    }
}

/// Collects every event in order.
#[derive(Default, Clone, Debug)]
pub struct EventRecorder {
    pub events: Vec<SearchEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learned clauses in the order they were derived.
    pub fn learned(&self) -> impl Iterator<Item = &[Lit]> + '_ {
        self.events.iter().filter_map(|e| match e {
            SearchEvent::Learned { clause, .. } => Some(clause.as_slice()),
            _ => None,
        })
    }

    pub fn conflicts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SearchEvent::Conflict { .. }))
            .count()
    }
}

impl Tracer for EventRecorder {
    fn event(&mut self, event: &SearchEvent) {
        self.events.push(event.clone());
    }
}

fn join(lits: &[Lit]) -> String {
    let inner = lits
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" | ");
    format!("({inner})")
}
