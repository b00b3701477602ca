use tracing::debug;

use crate::error::{Rejection, RigError};
use crate::model::{BusyGate, BusyReason};

/// Continuation points of the scripted pickup/throw sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// The pick clip has played out
    PickupFinished,
    /// Wind-up over: the item leaves the hand
    ThrowRelease,
    /// Post-throw buffer over: locomotion may resume
    ThrowRecovered,
}

/// Deadline-ordered queue of pending continuations.
///
/// Entries with equal deadlines come out in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct Timeline<E> {
    entries: Vec<(f32, E)>,
}

impl<E> Timeline<E> {
    pub fn new() -> Self { Self { entries: Vec::new() } }

    pub fn schedule(&mut self, at: f32, event: E) {
        let idx = self.entries.partition_point(|(deadline, _)| *deadline <= at);
        self.entries.insert(idx, (at, event));
    }

    /// Next event whose deadline has passed at `now`.
    pub fn pop_due(&mut self, now: f32) -> Option<E> {
        let due = self.entries.first().is_some_and(|(deadline, _)| *deadline <= now);
        if due {
            Some(self.entries.remove(0).1)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn clear(&mut self) { self.entries.clear(); }
}

impl<E> Default for Timeline<E> {
    fn default() -> Self { Self::new() }
}

/// Owns the busy gate and the continuations of whichever sequence holds it.
/// The only writer of the gate; everybody else gets a copy via [`Sequencer::gate`].
#[derive(Debug, Default)]
pub struct Sequencer {
    gate: BusyGate,
    timeline: Timeline<SequenceStep>,
}

impl Sequencer {
    pub fn new() -> Self { Self::default() }

    pub fn gate(&self) -> BusyGate { self.gate }

    pub fn is_busy(&self) -> bool { self.gate.is_busy() }

    /// Take the gate for a new sequence. Fails while another one is in flight.
    pub fn begin(&mut self, reason: BusyReason) -> Result<(), RigError> {
        if let BusyGate::Suspended(current) = self.gate {
            debug!(?reason, ?current, "sequence rejected, gate already held");
            return Err(Rejection::Busy.into());
        }
        debug!(?reason, "gate suspended");
        self.gate = BusyGate::Suspended(reason);
        Ok(())
    }

    pub fn schedule(&mut self, at: f32, step: SequenceStep) {
        self.timeline.schedule(at, step);
    }

    pub fn pop_due(&mut self, now: f32) -> Option<SequenceStep> {
        self.timeline.pop_due(now)
    }

    pub fn pending(&self) -> usize { self.timeline.len() }

    pub fn release(&mut self) {
        if let BusyGate::Suspended(reason) = self.gate {
            debug!(?reason, "gate released");
        }
        self.gate = BusyGate::Free;
    }

    /// Abandon the running sequence: drop pending steps and free the gate.
    pub fn cancel(&mut self) {
        if self.gate.is_busy() || !self.timeline.is_empty() {
            debug!(gate = ?self.gate, pending = self.timeline.len(), "sequence cancelled");
        }
        self.timeline.clear();
        self.gate = BusyGate::Free;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_orders_by_deadline() {
        let mut timeline = Timeline::new();
        timeline.schedule(2.0, "b");
        timeline.schedule(1.0, "a");
        timeline.schedule(2.0, "c");

        assert_eq!(timeline.pop_due(0.5), None);
        assert_eq!(timeline.pop_due(1.0), Some("a"));
        assert_eq!(timeline.pop_due(1.5), None);
        assert_eq!(timeline.pop_due(3.0), Some("b"));
        assert_eq!(timeline.pop_due(3.0), Some("c"));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_gate_is_exclusive() {
        let mut seq = Sequencer::new();
        seq.begin(BusyReason::PickingUp).unwrap();

        let err = seq.begin(BusyReason::Throwing).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::Busy));
        assert_eq!(seq.gate(), BusyGate::Suspended(BusyReason::PickingUp));

        seq.release();
        assert!(seq.begin(BusyReason::Throwing).is_ok());
    }

    #[test]
    fn test_cancel_clears_everything() {
        let mut seq = Sequencer::new();
        seq.begin(BusyReason::Throwing).unwrap();
        seq.schedule(1.0, SequenceStep::ThrowRelease);

        seq.cancel();
        assert_eq!(seq.gate(), BusyGate::Free);
        assert_eq!(seq.pending(), 0);
        assert_eq!(seq.pop_due(10.0), None);
    }
}
