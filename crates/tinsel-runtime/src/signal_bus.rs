//! Per-frame queue of control signals
//!
//! Buttons and gestures arrive at their own rate, often several per frame.
//! Formation signals (toggle, explode, assemble) act on the current state,
//! so each one is kept in order. Rotation and photo selection carry an
//! absolute value, and a newer one replaces any still queued.

use crate::signal::ControlSignal;

#[derive(Debug, Default)]
pub struct SignalBus {
    signals: Vec<ControlSignal>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a signal for the next drain
    pub fn push(&mut self, signal: ControlSignal) {
        if let Some(queued) = self
            .signals
            .iter_mut()
            .find(|queued| Self::supersedes(&signal, queued))
        {
            log::trace!("signal {} replaces queued value", signal.name());
            *queued = signal;
            return;
        }
        log::trace!("signal queued: {}", signal.name());
        self.signals.push(signal);
    }

    /// Whether `incoming` makes `queued` redundant
    fn supersedes(incoming: &ControlSignal, queued: &ControlSignal) -> bool {
        matches!(
            (incoming, queued),
            (ControlSignal::Rotate(_), ControlSignal::Rotate(_))
                | (ControlSignal::SelectPhoto(_), ControlSignal::SelectPhoto(_))
        )
    }

    /// Take every queued signal in arrival order
    pub fn drain(&mut self) -> Vec<ControlSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }
}
