use strum_macros::Display;

use super::{GateId, InputPinId, OutputPinId};
use crate::common::Point;
use crate::logic::Signal;

/// Diameter of a pin circle in virtual pixels.
pub const PIN_SIZE: f64 = 10.;

/// Length of the stub line between a gate body and its pin.
pub const DEFAULT_LINE_LENGTH: f64 = 20.;

// a point catches (or hits) a pin strictly inside half the pin size
pub fn pin_hit(pin: Point, point: Point) -> bool {
    pin.distance_squared(&point) < (PIN_SIZE / 2.) * (PIN_SIZE / 2.)
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum InputPinKind {
    #[default]
    Regular,
    Set,
    Reset,
    Data,
    Clock,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum OutputPinKind {
    #[default]
    Regular,
    Inverted,
}

impl OutputPinKind {
    // signal this pin shows for a given gate state
    pub fn drive(&self, state: Signal) -> Signal {
        match self {
            OutputPinKind::Regular => state,
            OutputPinKind::Inverted => !state,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputPin {
    pub gate: GateId,
    pub offset: Point,
    pub kind: InputPinKind,
    pub(super) signal: Signal,
    // driving output, never owned
    pub(super) source: Option<OutputPinId>,
}

impl InputPin {
    pub fn new(gate: GateId, offset: Point, kind: InputPinKind) -> Self {
        Self {
            gate,
            offset,
            kind,
            signal: Signal::Unknown,
            source: None,
        }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn source(&self) -> Option<OutputPinId> {
        self.source
    }
}

#[derive(Debug, Clone)]
pub struct OutputPin {
    pub gate: GateId,
    pub offset: Point,
    pub kind: OutputPinKind,
    pub(super) signal: Signal,
    pub(super) targets: Vec<InputPinId>,
}

impl OutputPin {
    pub fn new(gate: GateId, offset: Point, kind: OutputPinKind) -> Self {
        Self {
            gate,
            offset,
            kind,
            signal: Signal::Unknown,
            targets: Vec::new(),
        }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn targets(&self) -> &[InputPinId] {
        &self.targets
    }

    pub(super) fn catch(&mut self, input: InputPinId) {
        if !self.targets.contains(&input) {
            self.targets.push(input);
        }
    }

    pub(super) fn release(&mut self, input: InputPinId) {
        self.targets.retain(|target| *target != input);
    }
}
