use eyre::ensure;

use super::beam::{Beam, BEAM_PIN_OFFSET};
use super::pin::{InputPinKind, OutputPinKind, DEFAULT_LINE_LENGTH};
use super::sparty::Sparty;
use super::{GateId, InputPinId, OutputPinId};
use crate::common::{DimSize, Point};
use crate::logic::{LogicType, Signal};
use crate::scene::product::Property;

// distance of the and/or input pins from the body's top and bottom edges
const AND_OR_PIN_INSET: f64 = 13.;

// vertical nudge of flip-flop pins off the quarter lines
const FLIP_FLOP_PIN_SHIFT: f64 = 3.;

#[derive(Debug, Clone, PartialEq)]
pub enum GateKind {
    And,
    Or,
    Not,
    SrFlipFlop,
    DFlipFlop,
    Sensor(Property),
    Beam(Beam),
    Sparty(Sparty),
}

/// Ordered pin offsets a gate is built with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinLayout {
    pub inputs: Vec<(Point, InputPinKind)>,
    pub outputs: Vec<(Point, OutputPinKind)>,
}

impl GateKind {
    pub fn name(&self) -> String {
        match self {
            GateKind::And => "AND".to_owned(),
            GateKind::Or => "OR".to_owned(),
            GateKind::Not => "NOT".to_owned(),
            GateKind::SrFlipFlop => "SR".to_owned(),
            GateKind::DFlipFlop => "D".to_owned(),
            GateKind::Sensor(property) => format!("sensor:{property}"),
            GateKind::Beam(_) => "beam".to_owned(),
            GateKind::Sparty(_) => "sparty".to_owned(),
        }
    }

    pub fn logic_type(&self) -> Option<LogicType> {
        match self {
            GateKind::And => Some(LogicType::And),
            GateKind::Or => Some(LogicType::Or),
            GateKind::Not => Some(LogicType::Not),
            _ => None,
        }
    }

    pub fn is_flip_flop(&self) -> bool {
        matches!(self, GateKind::SrFlipFlop | GateKind::DFlipFlop)
    }

    pub fn initial_state(&self) -> Signal {
        if self.is_flip_flop() {
            Signal::Zero
        } else {
            Signal::Unknown
        }
    }

    /// Body box used for hit testing. `None` means the body is never hit.
    pub fn size(&self) -> Option<DimSize> {
        match self {
            GateKind::And | GateKind::Or => Some(DimSize(75., 50.)),
            GateKind::Not => Some(DimSize(50., 50.)),
            GateKind::SrFlipFlop | GateKind::DFlipFlop => Some(DimSize(50., 75.)),
            GateKind::Sensor(_) | GateKind::Beam(_) | GateKind::Sparty(_) => None,
        }
    }

    /// Drawn size, including bodies that never take hits.
    pub fn draw_size(&self) -> Option<DimSize> {
        match self {
            GateKind::Sensor(_) => Some(DimSize(100., 40.)),
            _ => self.size(),
        }
    }

    pub fn input_kinds(&self) -> Vec<InputPinKind> {
        match self {
            GateKind::And | GateKind::Or => vec![InputPinKind::Regular; 2],
            GateKind::Not | GateKind::Sparty(_) => vec![InputPinKind::Regular],
            GateKind::SrFlipFlop => vec![InputPinKind::Set, InputPinKind::Reset],
            GateKind::DFlipFlop => vec![InputPinKind::Data, InputPinKind::Clock],
            GateKind::Sensor(_) | GateKind::Beam(_) => vec![],
        }
    }

    pub fn output_kinds(&self) -> Vec<OutputPinKind> {
        match self {
            GateKind::SrFlipFlop | GateKind::DFlipFlop => {
                vec![OutputPinKind::Regular, OutputPinKind::Inverted]
            }
            GateKind::Sparty(_) => vec![],
            _ => vec![OutputPinKind::Regular],
        }
    }

    pub fn default_layout(&self, position: Point) -> PinLayout {
        let inputs = self.input_kinds();
        let outputs = self.output_kinds();

        let DimSize(w, h) = self.draw_size().unwrap_or_default();
        let (left, right) = (-w / 2. - DEFAULT_LINE_LENGTH, w / 2. + DEFAULT_LINE_LENGTH);

        let (input_offsets, output_offsets) = match self {
            GateKind::And | GateKind::Or => {
                let y = h / 2. - AND_OR_PIN_INSET;
                (vec![Point(left, -y), Point(left, y)], vec![Point(right, 0.)])
            }
            GateKind::Not => (vec![Point(left, 0.)], vec![Point(right, 0.)]),
            GateKind::SrFlipFlop | GateKind::DFlipFlop => {
                let top = -h / 4. + FLIP_FLOP_PIN_SHIFT;
                let bottom = h / 4. + FLIP_FLOP_PIN_SHIFT;
                (
                    vec![Point(left, top), Point(left, bottom)],
                    vec![Point(right, top), Point(right, bottom)],
                )
            }
            GateKind::Sensor(_) => (vec![], vec![Point(right, 0.)]),
            GateKind::Beam(_) => (vec![], vec![Point(BEAM_PIN_OFFSET - DEFAULT_LINE_LENGTH, 0.)]),
            GateKind::Sparty(sparty) => (vec![sparty.input_pin_offset(position)], vec![]),
        };

        PinLayout {
            inputs: input_offsets.into_iter().zip(inputs).collect(),
            outputs: output_offsets.into_iter().zip(outputs).collect(),
        }
    }

    pub fn check_layout(&self, layout: &PinLayout) -> eyre::Result<()> {
        let inputs = layout.inputs.iter().map(|(_, kind)| *kind).collect::<Vec<_>>();
        let outputs = layout.outputs.iter().map(|(_, kind)| *kind).collect::<Vec<_>>();

        ensure!(
            inputs == self.input_kinds(),
            "{} expects inputs {:?}, got {:?}",
            self.name(),
            self.input_kinds(),
            inputs
        );
        ensure!(
            outputs == self.output_kinds(),
            "{} expects outputs {:?}, got {:?}",
            self.name(),
            self.output_kinds(),
            outputs
        );

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    pub id: GateId,
    pub kind: GateKind,
    pub position: Point,
    pub(super) state: Signal,
    pub(super) inputs: Vec<InputPinId>,
    pub(super) outputs: Vec<OutputPinId>,
}

impl Gate {
    pub fn new(id: GateId, kind: GateKind, position: Point) -> Self {
        Self {
            id,
            state: kind.initial_state(),
            kind,
            position,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn state(&self) -> Signal {
        self.state
    }

    pub fn inputs(&self) -> &[InputPinId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputPinId] {
        &self.outputs
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.kind
            .size()
            .map(|size| size.bound_on(self.position, point))
            .unwrap_or(false)
    }

    pub fn as_beam(&self) -> Option<&Beam> {
        match &self.kind {
            GateKind::Beam(beam) => Some(beam),
            _ => None,
        }
    }

    pub fn as_beam_mut(&mut self) -> Option<&mut Beam> {
        match &mut self.kind {
            GateKind::Beam(beam) => Some(beam),
            _ => None,
        }
    }

    pub fn as_sparty(&self) -> Option<&Sparty> {
        match &self.kind {
            GateKind::Sparty(sparty) => Some(sparty),
            _ => None,
        }
    }

    pub fn as_sparty_mut(&mut self) -> Option<&mut Sparty> {
        match &mut self.kind {
            GateKind::Sparty(sparty) => Some(sparty),
            _ => None,
        }
    }

    pub fn sensor_property(&self) -> Option<Property> {
        match &self.kind {
            GateKind::Sensor(property) => Some(*property),
            _ => None,
        }
    }

    /// Next state of a logic or flip-flop gate from its tagged inputs.
    /// Sensing gates keep their state here; they compute from scans.
    pub fn next_state(&self, inputs: &[(InputPinKind, Signal)]) -> Signal {
        let tagged = |kind: InputPinKind| {
            inputs
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, signal)| *signal)
                .unwrap_or_default()
        };

        if let Some(logic) = self.kind.logic_type() {
            let signals = inputs.iter().map(|(_, signal)| *signal).collect::<Vec<_>>();
            return logic.evaluate(&signals);
        }

        match self.kind {
            GateKind::DFlipFlop => {
                let (data, clock) = (tagged(InputPinKind::Data), tagged(InputPinKind::Clock));
                if clock.is_one() && data.is_known() {
                    data
                } else {
                    self.state
                }
            }
            GateKind::SrFlipFlop => {
                let (set, reset) = (tagged(InputPinKind::Set), tagged(InputPinKind::Reset));
                match (set, reset) {
                    (Signal::One, Signal::One) => Signal::Unknown,
                    (Signal::One, _) => Signal::One,
                    (_, Signal::One) => Signal::Zero,
                    _ => self.state,
                }
            }
            _ => self.state,
        }
    }
}
