use std::ops::{Index, IndexMut};

use derive_more::Display;
use eyre::{ensure, ContextCompat};

use crate::common::Point;
use crate::logic::Signal;

pub mod beam;
pub mod gate;
pub mod pin;
pub mod sparty;

pub use gate::{Gate, GateKind, PinLayout};
pub use pin::{InputPin, InputPinKind, OutputPin, OutputPinKind};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("gate#{_0}")]
pub struct GateId(pub usize);

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("in#{_0}")]
pub struct InputPinId(pub usize);

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("out#{_0}")]
pub struct OutputPinId(pub usize);

/// Arena of gates and pins. Wires are held as handles on both ends: the
/// input keeps its single source, the output keeps every target.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    gates: Vec<Gate>,
    input_pins: Vec<InputPin>,
    output_pins: Vec<OutputPin>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gate(&mut self, kind: GateKind, position: Point) -> GateId {
        let layout = kind.default_layout(position);
        self.add_gate_with_pins(kind, position, &layout)
    }

    /// Builds a gate with explicit pin offsets.
    ///
    /// Panics when the pin kinds do not match what the gate kind expects.
    pub fn add_gate_with_pins(&mut self, kind: GateKind, position: Point, layout: &PinLayout) -> GateId {
        if let Err(err) = kind.check_layout(layout) {
            panic!("invalid pin layout: {err}");
        }

        let id = GateId(self.gates.len());
        self.gates.push(Gate::new(id, kind, position));

        for (offset, kind) in &layout.inputs {
            self.push_input_pin(id, *offset, *kind);
        }
        for (offset, kind) in &layout.outputs {
            self.push_output_pin(id, *offset, *kind);
        }

        tracing::debug!("add {} {} at {:?}", id, self[id].kind.name(), position);
        id
    }

    /// Registers one more input pin on `gate`. Rejected unless it is the
    /// next pin the gate kind expects.
    pub fn add_input_pin(&mut self, gate: GateId, offset: Point, kind: InputPinKind) -> eyre::Result<InputPinId> {
        let target = self.gate(gate).context(format!("no such gate: {gate}"))?;
        let expected = target.kind.input_kinds();
        let slot = target.inputs.len();
        ensure!(
            expected.get(slot) == Some(&kind),
            "{} {gate} cannot take input {slot} of kind {kind}, expects {expected:?}",
            target.kind.name()
        );

        Ok(self.push_input_pin(gate, offset, kind))
    }

    /// Registers one more output pin on `gate`, under the same rule as
    /// inputs.
    pub fn add_output_pin(&mut self, gate: GateId, offset: Point, kind: OutputPinKind) -> eyre::Result<OutputPinId> {
        let target = self.gate(gate).context(format!("no such gate: {gate}"))?;
        let expected = target.kind.output_kinds();
        let slot = target.outputs.len();
        ensure!(
            expected.get(slot) == Some(&kind),
            "{} {gate} cannot take output {slot} of kind {kind}, expects {expected:?}",
            target.kind.name()
        );

        Ok(self.push_output_pin(gate, offset, kind))
    }

    fn push_input_pin(&mut self, gate: GateId, offset: Point, kind: InputPinKind) -> InputPinId {
        let id = InputPinId(self.input_pins.len());
        self.input_pins.push(InputPin::new(gate, offset, kind));
        self.gates[gate.0].inputs.push(id);
        id
    }

    fn push_output_pin(&mut self, gate: GateId, offset: Point, kind: OutputPinKind) -> OutputPinId {
        let id = OutputPinId(self.output_pins.len());
        let mut pin = OutputPin::new(gate, offset, kind);
        pin.signal = kind.drive(self.gates[gate.0].state);
        self.output_pins.push(pin);
        self.gates[gate.0].outputs.push(id);
        id
    }

    /// Pins `gate` currently has, in registration order.
    pub fn layout(&self, gate: GateId) -> PinLayout {
        let gate = &self.gates[gate.0];
        PinLayout {
            inputs: gate
                .inputs
                .iter()
                .map(|id| (self.input_pins[id.0].offset, self.input_pins[id.0].kind))
                .collect(),
            outputs: gate
                .outputs
                .iter()
                .map(|id| (self.output_pins[id.0].offset, self.output_pins[id.0].kind))
                .collect(),
        }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> {
        (0..self.gates.len()).map(GateId)
    }

    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(id.0)
    }

    pub fn gate_mut(&mut self, id: GateId) -> Option<&mut Gate> {
        self.gates.get_mut(id.0)
    }

    pub fn input_pin(&self, id: InputPinId) -> Option<&InputPin> {
        self.input_pins.get(id.0)
    }

    pub fn output_pin(&self, id: OutputPinId) -> Option<&OutputPin> {
        self.output_pins.get(id.0)
    }

    pub fn input_signal(&self, id: InputPinId) -> Signal {
        self.input_pins[id.0].signal
    }

    pub fn output_signal(&self, id: OutputPinId) -> Signal {
        self.output_pins[id.0].signal
    }

    /// Drives an input by hand. The next propagation overwrites it if the
    /// pin is wired.
    pub fn set_input_signal(&mut self, id: InputPinId, signal: Signal) {
        self.input_pins[id.0].signal = signal;
    }

    /// Wires `output` to `input`. A previous driver of `input` is released.
    pub fn connect(&mut self, output: OutputPinId, input: InputPinId) {
        if let Some(previous) = self.input_pins[input.0].source.take() {
            self.output_pins[previous.0].release(input);
        }

        self.output_pins[output.0].catch(input);
        self.input_pins[input.0].source = Some(output);
        self.input_pins[input.0].signal = self.output_pins[output.0].signal;

        tracing::debug!("connect {output} -> {input}");
    }

    pub fn disconnect(&mut self, input: InputPinId) -> Option<OutputPinId> {
        let previous = self.input_pins[input.0].source.take()?;
        self.output_pins[previous.0].release(input);
        Some(previous)
    }

    pub fn wires(&self) -> impl Iterator<Item = (OutputPinId, InputPinId)> + '_ {
        self.input_pins
            .iter()
            .enumerate()
            .filter_map(|(index, pin)| pin.source.map(|source| (source, InputPinId(index))))
    }

    /// First phase of a tick: every bound input copies its driver.
    pub fn propagate_inputs(&mut self) {
        for pin in self.input_pins.iter_mut() {
            if let Some(source) = pin.source {
                pin.signal = self.output_pins[source.0].signal;
            }
        }
    }

    pub fn input_signals(&self, gate: GateId) -> Vec<(InputPinKind, Signal)> {
        self.gates[gate.0]
            .inputs
            .iter()
            .map(|id| {
                let pin = &self.input_pins[id.0];
                (pin.kind, pin.signal)
            })
            .collect()
    }

    /// Sets a gate's state and pushes it to its output pins.
    pub fn commit(&mut self, gate: GateId, state: Signal) {
        let gate = &mut self.gates[gate.0];
        gate.state = state;

        for id in &gate.outputs {
            let pin = &mut self.output_pins[id.0];
            pin.signal = pin.kind.drive(state);
        }
    }

    /// Recomputes a logic or flip-flop gate from its current inputs.
    pub fn evaluate(&mut self, gate: GateId) -> Signal {
        let inputs = self.input_signals(gate);
        let state = self.gates[gate.0].next_state(&inputs);
        self.commit(gate, state);
        state
    }

    pub fn input_location(&self, id: InputPinId) -> Point {
        let pin = &self.input_pins[id.0];
        self.gates[pin.gate.0].position + pin.offset
    }

    pub fn output_location(&self, id: OutputPinId) -> Point {
        let pin = &self.output_pins[id.0];
        self.gates[pin.gate.0].position + pin.offset
    }

    /// Output pin of `gate` under `point`, if any.
    pub fn hit_output_pin(&self, gate: GateId, point: Point) -> Option<OutputPinId> {
        self.gates[gate.0]
            .outputs
            .iter()
            .copied()
            .find(|id| pin::pin_hit(self.output_location(*id), point))
    }

    /// Connects `output` to the first input pin of `gate` under `point`.
    pub fn catch(&mut self, gate: GateId, output: OutputPinId, point: Point) -> bool {
        let found = self.gates[gate.0]
            .inputs
            .iter()
            .copied()
            .find(|id| pin::pin_hit(self.input_location(*id), point));

        let Some(input) = found else {
            return false;
        };

        self.connect(output, input);
        true
    }

    pub fn clear(&mut self) {
        self.gates.clear();
        self.input_pins.clear();
        self.output_pins.clear();
    }
}

impl Index<GateId> for Circuit {
    type Output = Gate;

    fn index(&self, index: GateId) -> &Self::Output {
        &self.gates[index.0]
    }
}

impl IndexMut<GateId> for Circuit {
    fn index_mut(&mut self, index: GateId) -> &mut Self::Output {
        &mut self.gates[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::{Circuit, GateId, GateKind, InputPinKind, OutputPinKind, PinLayout};
    use crate::common::Point;
    use crate::logic::Signal;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn step(circuit: &mut Circuit) {
        circuit.propagate_inputs();
        for id in circuit.gate_ids().collect::<Vec<_>>() {
            circuit.evaluate(id);
        }
    }

    #[test]
    fn unittest_circuit_one_tick_latency() {
        init_tracing();

        let mut circuit = Circuit::new();
        let a = circuit.add_gate(GateKind::Not, Point(0., 0.));
        let b = circuit.add_gate(GateKind::Not, Point(200., 0.));
        circuit.connect(circuit[a].outputs()[0], circuit[b].inputs()[0]);

        let a_in = circuit[a].inputs()[0];
        circuit.set_input_signal(a_in, Signal::Zero);
        step(&mut circuit);

        assert_eq!(circuit[a].state(), Signal::One);
        // b read a's output before a recomputed
        assert_eq!(circuit[b].state(), Signal::Unknown);

        circuit.set_input_signal(a_in, Signal::Zero);
        step(&mut circuit);
        assert_eq!(circuit[b].state(), Signal::Zero);
    }

    #[test]
    fn unittest_circuit_fan_out() {
        init_tracing();

        let mut circuit = Circuit::new();
        let source = circuit.add_gate(GateKind::SrFlipFlop, Point(0., 0.));
        let sinks = (0..4)
            .map(|i| circuit.add_gate(GateKind::Not, Point(200., 100. * i as f64)))
            .collect::<Vec<_>>();

        let q = circuit[source].outputs()[0];
        for sink in &sinks {
            circuit.connect(q, circuit[*sink].inputs()[0]);
        }
        assert_eq!(circuit.output_pin(q).map(|pin| pin.targets().len()), Some(4));

        circuit.set_input_signal(circuit[source].inputs()[0], Signal::One);
        circuit.set_input_signal(circuit[source].inputs()[1], Signal::Zero);
        circuit.evaluate(source);
        circuit.propagate_inputs();

        for sink in &sinks {
            assert_eq!(circuit.input_signal(circuit[*sink].inputs()[0]), Signal::One);
        }
    }

    #[test]
    fn unittest_circuit_reconnect() {
        init_tracing();

        let mut circuit = Circuit::new();
        let first = circuit.add_gate(GateKind::DFlipFlop, Point(0., 0.));
        let second = circuit.add_gate(GateKind::DFlipFlop, Point(0., 200.));
        let sink = circuit.add_gate(GateKind::Not, Point(200., 0.));

        let input = circuit[sink].inputs()[0];
        let q1 = circuit[first].outputs()[0];
        let q2_bar = circuit[second].outputs()[1];

        circuit.connect(q1, input);
        assert_eq!(circuit.input_signal(input), Signal::Zero);

        circuit.connect(q2_bar, input);
        assert_eq!(circuit.input_pin(input).and_then(|pin| pin.source()), Some(q2_bar));
        assert!(circuit.output_pin(q1).map(|pin| pin.targets().is_empty()).unwrap_or(false));
        assert_eq!(circuit.input_signal(input), Signal::One);
        assert_eq!(circuit.wires().count(), 1);

        assert_eq!(circuit.disconnect(input), Some(q2_bar));
        assert_eq!(circuit.disconnect(input), None);
    }

    #[test]
    fn unittest_circuit_unconnected_stays_unknown() {
        let mut circuit = Circuit::new();
        let and = circuit.add_gate(GateKind::And, Point(0., 0.));

        step(&mut circuit);
        step(&mut circuit);

        assert_eq!(circuit[and].state(), Signal::Unknown);
        assert_eq!(circuit.output_signal(circuit[and].outputs()[0]), Signal::Unknown);
    }

    #[test]
    fn unittest_circuit_catch() {
        let mut circuit = Circuit::new();
        let source = circuit.add_gate(GateKind::Not, Point(0., 0.));
        let sink = circuit.add_gate(GateKind::And, Point(300., 100.));
        let out = circuit[source].outputs()[0];

        assert_eq!(circuit.hit_output_pin(source, Point(46., 1.)), Some(out));
        assert_eq!(circuit.hit_output_pin(source, Point(0., 0.)), None);

        // second and input sits at (300 - 57.5, 100 + 12)
        assert!(!circuit.catch(sink, out, Point(250., 112.)));
        assert!(circuit.catch(sink, out, Point(244., 113.)));
        assert_eq!(
            circuit.input_pin(circuit[sink].inputs()[1]).and_then(|pin| pin.source()),
            Some(out)
        );
    }

    #[test]
    fn unittest_circuit_extra_pin_rejected() -> eyre::Result<()> {
        let mut circuit = Circuit::new();
        let and = circuit.add_gate(GateKind::And, Point(0., 0.));

        assert!(circuit
            .add_input_pin(and, Point(0., 0.), InputPinKind::Regular)
            .is_err());
        assert!(circuit
            .add_output_pin(and, Point(0., 0.), OutputPinKind::Regular)
            .is_err());
        assert!(circuit
            .add_input_pin(GateId(7), Point(0., 0.), InputPinKind::Regular)
            .is_err());
        assert_eq!(circuit[and].inputs().len(), 2);
        assert_eq!(circuit[and].outputs().len(), 1);

        // the gate still evaluates with its original pins
        circuit.set_input_signal(circuit[and].inputs()[0], Signal::One);
        circuit.set_input_signal(circuit[and].inputs()[1], Signal::One);
        assert_eq!(circuit.evaluate(and), Signal::One);

        GateKind::And.check_layout(&circuit.layout(and))?;

        Ok(())
    }

    #[test]
    #[should_panic]
    fn unittest_circuit_bad_layout_panics() {
        let mut circuit = Circuit::new();
        let layout = PinLayout {
            inputs: vec![(Point(0., 0.), InputPinKind::Regular)],
            outputs: vec![],
        };
        circuit.add_gate_with_pins(GateKind::And, Point(0., 0.), &layout);
    }
}
