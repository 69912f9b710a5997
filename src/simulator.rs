use derive_more::{Deref, DerefMut};
use itertools::Itertools;

use crate::circuit::GateId;
use crate::common::Point;
use crate::logic::Signal;
use crate::scene::conveyor::PanelButton;
use crate::scene::product::Property;
use crate::scene::visitor::{BeamProductVisitor, KickVisitor, ScanOrder, SensorVisitor};
use crate::scene::{Hit, ItemId, ProductId, Scene};
use crate::score::{ScoreListener, ScoreLog};
use crate::utils::Verify;

/// Drives a scene one tick at a time: every input pin copies its driver,
/// then every gate recomputes in scene order.
#[derive(Debug, Deref, DerefMut)]
pub struct Simulator<L: ScoreListener = ScoreLog> {
    #[deref]
    #[deref_mut]
    scene: Scene,
    listener: L,
    cycle: usize,
}

impl Simulator<ScoreLog> {
    pub fn from(scene: Scene) -> eyre::Result<Self> {
        Self::with_listener(scene, ScoreLog::default())
    }
}

impl<L: ScoreListener> Simulator<L> {
    pub fn with_listener(scene: Scene, listener: L) -> eyre::Result<Self> {
        let scene = scene.verified()?;

        tracing::info!(
            "simulator ready: {} gates, {} products",
            scene.circuit.gates().len(),
            scene.products().len()
        );

        Ok(Self {
            scene,
            listener,
            cycle: 0,
        })
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_parts(self) -> (Scene, L) {
        (self.scene, self.listener)
    }

    /// Animates by `elapsed` seconds, then evaluates once.
    pub fn tick(&mut self, elapsed: f64) {
        self.scene.animate(elapsed);
        self.step();
    }

    pub fn run(&mut self, ticks: usize, elapsed: f64) -> usize {
        for local_cycle in 0..ticks {
            self.tick(elapsed);
            tracing::debug!("simulator cycle: {}/{}", local_cycle + 1, self.cycle);
        }

        ticks
    }

    /// One evaluation without moving anything.
    pub fn step(&mut self) {
        self.scene.circuit.propagate_inputs();

        // scene order first, then gates built straight on the circuit
        let gates = self
            .scene
            .items()
            .iter()
            .filter_map(|item| match item {
                ItemId::Gate(id) => Some(*id),
                _ => None,
            })
            .chain(self.scene.circuit.gate_ids())
            .unique()
            .collect_vec();

        for id in gates {
            self.compute_gate(id);
        }

        self.cycle += 1;
    }

    fn compute_gate(&mut self, id: GateId) {
        let gate = &self.scene.circuit[id];

        if gate.as_beam().is_some() {
            self.compute_beam(id);
        } else if let Some(property) = gate.sensor_property() {
            self.compute_sensor(id, property);
        } else if gate.as_sparty().is_some() {
            self.compute_sparty(id);
        } else {
            self.scene.circuit.evaluate(id);
        }
    }

    fn compute_beam(&mut self, id: GateId) {
        let gate = &self.scene.circuit[id];
        let (Some(beam), origin) = (gate.as_beam().cloned(), gate.position) else {
            return;
        };

        let mut visitor = BeamProductVisitor::new(beam, origin);
        self.scene.accept(&mut visitor, ScanOrder::FrontToBack);

        let state = match self.scene.circuit[id].as_beam_mut() {
            Some(beam) => beam.set_broken(visitor.found_intersection()),
            None => Signal::Zero,
        };
        self.scene.circuit.commit(id, state);

        for product in visitor.left_beam() {
            self.score(*product);
        }
    }

    fn score(&mut self, id: ProductId) {
        let Some(product) = self.scene.product(id) else {
            return;
        };
        let (correct, last) = (product.is_correct(), product.last);

        tracing::info!("{id} left the beam, correct: {correct}");
        self.listener.product_result(correct);
        if last {
            self.listener.level_end();
        }
    }

    fn compute_sensor(&mut self, id: GateId, property: Property) {
        let mut visitor = SensorVisitor::new(property);
        self.scene.accept(&mut visitor, ScanOrder::BackToFront);

        let state = visitor.state();
        tracing::debug!("{id} senses {property}: {state}");
        self.scene.circuit.commit(id, state);
    }

    fn compute_sparty(&mut self, id: GateId) {
        let input = self
            .scene
            .circuit
            .input_signals(id)
            .first()
            .map(|(_, signal)| *signal)
            .unwrap_or_default();
        let previous = self.scene.circuit[id].state();

        if previous != Signal::One && input == Signal::One {
            self.kick(id);
        }

        self.scene.circuit.commit(id, input);
    }

    fn kick(&mut self, id: GateId) {
        let Some(sparty) = self.scene.circuit[id].as_sparty_mut() else {
            return;
        };
        sparty.kick();
        let kick_speed = sparty.effective_kick_speed();

        let mut visitor = KickVisitor::new();
        self.scene.accept(&mut visitor, ScanOrder::BackToFront);

        let kicked = visitor.kicked();
        tracing::info!("{id} kicks {}", kicked.iter().join(", "));

        for product in kicked {
            if let Some(product) = self.scene.product_mut(product) {
                product.moving_left = true;
                product.kick_speed = kick_speed;
            }
        }
    }

    pub fn start_conveyors(&mut self) {
        let ids = self.scene.conveyors().iter().map(|conveyor| conveyor.id).collect_vec();
        for id in ids {
            self.scene.start_conveyor(id);
        }
    }

    /// Mouse press at `point`; conveyor panel buttons act immediately.
    pub fn press(&mut self, point: Point) -> Option<Hit> {
        let hit = self.scene.hit_test(point)?;

        if let Hit::Panel(conveyor, button) = hit {
            match button {
                PanelButton::Start => self.scene.start_conveyor(conveyor),
                PanelButton::Stop => self.scene.stop_conveyor(conveyor),
            }
        }

        Some(hit)
    }
}
