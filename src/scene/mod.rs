use derive_more::Display;
use eyre::{ensure, WrapErr};
use itertools::{Either, Itertools};

use crate::circuit::{Circuit, GateId, GateKind, OutputPinId, PinLayout};
use crate::common::Point;
use crate::utils::Verify;

pub mod conveyor;
pub mod product;
pub mod sensor;
pub mod visitor;

use conveyor::{Conveyor, PanelButton};
use product::{Product, Property};
use sensor::Sensor;
use visitor::{ItemVisitor, ProductAnimator, ScanOrder};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("product#{_0}")]
pub struct ProductId(pub usize);

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("conveyor#{_0}")]
pub struct ConveyorId(pub usize);

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("sensor#{_0}")]
pub struct SensorId(pub usize);

/// Handle of anything placed in the scene, in drawing order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum ItemId {
    Gate(GateId),
    Product(ProductId),
    Conveyor(ConveyorId),
    Sensor(SensorId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hit {
    OutputPin(OutputPinId),
    Gate(GateId),
    Panel(ConveyorId, PanelButton),
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub circuit: Circuit,
    products: Vec<Product>,
    conveyors: Vec<Conveyor>,
    sensors: Vec<Sensor>,
    items: Vec<ItemId>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(id.0)
    }

    pub fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.get_mut(id.0)
    }

    pub fn conveyors(&self) -> &[Conveyor] {
        &self.conveyors
    }

    pub fn conveyor(&self, id: ConveyorId) -> Option<&Conveyor> {
        self.conveyors.get(id.0)
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn add_gate(&mut self, kind: GateKind, position: Point) -> GateId {
        let id = self.circuit.add_gate(kind, position);
        self.items.push(ItemId::Gate(id));
        id
    }

    pub fn add_gate_with_pins(&mut self, kind: GateKind, position: Point, layout: &PinLayout) -> GateId {
        let id = self.circuit.add_gate_with_pins(kind, position, layout);
        self.items.push(ItemId::Gate(id));
        id
    }

    pub fn add_conveyor(&mut self, position: Point, height: f64, speed: f64, panel: Point) -> ConveyorId {
        let id = ConveyorId(self.conveyors.len());
        self.conveyors
            .push(Conveyor::new(id, position, height, speed, panel));
        self.items.push(ItemId::Conveyor(id));
        id
    }

    /// Places a product `placement` pixels above its conveyor. The newest
    /// product of a conveyor is its last one.
    pub fn add_product(&mut self, conveyor: ConveyorId, placement: f64, mut product: Product) -> ProductId {
        let id = ProductId(self.products.len());
        let belt = &mut self.conveyors[conveyor.0];

        if let Some(previous) = belt.products.last() {
            self.products[previous.0].last = false;
        }
        belt.products.push(id);

        product.id = id;
        product.conveyor = Some(conveyor);
        product.placement = placement;
        product.position = Point(belt.position.x(), belt.position.y() - placement);
        product.last = true;

        self.products.push(product);
        self.items.push(ItemId::Product(id));
        id
    }

    /// Adds a sensor camera and one sensor gate per property, stacked in
    /// a column from `panel`.
    pub fn add_sensor(&mut self, position: Point, panel: Point, properties: &[Property]) -> SensorId {
        let id = SensorId(self.sensors.len());
        let mut sensor = Sensor::new(id, position, panel);

        for (index, property) in properties.iter().enumerate() {
            let gate = self.add_gate(GateKind::Sensor(*property), sensor.gate_position(index));
            sensor.gates.push(gate);
        }

        self.sensors.push(sensor);
        self.items.push(ItemId::Sensor(id));
        id
    }

    pub fn accept(&mut self, visitor: &mut dyn ItemVisitor, order: ScanOrder) {
        let Scene {
            circuit,
            products,
            conveyors,
            sensors,
            items,
            ..
        } = self;

        let scan = match order {
            ScanOrder::FrontToBack => Either::Left(items.iter()),
            ScanOrder::BackToFront => Either::Right(items.iter().rev()),
        };

        for item in scan {
            match item {
                ItemId::Gate(id) => {
                    let gate = &circuit[*id];
                    match gate.as_beam() {
                        Some(beam) => visitor.visit_beam(gate, beam),
                        None => visitor.visit_gate(gate),
                    }
                }
                ItemId::Product(id) => visitor.visit_product(&mut products[id.0]),
                ItemId::Conveyor(id) => visitor.visit_conveyor(&conveyors[id.0]),
                ItemId::Sensor(id) => visitor.visit_sensor(&sensors[id.0]),
            }

            if visitor.done() {
                break;
            }
        }
    }

    /// Topmost thing under `point`: an output pin, a gate body or a
    /// conveyor panel button.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        self.items.iter().rev().find_map(|item| match item {
            ItemId::Gate(id) => {
                if let Some(pin) = self.circuit.hit_output_pin(*id, point) {
                    Some(Hit::OutputPin(pin))
                } else if self.circuit[*id].hit_test(point) {
                    Some(Hit::Gate(*id))
                } else {
                    None
                }
            }
            ItemId::Conveyor(id) => self.conveyors[id.0]
                .panel_button(point)
                .map(|button| Hit::Panel(*id, button)),
            ItemId::Product(_) | ItemId::Sensor(_) => None,
        })
    }

    /// Drops a dragged wire end at `point`; the topmost gate with an input
    /// pin there catches it.
    pub fn try_to_catch(&mut self, output: OutputPinId, point: Point) -> bool {
        let gates = self
            .items
            .iter()
            .rev()
            .filter_map(|item| match item {
                ItemId::Gate(id) => Some(*id),
                _ => None,
            })
            .collect_vec();

        gates
            .into_iter()
            .any(|gate| self.circuit.catch(gate, output, point))
    }

    pub fn move_to_front(&mut self, item: ItemId) {
        if let Some(index) = self.items.iter().position(|other| *other == item) {
            let item = self.items.remove(index);
            self.items.push(item);
        }
    }

    pub fn move_gate(&mut self, gate: GateId, position: Point) {
        if let Some(gate) = self.circuit.gate_mut(gate) {
            gate.position = position;
        }
    }

    /// Starts a conveyor and puts its products back at their placements.
    pub fn start_conveyor(&mut self, id: ConveyorId) {
        let Some(conveyor) = self.conveyors.get_mut(id.0) else {
            return;
        };
        conveyor.start();

        let mut animator = ProductAnimator::reset(conveyor);
        self.accept(&mut animator, ScanOrder::FrontToBack);
        tracing::info!("{id} started");
    }

    pub fn stop_conveyor(&mut self, id: ConveyorId) {
        if let Some(conveyor) = self.conveyors.get_mut(id.0) {
            conveyor.stop();
            tracing::info!("{id} stopped");
        }
    }

    /// Advances belts and moves products by `elapsed` seconds.
    pub fn animate(&mut self, elapsed: f64) {
        for index in 0..self.conveyors.len() {
            self.conveyors[index].advance_belt(elapsed);
            let mut animator = ProductAnimator::new(&self.conveyors[index], elapsed, self.height);
            self.accept(&mut animator, ScanOrder::FrontToBack);
        }

        for id in self.circuit.gate_ids().collect_vec() {
            if let Some(sparty) = self.circuit[id].as_sparty_mut() {
                sparty.update(elapsed);
            }
        }
    }

    pub fn clear(&mut self) {
        self.circuit.clear();
        self.products.clear();
        self.conveyors.clear();
        self.sensors.clear();
        self.items.clear();
    }
}

impl Verify for Scene {
    fn verify(&self) -> eyre::Result<()> {
        for gate in self.circuit.gates() {
            gate.kind
                .check_layout(&self.circuit.layout(gate.id))
                .wrap_err_with(|| format!("{} has a bad pin layout", gate.id))?;
        }

        for (output, input) in self.circuit.wires() {
            ensure!(
                self.circuit.output_pin(output).is_some() && self.circuit.input_pin(input).is_some(),
                "wire {output} -> {input} references a missing pin"
            );
        }

        for product in &self.products {
            let Some(conveyor) = product.conveyor else {
                eyre::bail!("{} is not on a conveyor", product.id);
            };
            ensure!(
                self.conveyor(conveyor).is_some(),
                "{} references missing {conveyor}",
                product.id
            );
        }

        let has_beam = self.circuit.gates().iter().any(|gate| gate.as_beam().is_some());
        let has_sensor_gates = self
            .circuit
            .gates()
            .iter()
            .any(|gate| gate.sensor_property().is_some());
        ensure!(
            !has_sensor_gates || has_beam,
            "sensor gates need a beam to look at"
        );

        for gate in self.circuit.gates() {
            if gate.as_sparty().is_some()
                && gate
                    .inputs()
                    .iter()
                    .all(|input| self.circuit.input_pin(*input).and_then(|pin| pin.source()).is_none())
            {
                tracing::warn!("{} has no driver and will never kick", gate.id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::conveyor::PanelButton;
    use super::product::{Product, Property};
    use super::sensor::SENSOR_PANEL_ORIGIN;
    use super::{Hit, ItemId, Scene};
    use crate::circuit::beam::Beam;
    use crate::circuit::GateKind;
    use crate::common::Point;
    use crate::utils::Verify;

    fn red_square() -> Product {
        Product::new(Default::default(), Property::Red, Property::Square, Property::None)
    }

    #[test]
    fn unittest_scene_products_on_conveyor() {
        let mut scene = Scene::new(1000., 800.);
        let conveyor = scene.add_conveyor(Point(100., 400.), 800., 50., Point(90., -300.));

        let ids = [0., 150., 300.]
            .into_iter()
            .map(|placement| scene.add_product(conveyor, placement, red_square()))
            .collect::<Vec<_>>();

        let lasts = ids
            .iter()
            .filter_map(|id| scene.product(*id))
            .map(|product| product.last)
            .collect::<Vec<_>>();
        assert_eq!(lasts, vec![false, false, true]);
        assert_eq!(scene.product(ids[1]).map(|p| p.position), Some(Point(100., 250.)));
        assert_eq!(scene.conveyor(conveyor).map(|c| c.products.len()), Some(3));
    }

    #[test]
    fn unittest_scene_hit_test_order() {
        let mut scene = Scene::new(1000., 800.);
        let and = scene.add_gate(GateKind::And, Point(100., 100.));
        let not = scene.add_gate(GateKind::Not, Point(100., 100.));

        assert_eq!(scene.hit_test(Point(100., 100.)), Some(Hit::Gate(not)));

        scene.move_to_front(ItemId::Gate(and));
        assert_eq!(scene.hit_test(Point(100., 100.)), Some(Hit::Gate(and)));
        assert_eq!(scene.items().last(), Some(&ItemId::Gate(and)));

        let output = scene.circuit[and].outputs()[0];
        assert_eq!(scene.hit_test(Point(157., 101.)), Some(Hit::OutputPin(output)));
        assert_eq!(scene.hit_test(Point(500., 500.)), None);
    }

    #[test]
    fn unittest_scene_panel_hit() {
        let mut scene = Scene::new(1000., 800.);
        let conveyor = scene.add_conveyor(Point(100., 400.), 800., 50., Point(90., -300.));

        assert_eq!(
            scene.hit_test(Point(230., 140.)),
            Some(Hit::Panel(conveyor, PanelButton::Start))
        );
        assert_eq!(
            scene.hit_test(Point(230., 200.)),
            Some(Hit::Panel(conveyor, PanelButton::Stop))
        );
    }

    #[test]
    fn unittest_scene_try_to_catch() {
        let mut scene = Scene::new(1000., 800.);
        let source = scene.add_gate(GateKind::SrFlipFlop, Point(100., 100.));
        let sink = scene.add_gate(GateKind::Not, Point(300., 100.));
        let output = scene.circuit[source].outputs()[1];

        assert!(!scene.try_to_catch(output, Point(400., 400.)));
        assert!(scene.try_to_catch(output, Point(255., 100.)));

        let input = scene.circuit[sink].inputs()[0];
        assert_eq!(
            scene.circuit.input_pin(input).and_then(|pin| pin.source()),
            Some(output)
        );
    }

    #[test]
    fn unittest_scene_sensor_column() -> eyre::Result<()> {
        let mut scene = Scene::new(1000., 800.);
        let sensor = scene.add_sensor(
            Point(300., 300.),
            SENSOR_PANEL_ORIGIN,
            &[Property::Red, Property::Izzo],
        );

        let gates = scene.sensors()[sensor.0].gates.clone();
        assert_eq!(gates.len(), 2);
        assert_eq!(scene.circuit[gates[1]].position, Point(355., 575.));
        assert_eq!(scene.circuit[gates[1]].sensor_property(), Some(Property::Izzo));
        assert!(scene.verify().is_err());

        scene.add_gate(GateKind::Beam(Beam::new(200.)), Point(100., 500.));
        scene.verify()?;

        Ok(())
    }

    #[test]
    fn unittest_scene_start_and_clear() {
        let mut scene = Scene::new(1000., 800.);
        let conveyor = scene.add_conveyor(Point(100., 400.), 800., 50., Point(0., 0.));
        let product = scene.add_product(conveyor, 100., red_square());

        if let Some(item) = scene.product_mut(product) {
            item.position = Point(-20., 700.);
            item.displayed = false;
            item.moving_left = true;
        }

        scene.start_conveyor(conveyor);
        let item = scene.product(product).cloned().unwrap_or_default();
        assert_eq!(item.position, Point(100., 300.));
        assert!(item.displayed);
        assert!(!item.moving_left);
        assert!(scene.conveyors()[0].is_running());

        scene.animate(2.);
        assert_eq!(scene.product(product).map(|p| p.position), Some(Point(100., 400.)));

        scene.stop_conveyor(conveyor);
        scene.animate(2.);
        assert_eq!(scene.product(product).map(|p| p.position), Some(Point(100., 400.)));

        scene.clear();
        assert!(scene.items().is_empty());
        assert!(scene.circuit.gates().is_empty());
    }
}
