use crate::circuit::beam::{Beam, BEAM_Y_TOLERANCE};
use crate::circuit::Gate;
use crate::common::Point;
use crate::logic::Signal;
use crate::scene::conveyor::Conveyor;
use crate::scene::product::{Product, Property};
use crate::scene::sensor::Sensor;
use crate::scene::{ConveyorId, ProductId};

/// Sensor band below the beam line.
pub const SENSOR_BOTTOM_TOLERANCE: f64 = 40.;

/// Sensor band above the beam line.
pub const SENSOR_TOP_TOLERANCE: f64 = 100.;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanOrder {
    // drawing order, first added first
    FrontToBack,
    // most recently drawn first
    BackToFront,
}

/// Visitor over every item of a scene. Beams are reported through
/// `visit_beam` instead of `visit_gate`.
pub trait ItemVisitor {
    fn visit_gate(&mut self, _gate: &Gate) {}

    fn visit_beam(&mut self, _gate: &Gate, _beam: &Beam) {}

    fn visit_product(&mut self, _product: &mut Product) {}

    fn visit_conveyor(&mut self, _conveyor: &Conveyor) {}

    fn visit_sensor(&mut self, _sensor: &Sensor) {}

    /// Stops the scan once true.
    fn done(&self) -> bool {
        false
    }
}

/// Beam region scan for one beam. Marks products entering the region and
/// collects those that just left it.
pub struct BeamProductVisitor {
    beam: Beam,
    origin: Point,
    found: bool,
    left: Vec<ProductId>,
}

impl BeamProductVisitor {
    pub fn new(beam: Beam, origin: Point) -> Self {
        Self {
            beam,
            origin,
            found: false,
            left: Vec::new(),
        }
    }

    pub fn found_intersection(&self) -> bool {
        self.found
    }

    /// Products whose crossing ended during this scan.
    pub fn left_beam(&self) -> &[ProductId] {
        &self.left
    }
}

impl ItemVisitor for BeamProductVisitor {
    fn visit_product(&mut self, product: &mut Product) {
        if !product.displayed {
            return;
        }

        if self.beam.intersects(self.origin, product.position) {
            self.found = true;
            product.beam_hit = true;
        } else if product.beam_hit {
            product.beam_hit = false;
            self.left.push(product.id);
        }
    }
}

pub fn in_sensor_band(beam_y: f64, product_y: f64) -> bool {
    let distance = (beam_y - product_y).abs();
    if product_y >= beam_y {
        distance < SENSOR_BOTTOM_TOLERANCE
    } else {
        distance < SENSOR_TOP_TOLERANCE
    }
}

/// Evaluates one sensor property against the product nearest in z-order
/// that sits in the band of the most recently seen beam.
pub struct SensorVisitor {
    property: Property,
    beam_y: Option<f64>,
    // (y, matches) of every displayed product in scan order
    candidates: Vec<(f64, bool)>,
    items: usize,
}

impl SensorVisitor {
    pub fn new(property: Property) -> Self {
        Self {
            property,
            beam_y: None,
            candidates: Vec::new(),
            items: 0,
        }
    }

    pub fn state(&self) -> Signal {
        if self.items == 0 {
            return Signal::Unknown;
        }

        let Some(beam_y) = self.beam_y else {
            return Signal::Zero;
        };

        self.candidates
            .iter()
            .find(|(y, _)| in_sensor_band(beam_y, *y))
            .map(|(_, matches)| Signal::from(*matches))
            .unwrap_or(Signal::Zero)
    }
}

impl ItemVisitor for SensorVisitor {
    fn visit_gate(&mut self, _gate: &Gate) {
        self.items += 1;
    }

    fn visit_beam(&mut self, gate: &Gate, _beam: &Beam) {
        self.items += 1;
        self.beam_y = Some(gate.position.y());
    }

    fn visit_product(&mut self, product: &mut Product) {
        self.items += 1;
        if product.displayed {
            self.candidates
                .push((product.position.y(), product.has_property(self.property)));
        }
    }

    fn visit_conveyor(&mut self, _conveyor: &Conveyor) {
        self.items += 1;
    }

    fn visit_sensor(&mut self, _sensor: &Sensor) {
        self.items += 1;
    }
}

/// Finds the products a kick reaches: every displayed product within the
/// beam tolerance of the most recently seen beam.
#[derive(Default)]
pub struct KickVisitor {
    beam_y: Option<f64>,
    candidates: Vec<(ProductId, f64)>,
}

impl KickVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kicked(&self) -> Vec<ProductId> {
        let Some(beam_y) = self.beam_y else {
            return Vec::new();
        };

        self.candidates
            .iter()
            .filter(|(_, y)| (y - beam_y).abs() < BEAM_Y_TOLERANCE)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl ItemVisitor for KickVisitor {
    fn visit_beam(&mut self, gate: &Gate, _beam: &Beam) {
        self.beam_y = Some(gate.position.y());
    }

    fn visit_product(&mut self, product: &mut Product) {
        if product.displayed {
            self.candidates.push((product.id, product.position.y()));
        }
    }
}

/// Moves the products of one conveyor, or puts them back at their
/// placement when resetting.
pub struct ProductAnimator {
    conveyor: ConveyorId,
    origin: Point,
    speed: f64,
    running: bool,
    elapsed: f64,
    scene_height: f64,
    reset: bool,
}

impl ProductAnimator {
    pub fn new(conveyor: &Conveyor, elapsed: f64, scene_height: f64) -> Self {
        Self {
            conveyor: conveyor.id,
            origin: conveyor.position,
            speed: conveyor.speed,
            running: conveyor.is_running(),
            elapsed,
            scene_height,
            reset: false,
        }
    }

    pub fn reset(conveyor: &Conveyor) -> Self {
        Self {
            reset: true,
            ..Self::new(conveyor, 0., 0.)
        }
    }
}

impl ItemVisitor for ProductAnimator {
    fn visit_product(&mut self, product: &mut Product) {
        if product.conveyor != Some(self.conveyor) {
            return;
        }

        if self.reset {
            product.position = Point(self.origin.x(), self.origin.y() - product.placement);
            product.displayed = true;
            product.moving_left = false;
            product.beam_hit = false;
            return;
        }

        // a stopped belt freezes kicked products too
        if !product.displayed || !self.running {
            return;
        }

        if product.moving_left {
            product.position.0 -= product.kick_speed * self.elapsed;
            if product.position.x() < 0. {
                product.displayed = false;
            }
        } else {
            product.position.1 += self.speed * self.elapsed;
            if product.position.y() > self.scene_height {
                product.displayed = false;
            }
        }
    }
}
