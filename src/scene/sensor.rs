use super::SensorId;
use crate::circuit::GateId;
use crate::common::Point;
use crate::scene::product::Property;

/// Default top of the sensor gate column.
pub const SENSOR_PANEL_ORIGIN: Point = Point(355., 535.);

/// Vertical spacing of the gates in the column.
pub const SENSOR_GATE_SPACING: f64 = 40.;

/// Sensor camera with its column of property gates.
#[derive(Debug, Clone, Default)]
pub struct Sensor {
    pub id: SensorId,
    pub position: Point,
    pub panel: Point,
    pub gates: Vec<GateId>,
}

impl Sensor {
    pub fn new(id: SensorId, position: Point, panel: Point) -> Self {
        Self {
            id,
            position,
            panel,
            gates: Vec::new(),
        }
    }

    /// Where the `index`-th gate of the column sits.
    pub fn gate_position(&self, index: usize) -> Point {
        self.panel + Point(0., index as f64 * SENSOR_GATE_SPACING)
    }
}

/// Properties a sensor camera can be configured with, in column order.
pub fn parse_properties(names: &[String]) -> eyre::Result<Vec<Property>> {
    names
        .iter()
        .map(|name| {
            name.parse::<Property>()
                .map_err(|_| eyre::eyre!("unknown sensor property: {name}"))
        })
        .collect()
}
