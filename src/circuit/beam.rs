use crate::common::Point;
use crate::logic::Signal;

/// Vertical distance within which a product interrupts the beam.
pub const BEAM_Y_TOLERANCE: f64 = 40.;

/// Horizontal distance from the beam origin to its output pin.
pub const BEAM_PIN_OFFSET: f64 = 80.;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Beam {
    // horizontal extent of the beam from its origin
    pub sender: f64,
    broken: bool,
}

impl Beam {
    pub fn new(sender: f64) -> Self {
        Self {
            sender,
            broken: false,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn set_broken(&mut self, broken: bool) -> Signal {
        self.broken = broken;
        Signal::from(broken)
    }

    pub fn x_range(&self, origin: Point) -> (f64, f64) {
        let (a, b) = (origin.x(), origin.x() + self.sender);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Whether a product at `product` lies inside the beam region.
    pub fn intersects(&self, origin: Point, product: Point) -> bool {
        let (min_x, max_x) = self.x_range(origin);

        product.x() >= min_x
            && product.x() <= max_x
            && (product.y() - origin.y()).abs() < BEAM_Y_TOLERANCE
    }
}
