use strum_macros::Display;

use super::{ConveyorId, ProductId};
use crate::common::Point;

// (x, y, width, height) relative to the panel corner
const START_BUTTON: (f64, f64, f64, f64) = (35., 29., 95., 36.);
const STOP_BUTTON: (f64, f64, f64, f64) = (35., 87., 95., 36.);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum PanelButton {
    Start,
    Stop,
}

#[derive(Debug, Clone, Default)]
pub struct Conveyor {
    pub id: ConveyorId,
    pub position: Point,
    pub height: f64,
    pub speed: f64,
    // panel corner relative to the conveyor position
    pub panel: Point,
    pub products: Vec<ProductId>,
    running: bool,
    belt_y: f64,
}

impl Conveyor {
    pub fn new(id: ConveyorId, position: Point, height: f64, speed: f64, panel: Point) -> Self {
        Self {
            id,
            position,
            height,
            speed,
            panel,
            ..Default::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Belt texture offset, wrapped to the conveyor height.
    pub fn belt_y(&self) -> f64 {
        self.belt_y
    }

    /// Starts the belt. Resetting the products is left to the scene.
    pub fn start(&mut self) {
        self.belt_y = 0.;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn advance_belt(&mut self, elapsed: f64) {
        if !self.running {
            return;
        }

        self.belt_y += elapsed * self.speed;
        if self.height > 0. && self.belt_y >= self.height {
            self.belt_y %= self.height;
        }
    }

    pub fn panel_button(&self, point: Point) -> Option<PanelButton> {
        let rel = point - self.position - self.panel;
        let inside = |(x, y, w, h): (f64, f64, f64, f64)| {
            rel.x() >= x && rel.x() <= x + w && rel.y() >= y && rel.y() <= y + h
        };

        if inside(START_BUTTON) {
            Some(PanelButton::Start)
        } else if inside(STOP_BUTTON) {
            Some(PanelButton::Stop)
        } else {
            None
        }
    }
}
