use strum_macros::{Display, EnumIter, EnumString};

use super::{ConveyorId, ProductId};
use crate::common::Point;

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PropertyType {
    Color,
    Shape,
    #[default]
    Content,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Property {
    #[default]
    None,
    Red,
    Green,
    Blue,
    White,
    Square,
    Circle,
    Diamond,
    Izzo,
    Smith,
    Football,
    Basketball,
}

impl Property {
    pub fn property_type(&self) -> PropertyType {
        match self {
            Property::Red | Property::Green | Property::Blue | Property::White => {
                PropertyType::Color
            }
            Property::Square | Property::Circle | Property::Diamond => PropertyType::Shape,
            Property::None
            | Property::Izzo
            | Property::Smith
            | Property::Football
            | Property::Basketball => PropertyType::Content,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Product {
    pub id: ProductId,
    pub position: Point,
    pub color: Property,
    pub shape: Property,
    pub content: Property,
    // ground truth the player is scored against
    pub should_kick: bool,
    pub moving_left: bool,
    // leftward speed once kicked
    pub kick_speed: f64,
    pub beam_hit: bool,
    pub displayed: bool,
    // distance above the conveyor origin at start
    pub placement: f64,
    pub conveyor: Option<ConveyorId>,
    pub last: bool,
}

impl Product {
    pub fn new(id: ProductId, color: Property, shape: Property, content: Property) -> Self {
        Self {
            id,
            color,
            shape,
            content,
            displayed: true,
            ..Default::default()
        }
    }

    pub fn property(&self, ty: PropertyType) -> Property {
        match ty {
            PropertyType::Color => self.color,
            PropertyType::Shape => self.shape,
            PropertyType::Content => self.content,
        }
    }

    /// Compares the product's property of the same type as `property`.
    pub fn has_property(&self, property: Property) -> bool {
        self.property(property.property_type()) == property
    }

    /// True when the player's routing matched the ground truth.
    pub fn is_correct(&self) -> bool {
        !(self.should_kick ^ self.moving_left)
    }
}
