use crate::common::Point;

/// Fraction of the kick duration at which the boot meets the product.
pub const SPARTY_KICK_POINT: f64 = 0.35;

/// Maximum rotation of the boot in radians.
pub const SPARTY_BOOT_MAX_ROTATION: f64 = 0.8;

/// Leftward speed of kicked products when the level gives none.
pub const DEFAULT_KICK_SPEED: f64 = 75.;

/// Kicking actuator. The kick itself marks products as soon as it is
/// triggered; the timer only drives the boot animation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sparty {
    pub height: f64,
    pub kick_speed: f64,
    pub kick_duration: f64,
    // absolute location the input pin is attached to
    pub pin: Point,
    kicking: bool,
    kick_time: f64,
    product_kicked: bool,
}

impl Sparty {
    pub fn new(height: f64, kick_speed: f64, kick_duration: f64, pin: Point) -> Self {
        Self {
            height,
            kick_speed,
            kick_duration,
            pin,
            ..Default::default()
        }
    }

    pub fn kick(&mut self) {
        self.kicking = true;
        self.kick_time = 0.;
        self.product_kicked = false;
    }

    pub fn is_kicking(&self) -> bool {
        self.kicking
    }

    pub fn product_kicked(&self) -> bool {
        self.product_kicked
    }

    pub fn effective_kick_speed(&self) -> f64 {
        if self.kick_speed > 0. {
            self.kick_speed
        } else {
            DEFAULT_KICK_SPEED
        }
    }

    pub fn update(&mut self, elapsed: f64) {
        if !self.kicking {
            return;
        }

        self.kick_time += elapsed;
        if self.kick_time >= self.kick_duration * SPARTY_KICK_POINT {
            self.product_kicked = true;
        }
        if self.kick_time >= self.kick_duration {
            self.kicking = false;
            self.kick_time = 0.;
            self.product_kicked = false;
        }
    }

    /// Boot angle: rises to the maximum at the kick point and falls back.
    pub fn boot_rotation(&self) -> f64 {
        if !self.kicking || self.kick_duration <= 0. {
            return 0.;
        }

        let kick_at = self.kick_duration * SPARTY_KICK_POINT;
        if self.kick_time < kick_at {
            SPARTY_BOOT_MAX_ROTATION * self.kick_time / kick_at
        } else {
            let rest = self.kick_duration - kick_at;
            SPARTY_BOOT_MAX_ROTATION * (1. - (self.kick_time - kick_at) / rest).max(0.)
        }
    }

    /// Offset of the input pin from the gate at `position`.
    pub fn input_pin_offset(&self, position: Point) -> Point {
        Point(
            self.pin.x() - position.x() - super::pin::DEFAULT_LINE_LENGTH,
            self.pin.y() - position.y(),
        )
    }
}
