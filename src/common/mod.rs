use std::ops::{Add, Sub};

// Scene coordinates in virtual pixels, y grows downward.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.0 - other.0;
        let dy = self.1 - other.1;
        dx * dx + dy * dy
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Self::Output {
        Point(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point(self.0 - rhs.0, self.1 - rhs.1)
    }
}

// (width, height)
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct DimSize(pub f64, pub f64);

impl DimSize {
    // `center` is the middle of the box
    pub fn bound_on(&self, center: Point, target: Point) -> bool {
        let rel = target - center;
        let x = rel.0 + self.0 / 2.;
        let y = rel.1 + self.1 / 2.;

        x >= 0. && y >= 0. && x < self.0 && y < self.1
    }
}
