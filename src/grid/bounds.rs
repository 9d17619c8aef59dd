use glam::DVec2;

/// Closed interval along one axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Axis-aligned rectangle in world units (millimetres)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: Range,
    pub y: Range,
}

impl Bounds {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self {
            x: Range::new(min.x, max.x),
            y: Range::new(min.y, max.y),
        }
    }

    /// Rectangle of the given size centred on a point
    pub fn centered(center: DVec2, size: DVec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn min(&self) -> DVec2 {
        DVec2::new(self.x.min, self.y.min)
    }

    pub fn max(&self) -> DVec2 {
        DVec2::new(self.x.max, self.y.max)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.x.size(), self.y.size())
    }

    pub fn width(&self) -> f64 {
        self.x.size()
    }

    pub fn height(&self) -> f64 {
        self.y.size()
    }

    pub fn contains(&self, point: DVec2) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }
}
