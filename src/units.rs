use serde::Deserialize;

/// CSS reference density: 96 pixels per inch.
pub const CSS_PIXELS_PER_MILLIMETER: f64 = 96.0 / 25.4;

/// Physical unit conversions shared by everything drawn in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Units {
    pub pixels_per_millimeter: f64,
}

impl Units {
    pub fn new(pixels_per_millimeter: f64) -> Self {
        Self {
            pixels_per_millimeter,
        }
    }

    /// Convert a length in device pixels to millimetres at the given scale.
    pub fn pixels_to_millimeters(&self, pixels: f64, scale: f64) -> f64 {
        pixels / self.pixels_per_millimeter / scale
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::new(CSS_PIXELS_PER_MILLIMETER)
    }
}
