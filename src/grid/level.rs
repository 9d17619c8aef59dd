use crate::draw::DrawContext;
use crate::error::Result;
use crate::grid::bounds::Bounds;
use glam::DVec2;

/// A single square tiling at one spacing value
#[derive(Clone, Debug, PartialEq)]
pub struct GridLevel {
    spacing: f64,
    bounds: Option<Bounds>,
}

impl GridLevel {
    pub fn new(spacing: f64) -> Self {
        Self {
            spacing,
            bounds: None,
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// Grid-aligned coordinates inside `[min, max]` along one axis
    fn ticks(&self, min: f64, max: f64) -> impl Iterator<Item = f64> {
        let spacing = self.spacing;
        let first = (min / spacing).ceil() as i64;
        let last = (max / spacing).floor() as i64;
        (first..=last).map(move |k| k as f64 * spacing)
    }

    /// Line segments covering the bounds: verticals first, then horizontals
    pub fn lines(&self) -> Vec<(DVec2, DVec2)> {
        let Some(b) = self.bounds else {
            return Vec::new();
        };
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Vec::new();
        }

        let verticals = self
            .ticks(b.x.min, b.x.max)
            .map(|x| (DVec2::new(x, b.y.min), DVec2::new(x, b.y.max)));
        let horizontals = self
            .ticks(b.y.min, b.y.max)
            .map(|y| (DVec2::new(b.x.min, y), DVec2::new(b.x.max, y)));

        verticals.chain(horizontals).collect()
    }

    /// Stroke every line of this level with the context's current style
    pub fn draw<C: DrawContext + ?Sized>(&self, context: &mut C) -> Result<()> {
        for (from, to) in self.lines() {
            context.stroke_line(from, to)?;
        }
        Ok(())
    }
}
