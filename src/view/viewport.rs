use crate::config::ViewerConfig;
use crate::grid::Bounds;
use glam::DVec2;

/// Visible region of the millimetre plane, in Braille dots.
/// World y grows downward, matching screen and SVG coordinates.
#[derive(Clone, Debug)]
pub struct Viewport {
    /// World point at the canvas centre (mm)
    pub center: DVec2,
    /// Display scale (higher = more zoomed in)
    pub scale: f64,
    /// Canvas dot width
    pub width: usize,
    /// Canvas dot height
    pub height: usize,
    /// Dots per millimetre at scale 1
    pub dots_per_millimeter: f64,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
}

impl Viewport {
    pub fn new(scale: f64, width: usize, height: usize, config: &ViewerConfig) -> Self {
        Self {
            center: DVec2::ZERO,
            scale: scale.clamp(config.min_scale, config.max_scale),
            width,
            height,
            dots_per_millimeter: config.dots_per_millimeter,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
        }
    }

    /// Dots per world millimetre at the current scale
    pub fn dots_per_unit(&self) -> f64 {
        self.dots_per_millimeter * self.scale
    }

    fn half_size(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64) * 0.5
    }

    /// Project a world point to dot coordinates
    pub fn project(&self, point: DVec2) -> (i32, i32) {
        let p = (point - self.center) * self.dots_per_unit() + self.half_size();
        (p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Unproject dot coordinates back to the world
    pub fn unproject(&self, px: i32, py: i32) -> DVec2 {
        let p = DVec2::new(px as f64, py as f64);
        (p - self.half_size()) / self.dots_per_unit() + self.center
    }

    /// World rectangle covered by the canvas
    pub fn visible_bounds(&self) -> Bounds {
        let size = DVec2::new(self.width as f64, self.height as f64) / self.dots_per_unit();
        Bounds::centered(self.center, size)
    }

    /// Pan the viewport by a dot delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.center += DVec2::new(dx as f64, dy as f64) / self.dots_per_unit();
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale * self.zoom_step).min(self.max_scale);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale / self.zoom_step).max(self.min_scale);
    }

    /// Zoom in towards a specific dot location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, self.zoom_step);
    }

    /// Zoom out from a specific dot location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / self.zoom_step);
    }

    /// Zoom by factor, keeping the world point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let anchor = self.unproject(px, py);
        self.scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);

        let offset = DVec2::new(px as f64, py as f64) - self.half_size();
        self.center = anchor - offset / self.dots_per_unit();
    }
}
