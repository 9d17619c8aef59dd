use crate::braille::BrailleCanvas;
use crate::draw::DrawContext;
use crate::error::Result;
use crate::view::geometry::draw_line;
use crate::view::viewport::Viewport;
use glam::DVec2;

/// How strongly a stroke shows up on the terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intensity {
    Faint,
    Medium,
    Strong,
}

impl Intensity {
    /// Bucket an alpha normalised to the draw's base opacity
    pub fn from_alpha(alpha: f64) -> Self {
        if alpha < 0.34 {
            Intensity::Faint
        } else if alpha < 0.67 {
            Intensity::Medium
        } else {
            Intensity::Strong
        }
    }
}

/// Rasterised grid, one Braille canvas per intensity
pub struct GridLayers {
    pub faint: BrailleCanvas,
    pub medium: BrailleCanvas,
    pub strong: BrailleCanvas,
    /// Last stroke style set on the context
    pub stroke_style: String,
}

impl GridLayers {
    fn new(width: usize, height: usize) -> Self {
        Self {
            faint: BrailleCanvas::new(width, height),
            medium: BrailleCanvas::new(width, height),
            strong: BrailleCanvas::new(width, height),
            stroke_style: String::new(),
        }
    }

    pub fn layer(&self, intensity: Intensity) -> &BrailleCanvas {
        match intensity {
            Intensity::Faint => &self.faint,
            Intensity::Medium => &self.medium,
            Intensity::Strong => &self.strong,
        }
    }

    fn layer_mut(&mut self, intensity: Intensity) -> &mut BrailleCanvas {
        match intensity {
            Intensity::Faint => &mut self.faint,
            Intensity::Medium => &mut self.medium,
            Intensity::Strong => &mut self.strong,
        }
    }
}

/// Immediate-mode context drawing millimetre lines onto Braille layers.
/// Braille has no alpha, so global alpha selects a layer instead.
pub struct TerminalContext<'a> {
    viewport: &'a Viewport,
    layers: GridLayers,
    base_opacity: f64,
    alpha: f64,
    line_width: f64,
}

impl<'a> TerminalContext<'a> {
    /// `width`/`height` in characters; `base_opacity` is the opacity the
    /// grid is drawn with, so full-strength levels land on the strong layer
    pub fn new(viewport: &'a Viewport, width: usize, height: usize, base_opacity: f64) -> Self {
        Self {
            viewport,
            layers: GridLayers::new(width, height),
            base_opacity,
            alpha: 1.0,
            line_width: 0.0,
        }
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn into_layers(self) -> GridLayers {
        self.layers
    }

    fn intensity(&self) -> Intensity {
        if self.base_opacity > 0.0 {
            Intensity::from_alpha(self.alpha / self.base_opacity)
        } else {
            Intensity::from_alpha(self.alpha)
        }
    }
}

impl DrawContext for TerminalContext<'_> {
    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn global_alpha(&self) -> f64 {
        self.alpha
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.layers.stroke_style.clear();
        self.layers.stroke_style.push_str(style);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2) -> Result<()> {
        let intensity = self.intensity();
        let p0 = self.viewport.project(from);
        let p1 = self.viewport.project(to);
        draw_line(self.layers.layer_mut(intensity), p0, p1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;

    #[test]
    fn test_intensity_buckets() {
        assert_eq!(Intensity::from_alpha(0.1), Intensity::Faint);
        assert_eq!(Intensity::from_alpha(0.5), Intensity::Medium);
        assert_eq!(Intensity::from_alpha(1.0), Intensity::Strong);
    }

    #[test]
    fn test_alpha_relative_to_base_opacity() {
        let vp = Viewport::new(1.0, 8, 8, &ViewerConfig::default());
        let mut ctx = TerminalContext::new(&vp, 4, 2, 0.1);
        ctx.set_global_alpha(0.1);
        ctx.stroke_line(DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0)).unwrap();
        let layers = ctx.into_layers();
        assert!(!layers.strong.is_blank());
        assert!(layers.faint.is_blank());
    }

    #[test]
    fn test_stroke_projects_world_units() {
        // 4 dots per mm; centre at dot (4, 4)
        let vp = Viewport::new(1.0, 8, 8, &ViewerConfig::default());
        let mut ctx = TerminalContext::new(&vp, 4, 2, 1.0);
        ctx.stroke_line(DVec2::new(0.0, -1.0), DVec2::new(0.0, 0.75)).unwrap();
        let layers = ctx.into_layers();
        // x = 4 is the left dot column of the third character
        assert!(layers.strong.glyph(2, 0).is_some());
        assert!(layers.strong.glyph(2, 1).is_some());
        assert!(layers.strong.glyph(0, 0).is_none());
    }
}
