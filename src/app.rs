use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tui_multigrid::config::{Config, ExportConfig};
use tui_multigrid::draw::DrawOptions;
use tui_multigrid::grid::{MultiGrid, PatternAttributes};
use tui_multigrid::scene::SvgDocument;
use tui_multigrid::view::{frame_document, GridLayers, TerminalContext, Viewport};

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub grid: MultiGrid,
    /// Vector document holding the grid's pattern definitions
    pub document: SvgDocument,
    pub options: DrawOptions,
    pub show_grid: bool,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Result of the last export, shown in the status bar
    pub message: Option<String>,
    export: ExportConfig,
}

/// Braille dot size of the map area inside the border and status bar
fn inner_dots(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3); // 2 for border + 1 for status bar
    (inner_width * 2, inner_height * 4)
}

impl App {
    pub fn new(config: &Config, width: usize, height: usize) -> Result<Self> {
        let (dot_width, dot_height) = inner_dots(width, height);
        let viewport = Viewport::new(config.grid.scale, dot_width, dot_height, &config.viewer);

        let mut grid = MultiGrid::new(config.grid, config.units).context("Invalid [grid] configuration")?;
        let mut document = SvgDocument::new();
        grid.set_patterns(&mut document, PatternAttributes::new(&config.export.pattern_id))
            .context("Failed to create grid patterns")?;

        let mut app = Self {
            viewport,
            grid,
            document,
            options: config.style.clone(),
            show_grid: true,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            message: None,
            export: config.export.clone(),
        };
        app.sync_grid();
        Ok(app)
    }

    /// Push the viewport's scale and bounds into the grid
    fn sync_grid(&mut self) {
        if let Err(e) = self.grid.set_scale(&mut self.document, self.viewport.scale) {
            tracing::warn!("Ignoring scale update: {}", e);
        }
        self.grid.set_bounds(self.viewport.visible_bounds());
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (dot_width, dot_height) = inner_dots(width, height);
        self.viewport.width = dot_width;
        self.viewport.height = dot_height;
        self.sync_grid();
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.sync_grid();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.sync_grid();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.sync_grid();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.viewport.zoom_in_at(px, py);
        self.sync_grid();
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_dots(col, row);
        self.viewport.zoom_out_at(px, py);
        self.sync_grid();
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Rasterise the grid for a map area of `width` x `height` characters
    pub fn render_grid(&mut self, width: usize, height: usize) -> Option<GridLayers> {
        if !self.show_grid {
            return None;
        }
        let mut context = TerminalContext::new(&self.viewport, width, height, self.options.opacity);
        match self.grid.draw(&mut context, &self.options) {
            Ok(()) => Some(context.into_layers()),
            Err(e) => {
                tracing::warn!("Grid draw failed: {}", e);
                None
            }
        }
    }

    /// Write the pattern-filled grid for the current view to an SVG file
    pub fn export_svg(&mut self) -> Result<PathBuf> {
        let bounds = self.viewport.visible_bounds();
        let rect = self.grid.render()?;

        frame_document(&mut self.document, &bounds, &self.grid.units());
        self.document.clear_body();
        self.document.add_to_body(rect);

        let path = self.export.path.clone();
        fs::write(&path, self.document.to_svg_string())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Exported grid to {}", path.display());
        Ok(path)
    }

    /// Export and record the outcome for the status bar
    pub fn export(&mut self) {
        self.message = Some(match self.export_svg() {
            Ok(path) => format!("saved {}", path.display()),
            Err(e) => {
                tracing::error!("{:#}", e);
                format!("export failed: {}", e)
            }
        });
    }

    pub fn scale_label(&self) -> String {
        format!("{:.2}x", self.viewport.scale)
    }

    pub fn zoom_label(&self) -> String {
        format!("{:.2}", self.grid.zoom_level())
    }

    /// Spacing of the finest level in millimetres
    pub fn spacing_label(&self) -> String {
        format!("{}mm", self.grid.magnification())
    }

    /// Level count and the index the current decade rotates onto
    pub fn levels_label(&self) -> String {
        format!("x{}@{}", self.grid.num_grids(), self.grid.zoom_offset())
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.2}mm, {:.2}mm",
            self.viewport.center.x, self.viewport.center.y
        )
    }

    /// Handle mouse drag: pan opposite to the pointer movement
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in Braille dot coordinates (for the cursor marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_dots(col, row))
    }
}

/// Terminal cell to Braille dots, accounting for the 1-cell border
fn cell_to_dots(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_multigrid::scene::SceneGraph;

    fn app() -> App {
        App::new(&Config::default(), 82, 43).unwrap()
    }

    #[test]
    fn test_new_attaches_patterns() {
        let app = app();
        assert!(app.document.contains("grid-pattern-0"));
        assert!(app.document.contains("grid-pattern-1"));
        assert_eq!(app.viewport.width, 160);
        assert_eq!(app.viewport.height, 160);
    }

    #[test]
    fn test_pan_moves_grid_bounds() {
        let mut app = app();
        app.pan(40, 0);
        let bounds = app.grid.bounds().copied().unwrap();
        assert_eq!(bounds, app.viewport.visible_bounds());
        assert!(bounds.x.min > -20.0);
    }

    #[test]
    fn test_zoom_within_decade_keeps_patterns() {
        let mut app = app();
        let builds = app.grid.pattern_builds();
        // 1.0 -> 1.5 stays in the same decade
        app.zoom_in();
        assert_eq!(app.grid.pattern_builds(), builds);
        // 1.5 -> 2.25 -> 3.375 -> 5.06 crosses into the next
        app.zoom_in();
        app.zoom_in();
        app.zoom_in();
        assert_eq!(app.grid.pattern_builds(), builds + 1);
    }

    #[test]
    fn test_render_grid_draws_coarsest_level() {
        let mut app = app();
        let layers = app.render_grid(80, 40).unwrap();
        assert!(!layers.strong.is_blank());
        assert_eq!(layers.stroke_style, "blue");
    }

    #[test]
    fn test_export_frames_current_view() {
        let mut app = app();
        let path = std::env::temp_dir().join(format!("tui-multigrid-export-{}.svg", std::process::id()));
        app.export.path = path.clone();

        app.export_svg().unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        let _ = fs::remove_file(&path);

        // 160 x 160 dots at 4 dots/mm centred on the origin
        let ppm = app.grid.units().pixels_per_millimeter;
        let view_box = format!("viewBox=\"{} {} {} {}\"", -20.0 * ppm, -20.0 * ppm, 40.0 * ppm, 40.0 * ppm);
        assert!(svg.contains("width=\"40mm\" height=\"40mm\""));
        assert!(svg.contains(&view_box));
        assert!(svg.contains("<rect x=\"-20mm\" y=\"-20mm\" width=\"100%\" height=\"100%\" fill=\"url(#grid-pattern-1)\"/>"));
    }

    #[test]
    fn test_levels_label_tracks_decade() {
        let mut app = app();
        assert_eq!(app.levels_label(), "x2@0");
        // 1.0 * 1.5^4 = 5.06, one decade in
        for _ in 0..4 {
            app.zoom_in();
        }
        assert_eq!(app.levels_label(), "x2@1");
    }

    #[test]
    fn test_hidden_grid_renders_nothing() {
        let mut app = app();
        app.toggle_grid();
        assert!(app.render_grid(80, 40).is_none());
    }
}
