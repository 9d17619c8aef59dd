//! Zoom-adaptive multi-resolution grid.
//!
//! A fixed number of nested square grids whose spacings differ by a
//! constant ratio. As the scale changes the finest level fades in across
//! each decade so the grid never pops between resolutions. Two output
//! paths share the same fade policy: immediate-mode strokes through a
//! [`DrawContext`], and recursive tile patterns attached to a
//! [`SceneGraph`].

use crate::draw::{AlphaGuard, DrawContext, DrawOptions};
use crate::error::{GridError, Result};
use crate::grid::bounds::Bounds;
use crate::grid::level::GridLevel;
use crate::scene::{Element, NodeRef, SceneGraph};
use crate::units::Units;
use serde::Deserialize;
use std::rc::Rc;

/// Levels with alpha at or below this are not drawn
const MIN_VISIBLE_ALPHA: f64 = 0.05;

/// Cap on the finest level's alpha
const FINEST_ALPHA_CAP: f64 = 0.75;

/// Construction options. Each field defaults independently.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MultiGridOptions {
    pub scale: f64,
    pub num_grids: usize,
    pub grid_size: f64,
    pub min_spacing: f64,
}

impl Default for MultiGridOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            num_grids: 2,
            grid_size: 10.0,
            min_spacing: 0.5,
        }
    }
}

impl MultiGridOptions {
    pub fn validate(&self) -> Result<()> {
        validate_scale(self.scale)?;
        if self.num_grids == 0 {
            return Err(GridError::InvalidNumGrids(self.num_grids));
        }
        if !self.grid_size.is_finite() || self.grid_size <= 1.0 {
            return Err(GridError::InvalidGridSize(self.grid_size));
        }
        if !self.min_spacing.is_finite() || self.min_spacing <= 0.0 {
            return Err(GridError::InvalidMinSpacing(self.min_spacing));
        }
        Ok(())
    }
}

fn validate_scale(scale: f64) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidScale(scale))
    }
}

/// Pattern definition attributes: the base id plus anything copied verbatim
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatternAttributes {
    pub id: String,
    pub extra: Vec<(String, String)>,
}

impl PatternAttributes {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            extra: Vec::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.extra.push((key.to_string(), value.to_string()));
        self
    }
}

/// Pattern nodes owned by the grid, plus what they were built from
struct PatternSet {
    attributes: PatternAttributes,
    /// `floor(zoom_level)` the tiles were sized for
    tier: i64,
    nodes: Vec<NodeRef>,
}

pub struct MultiGrid {
    scale: f64,
    num_grids: usize,
    grid_size: f64,
    min_spacing: f64,
    units: Units,
    bounds: Option<Bounds>,
    levels: Vec<GridLevel>,
    levels_scale: Option<f64>,
    patterns: Option<PatternSet>,
    rect: Option<NodeRef>,
    level_builds: u64,
    pattern_builds: u64,
}

impl MultiGrid {
    pub fn new(options: MultiGridOptions, units: Units) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            scale: options.scale,
            num_grids: options.num_grids,
            grid_size: options.grid_size,
            min_spacing: options.min_spacing,
            units,
            bounds: None,
            levels: Vec::new(),
            levels_scale: None,
            patterns: None,
            rect: None,
            level_builds: 0,
            pattern_builds: 0,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn num_grids(&self) -> usize {
        self.num_grids
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn min_spacing(&self) -> f64 {
        self.min_spacing
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Number of times the level set has been rebuilt
    pub fn level_builds(&self) -> u64 {
        self.level_builds
    }

    /// Number of times the pattern set has been rebuilt
    pub fn pattern_builds(&self) -> u64 {
        self.pattern_builds
    }

    /// Continuous position in grid-size decades relative to `min_spacing`
    pub fn zoom_level(&self) -> f64 {
        (self.scale / self.min_spacing).ln() / self.grid_size.ln()
    }

    fn tier(&self) -> i64 {
        self.tier_for(self.scale)
    }

    fn tier_for(&self, scale: f64) -> i64 {
        ((scale / self.min_spacing).ln() / self.grid_size.ln()).floor() as i64
    }

    /// Factor keeping level 0 within one decade of legibility
    pub fn magnification(&self) -> f64 {
        self.grid_size.powf(-self.zoom_level().floor())
    }

    /// Spacing of the finest level; constant within a zoom decade
    pub fn min_grid_spacing(&self) -> f64 {
        1.0 / self.grid_size.powf(self.zoom_level().floor())
    }

    /// Which level index the current decade rotates onto; the viewer
    /// shows it next to the level count
    pub fn zoom_offset(&self) -> usize {
        (-self.tier()).rem_euclid(self.num_grids as i64) as usize
    }

    /// Opacity of level `index` at the current scale
    pub fn level_alpha(&self, index: usize) -> f64 {
        let last = self.num_grids - 1;
        if index >= last {
            1.0
        } else if index == 0 {
            let zoom = self.zoom_level();
            (zoom - zoom.floor()) * FINEST_ALPHA_CAP
        } else {
            index as f64 / last as f64
        }
    }

    /// Stroke width giving one device pixel at the current scale
    pub fn line_width(&self) -> f64 {
        self.units.pixels_to_millimeters(1.0, self.scale)
    }

    //
    // setting methods
    //

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);

        if let Some(rect) = &self.rect {
            let size = bounds.size();
            let mut rect = rect.borrow_mut();
            rect.set_attr("x", format!("{}mm", bounds.x.min));
            rect.set_attr("y", format!("{}mm", bounds.y.min));
            rect.set_attr("width", format!("{}mm", size.x));
            rect.set_attr("height", format!("{}mm", size.y));
        }

        for level in &mut self.levels {
            level.set_bounds(bounds);
        }
    }

    /// Update the scale. Pattern tiles are rebuilt only when the spacing
    /// bucket changes; their stroke opacities are refreshed every time.
    /// A rebuild that would replace a node this grid does not own fails
    /// with `IdCollision` and leaves the scale unchanged.
    pub fn set_scale<S: SceneGraph + ?Sized>(&mut self, container: &mut S, scale: f64) -> Result<()> {
        validate_scale(scale)?;

        let tier = self.tier_for(scale);
        let stale = match &self.patterns {
            Some(set) => set.tier != tier,
            None => false,
        };

        if stale {
            let ids = self.pattern_ids();
            let scene: &S = container;
            if let Some(id) = ids.iter().find(|id| scene.contains(id) && !self.owns(scene, id)) {
                return Err(GridError::IdCollision(id.to_string()));
            }
            for id in &ids {
                if self.owns(container, id) {
                    container.detach(id);
                }
            }
        }

        self.scale = scale;

        if stale {
            if let Some(set) = self.patterns.take() {
                let nodes = self.build_patterns(&set.attributes);
                for (i, node) in nodes.iter().enumerate() {
                    container.attach(&pattern_id(&set.attributes.id, i), Rc::clone(node));
                }
                tracing::info!(
                    "Rebuilt {} grid patterns '{}' at spacing {}mm",
                    nodes.len(),
                    set.attributes.id,
                    self.min_grid_spacing()
                );
                self.patterns = Some(PatternSet {
                    attributes: set.attributes,
                    tier,
                    nodes,
                });
            }
        }

        self.apply_pattern_opacity();
        Ok(())
    }

    //
    // immediate-mode drawing
    //

    /// Current levels, rebuilt if the scale moved since the last build
    pub fn levels(&mut self) -> &[GridLevel] {
        self.ensure_levels();
        &self.levels
    }

    fn ensure_levels(&mut self) {
        if self.levels_scale == Some(self.scale) && self.levels.len() == self.num_grids {
            return;
        }

        let mut spacing = self.magnification();
        let mut levels = Vec::with_capacity(self.num_grids);
        for _ in 0..self.num_grids {
            let mut level = GridLevel::new(spacing);
            if let Some(bounds) = self.bounds {
                level.set_bounds(bounds);
            }
            levels.push(level);
            spacing *= self.grid_size;
        }

        self.levels = levels;
        self.levels_scale = Some(self.scale);
        self.level_builds += 1;
        tracing::debug!(
            "Built {} grid levels at scale {} (zoom level {:.3})",
            self.num_grids,
            self.scale,
            self.zoom_level()
        );
    }

    /// Stroke every visible level, finest first. Global alpha is back at
    /// 1.0 when this returns, whether or not a level failed.
    pub fn draw<C: DrawContext + ?Sized>(&mut self, context: &mut C, options: &DrawOptions) -> Result<()> {
        self.ensure_levels();
        if self.bounds.is_none() {
            tracing::warn!("Grid drawn before bounds were set");
        }

        let line_width = self.line_width();
        let mut context = AlphaGuard::new(context);

        for (i, level) in self.levels.iter().enumerate() {
            let alpha = self.level_alpha(i);
            if alpha <= MIN_VISIBLE_ALPHA {
                continue;
            }

            context.set_line_width(line_width);
            context.set_global_alpha(options.opacity * alpha);
            context.set_stroke_style(&options.stroke_style);
            level.draw(&mut *context)?;
        }

        Ok(())
    }

    //
    // vector pattern rendering
    //

    /// Build the pattern set and attach it to `container`. Fails without
    /// attaching anything if an id is already held by another owner.
    pub fn set_patterns<S: SceneGraph + ?Sized>(
        &mut self,
        container: &mut S,
        attributes: PatternAttributes,
    ) -> Result<()> {
        for i in 0..self.num_grids {
            let id = pattern_id(&attributes.id, i);
            if container.contains(&id) && !self.owns(container, &id) {
                return Err(GridError::IdCollision(id));
            }
        }

        if let Some(old) = self.patterns.take() {
            for i in 0..old.nodes.len() {
                container.detach(&pattern_id(&old.attributes.id, i));
            }
        }

        let nodes = self.build_patterns(&attributes);
        for (i, node) in nodes.iter().enumerate() {
            container.attach(&pattern_id(&attributes.id, i), Rc::clone(node));
        }

        self.patterns = Some(PatternSet {
            attributes,
            tier: self.tier(),
            nodes,
        });
        self.apply_pattern_opacity();
        Ok(())
    }

    /// Backing rectangle filled with the coarsest pattern, which in turn
    /// paints every finer level. Positions are in millimetres, like the
    /// tiles, so the fill lines up with the world origin.
    pub fn render(&mut self) -> Result<NodeRef> {
        let set = self.patterns.as_ref().ok_or(GridError::PatternsNotSet)?;
        let coarsest = pattern_id(&set.attributes.id, set.nodes.len() - 1);
        let (x, y) = self
            .bounds
            .map(|b| (b.x.min, b.y.min))
            .unwrap_or((0.0, 0.0));

        let rect = Element::new("rect")
            .attr("x", format!("{}mm", x))
            .attr("y", format!("{}mm", y))
            .attr("width", "100%")
            .attr("height", "100%")
            .attr("fill", format!("url(#{})", coarsest))
            .into_node();

        self.rect = Some(Rc::clone(&rect));
        Ok(rect)
    }

    /// Pattern nodes currently attached, finest first
    pub fn patterns(&self) -> &[NodeRef] {
        self.patterns
            .as_ref()
            .map(|set| set.nodes.as_slice())
            .unwrap_or(&[])
    }

    /// Ids of the patterns currently held, finest first
    fn pattern_ids(&self) -> Vec<String> {
        match &self.patterns {
            Some(set) => (0..set.nodes.len())
                .map(|i| pattern_id(&set.attributes.id, i))
                .collect(),
            None => Vec::new(),
        }
    }

    fn owns<S: SceneGraph + ?Sized>(&self, container: &S, id: &str) -> bool {
        match (container.get(id), &self.patterns) {
            (Some(node), Some(set)) => set.nodes.iter().any(|ours| Rc::ptr_eq(ours, &node)),
            _ => false,
        }
    }

    fn build_patterns(&mut self, attributes: &PatternAttributes) -> Vec<NodeRef> {
        let mut spacing = self.min_grid_spacing();
        let mut nodes = Vec::with_capacity(self.num_grids);

        for i in 0..self.num_grids {
            let size = format!("{}mm", spacing);
            let mut pattern = Element::new("pattern").attr("id", pattern_id(&attributes.id, i));
            for (key, value) in &attributes.extra {
                if key != "id" {
                    pattern.set_attr(key, value);
                }
            }
            pattern.set_attr("width", &size);
            pattern.set_attr("height", &size);
            pattern.set_attr("patternUnits", "userSpaceOnUse");

            // Each coarser tile is layered over the next finer one
            if i > 0 {
                pattern.push(
                    Element::new("rect")
                        .attr("width", &size)
                        .attr("height", &size)
                        .attr("fill", format!("url(#{})", pattern_id(&attributes.id, i - 1))),
                );
            }

            let path = Element::new("path")
                .attr("d", format!("M {} 0 L 0 0 0 {}", spacing, spacing))
                .attr("fill", "none");
            pattern.push(
                Element::new("svg")
                    .attr("x", 0)
                    .attr("y", 0)
                    .attr("width", &size)
                    .attr("height", &size)
                    .attr("viewBox", format!("0 0 {} {}", spacing, spacing))
                    .child(path),
            );

            nodes.push(pattern.into_node());
            spacing *= self.grid_size;
        }

        self.pattern_builds += 1;
        nodes
    }

    fn apply_pattern_opacity(&self) {
        let Some(set) = &self.patterns else {
            return;
        };
        for (i, node) in set.nodes.iter().enumerate() {
            let alpha = self.level_alpha(i);
            node.borrow()
                .for_each_named("path", &mut |path: &mut Element| path.set_attr("stroke-opacity", alpha));
        }
    }
}

fn pattern_id(base: &str, index: usize) -> String {
    format!("{}{}", base, index)
}
